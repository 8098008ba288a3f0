use crate::entities::introspect::{Attribute, Introspect};
use crate::entities::parsed_json::{BASE_GETTER_NAMES, ParsedJson};
use crate::entities::units::{duration_human, parse_creation_time, size_human};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::ops::Deref;

/// Container-level metadata, built from the report's `format` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParsedJson", into = "ParsedJson")]
pub struct Format {
    raw: ParsedJson,
    filename: Option<String>,
    format_name: Option<String>,
    format_long_name: Option<String>,
    num_streams: Option<i64>,
    num_programs: Option<i64>,
    start_time_secs: Option<f64>,
    duration_secs: Option<f64>,
    duration_human: Option<String>,
    size_bytes: Option<u64>,
    size_human: Option<String>,
    bit_rate_bps: Option<i64>,
    probe_score: Option<i64>,
    title: Option<String>,
    creation_time: Option<DateTime<Utc>>,
}

impl Format {
    pub fn new(raw: ParsedJson) -> Self {
        let duration_secs = raw.get_as_f64("duration", None);
        let size_bytes = raw
            .get_as_i64("size", None)
            .and_then(|size| u64::try_from(size).ok());
        Self {
            filename: raw.get_str("filename", None),
            format_name: raw.get_str("format_name", None),
            format_long_name: raw.get_str("format_long_name", None),
            num_streams: raw.get_as_i64("nb_streams", None),
            num_programs: raw.get_as_i64("nb_programs", None),
            start_time_secs: raw.get_as_f64("start_time", None),
            duration_secs,
            duration_human: duration_secs.and_then(duration_human),
            size_bytes,
            size_human: size_bytes.map(size_human),
            bit_rate_bps: raw.get_as_i64("bit_rate", None),
            probe_score: raw.get_as_i64("probe_score", None),
            title: raw.get_tag("title", None),
            creation_time: raw
                .get_tag("creation_time", None)
                .as_deref()
                .and_then(parse_creation_time),
            raw,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Short name(s) of the container, e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`.
    pub fn format_name(&self) -> Option<&str> {
        self.format_name.as_deref()
    }

    pub fn format_long_name(&self) -> Option<&str> {
        self.format_long_name.as_deref()
    }

    pub const fn num_streams(&self) -> Option<i64> {
        self.num_streams
    }

    pub const fn num_programs(&self) -> Option<i64> {
        self.num_programs
    }

    pub const fn start_time_secs(&self) -> Option<f64> {
        self.start_time_secs
    }

    pub const fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    /// Duration as `HH:MM:SS.ss`.
    pub fn duration_human(&self) -> Option<&str> {
        self.duration_human.as_deref()
    }

    pub const fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }

    /// Size with an SI-decimal prefix, e.g. `"567.8 MB"`.
    pub fn size_human(&self) -> Option<&str> {
        self.size_human.as_deref()
    }

    pub const fn bit_rate_bps(&self) -> Option<i64> {
        self.bit_rate_bps
    }

    pub fn bit_rate_kbps(&self) -> Option<f64> {
        self.bit_rate_bps.map(|bps| bps as f64 / 1000.0)
    }

    pub const fn probe_score(&self) -> Option<i64> {
        self.probe_score
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub const fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.creation_time
    }

    pub fn tags(&self) -> Map<String, Value> {
        self.raw.tags()
    }
}

static FORMAT_ATTRIBUTES: &[Attribute<Format>] = &[
    Attribute::new("bit_rate_bps", |f: &Format| json!(f.bit_rate_bps)),
    Attribute::new("bit_rate_kbps", |f: &Format| json!(f.bit_rate_kbps())),
    Attribute::new("creation_time", |f: &Format| {
        json!(f.creation_time.map(|t| t.to_rfc3339()))
    }),
    Attribute::new("duration_human", |f: &Format| json!(f.duration_human)),
    Attribute::new("duration_secs", |f: &Format| json!(f.duration_secs)),
    Attribute::new("filename", |f: &Format| json!(f.filename)),
    Attribute::new("format_long_name", |f: &Format| json!(f.format_long_name)),
    Attribute::new("format_name", |f: &Format| json!(f.format_name)),
    Attribute::new("num_programs", |f: &Format| json!(f.num_programs)),
    Attribute::new("num_streams", |f: &Format| json!(f.num_streams)),
    Attribute::new("probe_score", |f: &Format| json!(f.probe_score)),
    Attribute::new("size_bytes", |f: &Format| json!(f.size_bytes)),
    Attribute::new("size_human", |f: &Format| json!(f.size_human)),
    Attribute::new("start_time_secs", |f: &Format| json!(f.start_time_secs)),
    Attribute::new("tags", |f: &Format| Value::Object(f.tags())),
    Attribute::new("title", |f: &Format| json!(f.title)),
];

impl Introspect for Format {
    fn attributes() -> &'static [Attribute<Self>] {
        FORMAT_ATTRIBUTES
    }

    fn getter_names(&self) -> &'static [&'static str] {
        BASE_GETTER_NAMES
    }

    fn raw(&self) -> &ParsedJson {
        &self.raw
    }
}

impl Deref for Format {
    type Target = ParsedJson;

    fn deref(&self) -> &ParsedJson {
        &self.raw
    }
}

impl From<ParsedJson> for Format {
    fn from(raw: ParsedJson) -> Self {
        Self::new(raw)
    }
}

impl From<Format> for ParsedJson {
    fn from(format: Format) -> Self {
        format.raw
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Format(({}): {}, {}, {} kb/s)",
            display_opt(self.format_name.as_ref()),
            display_opt(self.duration_human.as_ref()),
            display_opt(self.size_human.as_ref()),
            display_opt(self.bit_rate_kbps().as_ref()),
        )
    }
}

/// Renders a missing value as `None`, the way the summaries print gaps.
pub(crate) fn display_opt<T: fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "None".to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::units::SizeBase;
    use chrono::Datelike;

    fn sample_format() -> Format {
        Format::new(ParsedJson::from_value_lossy(json!({
            "filename": "SampleVideo_720x480_5mb.mp4",
            "nb_streams": 2,
            "nb_programs": 0,
            "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
            "format_long_name": "QuickTime / MOV",
            "start_time": "0.000000",
            "duration": "30.998000",
            "size": "5243244",
            "bit_rate": "1353182",
            "probe_score": 100,
            "tags": {
                "major_brand": "isom",
                "creation_time": "1970-01-01T00:00:00.000000Z",
                "title": "Sample"
            }
        })))
    }

    #[test]
    fn test_derived_attributes() {
        let format = sample_format();
        assert_eq!(format.format_name(), Some("mov,mp4,m4a,3gp,3g2,mj2"));
        assert_eq!(format.format_long_name(), Some("QuickTime / MOV"));
        assert_eq!(format.num_streams(), Some(2));
        assert_eq!(format.duration_secs(), Some(30.998));
        assert_eq!(format.duration_human(), Some("00:00:31.00"));
        assert_eq!(format.size_bytes(), Some(5_243_244));
        assert_eq!(format.size_human(), Some("5.2 MB"));
        assert_eq!(format.bit_rate_bps(), Some(1_353_182));
        assert_eq!(format.bit_rate_kbps(), Some(1353.182));
        assert_eq!(format.probe_score(), Some(100));
        assert_eq!(format.title(), Some("Sample"));
        assert_eq!(format.creation_time().map(|t| t.year()), Some(1970));
    }

    #[test]
    fn test_missing_fields_are_none() {
        let format = Format::new(ParsedJson::default());
        assert_eq!(format.size_bytes(), None);
        assert_eq!(format.size_human(), None);
        assert_eq!(format.duration_secs(), None);
        assert_eq!(format.duration_human(), None);
        assert_eq!(format.bit_rate_kbps(), None);
        assert!(format.tags().is_empty());
    }

    #[test]
    fn test_negative_size_has_no_byte_count() {
        let format = Format::new(ParsedJson::from_value_lossy(json!({ "size": "-1" })));
        assert_eq!(format.size_bytes(), None);
        assert_eq!(format.size_human(), None);
    }

    #[test]
    fn test_display_summary() {
        assert_eq!(
            sample_format().to_string(),
            "Format((mov,mp4,m4a,3gp,3g2,mj2): 00:00:31.00, 5.2 MB, 1353.182 kb/s)"
        );
        assert_eq!(
            Format::new(ParsedJson::default()).to_string(),
            "Format((None): None, None, None kb/s)"
        );
    }

    #[test]
    fn test_introspection() {
        let format = sample_format();
        assert!(format.attr_names().contains(&"size_human"));
        assert!(format.attr_names().contains(&"duration_human"));
        assert_eq!(format.attribute("size_human"), Some(json!("5.2 MB")));
        assert_eq!(format.keys()[0], "filename");
        assert!(format.getter_names().contains(&"get_duration_as_human"));
    }

    #[test]
    fn test_generic_getters_on_format() {
        let format = sample_format();
        assert_eq!(format.get_as_f64("duration", None), Some(30.998));
        assert_eq!(format.get_as_i64("nb_streams", None), Some(2));
        assert_eq!(
            format.get_str("format_long_name", None),
            Some("QuickTime / MOV".to_string())
        );
        assert_eq!(
            format.get_tag("major_brand", None),
            Some("isom".to_string())
        );
        assert_eq!(
            format.get_duration_as_human(None),
            Some("00:00:31.00".to_string())
        );
        assert_eq!(
            format.get_datasize_as_human("size", "B", None, SizeBase::Binary),
            Some("5.0 MiB".to_string())
        );
        assert_eq!(format.get("probe_score"), Some(&json!(100)));
        assert_eq!(format.get_disposition("default"), None);
        assert_eq!(
            format.get_str("missing", Some("fallback")),
            Some("fallback".to_string())
        );
    }

    #[test]
    fn test_serializes_to_retained_document() {
        let format = sample_format();
        let value = serde_json::to_value(&format).unwrap();
        assert_eq!(&value, &Value::Object(format.raw().as_map().clone()));
        let rebuilt: Format = serde_json::from_value(value).unwrap();
        assert_eq!(rebuilt, format);
    }
}

use crate::entities::format::display_opt;
use crate::entities::introspect::{Attribute, Introspect};
use crate::entities::parsed_json::{BASE_GETTER_NAMES, ParsedJson};
use crate::entities::units::parse_ratio;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::ops::Deref;

/// One entry of the report's optional `chapters` sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParsedJson", into = "ParsedJson")]
pub struct Chapter {
    raw: ParsedJson,
    id: Option<i64>,
    time_base: Option<String>,
    start: Option<i64>,
    end: Option<i64>,
    start_time_secs: Option<f64>,
    end_time_secs: Option<f64>,
    title: Option<String>,
}

impl Chapter {
    pub fn new(raw: ParsedJson) -> Self {
        let time_base = raw.get_str("time_base", None);
        let ratio = time_base.as_deref().and_then(parse_ratio);
        let start = raw.get_as_i64("start", None);
        let end = raw.get_as_i64("end", None);
        let in_secs = |ticks: Option<i64>| {
            let (num, den) = ratio?;
            Some(ticks? as f64 * num / den)
        };
        Self {
            id: raw.get_as_i64("id", None),
            start_time_secs: raw.get_as_f64("start_time", in_secs(start)),
            end_time_secs: raw.get_as_f64("end_time", in_secs(end)),
            title: raw.get_tag("title", None),
            time_base,
            start,
            end,
            raw,
        }
    }

    pub const fn id(&self) -> Option<i64> {
        self.id
    }

    /// Seconds per tick, as the rational string ffprobe prints (e.g. `"1/1000"`).
    pub fn time_base(&self) -> Option<&str> {
        self.time_base.as_deref()
    }

    /// Start position in `time_base` ticks.
    pub const fn start(&self) -> Option<i64> {
        self.start
    }

    /// End position in `time_base` ticks.
    pub const fn end(&self) -> Option<i64> {
        self.end
    }

    pub const fn start_time_secs(&self) -> Option<f64> {
        self.start_time_secs
    }

    pub const fn end_time_secs(&self) -> Option<f64> {
        self.end_time_secs
    }

    pub fn duration_secs(&self) -> Option<f64> {
        Some(self.end_time_secs? - self.start_time_secs?)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn tags(&self) -> Map<String, Value> {
        self.raw.tags()
    }
}

static CHAPTER_ATTRIBUTES: &[Attribute<Chapter>] = &[
    Attribute::new("duration_secs", |c: &Chapter| json!(c.duration_secs())),
    Attribute::new("end", |c: &Chapter| json!(c.end)),
    Attribute::new("end_time_secs", |c: &Chapter| json!(c.end_time_secs)),
    Attribute::new("id", |c: &Chapter| json!(c.id)),
    Attribute::new("start", |c: &Chapter| json!(c.start)),
    Attribute::new("start_time_secs", |c: &Chapter| json!(c.start_time_secs)),
    Attribute::new("tags", |c: &Chapter| Value::Object(c.tags())),
    Attribute::new("time_base", |c: &Chapter| json!(c.time_base)),
    Attribute::new("title", |c: &Chapter| json!(c.title)),
];

impl Introspect for Chapter {
    fn attributes() -> &'static [Attribute<Self>] {
        CHAPTER_ATTRIBUTES
    }

    fn getter_names(&self) -> &'static [&'static str] {
        BASE_GETTER_NAMES
    }

    fn raw(&self) -> &ParsedJson {
        &self.raw
    }
}

impl Deref for Chapter {
    type Target = ParsedJson;

    fn deref(&self) -> &ParsedJson {
        &self.raw
    }
}

impl From<ParsedJson> for Chapter {
    fn from(raw: ParsedJson) -> Self {
        Self::new(raw)
    }
}

impl From<Chapter> for ParsedJson {
    fn from(chapter: Chapter) -> Self {
        chapter.raw
    }
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chapter(chapters[{}]: \"{}\")",
            display_opt(self.id.as_ref()),
            display_opt(self.title.as_ref()),
        )
    }
}

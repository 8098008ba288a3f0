use crate::entities::chapter::Chapter;
use crate::entities::format::{Format, display_opt};
use crate::entities::introspect::{Attribute, Introspect};
use crate::entities::parsed_json::{BASE_GETTER_NAMES, ParsedJson};
use crate::entities::stream::{AttachmentStream, AudioStream, Stream, SubtitleStream, VideoStream};
use crate::error::ProbeError;
use crate::mapper;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::ops::Deref;

/// The root of the entity graph: everything one probe learned about one target.
///
/// Serializes to the retained report document. Deserializing re-runs the mapper, so a
/// round trip reproduces every derived attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "ParsedJson")]
pub struct ProbeResult {
    raw: ParsedJson,
    format: Format,
    chapters: Vec<Chapter>,
    streams: Vec<Stream>,
    command_line: Vec<String>,
}

impl ProbeResult {
    pub(crate) const fn from_parts(
        raw: ParsedJson,
        format: Format,
        chapters: Vec<Chapter>,
        streams: Vec<Stream>,
        command_line: Vec<String>,
    ) -> Self {
        Self {
            raw,
            format,
            chapters,
            streams,
            command_line,
        }
    }

    pub const fn format(&self) -> &Format {
        &self.format
    }

    /// Chapters in document order; empty when the report has none.
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Every stream entry in document order, recognized kind or not.
    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn attachment(&self) -> Vec<&AttachmentStream> {
        self.streams.iter().filter_map(Stream::as_attachment).collect()
    }

    pub fn audio(&self) -> Vec<&AudioStream> {
        self.streams.iter().filter_map(Stream::as_audio).collect()
    }

    pub fn subtitle(&self) -> Vec<&SubtitleStream> {
        self.streams.iter().filter_map(Stream::as_subtitle).collect()
    }

    pub fn video(&self) -> Vec<&VideoStream> {
        self.streams.iter().filter_map(Stream::as_video).collect()
    }

    /// The argument vector that produced this report. Empty when the result was mapped
    /// from a document rather than probed.
    pub fn command_line(&self) -> &[String] {
        &self.command_line
    }

    pub fn executed_cmd(&self) -> Option<&str> {
        self.command_line.first().map(String::as_str)
    }

    /// The probed target, exactly as it was passed to the executable.
    pub fn media_file_path(&self) -> Option<&str> {
        self.command_line.last().map(String::as_str)
    }

    pub fn into_raw(self) -> Value {
        Value::Object(self.raw.into_map())
    }
}

static PROBE_RESULT_ATTRIBUTES: &[Attribute<ProbeResult>] = &[
    Attribute::new("command_line", |r: &ProbeResult| json!(r.command_line)),
    Attribute::new("executed_cmd", |r: &ProbeResult| json!(r.executed_cmd())),
    Attribute::new("media_file_path", |r: &ProbeResult| json!(r.media_file_path())),
    Attribute::new("num_chapters", |r: &ProbeResult| json!(r.chapters.len())),
    Attribute::new("num_streams", |r: &ProbeResult| json!(r.streams.len())),
];

impl Introspect for ProbeResult {
    fn attributes() -> &'static [Attribute<Self>] {
        PROBE_RESULT_ATTRIBUTES
    }

    fn getter_names(&self) -> &'static [&'static str] {
        BASE_GETTER_NAMES
    }

    fn raw(&self) -> &ParsedJson {
        &self.raw
    }
}

impl Deref for ProbeResult {
    type Target = ParsedJson;

    fn deref(&self) -> &ParsedJson {
        &self.raw
    }
}

impl TryFrom<Value> for ProbeResult {
    type Error = ProbeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        mapper::map(value)
    }
}

impl From<ProbeResult> for ParsedJson {
    fn from(result: ProbeResult) -> Self {
        result.raw
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProbeResult({}: {} streams, {} chapters)",
            display_opt(self.media_file_path().as_ref()),
            self.streams.len(),
            self.chapters.len(),
        )?;
        write!(f, "\n  {}", self.format)?;
        for chapter in &self.chapters {
            write!(f, "\n  {chapter}")?;
        }
        for stream in &self.streams {
            write!(f, "\n  {stream}")?;
        }
        Ok(())
    }
}

//! Entity Mapper: turns a decoded report into the typed [`ProbeResult`] graph.

use crate::entities::chapter::Chapter;
use crate::entities::format::Format;
use crate::entities::parsed_json::ParsedJson;
use crate::entities::probe_result::ProbeResult;
use crate::entities::stream::Stream;
use crate::error::ProbeError;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Maps a decoded report into a [`ProbeResult`] with an empty command line.
///
/// # Errors
///
/// Returns [`ProbeError::Schema`] if the document is not a mapping, lacks a `format` mapping
/// or a `streams` sequence, or carries a `chapters` value that is not a sequence. A missing
/// `chapters` key maps to no chapters.
pub fn map(document: Value) -> Result<ProbeResult, ProbeError> {
    map_with_command_line(document, Vec::new())
}

/// Like [`map`], but records the argument vector that produced `document`.
pub fn map_with_command_line(
    document: Value,
    command_line: Vec<String>,
) -> Result<ProbeResult, ProbeError> {
    let Value::Object(root) = document else {
        return Err(ProbeError::Schema {
            key: "<root>",
            expected: "a mapping",
        });
    };

    let format = match root.get("format") {
        Some(Value::Object(format)) => Format::new(ParsedJson::new(format.clone())),
        _ => {
            return Err(ProbeError::Schema {
                key: "format",
                expected: "a mapping",
            });
        }
    };

    let streams: Vec<Stream> = match root.get("streams") {
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(position, entry)| Stream::from_json(snapshot(entry, "streams", position)))
            .collect(),
        _ => {
            return Err(ProbeError::Schema {
                key: "streams",
                expected: "a sequence",
            });
        }
    };

    let chapters: Vec<Chapter> = match root.get("chapters") {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(position, entry)| Chapter::new(snapshot(entry, "chapters", position)))
            .collect(),
        Some(_) => {
            return Err(ProbeError::Schema {
                key: "chapters",
                expected: "a sequence",
            });
        }
    };

    debug!(
        streams = streams.len(),
        chapters = chapters.len(),
        "Mapped probe report"
    );
    Ok(ProbeResult::from_parts(
        ParsedJson::new(root),
        format,
        chapters,
        streams,
        command_line,
    ))
}

/// Snapshots one sequence element; a non-mapping element becomes an empty entity.
fn snapshot(entry: &Value, section: &str, position: usize) -> ParsedJson {
    match entry {
        Value::Object(map) => ParsedJson::new(map.clone()),
        other => {
            warn!(
                section,
                position,
                found = %other,
                "Entry is not a mapping, keeping it as an empty entity"
            );
            ParsedJson::new(Map::new())
        }
    }
}

//! Structured Decoder: parses the captured stdout as a single JSON document.

use crate::error::ProbeError;
use serde_json::Value;

/// Bytes of context kept on each side of a parse failure.
const EXCERPT_RADIUS: usize = 20;

/// Decodes the executable's stdout into a generic JSON tree.
///
/// # Errors
///
/// Returns [`ProbeError::MalformedOutput`] with the line, column, byte offset and a short
/// excerpt around the offending region when `bytes` is not one well-formed JSON document.
pub fn decode(bytes: &[u8]) -> Result<Value, ProbeError> {
    serde_json::from_slice(bytes).map_err(|source| {
        let offset = byte_offset(bytes, source.line(), source.column());
        ProbeError::MalformedOutput {
            line: source.line(),
            column: source.column(),
            offset,
            excerpt: excerpt(bytes, offset),
            source,
        }
    })
}

/// Converts serde_json's 1-based line and column into a byte offset into `bytes`.
fn byte_offset(bytes: &[u8], line: usize, column: usize) -> usize {
    let line_start = bytes
        .split_inclusive(|&b| b == b'\n')
        .take(line.saturating_sub(1))
        .map(<[u8]>::len)
        .sum::<usize>();
    (line_start + column.saturating_sub(1)).min(bytes.len())
}

fn excerpt(bytes: &[u8], offset: usize) -> String {
    let start = offset.saturating_sub(EXCERPT_RADIUS);
    let end = (offset + EXCERPT_RADIUS).min(bytes.len());
    String::from_utf8_lossy(&bytes[start..end]).into_owned()
}

//! The typed entity graph built from one probe report.
//!
//! Every entity keeps the sub-document it was built from (see [`ParsedJson`]) and computes
//! its derived attributes once, at construction.

pub mod chapter;
pub mod format;
pub mod introspect;
pub mod parsed_json;
pub mod probe_result;
pub mod stream;
pub mod units;

pub use chapter::Chapter;
pub use format::Format;
pub use introspect::{Attribute, Introspect};
pub use parsed_json::ParsedJson;
pub use probe_result::ProbeResult;
pub use stream::{
    AttachmentStream, AudioStream, Stream, StreamInfo, StreamKind, SubtitleStream, VideoStream,
};
pub use units::SizeBase;

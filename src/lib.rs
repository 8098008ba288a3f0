//! # Media Probe
//!
//! Extract container, stream and chapter metadata from media files or streams.
//!
//! This crate runs `ffprobe` once per target, decodes its JSON report and maps it into
//! an immutable, typed entity graph with unit-aware derived attributes.
//!
//! ## Key Features
//!
//! - **Any Target**: Local paths are checked before spawning; URIs of any scheme are passed through untouched.
//! - **Bounded Runs**: An optional timeout kills and reaps ffprobe; stdout and stderr are captured separately.
//! - **Classified Failures**: Every failure is one [`ProbeError`] variant, from a missing executable to a report without a `streams` section.
//! - **Typed Streams**: Streams are dispatched on `codec_type` into video, audio, subtitle and attachment entities. Unknown kinds are kept, not dropped.
//! - **Human Units**: Sizes like `5.2 MB`, durations like `00:00:31.00` and frame rates from `30000/1001`.
//! - **Introspection**: Every entity lists its attributes, its getters and the raw keys it was built from.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use media_probe::Prober;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> color_eyre::Result<()> {
//!     let prober = Prober::builder().timeout(Duration::from_secs(30)).build()?;
//!     let result = prober.probe("assets/clip.mp4").await?;
//!
//!     println!("{}", result.format());
//!     for video in result.video() {
//!         let (width, height) = video.get_frame_shape((None, None));
//!         println!("{width:?}x{height:?} at {:?} fps", video.avg_frame_rate_fps());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod decode;
pub mod entities;
pub mod error;
pub mod invoke;
pub mod mapper;
pub mod prober;

pub use entities::{
    AttachmentStream, AudioStream, Chapter, Format, Introspect, ParsedJson, ProbeResult, SizeBase,
    Stream, StreamInfo, StreamKind, SubtitleStream, VideoStream,
};
pub use error::{ProbeError, ProbeErrorKind};
pub use invoke::runner::{CommandRunner, RunOutput, TokioRunner};
pub use prober::{Prober, probe};

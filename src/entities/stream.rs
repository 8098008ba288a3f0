//! Polymorphic stream entities, dispatched on each entry's `codec_type`.

use crate::entities::format::display_opt;
use crate::entities::introspect::{Attribute, Introspect};
use crate::entities::parsed_json::{BASE_GETTER_NAMES, ParsedJson};
use crate::entities::units::{duration_human, parse_rational};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::ops::Deref;
use tracing::warn;

/// The four stream kinds with a dedicated entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Attachment,
    Audio,
    Subtitle,
    Video,
}

impl StreamKind {
    /// Maps a `codec_type` value onto a kind; unknown values yield `None`.
    pub fn from_codec_type(codec_type: &str) -> Option<Self> {
        match codec_type {
            "attachment" => Some(Self::Attachment),
            "audio" => Some(Self::Audio),
            "subtitle" => Some(Self::Subtitle),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attachment => "attachment",
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
            Self::Video => "video",
        }
    }
}

/// Fields common to every stream entry, whatever its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParsedJson", into = "ParsedJson")]
pub struct StreamInfo {
    raw: ParsedJson,
    index: Option<i64>,
    codec_type: Option<String>,
    codec_name: Option<String>,
    codec_long_name: Option<String>,
    codec_tag_string: Option<String>,
    duration_secs: Option<f64>,
    duration_human: Option<String>,
    bit_rate_bps: Option<i64>,
    language: Option<String>,
    title: Option<String>,
    is_default: Option<bool>,
}

impl StreamInfo {
    pub fn new(raw: ParsedJson) -> Self {
        let duration_secs = raw.get_as_f64("duration", None);
        Self {
            index: raw.get_as_i64("index", None),
            codec_type: raw.get_str("codec_type", None),
            codec_name: raw.get_str("codec_name", None),
            codec_long_name: raw.get_str("codec_long_name", None),
            codec_tag_string: raw.get_str("codec_tag_string", None),
            duration_secs,
            duration_human: duration_secs.and_then(duration_human),
            bit_rate_bps: raw.get_as_i64("bit_rate", None),
            language: raw.get_tag("language", None),
            title: raw.get_tag("title", None),
            is_default: raw.get_disposition("default"),
            raw,
        }
    }

    /// Position of the stream inside the container, as ffprobe reports it.
    pub const fn index(&self) -> Option<i64> {
        self.index
    }

    /// The discriminator value, e.g. `"video"` or `"data"`.
    pub fn codec_type(&self) -> Option<&str> {
        self.codec_type.as_deref()
    }

    pub fn kind(&self) -> Option<StreamKind> {
        self.codec_type.as_deref().and_then(StreamKind::from_codec_type)
    }

    pub fn codec_name(&self) -> Option<&str> {
        self.codec_name.as_deref()
    }

    pub fn codec_long_name(&self) -> Option<&str> {
        self.codec_long_name.as_deref()
    }

    pub fn codec_tag_string(&self) -> Option<&str> {
        self.codec_tag_string.as_deref()
    }

    pub const fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    pub fn duration_human(&self) -> Option<&str> {
        self.duration_human.as_deref()
    }

    pub const fn bit_rate_bps(&self) -> Option<i64> {
        self.bit_rate_bps
    }

    pub fn bit_rate_kbps(&self) -> Option<f64> {
        self.bit_rate_bps.map(|bps| bps as f64 / 1000.0)
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub const fn is_default(&self) -> Option<bool> {
        self.is_default
    }

    pub fn is_attachment(&self) -> bool {
        self.kind() == Some(StreamKind::Attachment)
    }

    pub fn is_audio(&self) -> bool {
        self.kind() == Some(StreamKind::Audio)
    }

    pub fn is_subtitle(&self) -> bool {
        self.kind() == Some(StreamKind::Subtitle)
    }

    pub fn is_video(&self) -> bool {
        self.kind() == Some(StreamKind::Video)
    }

    pub fn tags(&self) -> Map<String, Value> {
        self.raw.tags()
    }

    pub const fn raw(&self) -> &ParsedJson {
        &self.raw
    }

    /// `streams[0]: video(h264)`
    fn describe(&self) -> String {
        format!(
            "streams[{}]: {}({})",
            display_opt(self.index.as_ref()),
            display_opt(self.codec_type.as_ref()),
            display_opt(self.codec_name.as_ref()),
        )
    }
}

/// Builds an attribute registry holding the common stream attributes followed by `$extra`.
macro_rules! stream_attributes {
    ($ty:ty $(, $name:literal => $read:expr)* $(,)?) => {
        &[
            Attribute::new("bit_rate_bps", |s: &$ty| json!(s.bit_rate_bps())),
            Attribute::new("bit_rate_kbps", |s: &$ty| json!(s.bit_rate_kbps())),
            Attribute::new("codec_long_name", |s: &$ty| json!(s.codec_long_name())),
            Attribute::new("codec_name", |s: &$ty| json!(s.codec_name())),
            Attribute::new("codec_tag_string", |s: &$ty| json!(s.codec_tag_string())),
            Attribute::new("codec_type", |s: &$ty| json!(s.codec_type())),
            Attribute::new("duration_human", |s: &$ty| json!(s.duration_human())),
            Attribute::new("duration_secs", |s: &$ty| json!(s.duration_secs())),
            Attribute::new("index", |s: &$ty| json!(s.index())),
            Attribute::new("is_default", |s: &$ty| json!(s.is_default())),
            Attribute::new("language", |s: &$ty| json!(s.language())),
            Attribute::new("tags", |s: &$ty| Value::Object(s.tags())),
            Attribute::new("title", |s: &$ty| json!(s.title())),
            $(Attribute::new($name, $read),)*
        ]
    };
}

/// Wires a stream entity into serde, `Introspect` and `Deref<Target = StreamInfo>`.
/// The generic getters are reached through `StreamInfo`'s own `Deref<Target = ParsedJson>`.
macro_rules! stream_entity {
    ($ty:ident, $attributes:ident, $getters:expr) => {
        impl Deref for $ty {
            type Target = StreamInfo;

            fn deref(&self) -> &StreamInfo {
                &self.info
            }
        }

        impl Introspect for $ty {
            fn attributes() -> &'static [Attribute<Self>] {
                $attributes
            }

            fn getter_names(&self) -> &'static [&'static str] {
                $getters
            }

            fn raw(&self) -> &ParsedJson {
                &self.info.raw
            }
        }

        impl From<ParsedJson> for $ty {
            fn from(raw: ParsedJson) -> Self {
                Self::new(raw)
            }
        }

        impl From<$ty> for ParsedJson {
            fn from(stream: $ty) -> Self {
                stream.info.raw
            }
        }
    };
}

static STREAM_INFO_ATTRIBUTES: &[Attribute<StreamInfo>] = stream_attributes!(StreamInfo);

impl Introspect for StreamInfo {
    fn attributes() -> &'static [Attribute<Self>] {
        STREAM_INFO_ATTRIBUTES
    }

    fn getter_names(&self) -> &'static [&'static str] {
        BASE_GETTER_NAMES
    }

    fn raw(&self) -> &ParsedJson {
        &self.raw
    }
}

impl Deref for StreamInfo {
    type Target = ParsedJson;

    fn deref(&self) -> &ParsedJson {
        &self.raw
    }
}

impl From<ParsedJson> for StreamInfo {
    fn from(raw: ParsedJson) -> Self {
        Self::new(raw)
    }
}

impl From<StreamInfo> for ParsedJson {
    fn from(info: StreamInfo) -> Self {
        info.raw
    }
}

impl fmt::Display for StreamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stream({})", self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParsedJson", into = "ParsedJson")]
pub struct VideoStream {
    info: StreamInfo,
    width: Option<i64>,
    height: Option<i64>,
    pix_fmt: Option<String>,
    avg_frame_rate: Option<String>,
    avg_frame_rate_fps: Option<f64>,
    num_frames: Option<i64>,
    display_aspect_ratio: Option<String>,
}

const VIDEO_GETTER_NAMES: &[&str] = &[
    "get",
    "get_as_f64",
    "get_as_i64",
    "get_datasize_as_human",
    "get_disposition",
    "get_duration_as_human",
    "get_frame_shape",
    "get_str",
    "get_tag",
];

impl VideoStream {
    pub fn new(raw: ParsedJson) -> Self {
        let avg_frame_rate = raw.get_str("avg_frame_rate", None);
        Self {
            width: raw.get_as_i64("width", None),
            height: raw.get_as_i64("height", None),
            pix_fmt: raw.get_str("pix_fmt", None),
            avg_frame_rate_fps: avg_frame_rate.as_deref().and_then(parse_rational),
            avg_frame_rate,
            num_frames: raw.get_as_i64("nb_frames", None),
            display_aspect_ratio: raw.get_str("display_aspect_ratio", None),
            info: StreamInfo::new(raw),
        }
    }

    pub const fn width(&self) -> Option<i64> {
        self.width
    }

    pub const fn height(&self) -> Option<i64> {
        self.height
    }

    /// `(width, height)` when both are present and integral.
    pub const fn frame_shape(&self) -> Option<(i64, i64)> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Some((width, height)),
            _ => None,
        }
    }

    /// Like [`VideoStream::frame_shape`], but hands back `default` untouched unless both
    /// dimensions are known. Pass `(None, None)` to destructure safely.
    pub const fn get_frame_shape(
        &self,
        default: (Option<i64>, Option<i64>),
    ) -> (Option<i64>, Option<i64>) {
        match self.frame_shape() {
            Some((width, height)) => (Some(width), Some(height)),
            None => default,
        }
    }

    pub fn pix_fmt(&self) -> Option<&str> {
        self.pix_fmt.as_deref()
    }

    /// Average frame rate as ffprobe prints it, e.g. `"30000/1001"`.
    pub fn avg_frame_rate(&self) -> Option<&str> {
        self.avg_frame_rate.as_deref()
    }

    pub const fn avg_frame_rate_fps(&self) -> Option<f64> {
        self.avg_frame_rate_fps
    }

    pub const fn num_frames(&self) -> Option<i64> {
        self.num_frames
    }

    pub fn display_aspect_ratio(&self) -> Option<&str> {
        self.display_aspect_ratio.as_deref()
    }
}

static VIDEO_ATTRIBUTES: &[Attribute<VideoStream>] = stream_attributes!(
    VideoStream,
    "avg_frame_rate" => |s: &VideoStream| json!(s.avg_frame_rate),
    "avg_frame_rate_fps" => |s: &VideoStream| json!(s.avg_frame_rate_fps),
    "display_aspect_ratio" => |s: &VideoStream| json!(s.display_aspect_ratio),
    "height" => |s: &VideoStream| json!(s.height),
    "num_frames" => |s: &VideoStream| json!(s.num_frames),
    "pix_fmt" => |s: &VideoStream| json!(s.pix_fmt),
    "width" => |s: &VideoStream| json!(s.width),
);

stream_entity!(VideoStream, VIDEO_ATTRIBUTES, VIDEO_GETTER_NAMES);

impl fmt::Display for VideoStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VideoStream({}: {}x{}, {} fps, {} kb/s)",
            self.describe(),
            display_opt(self.width.as_ref()),
            display_opt(self.height.as_ref()),
            display_opt(self.avg_frame_rate.as_ref()),
            display_opt(self.bit_rate_kbps().as_ref()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParsedJson", into = "ParsedJson")]
pub struct AudioStream {
    info: StreamInfo,
    sample_rate_hz: Option<i64>,
    num_channels: Option<i64>,
    channel_layout: Option<String>,
    sample_fmt: Option<String>,
    num_frames: Option<i64>,
}

impl AudioStream {
    pub fn new(raw: ParsedJson) -> Self {
        Self {
            sample_rate_hz: raw.get_as_i64("sample_rate", None),
            num_channels: raw.get_as_i64("channels", None),
            channel_layout: raw.get_str("channel_layout", None),
            sample_fmt: raw.get_str("sample_fmt", None),
            num_frames: raw.get_as_i64("nb_frames", None),
            info: StreamInfo::new(raw),
        }
    }

    pub const fn sample_rate_hz(&self) -> Option<i64> {
        self.sample_rate_hz
    }

    pub const fn num_channels(&self) -> Option<i64> {
        self.num_channels
    }

    /// e.g. `"stereo"` or `"5.1(side)"`.
    pub fn channel_layout(&self) -> Option<&str> {
        self.channel_layout.as_deref()
    }

    pub fn sample_fmt(&self) -> Option<&str> {
        self.sample_fmt.as_deref()
    }

    pub const fn num_frames(&self) -> Option<i64> {
        self.num_frames
    }
}

static AUDIO_ATTRIBUTES: &[Attribute<AudioStream>] = stream_attributes!(
    AudioStream,
    "channel_layout" => |s: &AudioStream| json!(s.channel_layout),
    "num_channels" => |s: &AudioStream| json!(s.num_channels),
    "num_frames" => |s: &AudioStream| json!(s.num_frames),
    "sample_fmt" => |s: &AudioStream| json!(s.sample_fmt),
    "sample_rate_hz" => |s: &AudioStream| json!(s.sample_rate_hz),
);

stream_entity!(AudioStream, AUDIO_ATTRIBUTES, BASE_GETTER_NAMES);

impl fmt::Display for AudioStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioStream({}: {} channels ({}), {} Hz, {} kb/s)",
            self.describe(),
            display_opt(self.num_channels.as_ref()),
            display_opt(self.channel_layout.as_ref()),
            display_opt(self.sample_rate_hz.as_ref()),
            display_opt(self.bit_rate_kbps().as_ref()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParsedJson", into = "ParsedJson")]
pub struct SubtitleStream {
    info: StreamInfo,
    is_forced: Option<bool>,
}

impl SubtitleStream {
    pub fn new(raw: ParsedJson) -> Self {
        Self {
            is_forced: raw.get_disposition("forced"),
            info: StreamInfo::new(raw),
        }
    }

    pub const fn is_forced(&self) -> Option<bool> {
        self.is_forced
    }
}

static SUBTITLE_ATTRIBUTES: &[Attribute<SubtitleStream>] = stream_attributes!(
    SubtitleStream,
    "is_forced" => |s: &SubtitleStream| json!(s.is_forced),
);

stream_entity!(SubtitleStream, SUBTITLE_ATTRIBUTES, BASE_GETTER_NAMES);

impl fmt::Display for SubtitleStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SubtitleStream({}: {})",
            self.describe(),
            display_opt(self.language.as_ref()),
        )
    }
}

/// An embedded file, typically a font carried by Matroska containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParsedJson", into = "ParsedJson")]
pub struct AttachmentStream {
    info: StreamInfo,
    filename: Option<String>,
    mime_type: Option<String>,
}

impl AttachmentStream {
    pub fn new(raw: ParsedJson) -> Self {
        Self {
            filename: raw.get_tag("filename", None),
            mime_type: raw.get_tag("mimetype", None),
            info: StreamInfo::new(raw),
        }
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }
}

static ATTACHMENT_ATTRIBUTES: &[Attribute<AttachmentStream>] = stream_attributes!(
    AttachmentStream,
    "filename" => |s: &AttachmentStream| json!(s.filename),
    "mime_type" => |s: &AttachmentStream| json!(s.mime_type),
);

stream_entity!(AttachmentStream, ATTACHMENT_ATTRIBUTES, BASE_GETTER_NAMES);

impl fmt::Display for AttachmentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AttachmentStream({}: {}, {})",
            self.describe(),
            display_opt(self.filename.as_ref()),
            display_opt(self.mime_type.as_ref()),
        )
    }
}

/// One entry of the report's `streams` sequence.
///
/// Entries whose `codec_type` is missing or not one of the four known kinds (ffprobe also
/// reports `data` streams, for example) are kept as [`Stream::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParsedJson", into = "ParsedJson")]
pub enum Stream {
    Attachment(AttachmentStream),
    Audio(AudioStream),
    Subtitle(SubtitleStream),
    Video(VideoStream),
    Other(StreamInfo),
}

/// Runs `$body` with `$s` bound to the concrete entity inside `$stream`.
macro_rules! with_variant {
    ($stream:expr, $s:ident => $body:expr) => {
        match $stream {
            Stream::Attachment($s) => $body,
            Stream::Audio($s) => $body,
            Stream::Subtitle($s) => $body,
            Stream::Video($s) => $body,
            Stream::Other($s) => $body,
        }
    };
}

impl Stream {
    /// Builds the entity matching the entry's `codec_type`.
    pub fn from_json(raw: ParsedJson) -> Self {
        let codec_type = raw.get_str("codec_type", None);
        match codec_type.as_deref().and_then(StreamKind::from_codec_type) {
            Some(StreamKind::Attachment) => Self::Attachment(AttachmentStream::new(raw)),
            Some(StreamKind::Audio) => Self::Audio(AudioStream::new(raw)),
            Some(StreamKind::Subtitle) => Self::Subtitle(SubtitleStream::new(raw)),
            Some(StreamKind::Video) => Self::Video(VideoStream::new(raw)),
            None => {
                let info = StreamInfo::new(raw);
                warn!(
                    index = ?info.index(),
                    codec_type = ?codec_type,
                    "Stream has no recognized codec_type, keeping common fields only"
                );
                Self::Other(info)
            }
        }
    }

    pub fn info(&self) -> &StreamInfo {
        match self {
            Self::Attachment(s) => &s.info,
            Self::Audio(s) => &s.info,
            Self::Subtitle(s) => &s.info,
            Self::Video(s) => &s.info,
            Self::Other(info) => info,
        }
    }

    pub fn kind(&self) -> Option<StreamKind> {
        match self {
            Self::Attachment(_) => Some(StreamKind::Attachment),
            Self::Audio(_) => Some(StreamKind::Audio),
            Self::Subtitle(_) => Some(StreamKind::Subtitle),
            Self::Video(_) => Some(StreamKind::Video),
            Self::Other(_) => None,
        }
    }

    pub fn is_attachment(&self) -> bool {
        matches!(self, Self::Attachment(_))
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio(_))
    }

    pub fn is_subtitle(&self) -> bool {
        matches!(self, Self::Subtitle(_))
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video(_))
    }

    pub fn as_attachment(&self) -> Option<&AttachmentStream> {
        match self {
            Self::Attachment(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioStream> {
        match self {
            Self::Audio(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_subtitle(&self) -> Option<&SubtitleStream> {
        match self {
            Self::Subtitle(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_video(&self) -> Option<&VideoStream> {
        match self {
            Self::Video(s) => Some(s),
            _ => None,
        }
    }

    pub fn raw(&self) -> &ParsedJson {
        self.info().raw()
    }

    pub fn attr_names(&self) -> Vec<&'static str> {
        with_variant!(self, s => s.attr_names())
    }

    pub fn attribute(&self, name: &str) -> Option<Value> {
        with_variant!(self, s => s.attribute(name))
    }

    pub fn attribute_values(&self) -> Vec<(&'static str, Value)> {
        with_variant!(self, s => s.attribute_values())
    }

    pub fn getter_names(&self) -> &'static [&'static str] {
        with_variant!(self, s => s.getter_names())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.raw().keys()
    }
}

impl Deref for Stream {
    type Target = StreamInfo;

    fn deref(&self) -> &StreamInfo {
        self.info()
    }
}

impl From<ParsedJson> for Stream {
    fn from(raw: ParsedJson) -> Self {
        Self::from_json(raw)
    }
}

impl From<Stream> for ParsedJson {
    fn from(stream: Stream) -> Self {
        with_variant!(stream, s => s.into())
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_variant!(self, s => fmt::Display::fmt(s, f))
    }
}

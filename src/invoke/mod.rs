//! Process Invoker: builds the ffprobe argument vector, runs the pre-flight check and
//! classifies how the process ended.

pub mod runner;

use crate::error::ProbeError;
use regex::Regex;
use runner::CommandRunner;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Executable looked up on `PATH` when no override is configured.
pub const DEFAULT_PROGRAM: &str = "ffprobe";

/// Requests one JSON document with the format, stream and chapter sections.
const REPORT_ARGS: [&str; 7] = [
    "-v",
    "error",
    "-print_format",
    "json",
    "-show_chapters",
    "-show_format",
    "-show_streams",
];

/// Per-call settings for [`invoke`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeOptions {
    /// Check that a local target exists before spawning anything.
    pub verify_local_mediafile: bool,
    pub timeout: Option<Duration>,
    /// Inserted between the report flags and the target, verbatim.
    pub extra_args: Vec<String>,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            verify_local_mediafile: true,
            timeout: None,
            extra_args: Vec::new(),
        }
    }
}

/// A successful run: the exact command line and everything it wrote to stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command_line: Vec<String>,
    pub stdout: Vec<u8>,
}

/// Runs `program` against `target` once and returns its stdout.
///
/// # Errors
///
/// * [`ProbeError::InvalidArgument`] for a zero timeout.
/// * [`ProbeError::LocalFileNotFound`] if verification is on, `target` is a local path and
///   no file exists there. Nothing is spawned in that case.
/// * [`ProbeError::ToolNotFound`], [`ProbeError::Spawn`] or [`ProbeError::Timeout`] from
///   the runner.
/// * [`ProbeError::Execution`] when the process exits non-zero, carrying its stderr.
pub async fn invoke<R: CommandRunner>(
    runner: &R,
    program: &Path,
    target: &str,
    options: &InvokeOptions,
) -> Result<Invocation, ProbeError> {
    check_timeout(options.timeout)?;
    if options.verify_local_mediafile && !looks_like_uri(target) && !Path::new(target).is_file() {
        return Err(ProbeError::LocalFileNotFound {
            path: PathBuf::from(target),
        });
    }

    let command_line = build_command_line(program, target, &options.extra_args);
    let output = runner
        .run(program, &command_line[1..], options.timeout)
        .await?;

    if !output.success() {
        return Err(ProbeError::Execution {
            command_line,
            exit_code: output.exit_code,
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        });
    }
    debug!(
        media = %target,
        stdout_bytes = output.stdout.len(),
        "Probe executable finished"
    );
    Ok(Invocation {
        command_line,
        stdout: output.stdout,
    })
}

/// `program`, the report flags, `extra_args`, then `target` as the last positional argument.
pub fn build_command_line(program: &Path, target: &str, extra_args: &[String]) -> Vec<String> {
    let mut command_line = Vec::with_capacity(REPORT_ARGS.len() + extra_args.len() + 2);
    command_line.push(program.display().to_string());
    command_line.extend(REPORT_ARGS.iter().map(|arg| arg.to_string()));
    command_line.extend(extra_args.iter().cloned());
    command_line.push(target.to_string());
    command_line
}

/// Turns `(key, value)` option pairs into flags: `-key value`, or just `-key` for an empty value.
/// A leading `-` on the key is kept rather than doubled.
pub fn option_args(options: &[(String, String)]) -> Vec<String> {
    let mut args = Vec::with_capacity(options.len() * 2);
    for (key, value) in options {
        if key.starts_with('-') {
            args.push(key.clone());
        } else {
            args.push(format!("-{key}"));
        }
        if !value.is_empty() {
            args.push(value.clone());
        }
    }
    args
}

static URI_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]+:").unwrap());

/// True when `target` starts with a URI scheme (`http://`, `rtmp://`, `pipe:`...).
///
/// Single-letter schemes are not accepted, so Windows drive paths like `C:\clip.mp4`
/// stay local paths.
pub fn looks_like_uri(target: &str) -> bool {
    URI_SCHEME.is_match(target)
}

pub(crate) fn check_timeout(timeout: Option<Duration>) -> Result<(), ProbeError> {
    match timeout {
        Some(limit) if limit.is_zero() => Err(ProbeError::InvalidArgument {
            name: "timeout",
            reason: "must be greater than zero".to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeErrorKind;
    use crate::invoke::runner::RunOutput;
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records every call and answers with a canned output.
    #[derive(Default)]
    struct SpyRunner {
        spawns: AtomicUsize,
        last_args: Mutex<Vec<String>>,
        output: RunOutput,
    }

    impl SpyRunner {
        fn answering(exit_code: i32, stdout: &[u8], stderr: &[u8]) -> Self {
            Self {
                output: RunOutput {
                    exit_code: Some(exit_code),
                    stdout: stdout.to_vec(),
                    stderr: stderr.to_vec(),
                },
                ..Self::default()
            }
        }
    }

    impl CommandRunner for SpyRunner {
        fn run(
            &self,
            _program: &Path,
            args: &[String],
            _limit: Option<Duration>,
        ) -> impl Future<Output = Result<RunOutput, ProbeError>> + Send {
            self.spawns.fetch_add(1, Ordering::SeqCst);
            *self.last_args.lock().unwrap() = args.to_vec();
            let output = self.output.clone();
            async move { Ok(output) }
        }
    }

    fn program() -> &'static Path {
        Path::new("ffprobe")
    }

    #[test]
    fn test_command_line_layout() {
        let extra = option_args(&[
            ("select_streams".to_string(), "v:0".to_string()),
            ("-count_frames".to_string(), String::new()),
        ]);
        let command_line = build_command_line(program(), "clip.mp4", &extra);
        assert_eq!(
            command_line,
            vec![
                "ffprobe",
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_chapters",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
                "-count_frames",
                "clip.mp4",
            ]
        );
    }

    #[test]
    fn test_uri_detection() {
        assert!(looks_like_uri("http://example.com/a.mp4"));
        assert!(looks_like_uri("rtmp://live.example.com/app"));
        assert!(looks_like_uri("srt://10.0.0.1:9000"));
        assert!(looks_like_uri("pipe:0"));
        assert!(looks_like_uri("file:clip.mp4"));
        assert!(!looks_like_uri("clip.mp4"));
        assert!(!looks_like_uri("/var/media/clip.mp4"));
        assert!(!looks_like_uri("./http:/weird"));
        assert!(!looks_like_uri(r"C:\Videos\clip.mp4"));
    }

    #[tokio::test]
    async fn test_missing_local_file_never_spawns() {
        let spy = SpyRunner::answering(0, b"{}", b"");
        let options = InvokeOptions::default();
        let err = invoke(&spy, program(), "/no/such/clip.mp4", &options)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProbeErrorKind::LocalFileNotFound);
        assert_eq!(spy.spawns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_directory_is_not_a_media_file() {
        let dir = tempfile::tempdir().unwrap();
        let spy = SpyRunner::answering(0, b"{}", b"");
        let target = dir.path().to_string_lossy().into_owned();
        let err = invoke(&spy, program(), &target, &InvokeOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProbeErrorKind::LocalFileNotFound);
        assert_eq!(spy.spawns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_verification_skipped_when_disabled_or_uri() {
        let spy = SpyRunner::answering(0, b"{}", b"");
        let options = InvokeOptions {
            verify_local_mediafile: false,
            ..InvokeOptions::default()
        };
        invoke(&spy, program(), "/no/such/clip.mp4", &options)
            .await
            .unwrap();
        let defaults = InvokeOptions::default();
        invoke(&spy, program(), "https://example.com/clip.mp4", &defaults)
            .await
            .unwrap();
        assert_eq!(spy.spawns.load(Ordering::SeqCst), 2);
        assert_eq!(
            spy.last_args.lock().unwrap().last().map(String::as_str),
            Some("https://example.com/clip.mp4")
        );
    }

    #[tokio::test]
    async fn test_existing_file_passes_preflight() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let spy = SpyRunner::answering(0, b"{\"format\":{}}", b"");
        let target = file.path().to_string_lossy().into_owned();
        let invocation = invoke(&spy, program(), &target, &InvokeOptions::default())
            .await
            .unwrap();
        assert_eq!(invocation.stdout, b"{\"format\":{}}");
        assert_eq!(
            invocation.command_line.first().map(String::as_str),
            Some("ffprobe")
        );
        assert_eq!(invocation.command_line.last(), Some(&target));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_execution_error() {
        let spy = SpyRunner::answering(
            1,
            b"{\"format\": {}, \"streams\": []}",
            b"clip.mp4: Invalid data found\n",
        );
        let options = InvokeOptions {
            verify_local_mediafile: false,
            ..InvokeOptions::default()
        };
        match invoke(&spy, program(), "clip.mp4", &options)
            .await
            .unwrap_err()
        {
            ProbeError::Execution {
                command_line,
                exit_code,
                stderr,
            } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr, "clip.mp4: Invalid data found");
                assert_eq!(command_line.last().map(String::as_str), Some("clip.mp4"));
            }
            other => panic!("Expected execution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_timeout_is_rejected_before_spawning() {
        let spy = SpyRunner::answering(0, b"{}", b"");
        let options = InvokeOptions {
            verify_local_mediafile: false,
            timeout: Some(Duration::ZERO),
            ..InvokeOptions::default()
        };
        let err = invoke(&spy, program(), "clip.mp4", &options)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProbeErrorKind::InvalidArgument);
        assert_eq!(spy.spawns.load(Ordering::SeqCst), 0);
    }
}

use crate::decode::decode;
use crate::entities::probe_result::ProbeResult;
use crate::error::ProbeError;
use crate::invoke::runner::{CommandRunner, TokioRunner};
use crate::invoke::{DEFAULT_PROGRAM, InvokeOptions, check_timeout, invoke, option_args};
use crate::mapper::map_with_command_line;
use bon::bon;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// The entry point for probing media: holds the executable to run and the per-call options.
///
/// A `Prober` keeps no state between calls, so one instance can serve any number of
/// concurrent probes.
///
/// ```rust,no_run
/// # use media_probe::{Prober, ProbeError};
/// # use std::time::Duration;
/// # #[tokio::main]
/// # async fn main() -> Result<(), ProbeError> {
/// let prober = Prober::builder()
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// let result = prober.probe("assets/clip.mp4").await?;
/// println!("{}", result.format());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Prober<R = TokioRunner> {
    program: PathBuf,
    options: InvokeOptions,
    runner: R,
}

#[bon]
impl Prober {
    /// Constructs a `Prober` via a builder pattern.
    ///
    /// # Builder Arguments
    ///
    /// * `ffprobe_path: Option<PathBuf>` - An executable to run instead of `ffprobe` from the
    ///   system's PATH. It must be an existing file.
    /// * `verify_local_mediafile: bool` - (Default: `true`) Check that a local target exists
    ///   before spawning ffprobe. URI targets (`http://`, `rtmp://`, `pipe:`...) are never checked.
    /// * `timeout: Option<Duration>` - Kill ffprobe if it runs longer than this. Unbounded if unset.
    /// * `extra_options: Vec<(String, String)>` - Additional ffprobe options, passed as
    ///   `-key value` (or just `-key` when the value is empty) before the target.
    ///
    /// # Errors
    ///
    /// * [`ProbeError::InvalidOverride`] if `ffprobe_path` is not an existing file.
    /// * [`ProbeError::InvalidArgument`] if `timeout` is zero.
    #[builder]
    pub fn new(
        ffprobe_path: Option<PathBuf>,
        #[builder(default = true)] verify_local_mediafile: bool,
        timeout: Option<Duration>,
        #[builder(default)] extra_options: Vec<(String, String)>,
    ) -> Result<Self, ProbeError> {
        let program = match ffprobe_path {
            Some(path) if path.is_file() => path,
            Some(path) => return Err(ProbeError::InvalidOverride { path }),
            None => PathBuf::from(DEFAULT_PROGRAM),
        };
        check_timeout(timeout)?;
        Ok(Self {
            program,
            options: InvokeOptions {
                verify_local_mediafile,
                timeout,
                extra_args: option_args(&extra_options),
            },
            runner: TokioRunner,
        })
    }
}

impl<R: CommandRunner> Prober<R> {
    /// Keeps the configuration but runs processes through `runner`.
    pub fn with_runner<S: CommandRunner>(self, runner: S) -> Prober<S> {
        Prober {
            program: self.program,
            options: self.options,
            runner,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub const fn options(&self) -> &InvokeOptions {
        &self.options
    }

    /// Probes one local path or URI: runs ffprobe, decodes its report and maps it.
    ///
    /// The stages run strictly in order and the first failure is returned as is; no
    /// partial result is ever produced.
    ///
    /// # Errors
    ///
    /// * [`ProbeError::LocalFileNotFound`], [`ProbeError::ToolNotFound`], [`ProbeError::Spawn`],
    ///   [`ProbeError::Timeout`] or [`ProbeError::Execution`] from running ffprobe.
    /// * [`ProbeError::MalformedOutput`] if its stdout is not one JSON document.
    /// * [`ProbeError::Schema`] if the document lacks the `format` or `streams` section.
    pub async fn probe(&self, target: &str) -> Result<ProbeResult, ProbeError> {
        let invocation = invoke(&self.runner, &self.program, target, &self.options).await?;
        let document = decode(&invocation.stdout)?;
        let result = map_with_command_line(document, invocation.command_line)?;
        debug!(media = %target, streams = result.streams().len(), "Probed media");
        Ok(result)
    }

    /// [`Prober::probe`] for callers without an async runtime.
    ///
    /// Drives the probe on a private current-thread runtime.
    ///
    /// # Errors
    ///
    /// * [`ProbeError::InvalidArgument`] when called from within a tokio runtime, where
    ///   blocking on a nested runtime would panic. Nothing is spawned in that case.
    /// * Everything [`Prober::probe`] returns.
    pub fn probe_blocking(&self, target: &str) -> Result<ProbeResult, ProbeError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(ProbeError::InvalidArgument {
                name: "probe_blocking",
                reason: "called from within a tokio runtime; use `probe().await` instead"
                    .to_string(),
            });
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.probe(target))
    }
}

/// Probes `target` with every option at its default.
///
/// # Errors
///
/// See [`Prober::probe`].
pub async fn probe(target: &str) -> Result<ProbeResult, ProbeError> {
    Prober::builder().build()?.probe(target).await
}

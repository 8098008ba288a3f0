use crate::error::ProbeError;
use std::future::Future;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

/// What one finished run of the executable produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RunOutput {
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// Runs one external process to completion.
///
/// Implementations spawn exactly one process per call, keep stdout and stderr apart,
/// and leave no process behind on any exit path. [`TokioRunner`] is the real one; tests
/// swap in stubs to observe or fake the process boundary.
pub trait CommandRunner {
    /// # Errors
    ///
    /// * [`ProbeError::ToolNotFound`] if `program` cannot be located.
    /// * [`ProbeError::Spawn`] if it exists but cannot be started.
    /// * [`ProbeError::Timeout`] if `limit` elapses first; the process is killed and reaped.
    ///
    /// A non-zero exit is not an error at this level.
    fn run(
        &self,
        program: &Path,
        args: &[String],
        limit: Option<Duration>,
    ) -> impl Future<Output = Result<RunOutput, ProbeError>> + Send;
}

/// Spawns the executable with `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRunner;

impl CommandRunner for TokioRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        limit: Option<Duration>,
    ) -> Result<RunOutput, ProbeError> {
        let program_name = program.display().to_string();
        debug!(
            program = %program_name,
            args = ?args,
            timeout = ?limit,
            "Spawning probe executable"
        );

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => ProbeError::ToolNotFound {
                    program: program_name.clone(),
                },
                _ => ProbeError::Spawn {
                    program: program_name.clone(),
                    source,
                },
            })?;
        let started = Instant::now();

        let Some(limit) = limit else {
            return collect_output(&mut child).await;
        };

        let waited = timeout(limit, collect_output(&mut child)).await;
        match waited {
            Ok(output) => output,
            Err(_) => {
                let elapsed = started.elapsed();
                if let Err(err) = child.kill().await {
                    warn!(
                        program = %program_name,
                        error = %err,
                        "Failed to kill timed-out probe executable"
                    );
                }
                debug!(
                    program = %program_name,
                    elapsed = ?elapsed,
                    "Killed probe executable after timeout"
                );
                Err(ProbeError::Timeout { limit, elapsed })
            }
        }
    }
}

/// Drains stdout and stderr into separate buffers while waiting for the exit status.
async fn collect_output(child: &mut Child) -> Result<RunOutput, ProbeError> {
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("stdout was not captured"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("stderr was not captured"))?;

    let mut out = Vec::new();
    let mut err = Vec::new();
    let (status, _, _) = tokio::try_join!(
        child.wait(),
        stdout.read_to_end(&mut out),
        stderr.read_to_end(&mut err),
    )?;

    Ok(RunOutput {
        exit_code: status.code(),
        stdout: out,
        stderr: err,
    })
}

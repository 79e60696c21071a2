//! Subprocess execution behind a [`Runner`] seam.
//!
//! Three shapes are needed: a captured one-shot (extractors, `git checkout`),
//! an enumerator piped into an interactive selector, and a fully interactive
//! child that owns the terminal (the editor).  Every wait except the editor's
//! is bounded.

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use super::tool::Invocation;

/// How long a selector gets to restore the terminal after SIGTERM.
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

// ───────────────────────────────────────── types ─────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Best diagnostic text: stderr, else stdout, else the exit code.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// What the selector reads on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// Stdout of an enumerator subprocess.
    Command(Invocation),
    /// Fixed candidates, one per line.
    Lines(Vec<String>),
    /// Nothing; the selector fills itself (e.g. a reload binding).
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Finished(ProcessOutput),
    TimedOut,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} timed out after {}s", .after.as_secs())]
    Timeout { program: String, after: Duration },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RunError {
    fn spawn(program: &str, source: io::Error) -> Self {
        Self::Spawn {
            program: program.to_string(),
            source,
        }
    }
}

// ───────────────────────────────────────── runner ────────────

#[async_trait]
pub trait Runner: Send + Sync {
    /// Run to completion with captured output, killing it after `timeout`.
    async fn output(
        &self,
        inv: &Invocation,
        cwd: &Path,
        timeout: Duration,
    ) -> Result<ProcessOutput, RunError>;

    /// Feed the selector and capture what it prints.  A timeout is an
    /// outcome, not an error: the user simply never picked anything.
    async fn pipeline(
        &self,
        feed: &Feed,
        selector: &Invocation,
        cwd: &Path,
        timeout: Duration,
    ) -> Result<PipelineOutcome, RunError>;

    /// Run with the terminal attached and wait for exit.
    async fn interactive(&self, inv: &Invocation, cwd: &Path) -> Result<ProcessOutput, RunError>;
}

/// Real subprocesses via `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRunner;

#[async_trait]
impl Runner for OsRunner {
    async fn output(
        &self,
        inv: &Invocation,
        cwd: &Path,
        timeout: Duration,
    ) -> Result<ProcessOutput, RunError> {
        debug!(command = %inv, "running");
        let child = Command::new(&inv.program)
            .args(&inv.args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RunError::spawn(&inv.program, e))?;

        // Dropping the future on timeout drops the child, which kills it.
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Err(_) => Err(RunError::Timeout {
                program: inv.program.clone(),
                after: timeout,
            }),
            Ok(Err(e)) => Err(RunError::Io(e)),
            Ok(Ok(out)) => Ok(ProcessOutput {
                code: out.status.code(),
                stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            }),
        }
    }

    async fn pipeline(
        &self,
        feed: &Feed,
        selector: &Invocation,
        cwd: &Path,
        timeout: Duration,
    ) -> Result<PipelineOutcome, RunError> {
        let mut selector_cmd = Command::new(&selector.program);
        // The selector draws on the terminal through stderr / tty, so only
        // stdout is captured.
        selector_cmd
            .args(&selector.args)
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut enumerator = None;
        match feed {
            Feed::Command(inv) => {
                debug!(enumerator = %inv, selector = %selector, "starting pipeline");
                let mut cmd = Command::new(&inv.program);
                cmd.args(&inv.args)
                    .current_dir(cwd)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::null())
                    .kill_on_drop(true);
                #[cfg(unix)]
                cmd.process_group(0);
                let mut child = cmd.spawn().map_err(|e| RunError::spawn(&inv.program, e))?;
                let stdout = child
                    .stdout
                    .take()
                    .ok_or_else(|| io::Error::other("enumerator stdout was not captured"))?;
                let stdin: Stdio = stdout.try_into()?;
                selector_cmd.stdin(stdin);
                enumerator = Some(child);
            }
            Feed::Lines(_) => {
                debug!(selector = %selector, "starting selector on fixed candidates");
                selector_cmd.stdin(Stdio::piped());
            }
            Feed::Empty => {
                debug!(selector = %selector, "starting selector without candidates");
                selector_cmd.stdin(Stdio::null());
            }
        }

        let mut child = match selector_cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                if let Some(ref mut enumerator) = enumerator {
                    reap_enumerator(enumerator).await;
                }
                return Err(RunError::spawn(&selector.program, e));
            }
        };

        if let Feed::Lines(lines) = feed {
            if let Some(mut stdin) = child.stdin.take() {
                let mut payload = lines.join("\n");
                payload.push('\n');
                // The selector may exit before reading everything; a broken
                // pipe here is expected and harmless.
                tokio::spawn(async move {
                    let _ = stdin.write_all(payload.as_bytes()).await;
                });
            }
        }

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("selector stdout was not captured"))?;

        let waited = tokio::time::timeout(timeout, async {
            let mut buf = Vec::new();
            let (read, status) = tokio::join!(stdout.read_to_end(&mut buf), child.wait());
            read?;
            Ok::<_, io::Error>((status?, buf))
        })
        .await;

        let outcome = match waited {
            Ok(Ok((status, buf))) => Ok(PipelineOutcome::Finished(ProcessOutput {
                code: status.code(),
                stdout: String::from_utf8_lossy(&buf).into_owned(),
                stderr: String::new(),
            })),
            Ok(Err(e)) => Err(RunError::Io(e)),
            Err(_) => {
                warn!(selector = %selector.program, secs = timeout.as_secs(), "selector timed out");
                terminate(&mut child).await;
                Ok(PipelineOutcome::TimedOut)
            }
        };

        if let Some(ref mut enumerator) = enumerator {
            reap_enumerator(enumerator).await;
        }
        outcome
    }

    async fn interactive(&self, inv: &Invocation, cwd: &Path) -> Result<ProcessOutput, RunError> {
        debug!(command = %inv, "running interactively");
        // Stdout belongs to the shell wrapper's payload; the editor draws
        // through stderr, which is still the terminal.
        let status = Command::new(&inv.program)
            .args(&inv.args)
            .current_dir(cwd)
            .stdout(io::stderr())
            .status()
            .await
            .map_err(|e| RunError::spawn(&inv.program, e))?;
        Ok(ProcessOutput {
            code: status.code(),
            ..ProcessOutput::default()
        })
    }
}

// ───────────────────────────────────────── cleanup ───────────

/// Ask the selector to exit so it can restore the terminal, then force it.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: `pid` belongs to a child we have not reaped yet.
            unsafe {
                libc::kill(pid as libc::pid_t, libc::SIGTERM);
            }
            if tokio::time::timeout(TERMINATE_GRACE, child.wait()).await.is_ok() {
                return;
            }
        }
    }
    if let Err(e) = child.start_kill() {
        warn!(error = %e, "failed to kill selector");
    }
    let _ = child.wait().await;
}

/// Kill the enumerator's whole process group and reap it.
async fn reap_enumerator(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: the enumerator leads its own group (`process_group(0)`).
            unsafe {
                libc::killpg(pid as libc::pid_t, libc::SIGKILL);
            }
        }
    }
    let _ = child.start_kill();
    let _ = child.wait().await;
}

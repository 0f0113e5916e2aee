//! Out-of-process sinks.
//!
//! The handler is spawned once per dispatch with the manifest `Args`
//! followed by `true`/`false`. The payload is written to stdin and
//! `HOSTWATCH_SUCCEEDED` carries the same flag. Trimmed stdout is the
//! result string; a nonzero exit status is a dispatch failure.

use super::Dispatch;
use crate::error::DispatchError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

pub const SUCCEEDED_ENV: &str = "HOSTWATCH_SUCCEEDED";

#[derive(Debug, Clone)]
pub struct ExecPlugin {
    program: PathBuf,
    args: Vec<String>,
}

impl ExecPlugin {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[async_trait]
impl Dispatch for ExecPlugin {
    async fn dispatch(&self, payload: &str, succeeded: bool) -> Result<String, DispatchError> {
        let flag = if succeeded { "true" } else { "false" };
        debug!("Running plugin process: {} {}", self.command_line(), flag);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(flag)
            .env(SUCCEEDED_ENV, flag)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DispatchError::Spawn {
                command: self.command_line(),
                source,
            })?;

        // stdin is fed while stdout is drained, so handlers that echo their
        // input never fill both pipes.
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // A handler that ignores its input may exit before we finish writing.
                if let Err(e) = stdin.write_all(payload.as_bytes()).await {
                    if e.kind() != ErrorKind::BrokenPipe {
                        return Err(e);
                    }
                }
            }
            Ok(())
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        fed?;

        if !output.status.success() {
            return Err(DispatchError::Exit {
                command: self.command_line(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

use super::Outcome;
use crate::error::ProbeError;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Run an external check binary with `args` and capture its stdout.
///
/// `command` may be a path or a bare name looked up on `PATH`.
pub async fn run_external(command: &str, args: &[String]) -> Result<Outcome, ProbeError> {
    let program =
        which::which(command).map_err(|_| ProbeError::MissingBinary(command.to_string()))?;

    debug!("Executing external check: {} {:?}", program.display(), args);

    let output = Command::new(&program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| ProbeError::Process {
            command: command.to_string(),
            detail: e.to_string(),
        })?;

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Outcome::healthy(format!("Success: {}", stdout)))
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(ProbeError::Process {
            command: command.to_string(),
            detail: format!("{} {}", output.status, stderr.trim()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_external_success() {
        let outcome = run_external("echo", &["hello".to_string()]).await.unwrap();
        assert!(outcome.healthy);
        assert_eq!(outcome.output, "Success: hello\n");
    }

    #[tokio::test]
    async fn test_run_external_failure() {
        let err = run_external("false", &[]).await.unwrap_err();
        assert!(err.to_string().starts_with("failed to run (false)"));
    }

    #[tokio::test]
    async fn test_run_external_missing() {
        let err = run_external("/no/such/binary", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "can't find external utility: /no/such/binary");
    }
}

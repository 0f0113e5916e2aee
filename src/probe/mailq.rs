use super::Outcome;
use crate::error::ProbeError;
use std::path::Path;

pub const MAILQ_PATH: &str = "/var/spool/clientmqueue";

/// Number of entries waiting in the client mail queue.
pub async fn mail_queue(path: &str) -> Result<Outcome, ProbeError> {
    if !Path::new(path).exists() {
        return Ok(Outcome::unhealthy(format!("{} doesn't exist", path)));
    }

    let mut entries = tokio::fs::read_dir(path)
        .await
        .map_err(|source| ProbeError::Read {
            path: path.to_string(),
            source,
        })?;

    let mut count = 0usize;
    while entries
        .next_entry()
        .await
        .map_err(|source| ProbeError::Read {
            path: path.to_string(),
            source,
        })?
        .is_some()
    {
        count += 1;
    }

    Ok(Outcome::healthy(count.to_string()))
}

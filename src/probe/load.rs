use super::Outcome;
use crate::error::ProbeError;

pub const LOADAVG_PATH: &str = "/proc/loadavg";

/// Raw contents of the kernel load average file.
pub async fn load_average(path: &str) -> Result<Outcome, ProbeError> {
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ProbeError::Read {
            path: path.to_string(),
            source,
        })?;
    Ok(Outcome::healthy(data))
}

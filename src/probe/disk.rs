use super::{percent, Outcome};
use crate::error::ProbeError;
use nix::sys::statvfs::{statvfs, Statvfs};

/// `total|used|free|NN%|inodes|iused|ifree|NN%` for the filesystem holding `path`.
pub fn disk_usage(path: &str) -> Result<Outcome, ProbeError> {
    let stat = stat(path)?;
    let frsize = stat.fragment_size() as u64;
    let total = stat.blocks() as u64 * frsize;
    let free = stat.blocks_available() as u64 * frsize;
    let used = total.saturating_sub(free);

    Ok(Outcome::healthy(format!(
        "{}|{}|{}|{}|{}",
        total,
        used,
        free,
        percent(used, total),
        inode_figures(&stat)
    )))
}

/// `inodes|iused|ifree|NN%` for the filesystem holding `path`.
pub fn inode_usage(path: &str) -> Result<Outcome, ProbeError> {
    let stat = stat(path)?;
    Ok(Outcome::healthy(inode_figures(&stat)))
}

/// Run a statvfs-based probe on the blocking pool.
///
/// A dead mount pins the calling thread inside statvfs, so only a blocking
/// pool thread may be lost to it.
pub async fn on_blocking_pool(
    path: &str,
    probe: fn(&str) -> Result<Outcome, ProbeError>,
) -> Result<Outcome, ProbeError> {
    let path = path.to_string();
    tokio::task::spawn_blocking(move || probe(&path)).await?
}

fn stat(path: &str) -> Result<Statvfs, ProbeError> {
    statvfs(path).map_err(|source| ProbeError::Statfs {
        path: path.to_string(),
        source,
    })
}

fn inode_figures(stat: &Statvfs) -> String {
    let total = stat.files() as u64;
    let free = stat.files_free() as u64;
    let used = total.saturating_sub(free);
    format!("{}|{}|{}|{}", total, used, free, percent(used, total))
}

use super::Outcome;
use crate::error::ProbeError;
use std::collections::HashSet;

const TCP_TABLES: [&str; 2] = ["/proc/net/tcp", "/proc/net/tcp6"];
/// Kernel socket state code for LISTEN.
const TCP_LISTEN: &str = "0A";
const SSH_DAEMON: &str = "sshd";

/// Whether an `sshd` process owns a listening TCP socket.
pub async fn check_ssh() -> Result<Outcome, ProbeError> {
    let mut listening = HashSet::new();
    for table in TCP_TABLES {
        // tcp6 is absent on hosts without IPv6
        if let Ok(content) = tokio::fs::read_to_string(table).await {
            listening.extend(listening_inodes(&content));
        }
    }

    let up = tokio::task::spawn_blocking(move || daemon_owns_any(SSH_DAEMON, &listening))
        .await?;

    if up {
        Ok(Outcome::healthy("SSH is up"))
    } else {
        Ok(Outcome::unhealthy("SSH is DOWN"))
    }
}

/// Socket inodes of LISTEN entries in a `/proc/net/tcp`-formatted table.
pub fn listening_inodes(table: &str) -> HashSet<u64> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.get(3) != Some(&TCP_LISTEN) {
                return None;
            }
            fields.get(9)?.parse().ok()
        })
        .collect()
}

/// Scan `/proc/<pid>/fd` of every process named `daemon` for one of `inodes`.
fn daemon_owns_any(daemon: &str, inodes: &HashSet<u64>) -> bool {
    if inodes.is_empty() {
        return false;
    }
    let Ok(procs) = std::fs::read_dir("/proc") else {
        return false;
    };

    procs.filter_map(|entry| entry.ok()).any(|entry| {
        let pid_dir = entry.path();
        let is_daemon = std::fs::read_to_string(pid_dir.join("comm"))
            .map(|comm| comm.trim() == daemon)
            .unwrap_or(false);
        if !is_daemon {
            return false;
        }
        let Ok(fds) = std::fs::read_dir(pid_dir.join("fd")) else {
            return false;
        };
        fds.filter_map(|fd| fd.ok())
            .filter_map(|fd| std::fs::read_link(fd.path()).ok())
            .filter_map(|target| socket_inode(&target.to_string_lossy()))
            .any(|inode| inodes.contains(&inode))
    })
}

/// Parse a `socket:[12345]` fd link target.
fn socket_inode(target: &str) -> Option<u64> {
    target
        .strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

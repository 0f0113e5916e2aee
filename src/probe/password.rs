use super::Outcome;
use crate::error::ProbeError;

pub const SHADOW_PATH: &str = "/etc/shadow";

const DAY_SECS: i64 = 24 * 3600;
/// A max age at or above this many days is treated as "never expires".
const NEVER_EXPIRES_DAYS: i64 = 10000;

/// The fields of one shadow entry that matter for expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowEntry {
    pub username: String,
    pub last_change: Option<i64>,
    pub max_days: Option<i64>,
}

impl ShadowEntry {
    /// Epoch seconds at which the password expires, or `None` for never.
    pub fn expires_at(&self) -> Option<i64> {
        let last_change = self.last_change.filter(|d| *d > 0)?;
        let max_days = self
            .max_days
            .filter(|d| (0..NEVER_EXPIRES_DAYS).contains(d))?;
        Some((last_change + max_days) * DAY_SECS)
    }
}

/// Expiry of `user`'s password as epoch seconds, or `never`.
pub async fn password_expiry(path: &str, user: &str) -> Result<Outcome, ProbeError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ProbeError::Read {
            path: path.to_string(),
            source,
        })?;

    let Some(entry) = find_entry(&content, user) else {
        return Ok(Outcome::unhealthy("user doesn't exist"));
    };

    Ok(Outcome::healthy(match entry.expires_at() {
        Some(epoch) => epoch.to_string(),
        None => "never".to_string(),
    }))
}

/// Find `user` in shadow-formatted `content`. Malformed lines are skipped.
pub fn find_entry(content: &str, user: &str) -> Option<ShadowEntry> {
    content.lines().find_map(|line| {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() < 5 || fields[0] != user {
            return None;
        }
        Some(ShadowEntry {
            username: fields[0].to_string(),
            last_change: fields[2].parse().ok(),
            max_days: fields[4].parse().ok(),
        })
    })
}

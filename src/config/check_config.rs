use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Interval used when `CheckFreq` is zero or negative.
pub const DEFAULT_CHECK_FREQ_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    #[default]
    Internal,
    External,
}

/// One probe to run, loaded from a single YAML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    #[serde(rename = "Label")]
    pub label: String,
    #[serde(rename = "CommandType")]
    pub command_type: CommandType,
    #[serde(rename = "Command")]
    pub command: String,
    #[serde(rename = "CheckFreq")]
    pub check_freq: i64,
    #[serde(rename = "Params", skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    #[serde(rename = "Enabled")]
    pub enabled: bool,
}

impl CheckConfig {
    /// Effective period between two runs of this check.
    pub fn interval(&self) -> Duration {
        match u64::try_from(self.check_freq) {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => Duration::from_secs(DEFAULT_CHECK_FREQ_SECS),
        }
    }
}

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Human-readable timestamp layout used on the wire, e.g. `Jan 02 2006 03:04:05`.
const TIMESTAMP_FORMAT: &str = "%b %d %Y %I:%M:%S";

/// One probe outcome, as stored by agents and shipped to scrapers and sinks.
///
/// The JSON field names are part of the wire contract. Decoding tolerates
/// missing fields and the older `EpochTime` spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckResult {
    #[serde(rename = "ConfigLabel")]
    pub config_label: String,
    #[serde(rename = "Host")]
    pub host: String,
    #[serde(rename = "TimeStamp")]
    pub time_stamp: String,
    #[serde(rename = "Epochtime", alias = "EpochTime")]
    pub epoch_time: i64,
    #[serde(rename = "Command")]
    pub command: String,
    #[serde(rename = "Output")]
    pub output: String,
    #[serde(rename = "Retval")]
    pub retval: i32,
}

/// Wall-clock instant captured once and rendered into both timestamp fields.
#[derive(Debug, Clone, Copy)]
pub struct Stamp(DateTime<Local>);

impl Stamp {
    pub fn now() -> Self {
        Self(Local::now())
    }

    pub fn epoch(&self) -> i64 {
        self.0.timestamp()
    }

    pub fn human(&self) -> String {
        self.0.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl CheckResult {
    /// Build a successful result stamped at `stamp`.
    pub fn success(label: &str, command: &str, output: impl Into<String>, stamp: Stamp) -> Self {
        Self {
            config_label: label.to_string(),
            host: String::new(),
            time_stamp: stamp.human(),
            epoch_time: stamp.epoch(),
            command: command.to_string(),
            output: output.into(),
            retval: 0,
        }
    }

    /// Build a failed result (`Retval=1`) stamped at `stamp`.
    pub fn failure(label: &str, command: &str, output: impl Into<String>, stamp: Stamp) -> Self {
        Self {
            retval: 1,
            ..Self::success(label, command, output, stamp)
        }
    }

    pub fn succeeded(&self) -> bool {
        self.retval == 0
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

/// Resolve the local hostname, degrading to an error string on failure.
pub fn resolve_host() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => format!("Error Getting Hostname: {}", e),
    }
}

//! Probe catalog: maps a CheckConfig's command name to a probe body.
//!
//! Every probe returns an [`Outcome`] or a [`ProbeError`]. The catalog turns
//! both into a [`CheckResult`], so a failing probe is recorded as `Retval=1`
//! instead of ending the scheduler task that called it.

pub mod disk;
pub mod external;
pub mod load;
pub mod mailq;
pub mod memory;
pub mod ntp;
pub mod password;
pub mod ssh;

use crate::check::{CheckResult, Stamp};
use crate::config::{CheckConfig, CommandType};
use crate::error::ProbeError;
use tracing::debug;

/// What a probe observed. `healthy == false` maps to `Retval=1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub healthy: bool,
}

impl Outcome {
    pub fn healthy(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            healthy: true,
        }
    }

    pub fn unhealthy(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            healthy: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    LoadAverage,
    MemUsage,
    CheckSwap,
    CheckDiskUsage,
    CheckInodes,
    CheckPassword,
    CheckSsh,
    CheckNtpSkew,
    CheckMailQ,
    External(String),
    Unknown(String),
}

impl Probe {
    /// Resolve the probe a config refers to.
    pub fn for_config(config: &CheckConfig) -> Self {
        match config.command_type {
            CommandType::External => Probe::External(config.command.clone()),
            CommandType::Internal => Self::internal(&config.command),
        }
    }

    fn internal(command: &str) -> Self {
        match command {
            "LoadAverage" => Probe::LoadAverage,
            "MemUsage" => Probe::MemUsage,
            "CheckSwap" => Probe::CheckSwap,
            "CheckDiskUsage" => Probe::CheckDiskUsage,
            "CheckInodes" => Probe::CheckInodes,
            "CheckPassword" => Probe::CheckPassword,
            "CheckSSH" => Probe::CheckSsh,
            "CheckNTPSkew" => Probe::CheckNtpSkew,
            "CheckMailQ" => Probe::CheckMailQ,
            other => Probe::Unknown(other.to_string()),
        }
    }

    pub fn command_name(&self) -> &str {
        match self {
            Probe::LoadAverage => "LoadAverage",
            Probe::MemUsage => "MemUsage",
            Probe::CheckSwap => "CheckSwap",
            Probe::CheckDiskUsage => "CheckDiskUsage",
            Probe::CheckInodes => "CheckInodes",
            Probe::CheckPassword => "CheckPassword",
            Probe::CheckSsh => "CheckSSH",
            Probe::CheckNtpSkew => "CheckNTPSkew",
            Probe::CheckMailQ => "CheckMailQ",
            Probe::External(path) | Probe::Unknown(path) => path,
        }
    }

    /// Probes that run once per Param rather than once per tick.
    fn per_param(&self) -> bool {
        matches!(
            self,
            Probe::CheckDiskUsage | Probe::CheckInodes | Probe::CheckPassword | Probe::CheckNtpSkew
        )
    }

    /// Run the probe for one tick of `config`.
    ///
    /// Per-param probes yield one result per Param, in Param order. Every
    /// other probe yields exactly one result. `Host` is left for the caller.
    pub async fn run(&self, config: &CheckConfig) -> Vec<CheckResult> {
        if !self.per_param() {
            return vec![self.invoke(&config.label, None, &config.params).await];
        }

        if config.params.is_empty() {
            return vec![CheckResult::failure(
                &config.label,
                self.command_name(),
                format!("{} requires at least one Param", self.command_name()),
                Stamp::now(),
            )];
        }

        let mut results = Vec::with_capacity(config.params.len());
        for param in &config.params {
            results.push(self.invoke(&config.label, Some(param), &[]).await);
        }
        results
    }

    async fn invoke(&self, label: &str, param: Option<&str>, args: &[String]) -> CheckResult {
        let param = param.unwrap_or_default();
        let outcome = match self {
            Probe::LoadAverage => load::load_average(load::LOADAVG_PATH).await,
            Probe::MemUsage => memory::mem_usage(memory::MEMINFO_PATH).await,
            Probe::CheckSwap => memory::swap_usage(memory::MEMINFO_PATH).await,
            Probe::CheckDiskUsage => disk::on_blocking_pool(param, disk::disk_usage).await,
            Probe::CheckInodes => disk::on_blocking_pool(param, disk::inode_usage).await,
            Probe::CheckPassword => password::password_expiry(password::SHADOW_PATH, param).await,
            Probe::CheckSsh => ssh::check_ssh().await,
            Probe::CheckNtpSkew => ntp::ntp_skew(param).await,
            Probe::CheckMailQ => mailq::mail_queue(mailq::MAILQ_PATH).await,
            Probe::External(path) => external::run_external(path, args).await,
            Probe::Unknown(name) => Ok(Outcome::unhealthy(format!(
                "unknown internal command: {}",
                name
            ))),
        };

        let label = self.label_for(label, param);
        let command = self.command_for(param);
        let stamp = Stamp::now();
        match outcome {
            Ok(Outcome {
                output,
                healthy: true,
            }) => CheckResult::success(&label, &command, output, stamp),
            Ok(Outcome { output, .. }) => CheckResult::failure(&label, &command, output, stamp),
            Err(e) => {
                debug!("Probe {} for '{}' failed: {}", command, label, e);
                CheckResult::failure(&label, &command, e.to_string(), stamp)
            }
        }
    }

    fn label_for(&self, label: &str, param: &str) -> String {
        match self {
            Probe::CheckDiskUsage | Probe::CheckInodes => format!("{} {}", param, label),
            _ => label.to_string(),
        }
    }

    fn command_for(&self, param: &str) -> String {
        match self {
            Probe::CheckPassword => format!("CheckPassword: [{}]", param),
            _ => self.command_name().to_string(),
        }
    }
}

/// Percentage of `used` in `total`, rendered without decimals.
pub(crate) fn percent(used: u64, total: u64) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.0}%", used as f64 / total as f64 * 100.0)
}

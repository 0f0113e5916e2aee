//! Alert and telemetry sinks.
//!
//! A plugin is described by a manifest in the plugin directory and backed
//! either by a compiled-in sink (`builtin:<kind>`) or by an external
//! executable speaking the stdin/stdout protocol in [`exec`].

pub mod exec;
pub mod log_sink;
pub mod manifest;
pub mod registry;
pub mod smtp;
pub mod webhook;

pub use manifest::PluginManifest;
pub use registry::PluginRegistry;

use crate::check::CheckResult;
use crate::error::DispatchError;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;

/// The call every sink implements.
///
/// `payload` is either a single serialized CheckResult (failed scrape) or
/// the raw JSON array returned by an agent (successful scrape).
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, payload: &str, succeeded: bool) -> Result<String, DispatchError>;
}

/// A validated, registered plugin.
pub struct PluginDescriptor {
    pub name: String,
    pub version: String,
    /// Manifest the plugin was loaded from.
    pub source: PathBuf,
    dispatcher: Box<dyn Dispatch>,
}

impl PluginDescriptor {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        source: impl Into<PathBuf>,
        dispatcher: Box<dyn Dispatch>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source: source.into(),
            dispatcher,
        }
    }

    pub async fn dispatch(&self, payload: &str, succeeded: bool) -> Result<String, DispatchError> {
        self.dispatcher.dispatch(payload, succeeded).await
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("source", &self.source)
            .finish()
    }
}

/// Decode a dispatch payload into records, accepting both payload shapes.
pub fn decode_payload(payload: &str) -> Result<Vec<CheckResult>, serde_json::Error> {
    match serde_json::from_str::<Vec<CheckResult>>(payload) {
        Ok(results) => Ok(results),
        Err(_) => serde_json::from_str::<CheckResult>(payload).map(|r| vec![r]),
    }
}

/// Plain-text rendering of one record, used by the mail sink.
pub fn render_result(result: &CheckResult) -> String {
    format!(
        "Label: {}\nHost: {}\nTimeStamp: {}\nEpochTime: {}\nCommand: {}\nOutput: {}\nRetval: {}\n",
        result.config_label,
        result.host,
        result.time_stamp,
        result.epoch_time,
        result.command,
        result.output,
        result.retval
    )
}

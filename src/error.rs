//! Error taxonomy shared by the agent and the scraper.
//!
//! None of these errors is fatal to the process. Probe and dispatch failures
//! are recorded or logged once per cycle, plugin load failures skip a single
//! manifest, and only [`RegistryError`] is handed back to the caller to decide.

use std::path::PathBuf;
use thiserror::Error;

/// A probe failed to produce a measurement.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("error reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {what}: {detail}")]
    Parse { what: String, detail: String },
    #[error("can't find external utility: {0}")]
    MissingBinary(String),
    #[error("failed to run ({command}): {detail}")]
    Process { command: String, detail: String },
    #[error("error querying ntp server: {0}")]
    Ntp(String),
    #[error("probe task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("statfs failed for {path}: {source}")]
    Statfs {
        path: String,
        #[source]
        source: nix::Error,
    },
}

/// A plugin manifest was rejected during registry construction.
#[derive(Debug, Error)]
pub enum PluginLoadError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("manifest {path} is missing required field '{field}'")]
    MissingField { path: PathBuf, field: &'static str },
    #[error("manifest {path} names unknown builtin handler '{kind}'")]
    UnknownBuiltin { path: PathBuf, kind: String },
    #[error("manifest {path} has invalid config for builtin '{kind}': {detail}")]
    InvalidConfig {
        path: PathBuf,
        kind: String,
        detail: String,
    },
    #[error("handler {handler} for manifest {path} is not an executable file")]
    NotExecutable { path: PathBuf, handler: PathBuf },
    #[error("plugin already loaded: {0}")]
    Duplicate(String),
}

/// Registry construction failed as a whole.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("plugin path doesn't exist ({0})")]
    MissingDirectory(PathBuf),
    #[error("failed to list plugin path {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no plugins loaded: do plugin manifests exist in {0}?")]
    Empty(PathBuf),
}

/// A sink call failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to start plugin process {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("plugin process {command} exited with {status}: {stderr}")]
    Exit {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("plugin i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("smtp error: {0}")]
    Smtp(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("payload is not a check result: {0}")]
    Payload(#[from] serde_json::Error),
}

/// A scrape fetch failed at the transport level.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// A store query was malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("missing service to retrieve")]
    MissingService,
}

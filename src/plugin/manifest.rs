use super::exec::ExecPlugin;
use super::log_sink::LogSink;
use super::smtp::{SmtpConfig, SmtpSink};
use super::webhook::{WebhookConfig, WebhookSink};
use super::{Dispatch, PluginDescriptor};
use crate::error::PluginLoadError;
use serde::Deserialize;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const BUILTIN_PREFIX: &str = "builtin:";

/// On-disk plugin description.
///
/// ```yaml
/// Name: alert_smtp
/// Version: "1.0"
/// Handler: builtin:smtp
/// Config:
///   SMTPServer: localhost:25
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PluginManifest {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    /// Accepts bare YAML numbers so `Version: 1.0` works unquoted.
    #[serde(rename = "Version")]
    pub version: Option<serde_yaml::Value>,
    #[serde(rename = "Handler")]
    pub handler: Option<String>,
    #[serde(rename = "Args")]
    pub args: Vec<String>,
    #[serde(rename = "Config")]
    pub config: serde_yaml::Value,
}

impl PluginManifest {
    pub fn from_file(path: &Path) -> Result<Self, PluginLoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| PluginLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| PluginLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the manifest and build its sink.
    pub fn into_descriptor(self, path: &Path) -> Result<PluginDescriptor, PluginLoadError> {
        let missing = |field| PluginLoadError::MissingField {
            path: path.to_path_buf(),
            field,
        };

        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| missing("Name"))?;
        let version = self
            .version
            .as_ref()
            .and_then(scalar_to_string)
            .ok_or_else(|| missing("Version"))?;
        let handler = self
            .handler
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| missing("Handler"))?;

        let dispatcher: Box<dyn Dispatch> = match handler.strip_prefix(BUILTIN_PREFIX) {
            Some(kind) => builtin(path, kind, &name, self.config)?,
            None => {
                let program = resolve_handler(path, &handler);
                if !is_executable(&program) {
                    return Err(PluginLoadError::NotExecutable {
                        path: path.to_path_buf(),
                        handler: program,
                    });
                }
                Box::new(ExecPlugin::new(program, self.args))
            }
        };

        Ok(PluginDescriptor::new(name, version, path, dispatcher))
    }
}

fn builtin(
    path: &Path,
    kind: &str,
    name: &str,
    config: serde_yaml::Value,
) -> Result<Box<dyn Dispatch>, PluginLoadError> {
    let invalid = |detail: String| PluginLoadError::InvalidConfig {
        path: path.to_path_buf(),
        kind: kind.to_string(),
        detail,
    };

    match kind {
        "log" => Ok(Box::new(LogSink::new(name))),
        "smtp" => {
            let config: SmtpConfig = from_config(config).map_err(&invalid)?;
            Ok(Box::new(SmtpSink::from_config(config).map_err(&invalid)?))
        }
        "webhook" => {
            let config: WebhookConfig = from_config(config).map_err(&invalid)?;
            Ok(Box::new(WebhookSink::from_config(config).map_err(&invalid)?))
        }
        other => Err(PluginLoadError::UnknownBuiltin {
            path: path.to_path_buf(),
            kind: other.to_string(),
        }),
    }
}

fn from_config<T: serde::de::DeserializeOwned>(config: serde_yaml::Value) -> Result<T, String> {
    let config = match config {
        serde_yaml::Value::Null => serde_yaml::Value::Mapping(Default::default()),
        other => other,
    };
    serde_yaml::from_value(config).map_err(|e| e.to_string())
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Relative handlers are resolved against the manifest's directory.
fn resolve_handler(manifest: &Path, handler: &str) -> PathBuf {
    let handler = PathBuf::from(handler);
    if handler.is_absolute() {
        return handler;
    }
    manifest
        .parent()
        .map(|dir| dir.join(&handler))
        .unwrap_or(handler)
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(yaml: &str) -> PluginManifest {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_builtin_log_manifest() {
        let manifest = parse("Name: log\nVersion: 1.0\nHandler: builtin:log\n");
        let descriptor = manifest
            .into_descriptor(Path::new("/etc/hostwatch/plugins.d/log.yml"))
            .unwrap();
        assert_eq!(descriptor.name, "log");
        assert_eq!(descriptor.version, "1.0");
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let path = Path::new("p.yml");
        let err = parse("Version: '1'\nHandler: builtin:log\n")
            .into_descriptor(path)
            .unwrap_err();
        assert!(matches!(err, PluginLoadError::MissingField { field: "Name", .. }));

        let err = parse("Name: x\nHandler: builtin:log\n")
            .into_descriptor(path)
            .unwrap_err();
        assert!(matches!(err, PluginLoadError::MissingField { field: "Version", .. }));

        let err = parse("Name: x\nVersion: '1'\n")
            .into_descriptor(path)
            .unwrap_err();
        assert!(matches!(err, PluginLoadError::MissingField { field: "Handler", .. }));
    }

    #[test]
    fn test_unknown_builtin() {
        let err = parse("Name: x\nVersion: '1'\nHandler: builtin:pager\n")
            .into_descriptor(Path::new("p.yml"))
            .unwrap_err();
        assert!(matches!(err, PluginLoadError::UnknownBuiltin { kind, .. } if kind == "pager"));
    }

    #[test]
    fn test_smtp_without_config_is_invalid() {
        let err = parse("Name: mail\nVersion: '1'\nHandler: builtin:smtp\n")
            .into_descriptor(Path::new("p.yml"))
            .unwrap_err();
        assert!(matches!(err, PluginLoadError::InvalidConfig { .. }));
    }

    #[test]
    fn test_exec_handler_must_be_executable() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("notify.sh");
        std::fs::write(&script, "#!/bin/sh\ncat\n").unwrap();
        let manifest_path = dir.path().join("notify.yml");

        let err = parse("Name: notify\nVersion: '1'\nHandler: notify.sh\n")
            .into_descriptor(&manifest_path)
            .unwrap_err();
        assert!(matches!(err, PluginLoadError::NotExecutable { .. }));

        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let descriptor = parse("Name: notify\nVersion: '1'\nHandler: notify.sh\n")
            .into_descriptor(&manifest_path)
            .unwrap();
        assert_eq!(descriptor.name, "notify");
        assert_eq!(descriptor.source, manifest_path);
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yml");
        std::fs::write(&path, "Name: [unclosed\n").unwrap();
        assert!(matches!(
            PluginManifest::from_file(&path),
            Err(PluginLoadError::Parse { .. })
        ));
        assert!(matches!(
            PluginManifest::from_file(&dir.path().join("absent.yml")),
            Err(PluginLoadError::Read { .. })
        ));
    }
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Interval used when `DefaultScrapeTime` is zero or negative.
pub const DEFAULT_SCRAPE_TIME_SECS: u64 = 300;
/// HTTP fetch timeout used when `ScrapeTimeout` is zero or negative.
pub const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 30;
/// Path scraped when a host lists no `HostPaths`.
pub const DEFAULT_HOST_PATH: &str = "/checkandclear";

/// Scrape behaviour for a set of agents, loaded from a single YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// `false` marks a sub-scraper node that keeps what it scrapes for an upstream scraper.
    #[serde(rename = "AutoClear")]
    pub auto_clear: bool,
    #[serde(rename = "DefaultScrapeTime")]
    pub default_scrape_time: i64,
    #[serde(rename = "ScrapeTimeout")]
    pub scrape_timeout: i64,
    #[serde(rename = "PluginPath")]
    pub plugin_path: String,
    #[serde(rename = "Hosts")]
    pub hosts: Vec<HostTarget>,
    #[serde(rename = "DefaultPlugins")]
    pub default_plugins: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostTarget {
    #[serde(rename = "HostName")]
    pub host_name: String,
    #[serde(rename = "ScrapeTime")]
    pub scrape_time: i64,
    #[serde(rename = "HostPaths")]
    pub host_paths: Vec<String>,
    #[serde(rename = "Plugins")]
    pub plugins: Vec<String>,
    #[serde(rename = "FailurePlugins")]
    pub failure_plugins: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            auto_clear: true,
            default_scrape_time: 0,
            scrape_timeout: 0,
            plugin_path: String::new(),
            hosts: Vec::new(),
            default_plugins: Vec::new(),
        }
    }
}

impl ScrapeConfig {
    pub fn default_interval(&self) -> Duration {
        positive_secs(self.default_scrape_time).unwrap_or(Duration::from_secs(DEFAULT_SCRAPE_TIME_SECS))
    }

    pub fn timeout(&self) -> Duration {
        positive_secs(self.scrape_timeout).unwrap_or(Duration::from_secs(DEFAULT_SCRAPE_TIMEOUT_SECS))
    }

    /// Period between scrapes of `host`, falling back to the config default.
    pub fn interval_for(&self, host: &HostTarget) -> Duration {
        positive_secs(host.scrape_time).unwrap_or_else(|| self.default_interval())
    }

    /// Success-path plugins for `host`; `DefaultPlugins` when the host lists none.
    pub fn plugins_for<'a>(&'a self, host: &'a HostTarget) -> &'a [String] {
        if host.plugins.is_empty() {
            &self.default_plugins
        } else {
            &host.plugins
        }
    }
}

impl HostTarget {
    pub fn paths(&self) -> Vec<String> {
        if self.host_paths.is_empty() {
            vec![DEFAULT_HOST_PATH.to_string()]
        } else {
            self.host_paths.clone()
        }
    }
}

fn positive_secs(secs: i64) -> Option<Duration> {
    u64::try_from(secs)
        .ok()
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_config_deserialization() {
        let yaml = r#"
DefaultScrapeTime: 600
PluginPath: ./plugins
Hosts:
  - HostName: localhost:9050
    ScrapeTime: 10
    HostPaths:
      - /checkandclear
      - /checks
    Plugins:
      - log
    FailurePlugins:
      - alert_smtp
DefaultPlugins:
  - log
"#;
        let config: ScrapeConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.auto_clear); // default
        assert_eq!(config.default_interval(), Duration::from_secs(600));
        assert_eq!(config.plugin_path, "./plugins");
        assert_eq!(config.hosts.len(), 1);
        let host = &config.hosts[0];
        assert_eq!(host.host_name, "localhost:9050");
        assert_eq!(config.interval_for(host), Duration::from_secs(10));
        assert_eq!(host.paths(), vec!["/checkandclear", "/checks"]);
        assert_eq!(host.failure_plugins, vec!["alert_smtp"]);
    }

    #[test]
    fn test_scrape_time_fallbacks() {
        let mut config = ScrapeConfig::default();
        let host = HostTarget {
            scrape_time: 0,
            ..HostTarget::default()
        };
        assert_eq!(config.interval_for(&host), Duration::from_secs(300));

        config.default_scrape_time = -5;
        assert_eq!(config.interval_for(&host), Duration::from_secs(300));

        config.default_scrape_time = 45;
        assert_eq!(config.interval_for(&host), Duration::from_secs(45));

        let negative = HostTarget {
            scrape_time: -1,
            ..HostTarget::default()
        };
        assert_eq!(config.interval_for(&negative), Duration::from_secs(45));
    }

    #[test]
    fn test_empty_host_paths_default_to_checkandclear() {
        let host = HostTarget::default();
        assert_eq!(host.paths(), vec!["/checkandclear"]);
    }

    #[test]
    fn test_plugins_fall_back_to_default_plugins() {
        let config = ScrapeConfig {
            default_plugins: vec!["log".to_string()],
            ..ScrapeConfig::default()
        };
        let bare = HostTarget::default();
        assert_eq!(config.plugins_for(&bare), ["log".to_string()]);

        let explicit = HostTarget {
            plugins: vec!["webhook".to_string()],
            ..HostTarget::default()
        };
        assert_eq!(config.plugins_for(&explicit), ["webhook".to_string()]);
    }

    #[test]
    fn test_timeout_default() {
        let config = ScrapeConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }
}

//! Default configuration written on first start when no config directory exists.

use crate::config::{CheckConfig, CommandType};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

const SCRAPER_DEFAULT_YML: &str = r#"# Keep scraped checks for an upstream scraper?
# Set to "false" if this scraper is a sub-scraper node.
AutoClear: true

# Scrape time if not defined in a specific host
DefaultScrapeTime: 600

# HTTP timeout for a single scrape, in seconds
ScrapeTimeout: 30

# The path to the plugin manifests
PluginPath: {plugin_dir}

# List of hosts to check
Hosts:
  # The hostname:port to check
  - HostName: localhost:9050

    # The wait between scrapes of this specific host
    ScrapeTime: 600

    # The URL paths on the agent to scrape (defaults to /checkandclear)
    HostPaths:
      - /checkandclear

    # The plugins to run after scraping this host
    Plugins:
      - log

    # What to run if scraping fails
    FailurePlugins:
      - log

# The plugins to run if not specified in the host block
DefaultPlugins:
  - log
"#;

const LOG_PLUGIN_YML: &str = r#"# Writes every payload to the scraper log
Name: log
Version: "0.1"
Handler: builtin:log
"#;

const SMTP_PLUGIN_EXAMPLE: &str = r#"# Rename to alert_smtp.yml to enable
Name: alert_smtp
Version: "0.1"
Handler: builtin:smtp
Config:
  # Who to alert in the event of a failed scrape
  AlertList:
    - someone@yourdomain.com
  # Who the email should come from
  FromAddress: hostwatch@yourdomain.com
  # The subject for the failed scrape email
  Subject: Failed To Scrape Host
  # The SMTP server to use as the MTA
  SMTPServer: smtp.yourdomain.com:25
"#;

fn internal(label: &str, command: &str, params: &[&str]) -> (String, CheckConfig) {
    let file = format!("{}.yml", label.to_lowercase().replace(' ', "_"));
    let config = CheckConfig {
        label: label.to_string(),
        command_type: CommandType::Internal,
        command: command.to_string(),
        check_freq: 60,
        params: params.iter().map(|p| p.to_string()).collect(),
        enabled: true,
    };
    (file, config)
}

/// The checks every fresh agent starts with.
pub fn default_checks() -> Vec<(String, CheckConfig)> {
    vec![
        internal("Load Average", "LoadAverage", &[]),
        internal("Memory Usage", "MemUsage", &[]),
        internal("Disk Usage", "CheckDiskUsage", &["/", "/home", "/tmp", "/var"]),
        internal("Root Password Expiration", "CheckPassword", &["root"]),
        internal("Oracle Password Expiration", "CheckPassword", &["oracle"]),
        internal("Check SSH", "CheckSSH", &[]),
        internal("Swap Usage", "CheckSwap", &[]),
        internal("Inode Usage", "CheckInodes", &["/"]),
        internal("NTP Skew", "CheckNTPSkew", &["pool.ntp.org"]),
        internal("MailQ Count", "CheckMailQ", &[]),
    ]
}

/// Create `dir` and populate it with the default checks.
pub fn write_agent_skeleton(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

    for (file, config) in default_checks() {
        let yaml = serde_yaml::to_string(&config)?;
        let path = dir.join(file);
        std::fs::write(&path, yaml)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    info!("📝 Wrote default agent configuration to {}", dir.display());
    Ok(())
}

/// Create the scraper and plugin directories with a default target and a `log` plugin.
pub fn write_scraper_skeleton(scraper_dir: &Path, plugin_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(scraper_dir)
        .with_context(|| format!("Failed to create config directory: {}", scraper_dir.display()))?;
    std::fs::create_dir_all(plugin_dir)
        .with_context(|| format!("Failed to create plugin directory: {}", plugin_dir.display()))?;

    // Quoted by the YAML emitter so paths with `: ` or `#` survive.
    let plugin_path = serde_yaml::to_string(&plugin_dir.display().to_string())?;
    let default_yml = SCRAPER_DEFAULT_YML.replace("{plugin_dir}", plugin_path.trim_end());
    std::fs::write(scraper_dir.join("default.yml"), default_yml)?;
    for (file, content) in [
        ("log.yml", LOG_PLUGIN_YML),
        ("alert_smtp.yml.example", SMTP_PLUGIN_EXAMPLE),
    ] {
        let path = plugin_dir.join(file);
        if !path.exists() {
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    info!(
        "📝 Wrote default scraper configuration to {} and {}",
        scraper_dir.display(),
        plugin_dir.display()
    );
    Ok(())
}

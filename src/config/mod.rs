pub mod check_config;
pub mod loader;
pub mod scrape_config;
pub mod skeleton;

pub use check_config::{CheckConfig, CommandType};
pub use loader::{load_check_configs, load_scrape_configs};
pub use scrape_config::{HostTarget, ScrapeConfig};

/// Default directory holding one CheckConfig per file.
pub const DEFAULT_AGENT_CONFIG_DIR: &str = "/etc/hostwatch/config.d";
/// Default directory holding one ScrapeConfig per file.
pub const DEFAULT_SCRAPER_CONFIG_DIR: &str = "/etc/hostwatch/scraper.d";
/// Default directory holding plugin manifests.
pub const DEFAULT_PLUGIN_DIR: &str = "/etc/hostwatch/plugins.d";

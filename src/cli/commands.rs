use crate::agent::AgentNode;
use crate::cli::{AgentArgs, NodeKind, ScraperArgs, ShowArgs};
use crate::config::{
    load_check_configs, load_scrape_configs, skeleton, ScrapeConfig,
    DEFAULT_AGENT_CONFIG_DIR, DEFAULT_PLUGIN_DIR, DEFAULT_SCRAPER_CONFIG_DIR,
};
use crate::plugin::PluginRegistry;
use crate::scraper::ScraperNode;
use anyhow::{Context, Result};
use futures_util::future::join_all;
use std::path::{Path, PathBuf};
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Run the agent until Ctrl+C.
pub async fn run_agent_command(args: &AgentArgs) -> Result<()> {
    if !args.config_dir.exists() && !args.no_skeleton {
        skeleton::write_agent_skeleton(&args.config_dir)?;
    }

    let configs: Vec<_> = load_check_configs(&args.config_dir)?
        .into_iter()
        .map(|(_, config)| config)
        .collect();

    let token = CancellationToken::new();
    let node = AgentNode::new(configs, args.listen.clone(), token.clone());
    let handles = node.start();

    info!("🎯 Hostwatch agent started");
    info!("📂 Config directory: {}", args.config_dir.display());

    wait_for_shutdown(token, handles).await
}

/// Run the scraper until Ctrl+C.
pub async fn run_scraper_command(args: &ScraperArgs) -> Result<()> {
    if !args.config_dir.exists() && !args.no_skeleton {
        let plugin_dir = args
            .plugin_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PLUGIN_DIR));
        skeleton::write_scraper_skeleton(&args.config_dir, &plugin_dir)?;
    }

    let configs: Vec<_> = load_scrape_configs(&args.config_dir)?
        .into_iter()
        .map(|(_, config)| config)
        .collect();

    let dirs = plugin_dirs(&configs, args.plugin_dir.as_deref());
    let registry = match PluginRegistry::load_all(&dirs) {
        Ok(registry) => registry,
        Err(e) => {
            // Scrapes still feed the local store; there is just nobody to alert.
            error!("❌ {}", e);
            warn!("Continuing without any plugins");
            PluginRegistry::default()
        }
    };

    let token = CancellationToken::new();
    let node = ScraperNode::new(configs, registry, args.listen.clone(), token.clone());
    let handles = node.start();

    info!("🎯 Hostwatch scraper started");
    info!("📂 Config directory: {}", args.config_dir.display());

    wait_for_shutdown(token, handles).await
}

/// Plugin directories to scan, in order: the override, else every
/// distinct `PluginPath`, else the default directory.
pub fn plugin_dirs(configs: &[ScrapeConfig], plugin_dir: Option<&Path>) -> Vec<PathBuf> {
    if let Some(dir) = plugin_dir {
        return vec![dir.to_path_buf()];
    }

    let mut dirs: Vec<PathBuf> = Vec::new();
    for config in configs {
        if config.plugin_path.is_empty() {
            continue;
        }
        let dir = PathBuf::from(&config.plugin_path);
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    if dirs.is_empty() {
        dirs.push(PathBuf::from(DEFAULT_PLUGIN_DIR));
    }
    dirs
}

async fn wait_for_shutdown(token: CancellationToken, handles: Vec<JoinHandle<()>>) -> Result<()> {
    info!("🛑 Press Ctrl+C to stop");
    signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c")?;
    info!("🛑 Received Ctrl+C, shutting down...");

    token.cancel();
    for joined in join_all(handles).await {
        if let Err(e) = joined {
            warn!("Task ended abnormally: {}", e);
        }
    }

    info!("🧹 Shutdown complete");
    Ok(())
}

/// Handle show command
pub fn handle_show_command(args: &ShowArgs) -> Result<()> {
    match args.kind {
        NodeKind::Agent => {
            let dir = args
                .config_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_AGENT_CONFIG_DIR));
            let configs = load_check_configs(&dir).context("Failed to load config")?;

            println!("Loaded {} checks from {}", configs.len(), dir.display());
            for (path, check) in &configs {
                let state = if check.enabled { "enabled" } else { "disabled" };
                println!(
                    "  {}: {} ({:?}) every {:?} params={:?} [{}] <- {}",
                    check.label,
                    check.command,
                    check.command_type,
                    check.interval(),
                    check.params,
                    state,
                    path.display()
                );
            }
        }
        NodeKind::Scraper => {
            let dir = args
                .config_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRAPER_CONFIG_DIR));
            let configs = load_scrape_configs(&dir).context("Failed to load config")?;

            println!("Loaded {} scrape configs from {}", configs.len(), dir.display());
            for (path, scrape) in &configs {
                println!("\n{}:", path.display());
                println!("  auto_clear: {}", scrape.auto_clear);
                println!("  plugin_path: {}", scrape.plugin_path);
                println!("  timeout: {:?}", scrape.timeout());
                for host in &scrape.hosts {
                    println!(
                        "  {} every {:?} paths={:?} plugins={:?} failure_plugins={:?}",
                        host.host_name,
                        scrape.interval_for(host),
                        host.paths(),
                        scrape.plugins_for(host),
                        host.failure_plugins
                    );
                }
            }

            let dirs = plugin_dirs(
                &configs.into_iter().map(|(_, c)| c).collect::<Vec<_>>(),
                None,
            );
            match PluginRegistry::load_all(&dirs) {
                Ok(registry) => {
                    println!("\nPlugins:");
                    for plugin in registry.iter() {
                        println!(
                            "  {} v{} <- {}",
                            plugin.name,
                            plugin.version,
                            plugin.source.display()
                        );
                    }
                }
                Err(e) => println!("\nPlugins: {}", e),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrape(plugin_path: &str) -> ScrapeConfig {
        ScrapeConfig {
            plugin_path: plugin_path.to_string(),
            ..ScrapeConfig::default()
        }
    }

    #[test]
    fn test_plugin_dirs_override_wins() {
        let dirs = plugin_dirs(&[scrape("/a")], Some(Path::new("/override")));
        assert_eq!(dirs, vec![PathBuf::from("/override")]);
    }

    #[test]
    fn test_plugin_dirs_dedupes_and_falls_back() {
        let dirs = plugin_dirs(&[scrape("/a"), scrape(""), scrape("/b"), scrape("/a")], None);
        assert_eq!(dirs, vec![PathBuf::from("/a"), PathBuf::from("/b")]);

        let dirs = plugin_dirs(&[scrape("")], None);
        assert_eq!(dirs, vec![PathBuf::from(DEFAULT_PLUGIN_DIR)]);
    }
}

use crate::check::{CheckResult, Stamp};
use crate::config::{HostTarget, ScrapeConfig};
use crate::error::ScrapeError;
use crate::plugin::PluginRegistry;
use crate::store::ResultStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Owns one periodic task per (ScrapeConfig, HostTarget) pair.
pub struct ScrapeOrchestrator {
    pub configs: Vec<ScrapeConfig>,
    registry: Arc<PluginRegistry>,
    store: ResultStore,
    token: CancellationToken,
}

impl ScrapeOrchestrator {
    pub fn new(
        configs: Vec<ScrapeConfig>,
        registry: Arc<PluginRegistry>,
        store: ResultStore,
        token: CancellationToken,
    ) -> Self {
        Self {
            configs,
            registry,
            store,
            token,
        }
    }

    /// Start a task for every host of every config and return their handles.
    pub fn start_all_tasks(&self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        for config in &self.configs {
            for host in &config.hosts {
                if host.host_name.is_empty() {
                    warn!("Skipping scrape target without HostName");
                    continue;
                }
                match HostScraper::new(config, host, self.registry.clone(), self.store.clone()) {
                    Ok(scraper) => {
                        let token = self.token.child_token();
                        handles.push(tokio::spawn(scraper.run(token)));
                    }
                    Err(e) => error!("❌ Cannot build HTTP client for {}: {}", host.host_name, e),
                }
            }
        }
        handles
    }
}

/// Scrape loop state for a single agent.
pub struct HostScraper {
    host: HostTarget,
    interval: Duration,
    success_plugins: Vec<String>,
    keep_results: bool,
    client: reqwest::Client,
    registry: Arc<PluginRegistry>,
    store: ResultStore,
}

impl HostScraper {
    pub fn new(
        config: &ScrapeConfig,
        host: &HostTarget,
        registry: Arc<PluginRegistry>,
        store: ResultStore,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            host: host.clone(),
            interval: config.interval_for(host),
            success_plugins: config.plugins_for(host).to_vec(),
            keep_results: !config.auto_clear,
            client,
            registry,
            store,
        })
    }

    pub async fn run(self, token: CancellationToken) {
        info!(
            "⏰ Scraping {} every {:?} (paths: {})",
            self.host.host_name,
            self.interval,
            self.host.paths().join(", ")
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = token.cancelled() => break,
            }

            tokio::select! {
                _ = self.scrape_once() => {}
                _ = token.cancelled() => break,
            }
        }

        debug!("Scraper for {} stopped", self.host.host_name);
    }

    /// One cycle over every configured path.
    pub async fn scrape_once(&self) {
        for path in self.host.paths() {
            self.scrape_path(&path).await;
        }
    }

    async fn scrape_path(&self, path: &str) {
        match self.fetch(path).await {
            Ok(body) => self.handle_success(&body).await,
            Err(e) => self.handle_failure(path, &e).await,
        }
    }

    async fn fetch(&self, path: &str) -> Result<String, ScrapeError> {
        let url = format!("http://{}{}", self.host.host_name, path);
        debug!("Scraping {}", url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            warn!("{} answered {}", url, response.status());
        }
        let body = response.bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn handle_success(&self, body: &str) {
        let results: Vec<CheckResult> = serde_json::from_str(body).unwrap_or_else(|e| {
            debug!(
                "Response from {} is not a result list: {}",
                self.host.host_name, e
            );
            Vec::new()
        });
        debug!(
            "Scraped {} result(s) from {}",
            results.len(),
            self.host.host_name
        );

        self.dispatch(&self.success_plugins, body, true).await;

        if self.keep_results {
            self.store.extend(results).await;
        }
    }

    async fn handle_failure(&self, path: &str, error: &ScrapeError) {
        warn!("❌ Failed to scrape {}{}: {}", self.host.host_name, path, error);
        let result = failure_result(&self.host.host_name, path, error);

        match serde_json::to_string(&result) {
            Ok(payload) => {
                self.dispatch(&self.host.failure_plugins, &payload, false)
                    .await
            }
            Err(e) => error!("❌ Cannot serialize scrape failure: {}", e),
        }

        if self.keep_results {
            self.store.append(result).await;
        }
    }

    /// Call each named plugin in order. Unknown names are skipped.
    async fn dispatch(&self, names: &[String], payload: &str, succeeded: bool) {
        for name in names {
            let Some(plugin) = self.registry.get(name) else {
                continue;
            };
            match plugin.dispatch(payload, succeeded).await {
                Ok(result) => debug!("Plugin {} returned: {}", name, result),
                Err(e) => error!("❌ Plugin {} failed for {}: {}", name, self.host.host_name, e),
            }
        }
    }
}

/// The record sent to failure plugins when an agent cannot be reached.
pub fn failure_result(host: &str, path: &str, error: &ScrapeError) -> CheckResult {
    CheckResult::failure(
        "",
        &format!("scrape: {}{}", host, path),
        format!("failed to scrape: {}", error),
        Stamp::now(),
    )
    .with_host(host)
}

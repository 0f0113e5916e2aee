//! Scraper node: scrape orchestrator, plugin registry and status server.

pub mod orchestrator;

pub use orchestrator::{HostScraper, ScrapeOrchestrator};

use crate::config::ScrapeConfig;
use crate::plugin::PluginRegistry;
use crate::store::ResultStore;
use crate::web::StatusServer;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Text served by the scraper's `/whoareyou`.
pub const SCRAPER_IDENTITY: &str = "Hostwatch Scraper";
pub const DEFAULT_SCRAPER_LISTEN: &str = "0.0.0.0:9051";

pub struct ScraperNode {
    configs: Vec<ScrapeConfig>,
    registry: Arc<PluginRegistry>,
    server: StatusServer,
    store: ResultStore,
    token: CancellationToken,
}

impl ScraperNode {
    pub fn new(
        configs: Vec<ScrapeConfig>,
        registry: PluginRegistry,
        listen: impl Into<String>,
        token: CancellationToken,
    ) -> Self {
        let store = ResultStore::new();
        let server = StatusServer::new(listen, SCRAPER_IDENTITY, store.clone());
        Self {
            configs,
            registry: Arc::new(registry),
            server,
            store,
            token,
        }
    }

    pub fn store(&self) -> ResultStore {
        self.store.clone()
    }

    /// Spawn every scraper task. All of them end once the token is cancelled.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        let orchestrator = ScrapeOrchestrator::new(
            self.configs.clone(),
            self.registry.clone(),
            self.store.clone(),
            self.token.clone(),
        );
        let mut handles = orchestrator.start_all_tasks();
        info!("🚀 Scraper started {} host task(s)", handles.len());

        let server = self.server.clone();
        let token = self.token.clone();
        handles.push(tokio::spawn(async move {
            if let Err(e) = server.start(token).await {
                error!("❌ Scraper status server failed: {:#}", e);
            }
        }));

        handles
    }
}

//! Agent node: check scheduler, aggregator, result store and status server.

pub mod scheduler;

pub use scheduler::CheckScheduler;

use crate::config::CheckConfig;
use crate::store::{spawn_aggregator, ResultStore};
use crate::web::StatusServer;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Text served by the agent's `/whoareyou`.
pub const AGENT_IDENTITY: &str = "Hostwatch Agent";
pub const DEFAULT_AGENT_LISTEN: &str = "0.0.0.0:9050";

pub struct AgentNode {
    configs: Vec<CheckConfig>,
    server: StatusServer,
    store: ResultStore,
    token: CancellationToken,
}

impl AgentNode {
    pub fn new(configs: Vec<CheckConfig>, listen: impl Into<String>, token: CancellationToken) -> Self {
        let store = ResultStore::new();
        let server = StatusServer::new(listen, AGENT_IDENTITY, store.clone());
        Self {
            configs,
            server,
            store,
            token,
        }
    }

    pub fn store(&self) -> ResultStore {
        self.store.clone()
    }

    /// Spawn every agent task. All of them end once the token is cancelled.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut handles = vec![spawn_aggregator(
            self.store.clone(),
            rx,
            self.token.clone(),
        )];

        let scheduler = CheckScheduler::new(self.configs.clone(), tx, self.token.clone());
        let checks = scheduler.start_all_tasks();
        info!(
            "🚀 Agent started {} of {} configured check(s)",
            checks.len(),
            self.configs.len()
        );
        handles.extend(checks);

        let server = self.server.clone();
        let token = self.token.clone();
        handles.push(tokio::spawn(async move {
            if let Err(e) = server.start(token).await {
                error!("❌ Agent status server failed: {:#}", e);
            }
        }));

        handles
    }
}

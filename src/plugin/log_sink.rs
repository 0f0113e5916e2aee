use super::Dispatch;
use crate::error::DispatchError;
use async_trait::async_trait;
use tracing::{info, warn};

/// Writes every payload to the process log.
#[derive(Debug, Clone)]
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Dispatch for LogSink {
    async fn dispatch(&self, payload: &str, succeeded: bool) -> Result<String, DispatchError> {
        if succeeded {
            info!(plugin = %self.name, "📥 {}", payload);
        } else {
            warn!(plugin = %self.name, "🚨 {}", payload);
        }
        Ok("logged".to_string())
    }
}

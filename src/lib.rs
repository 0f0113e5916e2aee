pub mod agent;
pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod plugin;
pub mod probe;
pub mod scraper;
pub mod store;
pub mod web;

// Public API
pub use agent::AgentNode;
pub use check::CheckResult;
pub use plugin::PluginRegistry;
pub use scraper::ScraperNode;
pub use store::ResultStore;

pub mod args;
pub mod commands;

pub use args::{AgentArgs, Cli, Commands, NodeKind, ScraperArgs, ShowArgs};
pub use commands::{handle_show_command, run_agent_command, run_scraper_command};

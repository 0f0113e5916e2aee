use anyhow::{Context, Result};
use clap::Parser;
use hostwatch::cli::{
    handle_show_command, run_agent_command, run_scraper_command, Cli, Commands,
};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first to get debug flag
    let cli = Cli::parse();
    init_logging(cli.debug, cli.log_file.as_deref())?;

    match &cli.command {
        Commands::Agent(args) => run_agent_command(args).await?,
        Commands::Scraper(args) => run_scraper_command(args).await?,
        Commands::Show(args) => handle_show_command(args)?,
    }

    Ok(())
}

fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => tracing_subscriber::fmt().with_max_level(level).init(),
    }

    Ok(())
}

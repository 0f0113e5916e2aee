use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging for internal details
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Append log lines to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run probes and serve their results
    Agent(AgentArgs),
    /// Poll agents and dispatch results to plugins
    Scraper(ScraperArgs),
    /// Print the configuration that would be loaded
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct AgentArgs {
    /// Directory holding one check definition per file
    #[arg(long, default_value = crate::config::DEFAULT_AGENT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Address the status server binds to
    #[arg(long, default_value = crate::agent::DEFAULT_AGENT_LISTEN)]
    pub listen: String,

    /// Do not create a default configuration when the directory is missing
    #[arg(long)]
    pub no_skeleton: bool,
}

#[derive(Args, Debug)]
pub struct ScraperArgs {
    /// Directory holding one scrape definition per file
    #[arg(long, default_value = crate::config::DEFAULT_SCRAPER_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Plugin manifest directory, overriding every PluginPath
    #[arg(long)]
    pub plugin_dir: Option<PathBuf>,

    /// Address the status server binds to
    #[arg(long, default_value = crate::scraper::DEFAULT_SCRAPER_LISTEN)]
    pub listen: String,

    /// Do not create a default configuration when the directory is missing
    #[arg(long)]
    pub no_skeleton: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Agent,
    Scraper,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Which configuration to print
    #[arg(long, value_enum, default_value_t = NodeKind::Agent)]
    pub kind: NodeKind,

    /// Configuration directory (defaults to the one for --kind)
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_defaults() {
        let cli = Cli::try_parse_from(["hostwatch", "agent"]).unwrap();
        assert!(!cli.debug);
        match cli.command {
            Commands::Agent(args) => {
                assert_eq!(args.config_dir, PathBuf::from("/etc/hostwatch/config.d"));
                assert_eq!(args.listen, "0.0.0.0:9050");
                assert!(!args.no_skeleton);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_scraper_flags() {
        let cli = Cli::try_parse_from([
            "hostwatch",
            "scraper",
            "--plugin-dir",
            "/tmp/plugins",
            "--listen",
            "127.0.0.1:19051",
            "--debug",
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Commands::Scraper(args) => {
                assert_eq!(args.plugin_dir, Some(PathBuf::from("/tmp/plugins")));
                assert_eq!(args.listen, "127.0.0.1:19051");
                assert_eq!(args.config_dir, PathBuf::from("/etc/hostwatch/scraper.d"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_show_kind() {
        let cli = Cli::try_parse_from(["hostwatch", "show", "--kind", "scraper"]).unwrap();
        match cli.command {
            Commands::Show(args) => assert_eq!(args.kind, NodeKind::Scraper),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["hostwatch"]).is_err());
    }
}

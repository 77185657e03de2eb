use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "travel-link")]
#[command(about = "Notification dispatch service for the travel booking platform")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "travel-link.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON (overrides logging.json from the config file)
    #[arg(long)]
    pub json_logs: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    pub check: bool,
}

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "spacectl")]
#[command(about = "spacectl: converge hosted spaces to a declared configuration")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL (overrides config and SPACECTL_ENDPOINT env var)
    #[arg(short, long, global = true, env = "SPACECTL_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Access token (overrides the profile token)
    #[arg(long, global = true, env = "HF_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "SPACECTL_PROFILE", default_value = "default")]
    pub profile: String,

    /// Path of the state file tracking the space
    #[arg(long, global = true, default_value = "space.state.json")]
    pub state: PathBuf,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the space, or converge the tracked space to the config file
    Apply(ApplyArgs),
    /// Show the changes apply would make, without calling the API
    Plan(PlanArgs),
    /// Re-read the tracked space from the API
    Refresh,
    /// Print the tracked state
    Show,
    /// Delete the tracked space and stop tracking it
    Destroy,
    /// Start tracking an existing space (e.g. acme/demo)
    Import(ImportArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct ApplyArgs {
    /// Path to the space config (TOML)
    #[arg(long, default_value = "space.toml")]
    pub file: PathBuf,
}

#[derive(clap::Args)]
pub struct PlanArgs {
    /// Path to the space config (TOML)
    #[arg(long, default_value = "space.toml")]
    pub file: PathBuf,
}

#[derive(clap::Args)]
pub struct ImportArgs {
    /// Space identifier (<namespace>/<name>)
    pub id: String,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (endpoint, token, timeout_secs)
    pub key: String,
    /// Value
    pub value: String,
}

mod cli;
mod commands;
mod config;
mod observability;
mod output;
mod state;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use spacectl_core::{HttpTransport, SpaceController};

use cli::{Cli, Commands, ConfigCommands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);

    let config_path = config::config_path()?;
    let profile = config::load_profile(&config_path, &cli.profile)?;
    let format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Apply(args) => {
            let controller = make_controller(&cli, &profile)?;
            commands::space::apply(&controller, &args.file, &cli.state, format).await?;
        }
        Commands::Plan(args) => {
            commands::space::plan(&args.file, &cli.state)?;
        }
        Commands::Refresh => {
            let controller = make_controller(&cli, &profile)?;
            commands::space::refresh(&controller, &cli.state, format).await?;
        }
        Commands::Show => {
            commands::space::show(&cli.state, format)?;
        }
        Commands::Destroy => {
            let controller = make_controller(&cli, &profile)?;
            commands::space::destroy(&controller, &cli.state).await?;
        }
        Commands::Import(args) => {
            let controller = make_controller(&cli, &profile)?;
            commands::space::import(&controller, &args.id, &cli.state, format).await?;
        }
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => {
                println!("{}: {}", "Profile".cyan(), cli.profile);
                println!(
                    "{}: {}",
                    "Endpoint".cyan(),
                    profile.endpoint.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "{}: {}",
                    "Token".cyan(),
                    if profile.token.is_some() { "(set)" } else { "(not set)" }
                );
                println!(
                    "{}: {}",
                    "Timeout".cyan(),
                    profile
                        .timeout_secs
                        .map(|s| format!("{s}s"))
                        .unwrap_or_else(|| "(default)".to_string())
                );
            }
            ConfigCommands::Set(set_args) => {
                let mut updated = profile.clone();
                updated.set(&set_args.key, &set_args.value)?;
                config::save_profile(&config_path, &cli.profile, &updated)?;
                output::print_success(&format!("Set {} for profile {}", set_args.key, cli.profile));
            }
        },
    }

    Ok(())
}

fn make_controller(
    cli: &Cli,
    profile: &config::ProfileConfig,
) -> Result<SpaceController<HttpTransport>> {
    let client_config = config::resolve_client_config(&cli.endpoint, &cli.token, profile);
    tracing::debug!(
        endpoint = %client_config.base_url,
        profile = %cli.profile,
        authenticated = client_config.token.is_some(),
        "Using API endpoint"
    );
    let transport = HttpTransport::new(client_config)?;
    Ok(SpaceController::new(transport))
}

use anyhow::Result;
use clap::Parser;
use lazymemo::cli::{Cli, Commands};
use lazymemo::types::config::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = Config::load_or_default(&cli.config)?;

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("lazymemo={}", log_level)
            .parse()
            .unwrap_or_else(|_| "lazymemo=info".parse().expect("fallback directive is valid")),
    );

    if config.general.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    tracing::debug!(config = %cli.config.display(), "Configuration loaded");

    match cli.command {
        Commands::Init { path } => {
            lazymemo::cli::commands::init(path)?;
        }
        Commands::Stats => {
            lazymemo::cli::commands::stats(&config)?;
        }
        Commands::List { computation, limit } => {
            lazymemo::cli::commands::list(&config, computation.as_deref(), limit)?;
        }
        Commands::Purge { computation } => {
            lazymemo::cli::commands::purge(&config, &computation)?;
        }
        Commands::Clear => {
            lazymemo::cli::commands::clear(&config)?;
        }
        Commands::Version => {
            lazymemo::cli::commands::version();
        }
    }

    Ok(())
}

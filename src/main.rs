use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod card;
mod cli;
mod config;
mod errors;
mod metadata;
mod scrape;
#[cfg(test)]
mod tests;
mod web;

use cli::{Command, ConfigArgs};
use config::Config;

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // log:: records are bridged through tracing-log
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<Config> {
    Config::load(args.config.as_deref()).context("failed to load configuration")
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = cli::Args::parse();

    match args.command {
        Command::Daemon { config_args } => {
            let config = load_config(&config_args)?;
            web::start_daemon(config)
        }

        Command::Card { url, config_args } => {
            let config = load_config(&config_args)?;
            let envelope = card::generate_card(&config, &url);

            println!("{}", serde_json::to_string_pretty(&envelope)?);
            Ok(())
        }

        Command::Config { config_args } => {
            let config = load_config(&config_args)?;
            print!("{}", config.to_yaml()?);
            Ok(())
        }
    }
}

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to a config.yaml.
    /// Built-in defaults are used when omitted.
    #[clap(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the card page and endpoint over HTTP.
    Daemon {
        #[clap(flatten)]
        config_args: ConfigArgs,
    },
    /// Generate a single card and print it as json
    Card {
        /// A url
        #[clap(allow_hyphen_values = true)]
        url: String,

        #[clap(flatten)]
        config_args: ConfigArgs,
    },
    /// Print the effective configuration
    Config {
        #[clap(flatten)]
        config_args: ConfigArgs,
    },
}

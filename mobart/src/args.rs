use std::path::PathBuf;

use clap::Parser;

/// Mobart image generation worker
#[derive(Debug, Parser)]
#[command(name = "mobart", about = "Turns prompts from a pub/sub channel into stored images")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "mobart.toml", env = "MOBART_CONFIG")]
    pub config: PathBuf,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, default_value = "info", env = "MOBART_LOG")]
    pub log_filter: String,

    /// Validate the configuration and exit
    #[arg(long)]
    pub check: bool,
}

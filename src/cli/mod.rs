//! Command-line interface.

pub mod commands;
pub mod display;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};
use commands::{run::RunArgs, simulate::SimulateArgs};

#[derive(Parser, Debug)]
#[command(name = "hackathon-coordinator")]
#[command(about = "Event bus, task store and lifecycle coordinator for hackathons", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of `.hackathon/`
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the coordinator until interrupted
    Run(RunArgs),

    /// Walk a hackathon through its lifecycle in-process and report the result
    Simulate(SimulateArgs),
}

impl Cli {
    /// Load configuration, install logging and run the selected command.
    pub async fn execute(self) -> Result<()> {
        let config = self.load_config()?;

        let mut log_config = LogConfig::try_from(&config.logging)?;
        if let Some(level) = &self.log_level {
            log_config = log_config.with_level(level.as_str());
        }
        let _logger = LoggerImpl::init(&log_config)?;

        match self.command {
            Commands::Run(args) => commands::run::execute(args, &config, self.json).await,
            Commands::Simulate(args) => commands::simulate::execute(args, &config, self.json).await,
        }
    }

    fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(),
        }
    }
}

/// Print `err` in the selected output mode and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{body}");
    } else {
        eprintln!("{} {err:#}", console::style("Error:").red().bold());
    }
    std::process::exit(1)
}

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use serde::Deserialize;

/// Command line arguments. Anything given here wins over the environment.
#[derive(Debug, Default, Parser)]
#[command(name = "civic-budget", about = "Participatory budgeting demo in the terminal")]
pub struct Args {
    /// Directory holding the stored demo state and the log file
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Simulated API latency in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Log filter, e.g. `info` or `civic_budget=debug`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Wipe stored session, projects, votes and preferences before starting
    #[arg(long)]
    pub reset: bool,
}

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Where the store keeps one JSON file per key
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Delay applied to every mock API call
    #[serde(default = "default_api_delay_ms")]
    pub api_delay_ms: u64,
    /// tracing filter directive
    #[serde(default = "default_log")]
    pub log: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".civic-budget")
}

fn default_api_delay_ms() -> u64 {
    300
}

fn default_log() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_delay_ms: default_api_delay_ms(),
            log: default_log(),
        }
    }
}

impl Config {
    /// Load configuration from `CIVIC_*` environment variables
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::prefixed("CIVIC_").from_env::<Config>()?;

        Ok(config)
    }

    /// Apply command line overrides on top of the environment
    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(dir) = &args.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(delay) = args.delay_ms {
            self.api_delay_ms = delay;
        }
        if let Some(level) = &args.log_level {
            self.log = level.clone();
        }
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("civic-budget.log")
    }
}

/// Initialize environment variables and load configuration
pub fn init(args: &Args) -> Result<Config> {
    let config = Config::load()?.with_args(args);

    Ok(config)
}

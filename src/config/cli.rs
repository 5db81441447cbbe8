use crate::adapters::ticket_store::CorruptStorePolicy;
use crate::config::{FileConfig, Overrides};
use crate::utils::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CorruptStoreArg {
    Abort,
    Reset,
}

impl From<CorruptStoreArg> for CorruptStorePolicy {
    fn from(arg: CorruptStoreArg) -> Self {
        match arg {
            CorruptStoreArg::Abort => CorruptStorePolicy::Abort,
            CorruptStoreArg::Reset => CorruptStorePolicy::Reset,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "oath-ticket-monitor")]
#[command(about = "Check the DSNY OATH portal for new tickets and email a summary")]
pub struct CheckArgs {
    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Known-tickets file (overrides KNOWN_TICKETS_PATH)
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// What to do when the known-tickets file cannot be parsed
    #[arg(long, value_enum)]
    pub on_corrupt_store: Option<CorruptStoreArg>,

    /// Print the notification instead of sending it; nothing is persisted
    #[arg(long)]
    pub dry_run: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            state_file: self.state_file.clone(),
            on_corrupt: self.on_corrupt_store.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "send_test_email")]
#[command(about = "Send a test message to validate the SMTP settings")]
pub struct TestEmailArgs {
    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Loads the config file when one was given.
pub fn load_file_config(path: Option<&PathBuf>) -> Result<FileConfig> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            FileConfig::from_file(path)
        }
        None => Ok(FileConfig::default()),
    }
}

use clap::Parser;
use std::path::PathBuf;

/// Terminal checklists, saved after every change.
#[derive(Debug, Parser)]
#[command(name = "checklists", version)]
pub struct Config {
    /// Directory holding the saved checklists and the log file
    #[arg(long, env = "CHECKLISTS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Name of the storage slot to read and write
    #[arg(long, default_value = "db")]
    pub slot: String,

    /// Keep everything in memory; nothing is read or written on disk
    #[arg(long)]
    pub ephemeral: bool,

    /// Log level written to the log file (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("checklists")
}

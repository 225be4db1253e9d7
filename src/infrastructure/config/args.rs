use super::app_config::LogLevel;
use crate::infrastructure::gateway::Compression;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "gatewire",
    version,
    about = "Connects to a real-time gateway and prints the events it dispatches",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Gateway url.
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// User id sent with the connect request.
    #[arg(long)]
    pub user_id: Option<String>,

    /// Transport compression.
    #[arg(long, value_enum)]
    pub compress: Option<Compression>,

    /// Consecutive reconnect attempts before giving up.
    #[arg(long)]
    pub max_reconnect_attempts: Option<u32>,

    /// Event name or opcode to print. Repeatable.
    #[arg(short, long = "event", value_name = "KEY")]
    pub events: Vec<String>,

    /// Log every envelope and dispatch.
    #[arg(long)]
    pub debug: bool,
}

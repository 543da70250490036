use clap::Parser;
use std::path::PathBuf;

/// Command-line argument parser for task-exec.
#[derive(Parser, Debug)]
#[command(name = "task-exec")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a config file, overriding the XDG default.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Suppress the logger's own startup banner.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

mod args;
mod completion;
mod config;
mod dispatcher;
mod error;
mod logger;
mod manager;
mod paths;
mod reader;
mod shell;
mod supervisor;
mod task;
mod tokenizer;

use std::sync::Arc;

use args::Args;
use config::AppConfig;
use log::info;
use supervisor::Supervisor;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();

    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => paths::get_config_path().ok(),
    };
    let config = config_path
        .as_deref()
        .map(AppConfig::load)
        .unwrap_or_default();

    if !args.quiet {
        if let Err(e) = logger::init_logger(&config.logging) {
            eprintln!("task-exec: warning: failed to initialize logger: {e}");
        }
    }

    info!("starting with config: {:?}", config);

    let supervisor = Arc::new(Supervisor::new(config.limits.clone()));

    if let Err(e) = shell::run(supervisor).await {
        eprintln!("task-exec: fatal: {e}");
        std::process::exit(1);
    }
}

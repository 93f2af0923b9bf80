mod analyzer;
mod classifier;
mod config;
mod error;
mod extractor;
mod feed;
mod formatter;
mod pipeline;
mod progress;
mod reference;
mod types;

use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::progress::ProgressLog;
use crate::reference::ReferenceCatalog;
use crate::types::{ScanStatus, WorkerMsg};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

/// Spawn the fetch cycle on a worker task and consume its ordered message
/// queue. At most one cycle is in flight; the worker owns the only sender,
/// so the channel closing doubles as the completion signal.
async fn run(cfg: Config) -> Result<()> {
    let catalog = ReferenceCatalog::load(&cfg.reference_path);
    if catalog.is_empty() {
        info!("Reference catalog empty; category hints will be unlabeled.");
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<WorkerMsg>();
    let progress = ProgressLog::new(tx.clone());
    let worker_cfg = cfg.clone();

    tokio::spawn(async move {
        let msg = match pipeline::run_cycle(&worker_cfg, &catalog, &progress).await {
            Ok(result) => WorkerMsg::Finished(result),
            Err(e) => WorkerMsg::Failed(e.to_string()),
        };
        let _ = tx.send(msg);
    });

    while let Some(msg) = rx.recv().await {
        match msg {
            WorkerMsg::Progress(line) => info!("{line}"),
            WorkerMsg::Finished(result) => {
                match result.status {
                    ScanStatus::NoData => info!("Scraping finished with no results."),
                    ScanStatus::Ok => {
                        info!("--- Scraping Complete ---");
                        print!("{}", formatter::render(&result.table));
                    }
                }
                return Ok(());
            }
            WorkerMsg::Failed(message) => {
                error!("ERROR: An error occurred.\nDetails: {message}");
                return Err(AppError::Feed(message));
            }
        }
    }

    // Worker dropped its sender without a terminal message.
    Err(AppError::ChannelSend("worker exited without a result".to_string()))
}

//! The tracker driver: loads a snapshot, continuously re-polls every known
//! server on a schedule, and renders the live state in a terminal UI.

mod clipboard;
mod tui;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use eyre::Result;
use tracing::{error, info};

use mcsentinel::{
    config::{self, TrackerFileConfig},
    pipeline::{self, scheduler, worker::WorkerMode, AppState},
    protocol::PROTOCOL_VERSION_PROBE,
    snapshot,
    tracing as mctracing,
    verifier,
};

#[derive(Parser, Debug)]
#[command(name = "tracker", about = "Continuously re-poll a known set of Minecraft servers")]
struct Args {
    #[arg(short = 's', long)]
    state_file: Option<String>,

    #[arg(short = 'r', long)]
    runners: Option<usize>,

    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    #[arg(long)]
    logging_dir: Option<String>,
}

struct Resolved {
    state_file: PathBuf,
    runners: usize,
    logging_dir: Option<String>,
}

fn resolve(args: Args, file: TrackerFileConfig) -> Resolved {
    Resolved {
        state_file: args
            .state_file
            .or(file.state_file)
            .unwrap_or_else(|| "save_state.bin".to_string())
            .into(),
        runners: args.runners.or(file.runners).unwrap_or(16),
        logging_dir: args.logging_dir.or(file.logging_dir),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let file: TrackerFileConfig = config::load(args.config.as_deref())?;
    let resolved = resolve(args, file);

    let _guard = mctracing::init_tracing(resolved.logging_dir.as_deref());
    info!(state_file = %resolved.state_file.display(), "starting tracker");

    let hosts = snapshot::load_or_default(&resolved.state_file)?;
    let state = AppState::new(hosts);
    let (sender, receiver) = pipeline::bounded_channel();
    let http_client = verifier::build_http_client()?;

    let scheduler_handle = tokio::spawn({
        let state = state.clone();
        let sender = sender.clone();
        let snapshot_path = resolved.state_file.clone();
        async move { scheduler::run(state, sender, &snapshot_path).await }
    });

    let mut worker_handles = Vec::new();
    for _ in 0..resolved.runners {
        let state = state.clone();
        let receiver = receiver.clone();
        let http_client = http_client.clone();
        worker_handles.push(tokio::spawn(async move {
            pipeline::worker::run(
                WorkerMode::Tracker,
                state,
                receiver,
                http_client,
                PROTOCOL_VERSION_PROBE,
                Duration::from_secs(5),
            )
            .await;
        }));
    }

    tokio::spawn({
        let state = state.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received ctrl-c, shutting down");
                state.shut_down();
            }
        }
    });

    // tui::run exits on its own once `state.running` goes false, whether
    // that's the user pressing Q or the ctrl-c handler above; this lets it
    // always restore the terminal before we tear down the pipeline.
    let tui_result = tui::run(state.clone()).await;

    state.shut_down();
    drop(sender);
    scheduler_handle.await.ok();
    for handle in worker_handles {
        handle.await.ok();
    }

    let final_hosts = state.hosts.read();
    if let Err(err) = snapshot::save(&resolved.state_file, &final_hosts) {
        error!(%err, "failed to write final snapshot");
    }

    tui_result
}

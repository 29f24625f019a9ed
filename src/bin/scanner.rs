//! The scanner driver: expands a target/port argument set into the full
//! cross-product, optionally pre-filters with ICMP or Nmap, feeds the poll
//! pipeline, and writes a final snapshot once every target has been tried
//! (or early, on ctrl-c).

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use eyre::{eyre, Result};
use tracing::info;

use mcsentinel::{
    config::{self, ScannerFileConfig},
    nmap, ping,
    pipeline::{self, worker::WorkerMode, AppState},
    protocol::PROTOCOL_VERSION_PROBE,
    snapshot, targets, tracing as mctracing, verifier,
};

#[derive(Parser, Debug)]
#[command(name = "scanner", about = "Sweep an address range for Minecraft servers")]
struct Args {
    #[arg(short = 't', long)]
    target: Option<String>,

    #[arg(short = 'p', long = "ports")]
    ports: Vec<String>,

    #[arg(short = 'r', long)]
    runners: Option<usize>,

    #[arg(short = 'T', long)]
    timeout: Option<u64>,

    #[arg(short = 'o', long)]
    output: Option<String>,

    #[arg(long)]
    randomize_ports: bool,

    #[arg(long)]
    randomize_hosts: bool,

    #[arg(long)]
    ping_scan: bool,

    #[arg(long)]
    ping_scan_runners: Option<usize>,

    #[arg(long)]
    nmap: bool,

    #[arg(long)]
    nmap_path: Option<String>,

    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    #[arg(long)]
    logging_dir: Option<String>,
}

struct Resolved {
    target: String,
    ports: Vec<String>,
    runners: usize,
    timeout: Duration,
    output: PathBuf,
    randomize_ports: bool,
    randomize_hosts: bool,
    ping_scan: bool,
    ping_scan_runners: usize,
    nmap: bool,
    nmap_path: String,
    logging_dir: Option<String>,
}

/// Merges CLI flags over an optional config file; flags always win.
fn resolve(args: Args, file: ScannerFileConfig) -> Result<Resolved> {
    let target = args
        .target
        .or(file.target)
        .ok_or_else(|| eyre!("--target is required (or set `target` in the config file)"))?;

    let ports = if !args.ports.is_empty() {
        args.ports
    } else {
        file.ports.unwrap_or_else(|| vec!["25565".to_string()])
    };

    Ok(Resolved {
        target,
        ports,
        runners: args.runners.or(file.runners).unwrap_or(32),
        timeout: Duration::from_secs(args.timeout.or(file.timeout_secs).unwrap_or(5)),
        output: args
            .output
            .or(file.output)
            .unwrap_or_else(|| "scan_results.bin".to_string())
            .into(),
        randomize_ports: args.randomize_ports || file.randomize_ports.unwrap_or(false),
        randomize_hosts: args.randomize_hosts || file.randomize_hosts.unwrap_or(false),
        ping_scan: args.ping_scan || file.ping_scan.unwrap_or(false),
        ping_scan_runners: args.ping_scan_runners.or(file.ping_scan_runners).unwrap_or(16),
        nmap: args.nmap || file.nmap.unwrap_or(false),
        nmap_path: args.nmap_path.or(file.nmap_path).unwrap_or_else(|| "nmap".to_string()),
        logging_dir: args.logging_dir.or(file.logging_dir),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let file: ScannerFileConfig = config::load(args.config.as_deref())?;
    let resolved = resolve(args, file)?;

    let _guard = mctracing::init_tracing(resolved.logging_dir.as_deref());
    info!(target = %resolved.target, "starting scan");

    let ports = targets::parse_port_specs(&resolved.ports)?;

    let target_pairs = if resolved.nmap {
        let hits = nmap::run_nmap(&resolved.nmap_path, &resolved.target, &ports, resolved.ping_scan).await?;
        hits.into_iter().map(|t| (t.addr, t.port)).collect()
    } else {
        let mut hosts = targets::expand_hosts(&resolved.target);
        if resolved.ping_scan {
            hosts = ping::filter_alive_hosts(hosts, resolved.ping_scan_runners, Duration::from_secs(10)).await;
        }
        targets::build_target_pairs(hosts, ports, resolved.randomize_hosts, resolved.randomize_ports)
    };

    info!(count = target_pairs.len(), "enqueuing targets");

    let state = AppState::new(mcsentinel::model::HostList::new());
    let (sender, receiver) = pipeline::bounded_channel();
    let http_client = verifier::build_http_client()?;

    let mut workers = Vec::new();
    for _ in 0..resolved.runners {
        let state = state.clone();
        let receiver = receiver.clone();
        let http_client = http_client.clone();
        let timeout = resolved.timeout;
        workers.push(tokio::spawn(async move {
            pipeline::worker::run(
                WorkerMode::Scanner,
                state,
                receiver,
                http_client,
                PROTOCOL_VERSION_PROBE,
                timeout,
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

    for target in target_pairs {
        if !state.is_running() {
            break;
        }
        pipeline::enqueue_with_backpressure(&sender, target).await;
    }
    drop(sender);

    for worker in workers {
        worker.await.ok();
    }

    let hosts = state.hosts.read();
    snapshot::save(&resolved.output, &hosts)?;
    let stats = hosts.stats();
    info!(
        hosts = stats.hosts,
        servers = stats.servers,
        active_servers = stats.active_servers,
        players = stats.players,
        "scan complete"
    );

    Ok(())
}

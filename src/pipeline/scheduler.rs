//! The tracker's re-poll scheduler: walks every known server in insertion
//! order, enqueuing each once per sweep, checkpointing the snapshot to disk
//! between sweeps. The scanner has no scheduler — its driver enqueues the
//! target list once and exits once the queue drains.

use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use crate::snapshot;

use super::{enqueue_with_backpressure, AppState, Sender};

/// Sleep while the queue is empty, between sweeps.
const IDLE_INTERVAL: Duration = Duration::from_millis(2500);
/// Sleep while the queue still has work in flight.
const BUSY_INTERVAL: Duration = Duration::from_millis(500);

/// Runs the tracker scheduler loop until `state.running` goes false.
/// `snapshot_path` is checkpointed at the start of every idle sweep.
pub async fn run(state: AppState, sender: Sender, snapshot_path: &Path) {
    loop {
        if !state.is_running() {
            break;
        }

        if sender.capacity() == sender.max_capacity() {
            checkpoint(&state, snapshot_path);
            enqueue_sweep(&state, &sender).await;
            tokio::time::sleep(IDLE_INTERVAL).await;
        } else {
            tokio::time::sleep(BUSY_INTERVAL).await;
        }
    }
}

async fn enqueue_sweep(state: &AppState, sender: &Sender) {
    let targets: Vec<(String, u16)> = {
        let hosts = state.hosts.read();
        hosts
            .iter_servers()
            .map(|(address, server)| (address.to_string(), server.port))
            .collect()
    };

    info!(count = targets.len(), "enqueuing sweep");
    for target in targets {
        if !state.is_running() {
            return;
        }
        enqueue_with_backpressure(sender, target).await;
    }
}

fn checkpoint(state: &AppState, snapshot_path: &Path) {
    let hosts = state.hosts.read();
    if let Err(err) = snapshot::save(snapshot_path, &hosts) {
        warn!(%err, "failed to checkpoint snapshot");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::bounded_channel;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn enqueue_sweep_enqueues_every_known_server_once() {
        let mut hosts = crate::model::HostList::new();
        hosts.upsert_server("10.0.0.1", 25565);
        hosts.upsert_server("10.0.0.2", 25565);
        let state = AppState::new(hosts);

        let (sender, receiver) = bounded_channel();
        enqueue_sweep(&state, &sender).await;

        let mut receiver = receiver.lock().await;
        let mut seen = Vec::new();
        while let Ok(target) = receiver.try_recv() {
            seen.push(target);
        }
        assert_eq!(seen.len(), 2);
    }

    #[tokio::test]
    async fn enqueue_sweep_stops_early_when_shut_down() {
        let mut hosts = crate::model::HostList::new();
        for i in 0..10u16 {
            hosts.upsert_server("10.0.0.1", 20000 + i);
        }
        let state = AppState::new(hosts);
        state.running.store(false, Ordering::Relaxed);

        let (sender, receiver) = bounded_channel();
        enqueue_sweep(&state, &sender).await;

        let mut receiver = receiver.lock().await;
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn checkpoint_writes_a_loadable_snapshot() {
        let dir = std::env::temp_dir().join(format!(
            "mcsentinel-scheduler-test-{:?}",
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("save_state.bin");

        let mut hosts = crate::model::HostList::new();
        hosts.upsert_server("10.0.0.1", 25565).active = true;
        let state = AppState::new(hosts);

        checkpoint(&state, &path);

        let loaded = snapshot::load(&path).unwrap();
        assert_eq!(loaded.hosts().len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}

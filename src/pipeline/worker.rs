//! The worker pool. Each worker pops one target, queries it, and merges
//! the result into the model graph — or, on failure, marks the server
//! inactive (tracker) or simply drops the target (scanner).

use std::time::Duration;

use tracing::{debug, trace};

use crate::{client, verifier};

use super::{AppState, Receiver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerMode {
    /// Drops failed targets; never runs the premium verifier.
    Scanner,
    /// Marks failed targets inactive; runs the premium verifier
    /// opportunistically after a successful poll.
    Tracker,
}

const RECV_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Runs one worker's loop until `state.running` goes false and the queue
/// is drained (or the queue is closed).
pub async fn run(
    mode: WorkerMode,
    state: AppState,
    receiver: Receiver,
    http_client: reqwest::Client,
    protocol_version: i32,
    query_timeout: Duration,
) {
    loop {
        if !state.is_running() {
            break;
        }

        let next = {
            let mut receiver = receiver.lock().await;
            tokio::time::timeout(RECV_POLL_INTERVAL, receiver.recv()).await
        };

        let (host, port) = match next {
            Ok(Some(target)) => target,
            Ok(None) => break,
            Err(_) => continue,
        };

        poll_one(mode, &state, &http_client, &host, port, protocol_version, query_timeout).await;
    }
}

async fn poll_one(
    mode: WorkerMode,
    state: &AppState,
    http_client: &reqwest::Client,
    host: &str,
    port: u16,
    protocol_version: i32,
    query_timeout: Duration,
) {
    match client::query(host, port, protocol_version, query_timeout).await {
        Ok(status) => {
            trace!(%host, port, "poll succeeded");
            {
                let mut hosts = state.hosts.write();
                let server = hosts.upsert_server(host, port);
                server.parse_status(&status);
            }

            if mode == WorkerMode::Tracker {
                verify_due_players(state, http_client, host, port).await;
            }
        }
        Err(err) => {
            debug!(%host, port, %err, "poll failed");
            if mode == WorkerMode::Tracker {
                let mut hosts = state.hosts.write();
                let server = hosts.upsert_server(host, port);
                server.mark_inactive();
            }
            // the scanner simply drops unreachable targets
        }
    }
}

/// Verifies every player on `(host, port)` whose verification cache is
/// stale. Candidates are collected under the lock, then each HTTP probe
/// runs with the lock released (the guard is never held across an await),
/// and the result is written back by re-resolving the same server.
async fn verify_due_players(state: &AppState, http_client: &reqwest::Client, host: &str, port: u16) {
    let candidates: Vec<(String, String)> = {
        let mut hosts = state.hosts.write();
        let server = hosts.upsert_server(host, port);
        server
            .players
            .iter()
            .filter(|p| p.needs_verification(verifier::PREMIUM_VERIFY_TTL_SECS))
            .map(|p| (p.uuid.clone(), p.name.clone()))
            .collect()
    };

    for (uuid, name) in candidates {
        if let Some(result) = verifier::verify(http_client, &uuid, &name).await {
            let mut hosts = state.hosts.write();
            let server = hosts.upsert_server(host, port);
            if let Some(player) = server
                .players
                .iter_mut()
                .find(|p| p.uuid == uuid || p.name == name)
            {
                verifier::apply_verification(player, result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::bounded_channel;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    async fn spawn_stub(response_json: &'static str) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let len = crate::codec::read_varint(&mut socket).await.unwrap();
                let mut buf = vec![0u8; len as usize];
                socket.read_exact(&mut buf).await.unwrap();
                let len = crate::codec::read_varint(&mut socket).await.unwrap();
                let mut buf = vec![0u8; len as usize];
                socket.read_exact(&mut buf).await.unwrap();

                let mut payload = vec![0x00];
                crate::codec::encode_string(response_json, &mut payload);
                socket.write_all(&crate::codec::frame(&payload)).await.unwrap();
                socket.flush().await.unwrap();
            }
        });
        addr
    }

    #[tokio::test]
    async fn successful_scan_merges_into_hostlist() {
        let json = r#"{"version":{"name":"1.20.1","protocol":763},"players":{"online":1,"max":20,"sample":[{"name":"Alice","id":"uuid-a"}]}}"#;
        let addr = spawn_stub(json).await;

        let state = AppState::new(crate::model::HostList::new());
        let http_client = verifier::build_http_client().unwrap();

        poll_one(
            WorkerMode::Scanner,
            &state,
            &http_client,
            &addr.ip().to_string(),
            addr.port(),
            crate::protocol::PROTOCOL_VERSION_PROBE,
            Duration::from_secs(5),
        )
        .await;

        let hosts = state.hosts.read();
        let (_, server) = hosts.iter_servers().next().unwrap();
        assert!(server.active);
        assert_eq!(server.active_players, 1);
    }

    #[tokio::test]
    async fn failed_poll_marks_tracker_server_inactive_but_keeps_players() {
        let state = AppState::new(crate::model::HostList::new());
        {
            let mut hosts = state.hosts.write();
            let server = hosts.upsert_server("127.0.0.1", 1);
            server.get_or_add_player("Alice", "uuid-a").update_last_seen();
            server.active = true;
        }
        let http_client = verifier::build_http_client().unwrap();

        // nothing listens on port 1, so this query fails
        poll_one(
            WorkerMode::Tracker,
            &state,
            &http_client,
            "127.0.0.1",
            1,
            crate::protocol::PROTOCOL_VERSION_PROBE,
            Duration::from_millis(200),
        )
        .await;

        let hosts = state.hosts.read();
        let (_, server) = hosts.iter_servers().next().unwrap();
        assert!(!server.active);
        assert_eq!(server.active_players, 0);
        assert_eq!(server.players.len(), 1);
    }

    #[tokio::test]
    async fn worker_drains_queue_and_stops_when_closed() {
        let json = r#"{"players":{"online":0,"max":0}}"#;
        let addr = spawn_stub(json).await;

        let state = AppState::new(crate::model::HostList::new());
        let (sender, receiver) = bounded_channel();
        sender
            .send((addr.ip().to_string(), addr.port()))
            .await
            .unwrap();
        drop(sender);

        run(
            WorkerMode::Scanner,
            state.clone(),
            receiver,
            verifier::build_http_client().unwrap(),
            crate::protocol::PROTOCOL_VERSION_PROBE,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(state.hosts.read().stats().servers, 1);
    }
}

//! ICMP pre-filtering, delegated to the platform's own `ping` binary rather
//! than raw socket code — ICMP pre-scanning is a contract-only collaborator
//! per the external interfaces.

use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio::process::Command;
use tracing::debug;

/// Pings every host concurrently (bounded by `runners`) and returns the
/// subset that replied within `timeout`.
pub async fn filter_alive_hosts(hosts: Vec<String>, runners: usize, timeout: Duration) -> Vec<String> {
    stream::iter(hosts)
        .map(|host| async move {
            if ping_once(&host, timeout).await {
                Some(host)
            } else {
                None
            }
        })
        .buffer_unordered(runners.max(1))
        .filter_map(|result| async move { result })
        .collect()
        .await
}

async fn ping_once(host: &str, timeout: Duration) -> bool {
    let timeout_secs = timeout.as_secs().max(1).to_string();

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("ping");
        c.args(["-n", "1", "-w", &(timeout.as_millis().to_string())]);
        c
    };

    #[cfg(not(target_os = "windows"))]
    let mut command = {
        let mut c = Command::new("ping");
        c.args(["-c", "1", "-W", &timeout_secs]);
        c
    };

    command.arg(host);
    command.stdout(std::process::Stdio::null());
    command.stderr(std::process::Stdio::null());

    match command.status().await {
        Ok(status) => status.success(),
        Err(err) => {
            debug!(%host, %err, "failed to invoke ping helper");
            false
        }
    }
}

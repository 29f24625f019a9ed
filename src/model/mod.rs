//! The Host → Server → {Player, Mod, Favicon} graph and its merge-on-update
//! semantics. HostList owns Hosts; Host owns its Servers; Server owns its
//! Players, Mods and Favicon. Back-references only ever point downward in
//! storage — upward context (which Host a Server belongs to) is resolved on
//! demand through the iterator, never stored, so serialization can walk the
//! tree top-down without cycles.

pub mod clock;
pub mod favicon;
pub mod host;
pub mod mods;
pub mod player;
pub mod server;
pub mod tristate;

pub use favicon::Favicon;
pub use host::Host;
pub use mods::Mod;
pub use player::Player;
pub use server::Server;
pub use tristate::Tristate;

use serde::{Deserialize, Serialize};

/// Summary counts used by the CLI's completion banner and the TUI's status
/// bar — the same numbers the source prints inline, exposed here as data
/// instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub hosts: usize,
    pub servers: usize,
    pub active_servers: usize,
    pub players: usize,
}

/// The root of the monitored-server graph. Address lookup is a linear scan
/// by design: host counts are bounded by scan range (thousands, not
/// millions), and a scan is the unit of work anyway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostList {
    hosts: Vec<Host>,
}

impl HostList {
    pub fn new() -> Self {
        HostList { hosts: Vec::new() }
    }

    pub fn get_or_add_host(&mut self, address: &str) -> &mut Host {
        let index = self.hosts.iter().position(|h| h.address == address);
        let index = match index {
            Some(i) => i,
            None => {
                self.hosts.push(Host::new(address.to_string()));
                self.hosts.len() - 1
            }
        };
        &mut self.hosts[index]
    }

    /// Upserts the Server at `(address, port)`, creating the Host and/or
    /// Server if necessary. Calling this twice with the same arguments
    /// yields the same underlying Server (stable identity within a single
    /// borrow scope).
    pub fn upsert_server(&mut self, address: &str, port: u16) -> &mut Server {
        self.get_or_add_host(address).get_or_add_server(port)
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn hosts_mut(&mut self) -> &mut [Host] {
        &mut self.hosts
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Iterates every `(host address, &Server)` pair in insertion order.
    pub fn iter_servers(&self) -> impl Iterator<Item = (&str, &Server)> {
        self.hosts
            .iter()
            .flat_map(|host| host.servers.iter().map(move |server| (host.address.as_str(), server)))
    }

    /// Iterates every `(host address, &mut Server)` pair in insertion order.
    pub fn iter_servers_mut(&mut self) -> impl Iterator<Item = (&str, &mut Server)> {
        self.hosts.iter_mut().flat_map(|host| {
            let address = host.address.as_str();
            host.servers.iter_mut().map(move |server| (address, server))
        })
    }

    pub fn stats(&self) -> Stats {
        let mut stats = Stats::default();
        for host in &self.hosts {
            stats.hosts += 1;
            for server in &host.servers {
                stats.servers += 1;
                if server.active {
                    stats.active_servers += 1;
                }
                stats.players += server.players.len();
            }
        }
        stats
    }
}

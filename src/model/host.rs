//! A remote address owning a sequence of monitored Servers.

use serde::{Deserialize, Serialize};

use super::server::Server;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub address: String,
    pub servers: Vec<Server>,
}

impl Host {
    pub fn new(address: String) -> Self {
        Host {
            address,
            servers: Vec::new(),
        }
    }

    /// Finds the Server with the given `port`, creating one if it doesn't
    /// already exist. Port uniqueness within a Host is the caller's
    /// invariant to preserve; this is the only place that constructs one.
    pub fn get_or_add_server(&mut self, port: u16) -> &mut Server {
        let index = self.servers.iter().position(|s| s.port == port);
        let index = match index {
            Some(i) => i,
            None => {
                self.servers.push(Server::new(port));
                self.servers.len() - 1
            }
        };
        &mut self.servers[index]
    }
}

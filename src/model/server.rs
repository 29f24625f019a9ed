//! The monitored endpoint. `parse_status` is the central mutation: it is
//! idempotent given the same input and preserves historical fields rather
//! than replacing the record wholesale.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::protocol::StatusResponse;

use super::{
    favicon::Favicon,
    mods::{mods_from_status, Mod},
    player::{canonicalize_uuid, Player},
    tristate::Tristate,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub port: u16,
    pub active: bool,
    pub protocol_version: Option<i32>,
    pub server_version: Option<String>,
    pub secure_chat: Tristate,
    pub active_players: u32,
    pub max_players: u32,
    pub players: Vec<Player>,
    pub mods: Vec<Mod>,
    pub favicon: Option<Favicon>,
    pub tags: HashSet<String>,
}

impl Server {
    pub fn new(port: u16) -> Self {
        Server {
            port,
            active: false,
            protocol_version: None,
            server_version: None,
            secure_chat: Tristate::Unknown,
            active_players: 0,
            max_players: 0,
            players: Vec::new(),
            mods: Vec::new(),
            favicon: None,
            tags: HashSet::new(),
        }
    }

    /// Finds an existing player by name OR uuid, creating one if neither
    /// matches. Two players sharing a name momentarily can stitch into the
    /// same record; this is accepted behavior, not a bug.
    pub fn get_or_add_player(&mut self, name: &str, uuid: &str) -> &mut Player {
        let uuid = canonicalize_uuid(uuid);
        let index = self
            .players
            .iter()
            .position(|p| p.name == name || p.uuid == uuid);

        let index = match index {
            Some(i) => i,
            None => {
                self.players.push(Player::new(name.to_string(), uuid));
                self.players.len() - 1
            }
        };

        &mut self.players[index]
    }

    /// Merges a freshly-received status response into this record.
    pub fn parse_status(&mut self, status: &StatusResponse) {
        self.active = true;

        if let Some(version) = &status.version {
            self.protocol_version = Some(version.protocol);
            if !version.name.is_empty() {
                self.server_version = Some(version.name.clone());
            }
        }

        if let Some(players) = &status.players {
            self.max_players = players.max;
            self.active_players = if players.max > 0 {
                players.online.min(players.max)
            } else {
                players.online
            };

            match &players.sample {
                Some(sample) => {
                    for entry in sample {
                        let uuid = canonicalize_uuid(&entry.id);
                        let player = self.get_or_add_player(&entry.name, &entry.id);
                        player.name = entry.name.clone();
                        player.uuid = uuid;
                        player.update_last_seen();
                    }
                }
                None => {
                    for player in &mut self.players {
                        player.mark_inactive();
                    }
                }
            }
        }

        self.mods = mods_from_status(status);

        if let Some(data_uri) = &status.favicon {
            match Favicon::parse(data_uri) {
                Ok(favicon) => self.favicon = Some(favicon),
                Err(err) => warn!(port = self.port, %err, "leaving previous favicon intact"),
            }
        }

        if let Some(enforces) = status.enforces_secure_chat {
            self.secure_chat = Tristate::from_bool(enforces);
        }
    }

    /// Called on query failure: staleness in every other field is
    /// preserved deliberately.
    pub fn mark_inactive(&mut self) {
        self.active = false;
        self.active_players = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_with_sample(names: &[(&str, &str)]) -> StatusResponse {
        let sample_json = names
            .iter()
            .map(|(name, id)| format!(r#"{{"name":"{name}","id":"{id}"}}"#))
            .collect::<Vec<_>>()
            .join(",");
        let json = format!(
            r#"{{"version":{{"name":"1.20.1","protocol":763}},"players":{{"online":{},"max":20,"sample":[{}]}}}}"#,
            names.len(),
            sample_json
        );
        serde_json::from_str(&json).unwrap()
    }

    fn status_without_sample() -> StatusResponse {
        serde_json::from_str(
            r#"{"version":{"name":"1.20.1","protocol":763},"players":{"online":0,"max":20}}"#,
        )
        .unwrap()
    }

    #[test]
    fn scenario_successful_query_of_stub_server() {
        let mut server = Server::new(25565);
        let status = status_with_sample(&[("Alice", "11111111-1111-1111-1111-111111111111")]);
        server.parse_status(&status);

        assert!(server.active);
        assert_eq!(server.server_version.as_deref(), Some("1.20.1"));
        assert_eq!(server.protocol_version, Some(763));
        assert_eq!(server.active_players, 1);
        assert_eq!(server.max_players, 20);
        assert_eq!(server.players.len(), 1);
        assert!(server.players[0].active);
        assert!(server.players[0].last_seen > 0);
    }

    #[test]
    fn scenario_player_disappears_but_is_retained() {
        let mut server = Server::new(25565);
        server.parse_status(&status_with_sample(&[(
            "Alice",
            "11111111-1111-1111-1111-111111111111",
        )]));
        server.players[0].last_seen -= 5;

        server.parse_status(&status_without_sample());

        assert_eq!(server.players.len(), 1);
        assert!(!server.players[0].active);
        assert!(server.players[0].play_time > 0.0);
    }

    #[test]
    fn mark_inactive_preserves_players_and_version() {
        let mut server = Server::new(25565);
        server.parse_status(&status_with_sample(&[(
            "Alice",
            "11111111-1111-1111-1111-111111111111",
        )]));

        server.mark_inactive();

        assert!(!server.active);
        assert_eq!(server.active_players, 0);
        assert_eq!(server.players.len(), 1);
        assert_eq!(server.server_version.as_deref(), Some("1.20.1"));
    }

    #[test]
    fn active_players_is_clamped_to_max_players() {
        let mut server = Server::new(25565);
        let status: StatusResponse = serde_json::from_str(
            r#"{"version":{"name":"1.20.1","protocol":763},"players":{"online":99,"max":20}}"#,
        )
        .unwrap();
        server.parse_status(&status);

        assert_eq!(server.max_players, 20);
        assert!(server.active_players <= server.max_players);
        assert_eq!(server.active_players, 20);
    }

    #[test]
    fn mods_are_wholesale_replaced() {
        let mut server = Server::new(25565);
        let first: StatusResponse = serde_json::from_str(
            r#"{"players":{"online":0,"max":0},"forgeData":{"mods":[{"modId":"jei","modmarker":"1"}]}}"#,
        )
        .unwrap();
        server.parse_status(&first);
        assert_eq!(server.mods.len(), 1);

        let second: StatusResponse = serde_json::from_str(
            r#"{"players":{"online":0,"max":0},"forgeData":{"mods":[{"modId":"a","modmarker":"1"},{"modId":"b","modmarker":"2"}]}}"#,
        )
        .unwrap();
        server.parse_status(&second);
        assert_eq!(server.mods.len(), 2);
        assert_eq!(server.mods[0].id, "a");
    }

    #[test]
    fn get_or_add_player_matches_on_name_or_uuid() {
        let mut server = Server::new(25565);
        server.get_or_add_player("Alice", "uuid-a");
        server.get_or_add_player("Alice", "uuid-different");
        assert_eq!(server.players.len(), 1, "matched on name");

        server.get_or_add_player("Bob", "uuid-a");
        assert_eq!(server.players.len(), 1, "matched on uuid even with new name");
    }
}

//! Durable checkpointing of the HostList graph. Writes are atomic (temp
//! file + rename within the same directory) and single-writer: only the
//! scheduler or a shutdown handler ever calls `save`, never a worker.

use std::path::Path;

use base64::Engine;
use eyre::{Context, Result};
use serde::Serialize;

use crate::model::HostList;

/// Loads a HostList from a bincode snapshot file. Missing files are not an
/// error here — callers (drivers) decide whether "start from empty" is
/// acceptable.
pub fn load(path: &Path) -> Result<HostList> {
    let bytes = std::fs::read(path)
        .wrap_err_with(|| format!("reading snapshot file {}", path.display()))?;
    bincode::deserialize(&bytes)
        .wrap_err_with(|| format!("decoding snapshot file {}", path.display()))
}

pub fn load_or_default(path: &Path) -> Result<HostList> {
    if path.exists() {
        load(path)
    } else {
        Ok(HostList::new())
    }
}

/// Writes `hosts` to `path` atomically: serialize to a temp file in the
/// same directory, then rename over the target.
pub fn save(path: &Path, hosts: &HostList) -> Result<()> {
    let bytes = bincode::serialize(hosts).wrap_err("encoding snapshot")?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let temp_path = match dir {
        Some(dir) => dir.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        )),
        None => std::path::PathBuf::from(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        )),
    };

    std::fs::write(&temp_path, &bytes)
        .wrap_err_with(|| format!("writing temp snapshot {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .wrap_err_with(|| format!("renaming temp snapshot into place at {}", path.display()))?;
    Ok(())
}

/// The human-readable JSON export schema described in the external
/// interfaces: `{hosts: [{address, servers: [...]}]}`.
#[derive(Serialize)]
pub struct JsonHostList {
    pub hosts: Vec<JsonHost>,
}

#[derive(Serialize)]
pub struct JsonHost {
    pub address: String,
    pub servers: Vec<JsonServer>,
}

#[derive(Serialize)]
pub struct JsonServer {
    pub port: u16,
    pub server_version: Option<String>,
    pub protocol_version: Option<i32>,
    pub secure_chat: crate::model::Tristate,
    pub active: bool,
    pub active_players: u32,
    pub max_players: u32,
    pub tags: Vec<String>,
    pub favicon: Option<JsonFavicon>,
    pub players: Vec<JsonPlayer>,
    pub mods: Vec<crate::model::Mod>,
}

#[derive(Serialize)]
pub struct JsonFavicon {
    pub mimetype: String,
    pub size: usize,
    pub crc32: u32,
    pub data_base64: String,
}

#[derive(Serialize)]
pub struct JsonPlayer {
    pub name: String,
    pub uuid: String,
    pub active: bool,
    pub last_seen: i64,
    pub play_time: f64,
    pub last_verified: i64,
    pub premium_name: crate::model::Tristate,
    pub premium_uuid: crate::model::Tristate,
}

pub fn to_json_export(hosts: &HostList) -> JsonHostList {
    JsonHostList {
        hosts: hosts
            .hosts()
            .iter()
            .map(|host| JsonHost {
                address: host.address.clone(),
                servers: host
                    .servers
                    .iter()
                    .map(|server| JsonServer {
                        port: server.port,
                        server_version: server.server_version.clone(),
                        protocol_version: server.protocol_version,
                        secure_chat: server.secure_chat,
                        active: server.active,
                        active_players: server.active_players,
                        max_players: server.max_players,
                        tags: server.tags.iter().cloned().collect(),
                        favicon: server.favicon.as_ref().map(|f| JsonFavicon {
                            mimetype: f.mimetype.clone(),
                            size: f.size,
                            crc32: f.crc32,
                            data_base64: base64::engine::general_purpose::STANDARD.encode(&f.raw_bytes),
                        }),
                        players: server
                            .players
                            .iter()
                            .map(|p| JsonPlayer {
                                name: p.name.clone(),
                                uuid: p.uuid.clone(),
                                active: p.active,
                                last_seen: p.last_seen,
                                play_time: p.play_time,
                                last_verified: p.last_verified,
                                premium_name: p.premium_name,
                                premium_uuid: p.premium_uuid,
                            })
                            .collect(),
                        mods: server.mods.clone(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips_via_rename() {
        let dir = std::env::temp_dir().join(format!("mcsentinel-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("save_state.bin");

        let mut hosts = HostList::new();
        hosts.upsert_server("10.0.0.1", 25565).server_version = Some("1.20.1".into());

        save(&path, &hosts).unwrap();
        assert!(path.exists());

        let loaded = load(&path).unwrap();
        assert_eq!(
            loaded.hosts()[0].servers[0].server_version.as_deref(),
            Some("1.20.1")
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_or_default_is_empty_for_missing_file() {
        let path = std::env::temp_dir().join("mcsentinel-definitely-missing.bin");
        let hosts = load_or_default(&path).unwrap();
        assert!(hosts.is_empty());
    }
}

//! Packet-level encoders/decoders for the three SLP packets this system
//! speaks: Handshake, StatusRequest and StatusResponse.

use serde::{Deserialize, Serialize};

use crate::codec::{encode_string, encode_ushort, encode_varint};

pub const NEXT_STATE_STATUS: i32 = 1;
pub const NEXT_STATE_LOGIN: i32 = 2;

/// The "any-version" protocol value third-party pingers use; a compliant
/// server echoes its own protocol number in the response regardless.
pub const PROTOCOL_VERSION_PROBE: i32 = 47;

/// Builds the body (packet id + fields, no outer length prefix) of the
/// Handshake packet.
pub fn encode_handshake(protocol_version: i32, address: &str, port: u16, next_state: i32) -> Vec<u8> {
    let mut body = vec![0x00];
    encode_varint(protocol_version, &mut body);
    encode_string(address, &mut body);
    encode_ushort(port, &mut body);
    encode_varint(next_state, &mut body);
    body
}

/// Builds the body of the (empty) StatusRequest packet.
pub fn encode_status_request() -> Vec<u8> {
    vec![0x00]
}

/// The decoded JSON body of a StatusResponse packet. Unknown keys are
/// ignored by serde's default struct handling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub version: Option<VersionInfo>,
    #[serde(default)]
    pub players: Option<PlayersInfo>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(rename = "enforcesSecureChat", default)]
    pub enforces_secure_chat: Option<bool>,
    #[serde(rename = "forgeData", default)]
    pub forge_data: Option<ForgeData>,
    #[serde(default)]
    pub modinfo: Option<ModInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayersInfo {
    pub online: u32,
    pub max: u32,
    #[serde(default)]
    pub sample: Option<Vec<PlayerSample>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSample {
    pub name: String,
    pub id: String,
}

/// Forge's modern mod-list convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeData {
    #[serde(default)]
    pub mods: Vec<ForgeMod>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeMod {
    #[serde(rename = "modId")]
    pub mod_id: String,
    #[serde(rename = "modmarker")]
    pub version: String,
}

/// Legacy FML mod-list convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModInfo {
    #[serde(rename = "modList", default)]
    pub mod_list: Vec<LegacyMod>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyMod {
    pub modid: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_vanilla_status() {
        let json = r#"{"version":{"name":"1.20.1","protocol":763},"players":{"online":2,"max":20,"sample":[{"name":"Alice","id":"11111111-1111-1111-1111-111111111111"}]}}"#;
        let status: StatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(status.version.unwrap().protocol, 763);
        let players = status.players.unwrap();
        assert_eq!(players.online, 2);
        assert_eq!(players.sample.unwrap()[0].name, "Alice");
    }

    #[test]
    fn ignores_unknown_keys() {
        let json = r#"{"version":{"name":"1.20.1","protocol":763},"players":{"online":0,"max":20},"somethingWeird":{"nested":true}}"#;
        let status: StatusResponse = serde_json::from_str(json).unwrap();
        assert!(status.players.is_some());
    }

    #[test]
    fn parses_forge_mods() {
        let json = r#"{"players":{"online":0,"max":0},"forgeData":{"mods":[{"modId":"jei","modmarker":"11.6.0"}]}}"#;
        let status: StatusResponse = serde_json::from_str(json).unwrap();
        let forge = status.forge_data.unwrap();
        assert_eq!(forge.mods[0].mod_id, "jei");
    }
}

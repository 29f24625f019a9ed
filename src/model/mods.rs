//! Normalizes the two mod-list conventions servers advertise (Forge's
//! `forgeData.mods` and legacy FML's `modinfo.modList`) into one shape.

use serde::{Deserialize, Serialize};

use crate::protocol::StatusResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mod {
    pub id: String,
    pub version: String,
}

/// Extracts the mod list from a status response, preferring modern Forge
/// data over legacy FML data if both are somehow present.
pub fn mods_from_status(status: &StatusResponse) -> Vec<Mod> {
    if let Some(forge) = &status.forge_data {
        return forge
            .mods
            .iter()
            .map(|m| Mod {
                id: m.mod_id.clone(),
                version: m.version.clone(),
            })
            .collect();
    }

    if let Some(modinfo) = &status.modinfo {
        return modinfo
            .mod_list
            .iter()
            .map(|m| Mod {
                id: m.modid.clone(),
                version: m.version.clone(),
            })
            .collect();
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_forge_over_legacy_fml() {
        let json = r#"{
            "players": {"online": 0, "max": 0},
            "forgeData": {"mods": [{"modId": "jei", "modmarker": "11.6.0"}]},
            "modinfo": {"modList": [{"modid": "old", "version": "1.0"}]}
        }"#;
        let status: StatusResponse = serde_json::from_str(json).unwrap();
        let mods = mods_from_status(&status);
        assert_eq!(mods, vec![Mod { id: "jei".into(), version: "11.6.0".into() }]);
    }

    #[test]
    fn normalizes_legacy_fml() {
        let json = r#"{
            "players": {"online": 0, "max": 0},
            "modinfo": {"modList": [{"modid": "old", "version": "1.0"}]}
        }"#;
        let status: StatusResponse = serde_json::from_str(json).unwrap();
        let mods = mods_from_status(&status);
        assert_eq!(mods, vec![Mod { id: "old".into(), version: "1.0".into() }]);
    }
}

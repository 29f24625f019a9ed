//! TOML configuration shared by both drivers, following the same
//! `#[serde(deny_unknown_fields)]` style the upstream config layer uses.
//! CLI flags always take precedence over values loaded here; see each
//! binary's `resolve` function.

use std::path::Path;

use eyre::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScannerFileConfig {
    pub target: Option<String>,
    pub ports: Option<Vec<String>>,
    pub runners: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub output: Option<String>,
    pub randomize_ports: Option<bool>,
    pub randomize_hosts: Option<bool>,
    pub ping_scan: Option<bool>,
    pub ping_scan_runners: Option<usize>,
    pub nmap: Option<bool>,
    pub nmap_path: Option<String>,
    pub logging_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerFileConfig {
    pub state_file: Option<String>,
    pub runners: Option<usize>,
    pub logging_dir: Option<String>,
}

pub fn load<T>(path: Option<&Path>) -> Result<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    let Some(path) = path else {
        return Ok(T::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&text).wrap_err_with(|| format!("parsing config file {}", path.display()))
}

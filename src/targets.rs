//! Expands the scanner's `--target`/`--ports` arguments into the
//! cross-product of `(host, port)` pairs fed to the poll pipeline.

use std::collections::BTreeSet;

use ipnetwork::IpNetwork;
use rand::seq::SliceRandom;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("'{0}' is not a valid port range expression")]
    InvalidPortExpr(String),
    #[error("port 0 is not a valid target port")]
    PortZero,
}

/// Parses specs like `["25565", "30000-30010"]` into a deduplicated,
/// ascending set of ports.
pub fn parse_port_specs(specs: &[String]) -> Result<Vec<u16>, TargetError> {
    let mut ports = BTreeSet::new();

    for spec in specs {
        if let Some((lower, upper)) = spec.split_once('-') {
            let lower: u32 = lower
                .parse()
                .map_err(|_| TargetError::InvalidPortExpr(spec.clone()))?;
            let upper: u32 = upper
                .parse()
                .map_err(|_| TargetError::InvalidPortExpr(spec.clone()))?;
            if lower > upper || upper > u16::MAX as u32 {
                return Err(TargetError::InvalidPortExpr(spec.clone()));
            }
            for port in lower..=upper {
                ports.insert(port as u16);
            }
        } else {
            let port: u32 = spec
                .parse()
                .map_err(|_| TargetError::InvalidPortExpr(spec.clone()))?;
            if port > u16::MAX as u32 {
                return Err(TargetError::InvalidPortExpr(spec.clone()));
            }
            ports.insert(port as u16);
        }
    }

    if ports.contains(&0) {
        return Err(TargetError::PortZero);
    }

    Ok(ports.into_iter().collect())
}

/// Expands `--target` into concrete host strings. CIDR ranges and bare IPs
/// expand to every address they contain; anything else (a DNS name) is
/// preserved verbatim as a single host, matching the model's invariant
/// that unresolved names pass through untouched.
pub fn expand_hosts(target: &str) -> Vec<String> {
    match target.parse::<IpNetwork>() {
        Ok(network) => network.iter().map(|ip| ip.to_string()).collect(),
        Err(_) => vec![target.to_string()],
    }
}

/// Builds the full cross-product of hosts × ports, optionally randomizing
/// each dimension independently before the product (matching the source's
/// `--randomize-hosts`/`--randomize-ports` flags).
pub fn build_target_pairs(
    mut hosts: Vec<String>,
    mut ports: Vec<u16>,
    randomize_hosts: bool,
    randomize_ports: bool,
) -> Vec<(String, u16)> {
    let mut rng = rand::thread_rng();
    if randomize_hosts {
        hosts.shuffle(&mut rng);
    }
    if randomize_ports {
        ports.shuffle(&mut rng);
    }

    let mut pairs = Vec::with_capacity(hosts.len() * ports.len());
    for host in &hosts {
        for &port in &ports {
            pairs.push((host.clone(), port));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_port_and_range() {
        let ports = parse_port_specs(&["25565".to_string(), "30000-30002".to_string()]).unwrap();
        assert_eq!(ports, vec![25565, 30000, 30001, 30002]);
    }

    #[test]
    fn rejects_invalid_expression() {
        assert!(parse_port_specs(&["abc".to_string()]).is_err());
    }

    #[test]
    fn rejects_port_zero() {
        assert!(parse_port_specs(&["0".to_string()]).is_err());
    }

    #[test]
    fn cidr_slash_30_expands_to_four_hosts() {
        let hosts = expand_hosts("10.0.0.0/30");
        assert_eq!(hosts.len(), 4);
    }

    #[test]
    fn dns_name_passes_through_verbatim() {
        let hosts = expand_hosts("mc.example.org");
        assert_eq!(hosts, vec!["mc.example.org".to_string()]);
    }

    #[test]
    fn scenario_cidr_expansion_cross_product() {
        let hosts = expand_hosts("10.0.0.0/30");
        let ports = parse_port_specs(&["25565-25566".to_string()]).unwrap();
        let pairs = build_target_pairs(hosts, ports, false, false);
        assert_eq!(pairs.len(), 8);
    }
}

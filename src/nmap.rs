//! Optional Nmap-backed port discovery. We shell out to the real `nmap`
//! binary and parse only the XML fields this system needs
//! (`<host><address addr>` and `<ports><port portid>`); everything else
//! Nmap reports is ignored.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NmapTarget {
    pub addr: String,
    pub port: u16,
}

#[derive(Debug, Error)]
pub enum NmapError {
    #[error("nmap exited with status {0}")]
    NonZeroExit(i32),
    #[error("failed to invoke nmap: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("failed to parse nmap xml output: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// Invokes `nmap -sS -oX - -p <ports> <target>` and parses its XML report
/// into `(addr, port)` pairs.
pub async fn run_nmap(
    nmap_path: &str,
    target: &str,
    ports: &[u16],
    ping_scan: bool,
) -> Result<Vec<NmapTarget>, NmapError> {
    let port_list = ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",");

    let mut command = tokio::process::Command::new(nmap_path);
    command.args(["-sS", "-oX", "-", "-p", &port_list, target]);
    if !ping_scan {
        command.arg("-Pn");
    }

    let output = command.output().await?;
    if !output.status.success() {
        return Err(NmapError::NonZeroExit(output.status.code().unwrap_or(-1)));
    }

    let xml = String::from_utf8_lossy(&output.stdout);
    parse_nmap_xml(&xml)
}

pub fn parse_nmap_xml(xml: &str) -> Result<Vec<NmapTarget>, NmapError> {
    let doc = roxmltree::Document::parse(xml)?;
    let mut targets = Vec::new();

    for host in doc.descendants().filter(|n| n.has_tag_name("host")) {
        let Some(address) = host
            .children()
            .find(|n| n.has_tag_name("address"))
            .and_then(|n| n.attribute("addr"))
        else {
            continue;
        };

        let Some(ports_elem) = host.children().find(|n| n.has_tag_name("ports")) else {
            continue;
        };

        for port in ports_elem.children().filter(|n| n.has_tag_name("port")) {
            if let Some(portid) = port.attribute("portid").and_then(|p| p.parse::<u16>().ok()) {
                targets.push(NmapTarget {
                    addr: address.to_string(),
                    port: portid,
                });
            }
        }
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port_elements() {
        let xml = r#"<?xml version="1.0"?>
<nmaprun>
  <host>
    <address addr="10.0.0.5" addrtype="ipv4"/>
    <ports>
      <port protocol="tcp" portid="25565"><state state="open"/></port>
      <port protocol="tcp" portid="25575"><state state="closed"/></port>
    </ports>
  </host>
  <host>
    <address addr="10.0.0.6" addrtype="ipv4"/>
    <ports>
      <port protocol="tcp" portid="25565"><state state="open"/></port>
    </ports>
  </host>
</nmaprun>"#;

        let targets = parse_nmap_xml(xml).unwrap();
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0], NmapTarget { addr: "10.0.0.5".into(), port: 25565 });
    }

    #[test]
    fn host_without_ports_element_is_skipped() {
        let xml = r#"<nmaprun><host><address addr="10.0.0.5" addrtype="ipv4"/></host></nmaprun>"#;
        let targets = parse_nmap_xml(xml).unwrap();
        assert!(targets.is_empty());
    }
}

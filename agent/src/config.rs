use clap::Parser;
use map1905_wire::mac::MacAddress;

use crate::error::ConfigError;

/// CLI surface for the `map1905d` agent, exactly the options the core
/// recognizes: none of these affect semantics beyond what is documented
/// here.
#[derive(Debug, Parser)]
#[command(name = "map1905d", version, about = "IEEE 1905.1a Abstraction Layer agent")]
pub struct Cli {
    /// This device's AL-MAC address (e.g. 02:ee:ff:33:44:00).
    #[arg(long = "al-mac")]
    pub al_mac: String,

    /// Name of the local interface to treat as the registrar interface.
    #[arg(long = "registrar-interface")]
    pub registrar_interface: Option<String>,

    /// Proactively map every discoverable device on the network, not only
    /// directly-connected ones.
    #[arg(long = "map-whole-network")]
    pub map_whole_network: bool,

    /// Increase logging verbosity (repeatable, up to -vvv).
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

/// Validated, in-memory configuration for a running agent. The only
/// options that affect core semantics (§9 of the design notes).
#[derive(Debug, Clone)]
pub struct Config {
    pub al_mac_address: MacAddress,
    pub registrar_interface_name: Option<String>,
    pub map_whole_network: bool,
    pub verbosity: u8,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Config, ConfigError> {
        let al_mac_address = parse_mac(&cli.al_mac).ok_or_else(|| ConfigError::InvalidAlMac(cli.al_mac.clone()))?;
        Ok(Config {
            al_mac_address,
            registrar_interface_name: cli.registrar_interface,
            map_whole_network: cli.map_whole_network,
            verbosity: cli.verbosity.min(3),
        })
    }
}

fn parse_mac(s: &str) -> Option<MacAddress> {
    let mut octets = [0u8; 6];
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 6 {
        return None;
    }
    for (i, part) in parts.iter().enumerate() {
        octets[i] = u8::from_str_radix(part, 16).ok()?;
    }
    Some(MacAddress::new(octets))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_valid_mac() {
        assert_eq!(parse_mac("02:ee:ff:33:44:00"), Some(MacAddress::new([0x02, 0xee, 0xff, 0x33, 0x44, 0x00])));
    }

    #[test]
    fn rejects_malformed_mac() {
        assert_eq!(parse_mac("not-a-mac"), None);
        assert_eq!(parse_mac("02:ee:ff:33:44"), None);
    }

    #[test]
    fn clamps_verbosity() {
        let cli = Cli {
            al_mac: "02:ee:ff:33:44:00".into(),
            registrar_interface: None,
            map_whole_network: false,
            verbosity: 9,
        };
        let config = Config::from_cli(cli).unwrap();
        assert_eq!(config.verbosity, 3);
    }
}

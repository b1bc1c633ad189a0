//! JSON probe description loaded at startup.
//!
//! Field names keep the camelCase spelling of the original deployment's
//! configuration files. `to_spec` converts the address strings into numeric
//! form; a malformed address fails there, before any header is built.

use anyhow::{Context as _, Result};
use serde::Deserialize;
use sr6_packet::{parse_ipv4, parse_ipv6, parse_mac, PacketError, ProbeSpec, DEFAULT_APN_ID};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Interface the frame is transmitted on.
    pub device: String,
    pub l2_src: String,
    pub l2_dst: String,
    /// Outer IPv6 transport addressing.
    pub underlay_v6_src: String,
    pub underlay_v6_dst: String,
    /// Inner encapsulated IPv4 addressing.
    pub overlay_v4_src: String,
    pub overlay_v4_dst: String,
    /// Segment list in routing path order.
    pub srh_addresses: Vec<String>,
    /// Raw ICMP payload.
    pub payload: String,
    #[serde(default)]
    pub encap_apn6: bool,
    #[serde(default = "default_apn_id")]
    pub apn_id: u64,
}

fn default_apn_id() -> u64 {
    DEFAULT_APN_ID
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open config file {}", path.display()))?;
        let config: Config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Converts the string-level configuration into the chain builder's
    /// numeric snapshot, rejecting any malformed address up front.
    pub fn to_spec(&self) -> Result<ProbeSpec, PacketError> {
        let segments = self
            .srh_addresses
            .iter()
            .map(|s| parse_ipv6(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ProbeSpec {
            l2_src: parse_mac(&self.l2_src)?,
            l2_dst: parse_mac(&self.l2_dst)?,
            underlay_v6_src: parse_ipv6(&self.underlay_v6_src)?,
            underlay_v6_dst: parse_ipv6(&self.underlay_v6_dst)?,
            overlay_v4_src: parse_ipv4(&self.overlay_v4_src)?,
            overlay_v4_dst: parse_ipv4(&self.overlay_v4_dst)?,
            segments,
            apn_id: self.encap_apn6.then_some(self.apn_id),
            payload: self.payload.clone().into_bytes(),
        })
    }
}

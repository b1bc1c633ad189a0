//! # Probe Header Chain Assembly
//!
//! ## Purpose
//!
//! Builds the full header chain of one SRv6 probe frame:
//!
//! ```text
//! Ethernet -> IPv6 -> SRH -> [APN6] -> IPv4 -> ICMP echo -> payload
//! ```
//!
//! ## How it works
//!
//! `build_chain` takes a `ProbeSpec` (the numeric configuration snapshot for
//! one invocation) and produces an ordered `HeaderChain`. The builder owns
//! all cross-header invariants: every `next_header` field names the header
//! that actually follows, and the outer IPv6 payload length is the exact sum
//! of everything behind it. Serialization walks the chain once into a single
//! contiguous buffer.
//!
//! The SRH and APN6 records use this crate's codecs; Ethernet, IPv6, IPv4,
//! and ICMP are `etherparse` headers, which also own the IPv4/ICMP checksum
//! computation on write.
//!
//! ## Main components
//!
//! - `ProbeSpec`: parsed addresses, segment list, APN6 flag, payload.
//! - `Header`: closed variant over the fixed set of header kinds.
//! - `HeaderChain`: the ordered chain plus `serialize()`.
//! - `build_chain()`: the assembly algorithm.
//! - `parse_mac()` / `parse_ipv4()` / `parse_ipv6()`: string-to-numeric
//!   address conversion, used to fail fast before any header exists.

use crate::apn6::Apn6Header;
use crate::error::PacketError;
use crate::srh::SegmentRoutingHeader;
use etherparse::{
    Ethernet2Header, EtherType, IcmpEchoHeader, Icmpv4Header, Icmpv4Type, IpNumber, Ipv4Header,
    Ipv6FlowLabel, Ipv6Header,
};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Protocol number of the segment routing (IPv6 routing) header.
pub const IP6_NEXT_SRH: u8 = 43;
/// Protocol number of the option header carrying APN6.
pub const IP6_NEXT_APN6: u8 = 60;
/// Protocol number of IPv4 encapsulated in IPv6.
pub const IP6_NEXT_IPV4: u8 = 4;

/// Default application identifier when the configuration does not set one.
pub const DEFAULT_APN_ID: u64 = 0x1234_5678_1234_5678;

// Fixed field values of the generated probe.
const PROBE_FLOW_LABEL: u32 = 0xf141;
const PROBE_HOP_LIMIT: u8 = 62;
const PROBE_IPV4_TTL: u8 = 254;
const ICMP_ECHO_ID: u16 = 0x7cf5;
const ICMP_ECHO_SEQ: u16 = 0x0100;
const SRH_ROUTING_TYPE: u8 = 4;
const SRH_SEGMENTS_LEFT: u8 = 1;
const SRH_LAST_ENTRY: u8 = 2;
const APN6_OPTION_TYPE: u8 = 0x13;
const APN6_OPTION_DATA_LEN: u8 = 12;

/// The configuration snapshot one chain is built from.
///
/// All addresses are already in numeric form; use the `parse_*` helpers (or
/// `sr6gen`'s configuration layer) to get here from strings.
#[derive(Debug, Clone)]
pub struct ProbeSpec {
    pub l2_src: [u8; 6],
    pub l2_dst: [u8; 6],
    /// Outer IPv6 transport addressing.
    pub underlay_v6_src: Ipv6Addr,
    pub underlay_v6_dst: Ipv6Addr,
    /// Inner encapsulated IPv4 addressing.
    pub overlay_v4_src: Ipv4Addr,
    pub overlay_v4_dst: Ipv4Addr,
    /// Segment list in routing path order.
    pub segments: Vec<Ipv6Addr>,
    /// `Some(id)` inserts an APN6 option header carrying `id` between the
    /// SRH and the inner IPv4 header.
    pub apn_id: Option<u64>,
    /// Raw ICMP payload bytes.
    pub payload: Vec<u8>,
}

/// One record of the chain. The set of header kinds is fixed and known at
/// compile time, so dispatch is a plain match.
#[derive(Debug, Clone)]
pub enum Header {
    Ethernet(Ethernet2Header),
    Ipv6(Ipv6Header),
    Srh(SegmentRoutingHeader),
    Apn6(Apn6Header),
    Ipv4(Ipv4Header),
    Icmp(Icmpv4Header),
    RawPayload(Vec<u8>),
}

impl Header {
    /// Length this record occupies on the wire.
    pub fn wire_len(&self) -> usize {
        match self {
            Header::Ethernet(_) => Ethernet2Header::LEN,
            Header::Ipv6(_) => Ipv6Header::LEN,
            Header::Srh(srh) => srh.wire_len(),
            Header::Apn6(apn6) => apn6.wire_len(),
            Header::Ipv4(ipv4) => ipv4.header_len(),
            Header::Icmp(icmp) => icmp.header_len(),
            Header::RawPayload(data) => data.len(),
        }
    }

    fn write<W: io::Write>(&self, writer: &mut W) -> Result<(), PacketError> {
        match self {
            Header::Ethernet(eth) => eth.write(writer)?,
            Header::Ipv6(ipv6) => ipv6.write(writer)?,
            Header::Srh(srh) => srh.write(writer)?,
            Header::Apn6(apn6) => apn6.write(writer)?,
            Header::Ipv4(ipv4) => ipv4.write(writer)?,
            Header::Icmp(icmp) => icmp.write(writer)?,
            Header::RawPayload(data) => writer.write_all(data).map_err(PacketError::from)?,
        }
        Ok(())
    }
}

/// An ordered, correctly linked sequence of headers ready for serialization.
///
/// Built fresh per invocation, serialized once, discarded.
#[derive(Debug, Clone)]
pub struct HeaderChain {
    headers: Vec<Header>,
}

impl HeaderChain {
    /// The chain records in wire order.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Total frame length.
    pub fn wire_len(&self) -> usize {
        self.headers.iter().map(Header::wire_len).sum()
    }

    /// Serializes the whole chain into one contiguous buffer.
    ///
    /// # Errors
    /// `PacketError::BufferError` if any record fails to write.
    pub fn serialize(&self) -> Result<Vec<u8>, PacketError> {
        let mut buf = Vec::with_capacity(self.wire_len());
        for header in &self.headers {
            header.write(&mut buf)?;
        }
        debug_assert_eq!(buf.len(), self.wire_len());
        Ok(buf)
    }
}

/// Builds the probe header chain for one configuration snapshot.
///
/// # How it works
///
/// 1. The SRH is built from the segment list with `hdr_ext_len = 2 * N`.
/// 2. With APN6 enabled the SRH links to the option header (60) and the
///    option header links to IPv4 (4); otherwise the SRH links to IPv4
///    directly.
/// 3. The ICMP echo header is checksummed over the payload, the inner IPv4
///    header over itself on write.
/// 4. The outer IPv6 payload length is the exact byte count of everything
///    after the fixed IPv6 header: SRH + optional APN6 + IPv4 + ICMP +
///    payload.
///
/// # Errors
/// `PacketError::BufferError` if a computed length does not fit its wire
/// field (payload too large for a 16-bit length).
pub fn build_chain(spec: &ProbeSpec) -> Result<HeaderChain, PacketError> {
    let mut srh = SegmentRoutingHeader::with_segments(
        if spec.apn_id.is_some() { IP6_NEXT_APN6 } else { IP6_NEXT_IPV4 },
        spec.segments.clone(),
    )?;
    srh.routing_type = SRH_ROUTING_TYPE;
    srh.segments_left = SRH_SEGMENTS_LEFT;
    srh.last_entry = SRH_LAST_ENTRY;

    let apn6 = spec.apn_id.map(|apn_id| Apn6Header {
        next_header: IP6_NEXT_IPV4,
        hdr_ext_len: 1,
        option_type: APN6_OPTION_TYPE,
        option_data_len: APN6_OPTION_DATA_LEN,
        apn_id_type: 0,
        flags: 0,
        apn_param_type: 0,
        apn_id,
    });

    let icmp = Icmpv4Header::with_checksum(
        Icmpv4Type::EchoRequest(IcmpEchoHeader {
            id: ICMP_ECHO_ID,
            seq: ICMP_ECHO_SEQ,
        }),
        &spec.payload,
    );

    let ipv4_payload_len = u16::try_from(icmp.header_len() + spec.payload.len())
        .map_err(|_| oversized("inner IPv4 payload"))?;
    let ipv4 = Ipv4Header::new(
        ipv4_payload_len,
        PROBE_IPV4_TTL,
        IpNumber::ICMP,
        spec.overlay_v4_src.octets(),
        spec.overlay_v4_dst.octets(),
    )
    .map_err(|_| oversized("inner IPv4 payload"))?;

    let ipv6_payload_len = srh.wire_len()
        + apn6.as_ref().map_or(0, Apn6Header::wire_len)
        + ipv4.header_len()
        + icmp.header_len()
        + spec.payload.len();
    let ipv6 = Ipv6Header {
        traffic_class: 0,
        flow_label: Ipv6FlowLabel::try_new(PROBE_FLOW_LABEL).map_err(|_| oversized("flow label"))?,
        payload_length: u16::try_from(ipv6_payload_len)
            .map_err(|_| oversized("IPv6 payload length"))?,
        next_header: IpNumber(IP6_NEXT_SRH),
        hop_limit: PROBE_HOP_LIMIT,
        source: spec.underlay_v6_src.octets(),
        destination: spec.underlay_v6_dst.octets(),
    };

    let ethernet = Ethernet2Header {
        source: spec.l2_src,
        destination: spec.l2_dst,
        ether_type: EtherType::IPV6,
    };

    let mut headers = vec![
        Header::Ethernet(ethernet),
        Header::Ipv6(ipv6),
        Header::Srh(srh),
    ];
    if let Some(apn6) = apn6 {
        headers.push(Header::Apn6(apn6));
    }
    headers.push(Header::Ipv4(ipv4));
    headers.push(Header::Icmp(icmp));
    headers.push(Header::RawPayload(spec.payload.clone()));

    let chain = HeaderChain { headers };
    log::debug!(
        "assembled {} header chain, {} bytes on wire, IPv6 payload length {}",
        chain.headers.len(),
        chain.wire_len(),
        ipv6_payload_len
    );
    Ok(chain)
}

fn oversized(what: &str) -> PacketError {
    PacketError::BufferError(io::Error::other(format!("{what} exceeds field range")))
}

/// Parses a `aa:bb:cc:dd:ee:ff` MAC address string.
///
/// # Errors
/// `PacketError::InvalidAddress` carrying the offending string.
pub fn parse_mac(s: &str) -> Result<[u8; 6], PacketError> {
    let mut mac = [0u8; 6];
    let mut parts = s.split(':');
    for byte in &mut mac {
        *byte = parts
            .next()
            .filter(|p| !p.is_empty() && p.len() <= 2)
            .and_then(|p| u8::from_str_radix(p, 16).ok())
            .ok_or_else(|| PacketError::InvalidAddress(s.to_string()))?;
    }
    if parts.next().is_some() {
        return Err(PacketError::InvalidAddress(s.to_string()));
    }
    Ok(mac)
}

/// Parses an IPv4 address string.
pub fn parse_ipv4(s: &str) -> Result<Ipv4Addr, PacketError> {
    s.parse()
        .map_err(|_| PacketError::InvalidAddress(s.to_string()))
}

/// Parses an IPv6 address string.
pub fn parse_ipv6(s: &str) -> Result<Ipv6Addr, PacketError> {
    s.parse()
        .map_err(|_| PacketError::InvalidAddress(s.to_string()))
}

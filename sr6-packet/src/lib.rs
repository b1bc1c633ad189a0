//! Codecs for the SRv6 and APN6 extension headers and assembly of the
//! single probe frame `sr6gen` transmits.

// Public modules and re-exports
pub mod apn6;
pub mod chain;
pub mod error;
pub mod srh;

pub use apn6::{Apn6Header, APN6_BASE_LEN, APN6_MIN_LEN};
pub use chain::{
    build_chain, parse_ipv4, parse_ipv6, parse_mac, Header, HeaderChain, ProbeSpec,
    DEFAULT_APN_ID, IP6_NEXT_APN6, IP6_NEXT_IPV4, IP6_NEXT_SRH,
};
pub use error::PacketError;
pub use srh::{SegmentRoutingHeader, SRH_BASE_LEN, SRH_SEGMENT_LEN};

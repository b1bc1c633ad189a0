//! End-to-end check of one assembled probe frame: build a chain from a
//! configuration snapshot, serialize it, then re-decode every layer from the
//! resulting buffer at its known offset.

use etherparse::{Icmpv4Slice, Ipv4HeaderSlice};
use sr6_packet::{
    build_chain, Apn6Header, ProbeSpec, SegmentRoutingHeader, IP6_NEXT_APN6, IP6_NEXT_IPV4,
    IP6_NEXT_SRH,
};
use std::net::{Ipv4Addr, Ipv6Addr};

const ETH_LEN: usize = 14;
const IPV6_LEN: usize = 40;

fn probe_spec(apn_id: Option<u64>) -> ProbeSpec {
    ProbeSpec {
        l2_src: [0x02, 0x42, 0xac, 0x11, 0x00, 0x01],
        l2_dst: [0x02, 0x42, 0xac, 0x11, 0x00, 0x02],
        underlay_v6_src: "fc00:1::1".parse().unwrap(),
        underlay_v6_dst: "fc00:1::2".parse().unwrap(),
        overlay_v4_src: Ipv4Addr::new(192, 168, 10, 1),
        overlay_v4_dst: Ipv4Addr::new(192, 168, 10, 2),
        segments: vec![
            "fc00:2::a".parse::<Ipv6Addr>().unwrap(),
            "fc00:2::b".parse::<Ipv6Addr>().unwrap(),
        ],
        apn_id,
        payload: b"abcd".to_vec(),
    }
}

#[test]
fn frame_round_trips_through_the_codecs() {
    let spec = probe_spec(Some(0xfeed_f00d_dead_beef));
    let chain = build_chain(&spec).unwrap();
    let frame = chain.serialize().unwrap();

    // outer Ethernet and fixed IPv6 header
    assert_eq!(&frame[0..6], &spec.l2_dst);
    assert_eq!(&frame[6..12], &spec.l2_src);
    assert_eq!(&frame[12..14], &[0x86, 0xdd]);
    assert_eq!(frame[ETH_LEN] >> 4, 6, "IPv6 version nibble");
    let payload_length = u16::from_be_bytes([frame[ETH_LEN + 4], frame[ETH_LEN + 5]]);
    assert_eq!(usize::from(payload_length), frame.len() - ETH_LEN - IPV6_LEN);
    assert_eq!(frame[ETH_LEN + 6], IP6_NEXT_SRH);
    assert_eq!(&frame[ETH_LEN + 8..ETH_LEN + 24], &spec.underlay_v6_src.octets());
    assert_eq!(&frame[ETH_LEN + 24..ETH_LEN + 40], &spec.underlay_v6_dst.octets());

    // SRH at its known offset, reproducing the configured segment list
    let (srh, rest) = SegmentRoutingHeader::decode(&frame[ETH_LEN + IPV6_LEN..]).unwrap();
    assert_eq!(srh.segments, spec.segments);
    assert_eq!(srh.next_header, IP6_NEXT_APN6);

    // APN6 directly behind it, reproducing the identifier
    let (apn6, rest) = Apn6Header::decode(rest).unwrap();
    assert_eq!(apn6.apn_id, 0xfeed_f00d_dead_beef);
    assert_eq!(apn6.next_header, IP6_NEXT_IPV4);

    // inner IPv4 with a valid checksum
    let ipv4 = Ipv4HeaderSlice::from_slice(rest).unwrap();
    assert_eq!(ipv4.protocol(), etherparse::IpNumber::ICMP);
    assert_eq!(ipv4.source(), spec.overlay_v4_src.octets());
    assert_eq!(ipv4.destination(), spec.overlay_v4_dst.octets());
    assert_eq!(usize::from(ipv4.total_len()), rest.len());
    let computed = ipv4.to_header().calc_header_checksum();
    assert_eq!(ipv4.header_checksum(), computed);

    // ICMP echo request with a valid checksum over the payload
    let icmp = Icmpv4Slice::from_slice(&rest[ipv4.slice().len()..]).unwrap();
    assert_eq!(icmp.type_u8(), 8);
    assert_eq!(icmp.code_u8(), 0);
    assert_eq!(icmp.payload(), b"abcd");
    let expected =
        etherparse::Icmpv4Header::with_checksum(icmp.header().icmp_type, icmp.payload()).checksum;
    assert_eq!(icmp.header().checksum, expected);
}

#[test]
fn frame_without_apn6_places_ipv4_behind_the_srh() {
    let spec = probe_spec(None);
    let frame = build_chain(&spec).unwrap().serialize().unwrap();

    let (srh, rest) = SegmentRoutingHeader::decode(&frame[ETH_LEN + IPV6_LEN..]).unwrap();
    assert_eq!(srh.next_header, IP6_NEXT_IPV4);
    assert_eq!(srh.segments, spec.segments);

    let ipv4 = Ipv4HeaderSlice::from_slice(rest).unwrap();
    assert_eq!(ipv4.protocol(), etherparse::IpNumber::ICMP);

    // 40 bytes of SRH + 20 + 8 + 4
    let payload_length = u16::from_be_bytes([frame[ETH_LEN + 4], frame[ETH_LEN + 5]]);
    assert_eq!(payload_length, 72);
}

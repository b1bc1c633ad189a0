//! # IPv6 Segment Routing Header Codec
//!
//! ## Purpose
//!
//! This module decodes and encodes the IPv6 Segment Routing Header (SRH), the
//! routing extension header that carries the ordered list of 128-bit segment
//! (waypoint) addresses for an SRv6 path.
//!
//! ## How it works
//!
//! The header is a fixed 8-byte base followed by `hdr_ext_len / 2` segment
//! addresses of 16 bytes each:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! | Next Header   |  Hdr Ext Len  | Routing Type  | Segments Left |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Last Entry   |     Flags     |              Tag              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |            Segment List[0] (128 bits IPv6 address)            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                              ...                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! `hdr_ext_len` counts 8-byte units after the first 8 bytes, so the total
//! wire length is `8 + 8 * hdr_ext_len`, and `hdr_ext_len = 2 * N` for N
//! segments. Segment addresses are read and written in network byte order on
//! both paths; `decode` never reads past the buffer and fails with a
//! truncation error when the declared segment list does not fit.
//!
//! ## Main components
//!
//! - `SegmentRoutingHeader`: the parsed header fields plus the segment list.
//! - `decode()`: bounds-checked parse returning the header and the rest of
//!   the buffer (the bytes belonging to the next header in the chain).
//! - `write()` / `to_bytes()`: serialization.

use crate::error::PacketError;
use std::io;
use std::net::Ipv6Addr;

/// Length of the fixed SRH base, before any segment address.
pub const SRH_BASE_LEN: usize = 8;

/// Size of one segment list entry (a full IPv6 address).
pub const SRH_SEGMENT_LEN: usize = 16;

/// A parsed IPv6 Segment Routing Header.
///
/// The `segments` order is significant: it is the routing path order as it
/// appears on the wire. `segments` may be empty, giving the degenerate
/// 8-byte header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SegmentRoutingHeader {
    /// Protocol number of the header immediately following this one.
    pub next_header: u8,
    /// Header length in 8-byte units after the first 8 bytes (`2 * N` for
    /// N segments). `with_segments` keeps this consistent with `segments`;
    /// `decode` fills it from the wire.
    pub hdr_ext_len: u8,
    pub routing_type: u8,
    pub segments_left: u8,
    pub last_entry: u8,
    pub flags: u8,
    pub tag: u16,
    /// Segment list in wire order.
    pub segments: Vec<Ipv6Addr>,
}

impl SegmentRoutingHeader {
    /// Creates a header for the given segment list with `hdr_ext_len`
    /// recomputed from the list length. The remaining fixed fields are left
    /// zeroed for the caller to fill in.
    ///
    /// # Errors
    /// `PacketError::BufferError` if the list is too long for the 8-bit
    /// `hdr_ext_len` field (more than 127 segments); a wrapped length would
    /// declare fewer segments than the header carries.
    pub fn with_segments(next_header: u8, segments: Vec<Ipv6Addr>) -> Result<Self, PacketError> {
        let hdr_ext_len = u8::try_from(2 * segments.len()).map_err(|_| {
            PacketError::BufferError(io::Error::other(
                "segment list exceeds hdr ext len range",
            ))
        })?;
        Ok(SegmentRoutingHeader {
            next_header,
            hdr_ext_len,
            segments,
            ..SegmentRoutingHeader::default()
        })
    }

    /// Total length of this header on the wire: `8 + 16 * N`.
    pub fn wire_len(&self) -> usize {
        SRH_BASE_LEN + SRH_SEGMENT_LEN * self.segments.len()
    }

    /// Parses a Segment Routing Header from the front of `data`.
    ///
    /// The segment count is taken from the `hdr_ext_len` field; the buffer
    /// must hold the full declared header, not just the 8-byte base, before
    /// any segment is read.
    ///
    /// # Returns
    /// The parsed header and the remaining bytes after it (the payload for
    /// the next decoding stage).
    ///
    /// # Errors
    /// `PacketError::TruncatedInput` if `data` is shorter than 8 bytes, or
    /// shorter than `8 + 16 * (hdr_ext_len / 2)`.
    pub fn decode(data: &[u8]) -> Result<(Self, &[u8]), PacketError> {
        if data.len() < SRH_BASE_LEN {
            return Err(PacketError::TruncatedInput {
                needed: SRH_BASE_LEN,
                available: data.len(),
            });
        }
        let hdr_ext_len = data[1];
        let seg_count = usize::from(hdr_ext_len / 2);
        let total = SRH_BASE_LEN + SRH_SEGMENT_LEN * seg_count;
        if data.len() < total {
            return Err(PacketError::TruncatedInput {
                needed: total,
                available: data.len(),
            });
        }

        let mut segments = Vec::with_capacity(seg_count);
        for i in 0..seg_count {
            let off = SRH_BASE_LEN + SRH_SEGMENT_LEN * i;
            let mut octets = [0u8; SRH_SEGMENT_LEN];
            octets.copy_from_slice(&data[off..off + SRH_SEGMENT_LEN]);
            segments.push(Ipv6Addr::from(octets));
        }

        let header = SegmentRoutingHeader {
            next_header: data[0],
            hdr_ext_len,
            routing_type: data[2],
            segments_left: data[3],
            last_entry: data[4],
            flags: data[5],
            tag: u16::from_be_bytes([data[6], data[7]]),
            segments,
        };
        Ok((header, &data[total..]))
    }

    /// Writes the header to `writer`, `8 + 16 * N` bytes in total.
    ///
    /// Each segment address is emitted as its 16 bytes in network order.
    /// Field values are written as stored; the caller is responsible for
    /// keeping `hdr_ext_len` consistent with the segment list (see
    /// `with_segments`).
    ///
    /// # Errors
    /// `PacketError::BufferError` if the writer fails.
    pub fn write<W: io::Write>(&self, writer: &mut W) -> Result<(), PacketError> {
        let mut base = [0u8; SRH_BASE_LEN];
        base[0] = self.next_header;
        base[1] = self.hdr_ext_len;
        base[2] = self.routing_type;
        base[3] = self.segments_left;
        base[4] = self.last_entry;
        base[5] = self.flags;
        base[6..8].copy_from_slice(&self.tag.to_be_bytes());
        writer.write_all(&base)?;
        for segment in &self.segments {
            writer.write_all(&segment.octets())?;
        }
        Ok(())
    }

    /// Serializes the header into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PacketError> {
        let mut buf = Vec::with_capacity(self.wire_len());
        self.write(&mut buf)?;
        Ok(buf)
    }
}

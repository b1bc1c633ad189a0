//! # APN6 Hop-by-Hop Option Codec
//!
//! ## Purpose
//!
//! Decodes and encodes the APN6 (application-aware networking over IPv6)
//! extension header: an 8-byte base carrying TLV option framing, followed by
//! a 64-bit application identifier.
//!
//! ```text
//! | Next Header | Hdr Ext Len | Option Type | Option Data Len |
//! | APN ID Type |    Flags    |        APN Param Type         |
//! |                   APN ID (64 bits)                        |
//! ```
//!
//! The `hdr_ext_len` field reuses the SRH sizing convention (total length
//! `8 + 8 * hdr_ext_len`) by local convention of this tool rather than a
//! generic extension-header rule; with the identifier present the minimum
//! wire length is 16 bytes, and `decode` requires all 16 before reading the
//! identifier.

use crate::error::PacketError;
use std::io;

/// Length of the APN6 fixed base, before the application identifier.
pub const APN6_BASE_LEN: usize = 8;

/// Minimum wire length: base plus the 64-bit identifier.
pub const APN6_MIN_LEN: usize = 16;

/// A parsed APN6 option header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Apn6Header {
    pub next_header: u8,
    /// Header length in 8-byte units after the first 8 bytes; 1 for the
    /// 16-byte header built by this tool.
    pub hdr_ext_len: u8,
    pub option_type: u8,
    pub option_data_len: u8,
    pub apn_id_type: u8,
    pub flags: u8,
    pub apn_param_type: u16,
    /// The 64-bit application identifier.
    pub apn_id: u64,
}

impl Apn6Header {
    /// Total length of this header on the wire: `8 + 8 * hdr_ext_len`,
    /// never less than the 16 bytes needed for the identifier.
    pub fn wire_len(&self) -> usize {
        APN6_MIN_LEN.max(APN6_BASE_LEN + 8 * usize::from(self.hdr_ext_len))
    }

    /// Parses an APN6 header from the front of `data`.
    ///
    /// The buffer must hold the full length declared by `hdr_ext_len`, never
    /// less than the 16 bytes of base plus identifier; the returned
    /// remainder starts at the declared header end, past any padding.
    ///
    /// # Errors
    /// `PacketError::TruncatedInput` if fewer than 8 bytes are available for
    /// the base, or fewer than `max(16, 8 + 8 * hdr_ext_len)` for the whole
    /// header. An 8-byte base without the identifier is rejected rather than
    /// decoded with an undefined `apn_id`.
    pub fn decode(data: &[u8]) -> Result<(Self, &[u8]), PacketError> {
        if data.len() < APN6_BASE_LEN {
            return Err(PacketError::TruncatedInput {
                needed: APN6_BASE_LEN,
                available: data.len(),
            });
        }
        let total = APN6_MIN_LEN.max(APN6_BASE_LEN + 8 * usize::from(data[1]));
        if data.len() < total {
            return Err(PacketError::TruncatedInput {
                needed: total,
                available: data.len(),
            });
        }
        let header = Apn6Header {
            next_header: data[0],
            hdr_ext_len: data[1],
            option_type: data[2],
            option_data_len: data[3],
            apn_id_type: data[4],
            flags: data[5],
            apn_param_type: u16::from_be_bytes([data[6], data[7]]),
            apn_id: u64::from_be_bytes([
                data[8], data[9], data[10], data[11], data[12], data[13], data[14], data[15],
            ]),
        };
        Ok((header, &data[total..]))
    }

    /// Writes the header to `writer`, `wire_len()` bytes in total. Bytes
    /// past the identifier (when `hdr_ext_len > 1`) are zero padding.
    ///
    /// # Errors
    /// `PacketError::BufferError` if the writer fails.
    pub fn write<W: io::Write>(&self, writer: &mut W) -> Result<(), PacketError> {
        let mut fixed = [0u8; APN6_MIN_LEN];
        fixed[0] = self.next_header;
        fixed[1] = self.hdr_ext_len;
        fixed[2] = self.option_type;
        fixed[3] = self.option_data_len;
        fixed[4] = self.apn_id_type;
        fixed[5] = self.flags;
        fixed[6..8].copy_from_slice(&self.apn_param_type.to_be_bytes());
        fixed[8..16].copy_from_slice(&self.apn_id.to_be_bytes());
        writer.write_all(&fixed)?;
        let padding = self.wire_len() - APN6_MIN_LEN;
        if padding > 0 {
            writer.write_all(&vec![0u8; padding])?;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Apn6Header {
        Apn6Header {
            next_header: 4,
            hdr_ext_len: 1,
            option_type: 0x13,
            option_data_len: 12,
            apn_id_type: 0,
            flags: 0,
            apn_param_type: 0x00aa,
            apn_id: 0x1234_5678_1234_5678,
        }
    }

    #[test]
    fn decode_then_encode_is_identity() {
        let wire = sample().to_bytes().unwrap();
        assert_eq!(wire.len(), 16);
        let (header, rest) = Apn6Header::decode(&wire).unwrap();
        assert!(rest.is_empty());
        assert_eq!(header, sample());
        assert_eq!(header.to_bytes().unwrap(), wire);
    }

    #[test]
    fn identifier_is_big_endian_on_the_wire() {
        let wire = sample().to_bytes().unwrap();
        assert_eq!(&wire[8..16], &[0x12, 0x34, 0x56, 0x78, 0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn decode_rejects_short_base() {
        for len in 0..8 {
            let buf = vec![0u8; len];
            match Apn6Header::decode(&buf) {
                Err(PacketError::TruncatedInput { needed: 8, available }) => {
                    assert_eq!(available, len)
                }
                other => panic!("expected truncation, got {other:?}"),
            }
        }
    }

    #[test]
    fn decode_rejects_base_without_identifier() {
        // 8..15 bytes: the base parses but the identifier cannot be read
        for len in 8..16 {
            let buf = vec![0u8; len];
            match Apn6Header::decode(&buf) {
                Err(PacketError::TruncatedInput { needed: 16, available }) => {
                    assert_eq!(available, len)
                }
                other => panic!("expected truncation, got {other:?}"),
            }
        }
    }

    #[test]
    fn decode_rejects_buffer_shorter_than_declared_length() {
        // base and identifier are present, but hdr_ext_len declares 24 bytes
        let mut header = sample();
        header.hdr_ext_len = 2;
        let wire = header.to_bytes().unwrap();
        match Apn6Header::decode(&wire[..16]) {
            Err(PacketError::TruncatedInput { needed: 24, available: 16 }) => {}
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn decode_remainder_starts_at_declared_header_end() {
        // a 24-byte header: the remainder must skip the padding, not point
        // into it, or a chained decode misparses the following header
        let mut header = sample();
        header.hdr_ext_len = 2;
        let mut wire = header.to_bytes().unwrap();
        wire.extend_from_slice(b"rest");
        let (decoded, rest) = Apn6Header::decode(&wire).unwrap();
        assert_eq!(decoded.hdr_ext_len, 2);
        assert_eq!(decoded.apn_id, sample().apn_id);
        assert_eq!(rest, b"rest");
    }

    #[test]
    fn oversized_hdr_ext_len_pads_with_zeros() {
        let mut header = sample();
        header.hdr_ext_len = 2;
        let wire = header.to_bytes().unwrap();
        assert_eq!(wire.len(), 24);
        assert!(wire[16..].iter().all(|&b| b == 0));
    }
}

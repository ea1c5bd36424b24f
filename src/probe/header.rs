//! Fixed-offset decoding of the IPv4 and ICMP headers at the front of a
//! datagram read from the raw ICMP socket.
//!
//! Nothing here validates checksums, the protocol number or the header
//! length: the receive socket only ever delivers ICMP, and the views are
//! read at fixed offsets so a header carrying options still yields
//! correctly positioned address fields.

use pnet::packet::icmp::IcmpPacket;
use pnet::packet::ipv4::Ipv4Packet;
use std::net::Ipv4Addr;

use crate::error::{TraceError, TraceResult};

/// Size of an IPv4 header without options
pub const IPV4_HEADER_SIZE: usize = 20;
/// Type, code, checksum and the 4-byte type-specific field
pub const ICMP_HEADER_SIZE: usize = 8;
/// Bytes after the IP header that are handed to the ICMP decoder
pub const ICMP_VIEW_SIZE: usize = 12;

/// ICMP Time Exceeded
pub const ICMP_TIME_EXCEEDED: u8 = 11;

/// Decoded view of the first 20 bytes of an IPv4 datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4HeaderView {
    pub version: u8,
    /// Header length in 32-bit words
    pub header_length: u8,
    pub type_of_service: u8,
    pub total_length: u16,
    pub identification: u16,
    pub flags: u8,
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

impl Ipv4HeaderView {
    /// Responding hop address in dotted-decimal form
    pub fn source_dotted(&self) -> String {
        self.source.to_string()
    }
}

/// Decoded ICMP header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpHeaderView {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    /// Upper half of the type-specific word (unused for Time Exceeded)
    pub unused: u16,
    /// Lower half of the type-specific word (next-hop MTU for Frag Needed)
    pub next_hop_mtu: u16,
}

/// Decode the fixed 20-byte IPv4 header at the start of `data`
pub fn decode_ipv4_header(data: &[u8]) -> TraceResult<Ipv4HeaderView> {
    let packet = Ipv4Packet::new(data).ok_or(TraceError::PacketTooShort {
        expected: IPV4_HEADER_SIZE,
        actual: data.len(),
    })?;

    Ok(Ipv4HeaderView {
        version: packet.get_version(),
        header_length: packet.get_header_length(),
        type_of_service: (packet.get_dscp() << 2) | packet.get_ecn(),
        total_length: packet.get_total_length(),
        identification: packet.get_identification(),
        flags: packet.get_flags(),
        fragment_offset: packet.get_fragment_offset(),
        ttl: packet.get_ttl(),
        protocol: packet.get_next_level_protocol().0,
        checksum: packet.get_checksum(),
        source: packet.get_source(),
        destination: packet.get_destination(),
    })
}

/// Decode an ICMP header from the start of `data`
pub fn decode_icmp_header(data: &[u8]) -> TraceResult<IcmpHeaderView> {
    if data.len() < ICMP_HEADER_SIZE {
        return Err(TraceError::PacketTooShort {
            expected: ICMP_HEADER_SIZE,
            actual: data.len(),
        });
    }
    let packet = IcmpPacket::new(data).ok_or(TraceError::PacketTooShort {
        expected: ICMP_HEADER_SIZE,
        actual: data.len(),
    })?;

    Ok(IcmpHeaderView {
        icmp_type: packet.get_icmp_type().0,
        code: packet.get_icmp_code().0,
        checksum: packet.get_checksum(),
        unused: u16::from_be_bytes([data[4], data[5]]),
        next_hop_mtu: u16::from_be_bytes([data[6], data[7]]),
    })
}

/// Decode both headers from a receive buffer.
///
/// The IP view covers `[0..20]` and the ICMP view `[20..32]`, regardless of
/// the header length advertised in the first byte.
pub fn decode_response(buffer: &[u8]) -> TraceResult<(Ipv4HeaderView, IcmpHeaderView)> {
    let ip = decode_ipv4_header(bounded(buffer, 0, IPV4_HEADER_SIZE)?)?;
    let icmp = decode_icmp_header(bounded(buffer, IPV4_HEADER_SIZE, ICMP_VIEW_SIZE)?)?;
    Ok((ip, icmp))
}

fn bounded(buffer: &[u8], start: usize, len: usize) -> TraceResult<&[u8]> {
    buffer
        .get(start..start + len)
        .ok_or(TraceError::PacketTooShort {
            expected: start + len,
            actual: buffer.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Time Exceeded from 10.0.0.1, as a router would send it
    fn time_exceeded_packet() -> Vec<u8> {
        let mut packet = vec![0u8; 56];
        packet[0] = 0x45; // Version 4, IHL 5
        packet[1] = 0xB8; // DSCP 46, ECN 0
        packet[2] = 0x00;
        packet[3] = 0x38; // Total length 56
        packet[4] = 0x12;
        packet[5] = 0x34; // Identification
        packet[6] = 0x40; // DF
        packet[8] = 250; // TTL
        packet[9] = 1; // ICMP
        packet[10] = 0xBE;
        packet[11] = 0xEF;
        packet[12..16].copy_from_slice(&[10, 0, 0, 1]);
        packet[16..20].copy_from_slice(&[192, 168, 1, 10]);
        packet[20] = 11; // Time Exceeded
        packet[21] = 0; // TTL exceeded in transit
        packet[22] = 0xF4;
        packet[23] = 0xFF;
        packet
    }

    #[test]
    fn test_decode_ipv4_fields() {
        let packet = time_exceeded_packet();
        let ip = decode_ipv4_header(&packet).unwrap();

        assert_eq!(ip.version, 4);
        assert_eq!(ip.header_length, 5);
        assert_eq!(ip.type_of_service, 0xB8);
        assert_eq!(ip.total_length, 56);
        assert_eq!(ip.identification, 0x1234);
        assert_eq!(ip.flags, 0b010);
        assert_eq!(ip.fragment_offset, 0);
        assert_eq!(ip.ttl, 250);
        assert_eq!(ip.protocol, 1);
        assert_eq!(ip.checksum, 0xBEEF);
        assert_eq!(ip.source, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(ip.destination, Ipv4Addr::new(192, 168, 1, 10));
        assert_eq!(ip.source_dotted(), "10.0.0.1");
    }

    #[test]
    fn test_decode_icmp_fields() {
        let mut packet = time_exceeded_packet();
        packet[24..28].copy_from_slice(&[0x00, 0x00, 0x05, 0xDC]);
        let icmp = decode_icmp_header(&packet[20..32]).unwrap();

        assert_eq!(icmp.icmp_type, 11);
        assert_eq!(icmp.code, 0);
        assert_eq!(icmp.checksum, 0xF4FF);
        assert_eq!(icmp.unused, 0);
        assert_eq!(icmp.next_hop_mtu, 1500);
    }

    #[test]
    fn test_decode_response_ignores_options_length() {
        // IHL claims options; views still sit at fixed offsets
        let mut packet = time_exceeded_packet();
        packet[0] = 0x46;
        let (ip, icmp) = decode_response(&packet).unwrap();
        assert_eq!(ip.header_length, 6);
        assert_eq!(ip.source, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(icmp.icmp_type, 11);
    }

    #[test]
    fn test_short_ipv4_is_error() {
        let err = decode_ipv4_header(&[0x45; 19]).unwrap_err();
        assert!(matches!(
            err,
            TraceError::PacketTooShort {
                expected: 20,
                actual: 19
            }
        ));
    }

    #[test]
    fn test_short_icmp_is_error() {
        assert!(decode_icmp_header(&[11, 0, 0, 0]).is_err());
        assert!(decode_icmp_header(&[]).is_err());
    }

    #[test]
    fn test_decode_response_needs_32_bytes() {
        let packet = time_exceeded_packet();
        assert!(decode_response(&packet[..31]).is_err());
        assert!(decode_response(&packet[..32]).is_ok());
    }

    // ========================================================================
    // Property-based tests (proptest)
    // ========================================================================

    use proptest::prelude::*;

    proptest! {
        /// Source address decodes to the raw octets at 12..16
        #[test]
        fn proptest_source_matches_raw_octets(header in prop::collection::vec(0u8..=255, 20)) {
            let ip = decode_ipv4_header(&header).unwrap();
            let raw = Ipv4Addr::new(header[12], header[13], header[14], header[15]);

            prop_assert_eq!(ip.source, raw);
            prop_assert_eq!(ip.source_dotted().parse::<Ipv4Addr>().unwrap(), raw);
        }

        /// Arbitrary buffers never panic the decoder
        #[test]
        fn proptest_decode_no_panic(data in prop::collection::vec(0u8..=255, 0..600)) {
            let _ = decode_response(&data);
        }
    }
}

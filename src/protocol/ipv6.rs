//! Zero-copy IPv6 header, as the enclosing header of a DCCP segment.
//!
//! IPv6 fixed header layout (40 bytes):
//!   0                   1                   2                   3
//!   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |Version| Traffic Class |           Flow Label                  |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |         Payload Length        |  Next Header  |   Hop Limit   |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                         Source Address                        |
//!  |                          (128 bits)                           |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                      Destination Address                      |
//!  |                          (128 bits)                           |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!
//! Extension headers are not walked; a DCCP segment is only recognised
//! when it directly follows the fixed header.

use super::{checksum, IpProtocol, ParseError};
use std::fmt;
use std::net::Ipv6Addr;

/// IPv6 fixed header length
pub const IPV6_HEADER_LEN: usize = 40;

/// Zero-copy IPv6 header.
#[derive(Debug)]
pub struct Ipv6Header<'a> {
    data: &'a [u8],
}

impl<'a> Ipv6Header<'a> {
    /// Parse an IPv6 header from a byte slice.
    pub fn parse(data: &'a [u8]) -> Result<Self, ParseError> {
        if data.len() < IPV6_HEADER_LEN {
            return Err(ParseError::Snapped {
                offset: 0,
                needed: IPV6_HEADER_LEN,
                captured: data.len(),
            });
        }

        let version = (data[0] >> 4) & 0x0F;
        if version != 6 {
            return Err(ParseError::InvalidHeader(format!(
                "expected IPv6 (version 6), got version {}",
                version
            )));
        }

        Ok(Ipv6Header { data })
    }

    /// Payload length (not including the 40-byte fixed header).
    #[inline]
    pub fn payload_length(&self) -> u16 {
        u16::from_be_bytes([self.data[4], self.data[5]])
    }

    /// Next header protocol number.
    #[inline]
    pub fn next_header(&self) -> IpProtocol {
        IpProtocol::from(self.data[6])
    }

    /// Hop limit (analogous to IPv4 TTL).
    #[inline]
    pub fn hop_limit(&self) -> u8 {
        self.data[7]
    }

    /// Source IPv6 address.
    #[inline]
    pub fn src_addr(&self) -> Ipv6Addr {
        let mut octets = [0u8; 16];
        octets.copy_from_slice(&self.data[8..24]);
        Ipv6Addr::from(octets)
    }

    /// Destination IPv6 address.
    #[inline]
    pub fn dst_addr(&self) -> Ipv6Addr {
        let mut octets = [0u8; 16];
        octets.copy_from_slice(&self.data[24..40]);
        Ipv6Addr::from(octets)
    }

    /// Transport length claimed by the header.
    #[inline]
    pub fn claimed_payload_len(&self) -> usize {
        self.payload_length() as usize
    }

    /// Captured payload after the fixed IPv6 header.
    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        let available = self.data.len() - IPV6_HEADER_LEN;
        let end = IPV6_HEADER_LEN + self.claimed_payload_len().min(available);
        &self.data[IPV6_HEADER_LEN..end]
    }

    /// Transport checksum over the IPv6 pseudo-header (RFC 8200 §8.1) and
    /// `covered` bytes. Returns zero when the checksum is correct.
    pub fn pseudo_header_checksum(&self, proto: IpProtocol, len: usize, covered: &[u8]) -> u16 {
        let len = len as u32;
        let mut sum = checksum::sum_words(&self.data[8..40]);
        sum += u64::from(len >> 16) + u64::from(len & 0xFFFF);
        sum += u64::from(proto.as_u8());
        sum += checksum::sum_words(covered);
        checksum::finish(sum)
    }
}

impl<'a> fmt::Display for Ipv6Header<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} next_hdr={} hop_limit={} len={}",
            self.src_addr(),
            self.dst_addr(),
            self.next_header(),
            self.hop_limit(),
            self.payload_length()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_ipv6_header() -> Vec<u8> {
        let mut pkt = vec![0u8; 40];
        pkt[0] = 0x60; // Version=6
        pkt[5] = 0x14; // Payload length = 20
        pkt[6] = 33; // Next Header = DCCP
        pkt[7] = 64; // Hop Limit
        pkt[23] = 1; // Source: ::1
        pkt[39] = 2; // Dest: ::2
        pkt.extend_from_slice(&[0u8; 20]);
        pkt
    }

    #[test]
    fn parse_valid_ipv6() {
        let pkt = make_ipv6_header();
        let hdr = Ipv6Header::parse(&pkt).unwrap();
        assert_eq!(hdr.payload_length(), 20);
        assert_eq!(hdr.next_header(), IpProtocol::Dccp);
        assert_eq!(hdr.hop_limit(), 64);
        assert_eq!(hdr.src_addr(), Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1));
        assert_eq!(hdr.dst_addr(), Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 2));
        assert_eq!(hdr.payload().len(), 20);
    }

    #[test]
    fn pseudo_header_checksum_round_trips() {
        let pkt = make_ipv6_header();
        let hdr = Ipv6Header::parse(&pkt).unwrap();
        let mut segment = vec![0x13, 0x88, 0x00, 0x50, 0x03, 0x00, 0x00, 0x00, 0x05];
        let cksum = hdr.pseudo_header_checksum(IpProtocol::Dccp, segment.len(), &segment);
        segment[6..8].copy_from_slice(&cksum.to_be_bytes());
        assert_eq!(
            hdr.pseudo_header_checksum(IpProtocol::Dccp, segment.len(), &segment),
            0
        );
    }

    #[test]
    fn reject_too_short_ipv6() {
        let pkt = [0x60; 39]; // one byte short
        assert!(Ipv6Header::parse(&pkt).is_err());
    }
}

//! Zero-copy IPv4 header, as the enclosing header of a DCCP segment.
//!
//! IPv4 header layout (20-60 bytes):
//!   0                   1                   2                   3
//!   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |Version|  IHL  |Type of Service|          Total Length         |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |         Identification        |Flags|      Fragment Offset    |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |  Time to Live |    Protocol   |         Header Checksum       |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                       Source Address                          |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                    Destination Address                        |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                    Options                    |    Padding    |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

use super::{checksum, IpProtocol, ParseError};
use std::fmt;
use std::net::Ipv4Addr;

/// Minimum IPv4 header length (no options)
pub const IPV4_MIN_HEADER_LEN: usize = 20;

/// Zero-copy IPv4 header.
#[derive(Debug)]
pub struct Ipv4Header<'a> {
    data: &'a [u8],
    header_len: usize,
}

impl<'a> Ipv4Header<'a> {
    /// Parse an IPv4 header from a byte slice.
    pub fn parse(data: &'a [u8]) -> Result<Self, ParseError> {
        if data.len() < IPV4_MIN_HEADER_LEN {
            return Err(ParseError::Snapped {
                offset: 0,
                needed: IPV4_MIN_HEADER_LEN,
                captured: data.len(),
            });
        }

        let version = (data[0] >> 4) & 0x0F;
        if version != 4 {
            return Err(ParseError::InvalidHeader(format!(
                "expected IPv4 (version 4), got version {}",
                version
            )));
        }

        let ihl = (data[0] & 0x0F) as usize;
        let header_len = ihl * 4;

        if header_len < IPV4_MIN_HEADER_LEN {
            return Err(ParseError::InvalidHeader(format!(
                "IHL too small: {} (min 5)",
                ihl
            )));
        }

        if data.len() < header_len {
            return Err(ParseError::Snapped {
                offset: 0,
                needed: header_len,
                captured: data.len(),
            });
        }

        Ok(Ipv4Header { data, header_len })
    }

    /// Header length in bytes.
    #[inline]
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Total length of the IP packet (header + payload) in bytes.
    #[inline]
    pub fn total_length(&self) -> u16 {
        u16::from_be_bytes([self.data[2], self.data[3]])
    }

    /// Time to Live.
    #[inline]
    pub fn ttl(&self) -> u8 {
        self.data[8]
    }

    /// Protocol number.
    #[inline]
    pub fn protocol(&self) -> IpProtocol {
        IpProtocol::from(self.data[9])
    }

    /// Source IP address.
    #[inline]
    pub fn src_addr(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.data[12], self.data[13], self.data[14], self.data[15])
    }

    /// Destination IP address.
    #[inline]
    pub fn dst_addr(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.data[16], self.data[17], self.data[18], self.data[19])
    }

    /// Transport length claimed by the header: `total_length - header_len`.
    /// Independent of how many bytes were captured.
    #[inline]
    pub fn claimed_payload_len(&self) -> usize {
        (self.total_length() as usize).saturating_sub(self.header_len)
    }

    /// Captured payload after the IPv4 header.
    /// Clamped to the claimed length to avoid reading trailer bytes.
    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        let available = self.data.len() - self.header_len;
        let end = self.header_len + self.claimed_payload_len().min(available);
        &self.data[self.header_len..end]
    }

    /// Transport checksum over the IPv4 pseudo-header and `covered` bytes.
    ///
    /// `len` is the transport length placed in the pseudo-header. Returns
    /// zero when `covered` carries a correct checksum.
    pub fn pseudo_header_checksum(&self, proto: IpProtocol, len: usize, covered: &[u8]) -> u16 {
        let mut sum = checksum::sum_words(&self.data[12..20]);
        sum += u64::from(proto.as_u8());
        sum += u64::from(len as u16);
        sum += checksum::sum_words(covered);
        checksum::finish(sum)
    }
}

impl<'a> fmt::Display for Ipv4Header<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} proto={} ttl={} len={}",
            self.src_addr(),
            self.dst_addr(),
            self.protocol(),
            self.ttl(),
            self.total_length()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_ipv4_header() -> Vec<u8> {
        let mut pkt = vec![0u8; 20];
        pkt[0] = 0x45; // Version=4, IHL=5
        pkt[2] = 0x00;
        pkt[3] = 0x28; // Total length = 40
        pkt[8] = 64; // TTL
        pkt[9] = 33; // Protocol = DCCP
        // Source: 192.168.1.100
        pkt[12..16].copy_from_slice(&[192, 168, 1, 100]);
        // Dest: 10.0.0.1
        pkt[16..20].copy_from_slice(&[10, 0, 0, 1]);
        pkt.extend_from_slice(&[0u8; 20]);
        pkt
    }

    #[test]
    fn parse_valid_ipv4() {
        let pkt = make_ipv4_header();
        let hdr = Ipv4Header::parse(&pkt).unwrap();
        assert_eq!(hdr.header_len(), 20);
        assert_eq!(hdr.total_length(), 40);
        assert_eq!(hdr.ttl(), 64);
        assert_eq!(hdr.protocol(), IpProtocol::Dccp);
        assert_eq!(hdr.src_addr(), Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(hdr.dst_addr(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(hdr.claimed_payload_len(), 20);
        assert_eq!(hdr.payload().len(), 20);
    }

    #[test]
    fn payload_is_clamped_to_captured_bytes() {
        let mut pkt = make_ipv4_header();
        pkt.truncate(30);
        let hdr = Ipv4Header::parse(&pkt).unwrap();
        assert_eq!(hdr.claimed_payload_len(), 20);
        assert_eq!(hdr.payload().len(), 10);
    }

    #[test]
    fn pseudo_header_checksum_round_trips() {
        let pkt = make_ipv4_header();
        let hdr = Ipv4Header::parse(&pkt).unwrap();
        let mut segment = vec![0x13, 0x88, 0x00, 0x50, 0x03, 0x00, 0x00, 0x00];
        let cksum = hdr.pseudo_header_checksum(IpProtocol::Dccp, segment.len(), &segment);
        segment[6..8].copy_from_slice(&cksum.to_be_bytes());
        assert_eq!(
            hdr.pseudo_header_checksum(IpProtocol::Dccp, segment.len(), &segment),
            0
        );
    }

    #[test]
    fn reject_too_short_packet() {
        let pkt = [0u8; 19];
        assert!(matches!(
            Ipv4Header::parse(&pkt),
            Err(ParseError::Snapped { needed: 20, .. })
        ));
    }

    #[test]
    fn reject_wrong_version() {
        let mut pkt = [0u8; 20];
        pkt[0] = 0x65; // version 6, IHL 5
        assert!(Ipv4Header::parse(&pkt).is_err());
    }
}

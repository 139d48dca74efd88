pub mod checksum;
pub mod dccp;
pub mod dccp_option;
pub mod ipv4;
pub mod ipv6;
pub mod reader;

use std::fmt;
use std::net::IpAddr;
use thiserror::Error;

/// IP Protocol numbers (subset relevant to our use case)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpProtocol {
    Icmp,
    Tcp,
    Udp,
    Dccp,
    Icmpv6,
    Unknown(u8),
}

impl From<u8> for IpProtocol {
    fn from(value: u8) -> Self {
        match value {
            1 => IpProtocol::Icmp,
            6 => IpProtocol::Tcp,
            17 => IpProtocol::Udp,
            33 => IpProtocol::Dccp,
            58 => IpProtocol::Icmpv6,
            other => IpProtocol::Unknown(other),
        }
    }
}

impl IpProtocol {
    pub fn as_u8(&self) -> u8 {
        match self {
            IpProtocol::Icmp => 1,
            IpProtocol::Tcp => 6,
            IpProtocol::Udp => 17,
            IpProtocol::Dccp => 33,
            IpProtocol::Icmpv6 => 58,
            IpProtocol::Unknown(v) => *v,
        }
    }
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpProtocol::Icmp => write!(f, "ICMP"),
            IpProtocol::Tcp => write!(f, "TCP"),
            IpProtocol::Udp => write!(f, "UDP"),
            IpProtocol::Dccp => write!(f, "DCCP"),
            IpProtocol::Icmpv6 => write!(f, "ICMPv6"),
            IpProtocol::Unknown(v) => write!(f, "Proto({})", v),
        }
    }
}

/// Errors from protocol parsing.
///
/// `Truncated`, `InvalidType` and `InvalidOption` are protocol violations;
/// `Snapped` means the bytes exist on the wire but were not captured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A length claimed by the protocol is too short for the next field.
    #[error("{what} {available} < {needed}")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },
    /// The captured buffer ends before a field that should be there.
    #[error("captured {captured} bytes, need {needed} at offset {offset}")]
    Snapped {
        offset: usize,
        needed: usize,
        captured: usize,
    },
    /// Packet type outside the ten known values.
    #[error("invalid packet type {0}")]
    InvalidType(u8),
    /// Unknown or reserved option type, or a length its type forbids.
    #[error("invalid option {option_type}: {reason}")]
    InvalidOption { option_type: u8, reason: String },
    /// Malformed enclosing network header.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl ParseError {
    /// Marker appended to a rendered line when decoding stops on this error.
    pub fn marker(&self) -> &'static str {
        match self {
            ParseError::Snapped { .. } => "[|dccp]",
            _ => "(invalid)",
        }
    }
}

/// A raw IP datagram split into its network header and transport bytes.
#[derive(Debug)]
pub struct ParsedPacket<'a> {
    pub network: NetworkHeader<'a>,
    /// Captured transport bytes, possibly fewer than `claimed_len`.
    pub transport: &'a [u8],
    /// Transport length according to the network header.
    pub claimed_len: usize,
}

/// Network layer header
#[derive(Debug)]
pub enum NetworkHeader<'a> {
    Ipv4(ipv4::Ipv4Header<'a>),
    Ipv6(ipv6::Ipv6Header<'a>),
}

impl<'a> NetworkHeader<'a> {
    pub fn src_ip(&self) -> IpAddr {
        match self {
            NetworkHeader::Ipv4(h) => IpAddr::V4(h.src_addr()),
            NetworkHeader::Ipv6(h) => IpAddr::V6(h.src_addr()),
        }
    }

    pub fn dst_ip(&self) -> IpAddr {
        match self {
            NetworkHeader::Ipv4(h) => IpAddr::V4(h.dst_addr()),
            NetworkHeader::Ipv6(h) => IpAddr::V6(h.dst_addr()),
        }
    }

    pub fn protocol(&self) -> IpProtocol {
        match self {
            NetworkHeader::Ipv4(h) => h.protocol(),
            NetworkHeader::Ipv6(h) => h.next_header(),
        }
    }

    /// Transport checksum over the family's pseudo-header plus `covered`.
    pub fn pseudo_header_checksum(&self, proto: IpProtocol, len: usize, covered: &[u8]) -> u16 {
        match self {
            NetworkHeader::Ipv4(h) => h.pseudo_header_checksum(proto, len, covered),
            NetworkHeader::Ipv6(h) => h.pseudo_header_checksum(proto, len, covered),
        }
    }
}

/// Parse a raw IP datagram (no link layer) from captured bytes.
pub fn parse_packet(data: &[u8]) -> Result<ParsedPacket<'_>, ParseError> {
    let version = match data.first() {
        Some(b) => b >> 4,
        None => {
            return Err(ParseError::Snapped {
                offset: 0,
                needed: 1,
                captured: 0,
            })
        }
    };

    match version {
        4 => {
            let hdr = ipv4::Ipv4Header::parse(data)?;
            let claimed_len = hdr.claimed_payload_len();
            let transport = hdr.payload();
            Ok(ParsedPacket {
                network: NetworkHeader::Ipv4(hdr),
                transport,
                claimed_len,
            })
        }
        6 => {
            let hdr = ipv6::Ipv6Header::parse(data)?;
            let claimed_len = hdr.claimed_payload_len();
            let transport = hdr.payload();
            Ok(ParsedPacket {
                network: NetworkHeader::Ipv6(hdr),
                transport,
                claimed_len,
            })
        }
        other => Err(ParseError::InvalidHeader(format!(
            "unsupported IP version {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_numbers_round_trip() {
        for raw in [1u8, 6, 17, 33, 58, 132] {
            assert_eq!(IpProtocol::from(raw).as_u8(), raw);
        }
        assert_eq!(IpProtocol::from(33).to_string(), "DCCP");
    }

    #[test]
    fn parse_packet_splits_ipv4() {
        let mut pkt = vec![0u8; 32];
        pkt[0] = 0x45;
        pkt[3] = 40; // claims 20 transport bytes, only 12 captured
        pkt[9] = 33;
        let parsed = parse_packet(&pkt).unwrap();
        assert_eq!(parsed.network.protocol(), IpProtocol::Dccp);
        assert_eq!(parsed.claimed_len, 20);
        assert_eq!(parsed.transport.len(), 12);
    }

    #[test]
    fn parse_packet_rejects_other_versions() {
        assert!(matches!(
            parse_packet(&[0x50; 24]),
            Err(ParseError::InvalidHeader(_))
        ));
        assert!(matches!(parse_packet(&[]), Err(ParseError::Snapped { .. })));
    }

    #[test]
    fn markers() {
        let snapped = ParseError::Snapped {
            offset: 0,
            needed: 4,
            captured: 2,
        };
        assert_eq!(snapped.marker(), "[|dccp]");
        assert_eq!(ParseError::InvalidType(12).marker(), "(invalid)");
    }
}

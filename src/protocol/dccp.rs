//! DCCP generic and type-specific header decoder (RFC 4340 §5).
//!
//! Generic header, X=0 (12 bytes):
//!   0                   1                   2                   3
//!   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |          Source Port          |           Dest Port           |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |  Data Offset  | CCVal | CsCov |           Checksum            |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  | Res | Type  |X|    Sequence Number (low bits)                 |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!
//! With X=1 the third word carries a reserved byte and the first 16 bits
//! of a 48-bit sequence number, followed by its low 32 bits (16 bytes).
//!
//! The type-specific extension follows. Acknowledgement numbers always
//! occupy an 8-byte slot here: with X=0 the ack is the low 24 bits of its
//! first word, with X=1 the low 48 bits of the whole slot.

use super::reader::Reader;
use super::ParseError;
use std::fmt;

/// Generic header length with a 24-bit sequence number.
pub const DCCP_HEADER_LEN: usize = 12;

/// Generic header length with a 48-bit sequence number.
pub const DCCP_EXT_HEADER_LEN: usize = 16;

const XTR_OFFSET: usize = 8;

/// Packet type carried in the generic header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Request,
    Response,
    Data,
    Ack,
    DataAck,
    CloseReq,
    Close,
    Reset,
    Sync,
    SyncAck,
    Unknown(u8),
}

impl From<u8> for PacketType {
    fn from(value: u8) -> Self {
        match value {
            0 => PacketType::Request,
            1 => PacketType::Response,
            2 => PacketType::Data,
            3 => PacketType::Ack,
            4 => PacketType::DataAck,
            5 => PacketType::CloseReq,
            6 => PacketType::Close,
            7 => PacketType::Reset,
            8 => PacketType::Sync,
            9 => PacketType::SyncAck,
            other => PacketType::Unknown(other),
        }
    }
}

impl PacketType {
    pub fn as_u8(&self) -> u8 {
        match self {
            PacketType::Request => 0,
            PacketType::Response => 1,
            PacketType::Data => 2,
            PacketType::Ack => 3,
            PacketType::DataAck => 4,
            PacketType::CloseReq => 5,
            PacketType::Close => 6,
            PacketType::Reset => 7,
            PacketType::Sync => 8,
            PacketType::SyncAck => 9,
            PacketType::Unknown(v) => *v,
        }
    }

    /// Bytes of type-specific header after the generic header, or `None`
    /// for an unknown type.
    pub fn extension_len(&self) -> Option<usize> {
        match self {
            PacketType::Data => Some(0),
            PacketType::Request => Some(4),
            PacketType::Response | PacketType::Reset => Some(12),
            PacketType::Ack
            | PacketType::DataAck
            | PacketType::CloseReq
            | PacketType::Close
            | PacketType::Sync
            | PacketType::SyncAck => Some(8),
            PacketType::Unknown(_) => None,
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketType::Request => write!(f, "DCCP-Request"),
            PacketType::Response => write!(f, "DCCP-Response"),
            PacketType::Data => write!(f, "DCCP-Data"),
            PacketType::Ack => write!(f, "DCCP-Ack"),
            PacketType::DataAck => write!(f, "DCCP-DataAck"),
            PacketType::CloseReq => write!(f, "DCCP-CloseReq"),
            PacketType::Close => write!(f, "DCCP-Close"),
            PacketType::Reset => write!(f, "DCCP-Reset"),
            PacketType::Sync => write!(f, "DCCP-Sync"),
            PacketType::SyncAck => write!(f, "DCCP-SyncAck"),
            PacketType::Unknown(v) => write!(f, "packet-type-{}", v),
        }
    }
}

/// Reason carried by a DCCP-Reset (RFC 4340 §5.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetCode {
    Unspecified,
    Closed,
    Aborted,
    NoConnection,
    PacketError,
    OptionError,
    MandatoryError,
    ConnectionRefused,
    BadServiceCode,
    TooBusy,
    BadInitCookie,
    AggressionPenalty,
    Unknown(u8),
}

impl From<u8> for ResetCode {
    fn from(value: u8) -> Self {
        match value {
            0 => ResetCode::Unspecified,
            1 => ResetCode::Closed,
            2 => ResetCode::Aborted,
            3 => ResetCode::NoConnection,
            4 => ResetCode::PacketError,
            5 => ResetCode::OptionError,
            6 => ResetCode::MandatoryError,
            7 => ResetCode::ConnectionRefused,
            8 => ResetCode::BadServiceCode,
            9 => ResetCode::TooBusy,
            10 => ResetCode::BadInitCookie,
            11 => ResetCode::AggressionPenalty,
            other => ResetCode::Unknown(other),
        }
    }
}

impl fmt::Display for ResetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResetCode::Unspecified => "unspecified",
            ResetCode::Closed => "closed",
            ResetCode::Aborted => "aborted",
            ResetCode::NoConnection => "no_connection",
            ResetCode::PacketError => "packet_error",
            ResetCode::OptionError => "option_error",
            ResetCode::MandatoryError => "mandatory_error",
            ResetCode::ConnectionRefused => "connection_refused",
            ResetCode::BadServiceCode => "bad_service_code",
            ResetCode::TooBusy => "too_busy",
            ResetCode::BadInitCookie => "bad_init_cookie",
            ResetCode::AggressionPenalty => "aggression_penalty",
            ResetCode::Unknown(v) => return write!(f, "reset-code-{} (invalid)", v),
        };
        f.write_str(name)
    }
}

/// Decoded generic header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericHeader {
    pub source_port: u16,
    pub dest_port: u16,
    /// Header length in 32-bit words, options included.
    pub data_offset: u8,
    pub ccval: u8,
    pub cscov: u8,
    pub checksum: u16,
    pub extended_sequence: bool,
    pub packet_type: PacketType,
    pub sequence_number: u64,
}

impl GenericHeader {
    /// Decode the generic header from captured bytes.
    ///
    /// `claimed_len` is the DCCP length according to the enclosing header;
    /// it is checked before the captured bytes are.
    pub fn decode(buf: &[u8], claimed_len: usize) -> Result<Self, ParseError> {
        if claimed_len < DCCP_HEADER_LEN {
            return Err(ParseError::Truncated {
                what: "length",
                needed: DCCP_HEADER_LEN,
                available: claimed_len,
            });
        }

        let xtr = Reader::at(buf, XTR_OFFSET).peek_u8()?;
        let extended_sequence = xtr & 1 != 0;
        let generic_len = if extended_sequence {
            DCCP_EXT_HEADER_LEN
        } else {
            DCCP_HEADER_LEN
        };
        if claimed_len < generic_len {
            return Err(ParseError::Truncated {
                what: "length",
                needed: generic_len,
                available: claimed_len,
            });
        }

        let mut r = Reader::new(buf);
        r.ensure(generic_len)?;
        let source_port = r.be_u16()?;
        let dest_port = r.be_u16()?;
        let data_offset = r.u8()?;
        let ccval_cscov = r.u8()?;
        let checksum = r.be_u16()?;
        r.skip(1)?;
        let sequence_number = if extended_sequence {
            r.skip(1)?;
            r.be_u48()?
        } else {
            u64::from(r.be_u24()?)
        };

        Ok(GenericHeader {
            source_port,
            dest_port,
            data_offset,
            ccval: ccval_cscov >> 4,
            cscov: ccval_cscov & 0x0F,
            checksum,
            extended_sequence,
            packet_type: PacketType::from((xtr >> 1) & 0x0F),
            sequence_number,
        })
    }

    /// Size of the generic header: 12 or 16 bytes.
    #[inline]
    pub fn generic_len(&self) -> usize {
        if self.extended_sequence {
            DCCP_EXT_HEADER_LEN
        } else {
            DCCP_HEADER_LEN
        }
    }

    /// Declared header length in bytes (`data_offset * 4`).
    #[inline]
    pub fn header_len(&self) -> usize {
        self.data_offset as usize * 4
    }

    /// Bytes between a fixed header of `fixed_len` and `data_offset * 4`.
    ///
    /// A data offset shorter than the fixed header is tolerated and simply
    /// yields an empty option area.
    #[inline]
    pub fn options_len(&self, fixed_len: usize) -> usize {
        self.header_len().saturating_sub(fixed_len)
    }

    /// Number of leading bytes covered by the checksum (RFC 4340 §9.2).
    pub fn checksum_coverage(&self, claimed_len: usize) -> usize {
        checksum_coverage(self.data_offset, self.cscov, claimed_len)
    }
}

/// `cscov == 0` covers the whole packet; otherwise the header plus
/// `cscov - 1` words of payload, never more than `claimed_len`.
pub fn checksum_coverage(data_offset: u8, cscov: u8, claimed_len: usize) -> usize {
    if cscov == 0 {
        return claimed_len;
    }
    let cov = (data_offset as usize + cscov as usize - 1) * 4;
    cov.min(claimed_len)
}

/// Type-specific part of the header, one variant per packet-type family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExtension {
    Request {
        service_code: u32,
    },
    Response {
        ack_number: u64,
        service_code: u32,
    },
    Data,
    /// Ack, DataAck, CloseReq, Close, Sync and SyncAck.
    AckBearing {
        ack_number: u64,
    },
    Reset {
        ack_number: u64,
        reset_code: ResetCode,
        reset_data: [u8; 3],
    },
}

impl TypeExtension {
    /// Decode the extension selected by `generic.packet_type`.
    ///
    /// Returns the extension and the fixed header length (generic header plus
    /// extension), which is where the option area starts.
    pub fn decode(
        generic: &GenericHeader,
        buf: &[u8],
        claimed_len: usize,
    ) -> Result<(Self, usize), ParseError> {
        let base = generic.generic_len();
        let ext_len = generic
            .packet_type
            .extension_len()
            .ok_or(ParseError::InvalidType(generic.packet_type.as_u8()))?;
        let fixed_len = base + ext_len;
        if claimed_len < fixed_len {
            return Err(ParseError::Truncated {
                what: "length",
                needed: fixed_len,
                available: claimed_len,
            });
        }

        let ext = match generic.packet_type {
            PacketType::Data => TypeExtension::Data,
            PacketType::Request => TypeExtension::Request {
                service_code: Reader::at(buf, base).be_u32()?,
            },
            PacketType::Response => TypeExtension::Response {
                ack_number: read_ack(generic, buf)?,
                service_code: Reader::at(buf, base + 8).be_u32()?,
            },
            PacketType::Reset => {
                let mut r = Reader::at(buf, base + 8);
                r.ensure(4)?;
                let reset_code = ResetCode::from(r.u8()?);
                let mut reset_data = [0u8; 3];
                reset_data.copy_from_slice(r.bytes(3)?);
                TypeExtension::Reset {
                    ack_number: read_ack(generic, buf)?,
                    reset_code,
                    reset_data,
                }
            }
            _ => TypeExtension::AckBearing {
                ack_number: read_ack(generic, buf)?,
            },
        };

        Ok((ext, fixed_len))
    }

    /// Acknowledgement number, for every type except Data and Request.
    pub fn ack_number(&self) -> Option<u64> {
        match self {
            TypeExtension::Response { ack_number, .. }
            | TypeExtension::AckBearing { ack_number }
            | TypeExtension::Reset { ack_number, .. } => Some(*ack_number),
            TypeExtension::Request { .. } | TypeExtension::Data => None,
        }
    }

    pub fn service_code(&self) -> Option<u32> {
        match self {
            TypeExtension::Request { service_code }
            | TypeExtension::Response { service_code, .. } => Some(*service_code),
            _ => None,
        }
    }
}

fn read_ack(generic: &GenericHeader, buf: &[u8]) -> Result<u64, ParseError> {
    let mut r = Reader::at(buf, generic.generic_len());
    if generic.extended_sequence {
        r.skip(2)?;
        r.be_u48()
    } else {
        r.skip(1)?;
        Ok(u64::from(r.be_u24()?))
    }
}

/// A fully decoded fixed header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DccpHeader {
    pub generic: GenericHeader,
    pub extension: TypeExtension,
    /// Generic header plus type extension, in bytes.
    pub fixed_len: usize,
}

impl DccpHeader {
    /// Bytes between the fixed header and `data_offset * 4`.
    #[inline]
    pub fn options_len(&self) -> usize {
        self.generic.options_len(self.fixed_len)
    }
}

/// Decode the generic header and its type extension.
pub fn decode_header(buf: &[u8], claimed_len: usize) -> Result<DccpHeader, ParseError> {
    let generic = GenericHeader::decode(buf, claimed_len)?;
    let (extension, fixed_len) = TypeExtension::decode(&generic, buf, claimed_len)?;
    Ok(DccpHeader {
        generic,
        extension,
        fixed_len,
    })
}

//! DCCP option decoder (RFC 4340 §5.8).
//!
//! Options are TLVs. Types 0-31 are a single byte; types 32 and above carry
//! a length byte that counts the type and length bytes themselves. Types
//! 128-255 are CCID-specific and only their length is interpreted.

use super::reader::Reader;
use super::ParseError;
use std::fmt;

/// Option type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Padding,
    Mandatory,
    SlowReceiver,
    ChangeL,
    ConfirmL,
    ChangeR,
    ConfirmR,
    InitCookie,
    NdpCount,
    AckVector0,
    AckVector1,
    DataDropped,
    Timestamp,
    TimestampEcho,
    ElapsedTime,
    DataChecksum,
    /// 128-255, interpreted by the congestion control in use.
    Ccid(u8),
    Unknown(u8),
}

impl From<u8> for OptionType {
    fn from(value: u8) -> Self {
        match value {
            0 => OptionType::Padding,
            1 => OptionType::Mandatory,
            2 => OptionType::SlowReceiver,
            32 => OptionType::ChangeL,
            33 => OptionType::ConfirmL,
            34 => OptionType::ChangeR,
            35 => OptionType::ConfirmR,
            36 => OptionType::InitCookie,
            37 => OptionType::NdpCount,
            38 => OptionType::AckVector0,
            39 => OptionType::AckVector1,
            40 => OptionType::DataDropped,
            41 => OptionType::Timestamp,
            42 => OptionType::TimestampEcho,
            43 => OptionType::ElapsedTime,
            44 => OptionType::DataChecksum,
            v if v >= 128 => OptionType::Ccid(v),
            other => OptionType::Unknown(other),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionType::Padding => "nop",
            OptionType::Mandatory => "mandatory",
            OptionType::SlowReceiver => "slowreceiver",
            OptionType::ChangeL => "change_l",
            OptionType::ConfirmL => "confirm_l",
            OptionType::ChangeR => "change_r",
            OptionType::ConfirmR => "confirm_r",
            OptionType::InitCookie => "initcookie",
            OptionType::NdpCount => "ndp_count",
            OptionType::AckVector0 => "ack_vector0",
            OptionType::AckVector1 => "ack_vector1",
            OptionType::DataDropped => "data_dropped",
            OptionType::Timestamp => "timestamp",
            OptionType::TimestampEcho => "timestamp_echo",
            OptionType::ElapsedTime => "elapsed_time",
            OptionType::DataChecksum => "data_checksum",
            OptionType::Ccid(v) => return write!(f, "CCID option {}", v),
            OptionType::Unknown(v) => return write!(f, "option-type-{}", v),
        };
        f.write_str(name)
    }
}

/// Feature number negotiated by Change/Confirm options (RFC 4340 §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureNumber {
    Reserved,
    Ccid,
    AllowShortSeqno,
    SequenceWindow,
    EcnIncapable,
    AckRatio,
    SendAckVector,
    SendNdpCount,
    MinimumChecksumCoverage,
    CheckDataChecksum,
    Unknown(u8),
}

impl From<u8> for FeatureNumber {
    fn from(value: u8) -> Self {
        match value {
            0 => FeatureNumber::Reserved,
            1 => FeatureNumber::Ccid,
            2 => FeatureNumber::AllowShortSeqno,
            3 => FeatureNumber::SequenceWindow,
            4 => FeatureNumber::EcnIncapable,
            5 => FeatureNumber::AckRatio,
            6 => FeatureNumber::SendAckVector,
            7 => FeatureNumber::SendNdpCount,
            8 => FeatureNumber::MinimumChecksumCoverage,
            9 => FeatureNumber::CheckDataChecksum,
            other => FeatureNumber::Unknown(other),
        }
    }
}

impl fmt::Display for FeatureNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureNumber::Reserved => "reserved",
            FeatureNumber::Ccid => "ccid",
            FeatureNumber::AllowShortSeqno => "allow_short_seqno",
            FeatureNumber::SequenceWindow => "sequence_window",
            FeatureNumber::EcnIncapable => "ecn_incapable",
            FeatureNumber::AckRatio => "ack_ratio",
            FeatureNumber::SendAckVector => "send_ack_vector",
            FeatureNumber::SendNdpCount => "send_ndp_count",
            FeatureNumber::MinimumChecksumCoverage => "minimum_checksum_coverage",
            FeatureNumber::CheckDataChecksum => "check_data_checksum",
            FeatureNumber::Unknown(v) => return write!(f, "feature-number-{} (invalid)", v),
        };
        f.write_str(name)
    }
}

/// Value of a CCID-specific option, interpreted by length only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CcidValue<'a> {
    U16(u16),
    U32(u32),
    Raw(&'a [u8]),
}

/// Interpreted payload of one option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionBody<'a> {
    /// Padding, Mandatory and SlowReceiver.
    Empty,
    /// Change-L/R and Confirm-L/R.
    Feature {
        number: FeatureNumber,
        values: &'a [u8],
    },
    /// Init-Cookie, Ack-Vector, Data-Dropped and Data-Checksum.
    Opaque(&'a [u8]),
    /// NDP-Count, rendered byte by byte.
    NdpCount(&'a [u8]),
    Timestamp(u32),
    TimestampEcho {
        timestamp: u32,
        elapsed: Option<u32>,
    },
    ElapsedTime(u32),
    Ccid(CcidValue<'a>),
}

/// One decoded option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DccpOption<'a> {
    pub option_type: u8,
    /// Total length including the type byte and, for types >= 32, the
    /// length byte.
    pub length: u8,
    pub body: OptionBody<'a>,
}

impl<'a> DccpOption<'a> {
    pub fn kind(&self) -> OptionType {
        OptionType::from(self.option_type)
    }
}

impl<'a> fmt::Display for DccpOption<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        match self.body {
            OptionBody::Empty => Ok(()),
            OptionBody::Feature { number, values } => {
                write!(f, " {}", number)?;
                values.iter().try_for_each(|v| write!(f, " {}", v))
            }
            OptionBody::Opaque(bytes) | OptionBody::Ccid(CcidValue::Raw(bytes)) => {
                f.write_str(" 0x")?;
                bytes.iter().try_for_each(|b| write!(f, "{:02x}", b))
            }
            OptionBody::NdpCount(bytes) => bytes.iter().try_for_each(|b| write!(f, " {}", b)),
            OptionBody::Timestamp(v) | OptionBody::ElapsedTime(v) => write!(f, " {}", v),
            OptionBody::TimestampEcho { timestamp, elapsed } => {
                write!(f, " {}", timestamp)?;
                match elapsed {
                    Some(e) => write!(f, " (elapsed time {})", e),
                    None => Ok(()),
                }
            }
            OptionBody::Ccid(CcidValue::U16(v)) => write!(f, " {}", v),
            OptionBody::Ccid(CcidValue::U32(v)) => write!(f, " {}", v),
        }
    }
}

fn invalid(option_type: u8, reason: String) -> ParseError {
    ParseError::InvalidOption {
        option_type,
        reason,
    }
}

/// Check the per-type length rule before any payload byte is read.
fn check_length(option_type: u8, length: u8) -> Result<(), ParseError> {
    let ok = match OptionType::from(option_type) {
        OptionType::Padding | OptionType::Mandatory | OptionType::SlowReceiver => true,
        OptionType::ChangeL | OptionType::ChangeR => length >= 4,
        OptionType::ConfirmL
        | OptionType::ConfirmR
        | OptionType::InitCookie
        | OptionType::AckVector0
        | OptionType::AckVector1
        | OptionType::DataDropped => length >= 3,
        OptionType::NdpCount => (3..=8).contains(&length),
        OptionType::Timestamp | OptionType::DataChecksum => length == 6,
        OptionType::TimestampEcho => matches!(length, 6 | 8 | 10),
        OptionType::ElapsedTime => matches!(length, 4 | 6),
        OptionType::Ccid(_) => true,
        OptionType::Unknown(_) => {
            return Err(invalid(option_type, "unknown option type".into()));
        }
    };
    if ok {
        Ok(())
    } else {
        Err(invalid(option_type, format!("bad length {}", length)))
    }
}

/// Decode exactly one option at the cursor.
///
/// `budget` is what remains of the option area according to the header's
/// data offset. On success the cursor is advanced past the option and the
/// number of bytes consumed is returned; on failure the cursor is left at
/// the option's type byte.
pub fn decode_one_option<'a>(
    cursor: &mut Reader<'a>,
    budget: usize,
) -> Result<(DccpOption<'a>, usize), ParseError> {
    if budget < 1 {
        return Err(ParseError::Truncated {
            what: "remaining length",
            needed: 1,
            available: budget,
        });
    }

    let mut r = *cursor;
    let option_type = r.u8()?;
    let length = if option_type >= 32 {
        let length = r.u8()?;
        if length < 2 {
            return Err(invalid(option_type, format!("length {} < 2", length)));
        }
        length
    } else {
        1
    };

    if budget < length as usize {
        return Err(ParseError::Truncated {
            what: "remaining length",
            needed: length as usize,
            available: budget,
        });
    }

    check_length(option_type, length)?;

    let payload: &'a [u8] = if option_type >= 32 {
        r.bytes(length as usize - 2)?
    } else {
        &[]
    };
    let mut p = Reader::new(payload);

    let body = match OptionType::from(option_type) {
        OptionType::Padding | OptionType::Mandatory | OptionType::SlowReceiver => {
            OptionBody::Empty
        }
        OptionType::ChangeL | OptionType::ChangeR | OptionType::ConfirmL | OptionType::ConfirmR => {
            OptionBody::Feature {
                number: FeatureNumber::from(p.u8()?),
                values: p.bytes(p.remaining())?,
            }
        }
        OptionType::InitCookie
        | OptionType::AckVector0
        | OptionType::AckVector1
        | OptionType::DataDropped
        | OptionType::DataChecksum => OptionBody::Opaque(payload),
        OptionType::NdpCount => OptionBody::NdpCount(payload),
        OptionType::Timestamp => OptionBody::Timestamp(p.be_u32()?),
        OptionType::TimestampEcho => {
            let timestamp = p.be_u32()?;
            let elapsed = match length {
                8 => Some(u32::from(p.be_u16()?)),
                10 => Some(p.be_u32()?),
                _ => None,
            };
            OptionBody::TimestampEcho { timestamp, elapsed }
        }
        OptionType::ElapsedTime => OptionBody::ElapsedTime(match length {
            4 => u32::from(p.be_u16()?),
            _ => p.be_u32()?,
        }),
        OptionType::Ccid(_) => OptionBody::Ccid(match length {
            4 => CcidValue::U16(p.be_u16()?),
            6 => CcidValue::U32(p.be_u32()?),
            _ => CcidValue::Raw(payload),
        }),
        OptionType::Unknown(_) => return Err(invalid(option_type, "unknown option type".into())),
    };

    tracing::trace!(option_type, length, "decoded DCCP option");
    *cursor = r;
    Ok((
        DccpOption {
            option_type,
            length,
            body,
        },
        length as usize,
    ))
}

/// Iterator over an option area.
///
/// Yields options in wire order until the budget is exhausted. After the
/// first error it yields that error once and then stops.
#[derive(Debug, Clone)]
pub struct Options<'a> {
    cursor: Reader<'a>,
    budget: usize,
    consumed: usize,
    failed: bool,
}

impl<'a> Options<'a> {
    /// Options in `buf[start..start + len]`, where `len` comes from the
    /// header and may exceed what was captured.
    pub fn new(buf: &'a [u8], start: usize, len: usize) -> Self {
        Options {
            cursor: Reader::at(buf, start),
            budget: len,
            consumed: 0,
            failed: false,
        }
    }

    /// Bytes consumed by the options decoded so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Budget left in the option area.
    pub fn remaining(&self) -> usize {
        self.budget
    }

    /// Type byte of the option at the cursor, if captured. After an error
    /// this is the option that failed.
    pub fn pending_type(&self) -> Option<OptionType> {
        self.cursor.peek_u8().ok().map(OptionType::from)
    }
}

impl<'a> Iterator for Options<'a> {
    type Item = Result<DccpOption<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.budget == 0 {
            return None;
        }
        match decode_one_option(&mut self.cursor, self.budget) {
            Ok((option, used)) => {
                self.budget -= used;
                self.consumed += used;
                Some(Ok(option))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

//! One-line DCCP rendering for the CLI.
//!
//! The renderer writes tokens as it decodes. When decoding stops on an
//! error, everything already written stays in the line and the error's
//! marker is appended.

use crate::protocol::checksum;
use crate::protocol::dccp::{GenericHeader, TypeExtension};
use crate::protocol::dccp_option::Options;
use crate::protocol::{IpProtocol, NetworkHeader, ParseError};
use std::fmt::Write as _;

/// Output switches consumed by the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Print only the payload byte count.
    pub quiet: bool,
    /// 0 = minimal, 1 = adds CCVal/CsCov/checksum, 2+ = adds sequence
    /// number and options.
    pub verbose: u8,
}

/// How rendering of one packet ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Quiet mode: only the payload length was printed.
    Quiet { payload_len: usize },
    /// Decoded to the end. `options_len` is what the options loop consumed.
    Done { options_len: usize },
    /// Stopped at the first malformation.
    Invalid(ParseError),
}

/// A rendered line and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub line: String,
    pub outcome: Outcome,
}

impl Rendered {
    pub fn is_invalid(&self) -> bool {
        matches!(self.outcome, Outcome::Invalid(_))
    }
}

/// Space-separated token sink.
#[derive(Debug, Default)]
struct Line(String);

impl Line {
    fn push(&mut self, token: impl std::fmt::Display) {
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        let _ = write!(self.0, "{}", token);
    }
}

/// Render one DCCP segment.
///
/// `segment` holds the captured bytes, `claimed_len` the DCCP length from
/// the enclosing header. The two differ when the capture was cut short.
pub fn render_dccp(
    network: &NetworkHeader<'_>,
    segment: &[u8],
    claimed_len: usize,
    opts: &DisplayOptions,
) -> Rendered {
    let mut line = Line::default();
    let outcome = match render_into(&mut line, network, segment, claimed_len, opts) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::debug!(error = %err, claimed_len, captured = segment.len(), "invalid DCCP packet");
            line.push(err.marker());
            Outcome::Invalid(err)
        }
    };
    Rendered {
        line: line.0,
        outcome,
    }
}

fn render_into(
    line: &mut Line,
    network: &NetworkHeader<'_>,
    segment: &[u8],
    claimed_len: usize,
    opts: &DisplayOptions,
) -> Result<Outcome, ParseError> {
    let generic = GenericHeader::decode(segment, claimed_len)?;

    if opts.quiet {
        let header_len = generic.header_len();
        if claimed_len < header_len {
            return Err(ParseError::Truncated {
                what: "length",
                needed: header_len,
                available: claimed_len,
            });
        }
        let payload_len = claimed_len - header_len;
        line.push(payload_len);
        return Ok(Outcome::Quiet { payload_len });
    }

    line.push(format!(
        "{}.{} > {}.{}:",
        network.src_ip(),
        generic.source_port,
        network.dst_ip(),
        generic.dest_port
    ));
    line.push(IpProtocol::Dccp);

    if opts.verbose >= 1 {
        line.push(checksum_field(&generic, network, segment, claimed_len));
    }

    line.push(generic.packet_type);
    let (extension, fixed_len) = TypeExtension::decode(&generic, segment, claimed_len)?;
    match &extension {
        TypeExtension::Request { service_code } | TypeExtension::Response { service_code, .. } => {
            line.push(format!("(service={})", service_code));
        }
        TypeExtension::Reset { reset_code, .. } => {
            line.push(format!("(code={})", reset_code));
        }
        TypeExtension::Data | TypeExtension::AckBearing { .. } => {}
    }
    if let Some(ack) = extension.ack_number() {
        line.push(format!("(ack={})", ack));
    }

    if opts.verbose < 2 {
        return Ok(Outcome::Done { options_len: 0 });
    }

    line.push(format!("seq {}", generic.sequence_number));

    let options_len = generic.options_len(fixed_len);
    if options_len == 0 {
        return Ok(Outcome::Done { options_len: 0 });
    }

    let mut list = String::from("<");
    let mut options = Options::new(segment, fixed_len, options_len);
    let mut first = true;
    while let Some(item) = options.next() {
        if !first {
            list.push_str(", ");
        }
        first = false;
        match item {
            Ok(option) => {
                let _ = write!(list, "{}", option);
            }
            Err(err) => {
                if let Some(kind) = options.pending_type() {
                    let _ = write!(list, "{}", kind);
                }
                line.push(list.trim_end_matches([',', ' ']));
                return Err(err);
            }
        }
    }
    list.push('>');
    line.push(list);

    Ok(Outcome::Done {
        options_len: options.consumed(),
    })
}

/// `(CCVal n, CsCov n[, cksum 0x____ (correct|incorrect -> 0x____)])`.
///
/// The checksum is only verified when the whole claimed length was
/// captured. A mismatch is reported but never stops decoding.
fn checksum_field(
    generic: &GenericHeader,
    network: &NetworkHeader<'_>,
    segment: &[u8],
    claimed_len: usize,
) -> String {
    let mut out = format!("(CCVal {}, CsCov {}", generic.ccval, generic.cscov);
    if segment.len() >= claimed_len {
        let coverage = generic.checksum_coverage(claimed_len);
        let computed =
            network.pseudo_header_checksum(IpProtocol::Dccp, claimed_len, &segment[..coverage]);
        let _ = write!(out, ", cksum 0x{:04x} ", generic.checksum);
        if computed == 0 {
            out.push_str("(correct)");
        } else {
            let _ = write!(
                out,
                "(incorrect -> 0x{:04x})",
                checksum::should_be(generic.checksum, computed)
            );
        }
    }
    out.push(')');
    out
}

/// Print a rendered packet line, prefixed with its index.
pub fn print_packet_line(index: u64, rendered: &Rendered) {
    println!("#{:<6} {}", index, rendered.line);
}

/// Print a compact one-line summary for a datagram whose network header
/// failed to parse.
pub fn print_parse_error(index: u64, data_len: usize, error: &ParseError) {
    println!("#{:<6} [PARSE ERROR] {} bytes: {}", index, data_len, error);
}

/// Print a hex dump with offsets, hex values, and ASCII representation.
pub fn print_hex_dump(data: &[u8]) {
    print!("{}", format_hex_dump(data));
}

/// Format raw bytes as a hex dump, 16 bytes per row.
pub fn format_hex_dump(data: &[u8]) -> String {
    // Limit hex dump to first 256 bytes for readability
    let display_len = data.len().min(256);
    let mut out = String::new();

    for offset in (0..display_len).step_by(16) {
        let end = (offset + 16).min(display_len);
        let chunk = &data[offset..end];

        let _ = write!(out, "    {:04x}  ", offset);

        for (i, byte) in chunk.iter().enumerate() {
            let _ = write!(out, "{:02x} ", byte);
            if i == 7 {
                out.push(' ');
            }
        }

        // Padding for incomplete lines
        for i in chunk.len()..16 {
            out.push_str("   ");
            if i == 7 {
                out.push(' ');
            }
        }

        out.push_str(" |");
        for byte in chunk {
            if byte.is_ascii_graphic() || *byte == b' ' {
                out.push(*byte as char);
            } else {
                out.push('.');
            }
        }
        out.push_str("|\n");
    }

    if display_len < data.len() {
        let _ = writeln!(out, "    ... ({} bytes remaining)", data.len() - display_len);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ipv4::Ipv4Header;

    fn ipv4() -> Vec<u8> {
        let mut ip = vec![0u8; 20];
        ip[0] = 0x45;
        ip[9] = 33;
        ip[12..16].copy_from_slice(&[10, 0, 0, 1]);
        ip[16..20].copy_from_slice(&[10, 0, 0, 2]);
        ip
    }

    fn render(segment: &[u8], claimed: usize, quiet: bool, verbose: u8) -> Rendered {
        let ip = ipv4();
        let net = NetworkHeader::Ipv4(Ipv4Header::parse(&ip).unwrap());
        render_dccp(&net, segment, claimed, &DisplayOptions { quiet, verbose })
    }

    fn data_packet(doff: u8) -> Vec<u8> {
        let mut seg = vec![0u8; doff as usize * 4];
        seg[0..2].copy_from_slice(&1000u16.to_be_bytes());
        seg[2..4].copy_from_slice(&2000u16.to_be_bytes());
        seg[4] = doff;
        seg[8] = 2 << 1; // DCCP-Data
        seg[11] = 5;
        seg
    }

    #[test]
    fn minimal_data_line() {
        let seg = data_packet(3);
        let out = render(&seg, seg.len(), false, 0);
        assert_eq!(out.line, "10.0.0.1.1000 > 10.0.0.2.2000: DCCP DCCP-Data");
        assert_eq!(out.outcome, Outcome::Done { options_len: 0 });
    }

    #[test]
    fn too_short_claimed_length_is_invalid() {
        let seg = data_packet(3);
        let out = render(&seg, 8, false, 0);
        assert_eq!(out.line, "(invalid)");
        assert!(matches!(
            out.outcome,
            Outcome::Invalid(ParseError::Truncated { needed: 12, .. })
        ));
    }

    #[test]
    fn quiet_requires_header_within_length() {
        let seg = data_packet(5);
        let out = render(&seg, 16, true, 0);
        assert!(out.is_invalid());
    }

    #[test]
    fn verbose_without_full_capture_skips_checksum() {
        let seg = data_packet(3);
        let out = render(&seg, 40, false, 1);
        assert_eq!(
            out.line,
            "10.0.0.1.1000 > 10.0.0.2.2000: DCCP (CCVal 0, CsCov 0) DCCP-Data"
        );
    }

    #[test]
    fn sequence_and_options_at_verbose_two() {
        let mut seg = data_packet(5);
        seg[12..20].copy_from_slice(&[0, 43, 4, 0, 9, 0, 0, 2]);
        let out = render(&seg, seg.len(), false, 2);
        assert!(out
            .line
            .ends_with("DCCP-Data seq 5 <nop, elapsed_time 9, nop, nop, slowreceiver>"));
        assert_eq!(out.outcome, Outcome::Done { options_len: 8 });
    }

    #[test]
    fn short_data_offset_renders_without_options() {
        let mut seg = data_packet(5);
        seg[4] = 3; // shorter than the 20-byte Ack header
        seg[8] = 3 << 1; // DCCP-Ack
        seg[12..16].copy_from_slice(&[0, 0, 0, 4]);
        let out = render(&seg, seg.len(), false, 2);
        assert!(out.line.ends_with("DCCP-Ack (ack=4) seq 5"));
        assert_eq!(out.outcome, Outcome::Done { options_len: 0 });
    }

    #[test]
    fn bad_option_keeps_partial_output() {
        let mut seg = data_packet(5);
        seg[12..20].copy_from_slice(&[0, 41, 5, 0, 0, 0, 0, 0]);
        let out = render(&seg, seg.len(), false, 2);
        assert!(out.line.ends_with("seq 5 <nop, timestamp (invalid)"));
        assert!(matches!(
            out.outcome,
            Outcome::Invalid(ParseError::InvalidOption { option_type: 41, .. })
        ));
    }

    #[test]
    fn unknown_type_prints_name_then_marker() {
        let mut seg = data_packet(3);
        seg[8] = 13 << 1;
        let out = render(&seg, seg.len(), false, 0);
        assert_eq!(
            out.line,
            "10.0.0.1.1000 > 10.0.0.2.2000: DCCP packet-type-13 (invalid)"
        );
    }

    #[test]
    fn snapped_extension_uses_capture_marker() {
        let mut seg = data_packet(4);
        seg[8] = 0; // DCCP-Request
        let out = render(&seg[..14], 16, false, 0);
        assert!(out.line.ends_with("DCCP-Request [|dccp]"));
    }

    #[test]
    fn hex_dump_layout() {
        let dump = format_hex_dump(b"DCCP\x00\x01");
        assert_eq!(
            dump,
            "    0000  44 43 43 50 00 01                                 |DCCP..|\n"
        );
    }
}

//! dccpscope library crate: re-exports modules for the binary, benchmarks
//! and tests.

pub mod config;
pub mod display;
pub mod input;
pub mod protocol;

use display::{DisplayOptions, Rendered};
use protocol::{IpProtocol, ParseError};

/// Parse a raw IP datagram and render its DCCP segment.
///
/// Returns `Ok(None)` when the datagram carries another protocol. Errors
/// only come from the network header; DCCP malformations are reported in
/// the returned [`Rendered`].
pub fn render_datagram(raw: &[u8], opts: &DisplayOptions) -> Result<Option<Rendered>, ParseError> {
    let parsed = protocol::parse_packet(raw)?;
    if parsed.network.protocol() != IpProtocol::Dccp {
        tracing::debug!(
            "{} > {}: {}",
            parsed.network.src_ip(),
            parsed.network.dst_ip(),
            parsed.network.protocol()
        );
        return Ok(None);
    }
    Ok(Some(display::render_dccp(
        &parsed.network,
        parsed.transport,
        parsed.claimed_len,
        opts,
    )))
}

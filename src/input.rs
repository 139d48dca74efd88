//! Hex-encoded datagram input.
//!
//! One IP datagram per line. Whitespace and `:` between digits are ignored;
//! blank lines and lines starting with `#` are skipped.

use std::io::BufRead;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("line {line}: odd number of hex digits")]
    OddLength { line: usize },
    #[error("line {line}: invalid hex digit {digit:?}")]
    BadDigit { line: usize, digit: char },
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decode one line of hex into bytes.
pub fn decode_hex(text: &str, line: usize) -> Result<Vec<u8>, InputError> {
    let digits: Vec<char> = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if digits.len() % 2 != 0 {
        return Err(InputError::OddLength { line });
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let hi = nibble(pair[0], line)?;
            let lo = nibble(pair[1], line)?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

fn nibble(digit: char, line: usize) -> Result<u8, InputError> {
    digit
        .to_digit(16)
        .map(|v| v as u8)
        .ok_or(InputError::BadDigit { line, digit })
}

/// Datagrams read from a line-oriented source.
///
/// Yields `(line_number, bytes)`; a malformed line yields an error and the
/// iterator carries on with the next one.
pub struct HexLines<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> HexLines<R> {
    pub fn new(reader: R) -> Self {
        HexLines {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for HexLines<R> {
    type Item = Result<(usize, Vec<u8>), InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;
            let text = self.buf.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            return Some(decode_hex(text, self.line).map(|bytes| (self.line, bytes)));
        }
    }
}

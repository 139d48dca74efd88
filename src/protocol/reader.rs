//! Bounded big-endian reader over captured packet bytes.
//!
//! Every DCCP field access goes through [`Reader`]. The reader only knows
//! how many bytes were actually captured; the protocol's own claimed lengths
//! are checked by the decoders before they ask for a field. A read past the
//! captured bytes fails with [`ParseError::Snapped`] and leaves the cursor
//! where it was.

use super::ParseError;

/// Cursor over a captured byte slice.
///
/// Position and remaining length are derived from a single offset, so they
/// can never drift apart.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Reader positioned at the start of `data`.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    /// Reader positioned at `offset` into `data`.
    ///
    /// The offset may lie past the end of the captured bytes; the first read
    /// will then fail with `Snapped`.
    #[inline]
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Reader { data, pos: offset }
    }

    /// Offset of the cursor from the start of the underlying buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Captured bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Fail unless at least `n` captured bytes follow the cursor.
    pub fn ensure(&self, n: usize) -> Result<(), ParseError> {
        if self.remaining() < n {
            return Err(self.snapped(n));
        }
        Ok(())
    }

    /// Look at the next byte without advancing.
    #[inline]
    pub fn peek_u8(&self) -> Result<u8, ParseError> {
        self.data.get(self.pos).copied().ok_or_else(|| self.snapped(1))
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8, ParseError> {
        let [b] = self.take::<1>()?;
        Ok(b)
    }

    #[inline]
    pub fn be_u16(&mut self) -> Result<u16, ParseError> {
        Ok(u16::from_be_bytes(self.take::<2>()?))
    }

    /// 24-bit big-endian value, zero-extended.
    #[inline]
    pub fn be_u24(&mut self) -> Result<u32, ParseError> {
        let [a, b, c] = self.take::<3>()?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    #[inline]
    pub fn be_u32(&mut self) -> Result<u32, ParseError> {
        Ok(u32::from_be_bytes(self.take::<4>()?))
    }

    /// 48-bit big-endian value, zero-extended.
    #[inline]
    pub fn be_u48(&mut self) -> Result<u64, ParseError> {
        let [a, b, c, d, e, f] = self.take::<6>()?;
        Ok(u64::from_be_bytes([0, 0, a, b, c, d, e, f]))
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        self.ensure(n)?;
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Advance past `n` bytes, which must have been captured.
    pub fn skip(&mut self, n: usize) -> Result<(), ParseError> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    fn snapped(&self, needed: usize) -> ParseError {
        ParseError::Snapped {
            offset: self.pos,
            needed,
            captured: self.data.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_widths() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
        let mut r = Reader::new(&buf);
        assert_eq!(r.u8().unwrap(), 0x01);
        assert_eq!(r.be_u16().unwrap(), 0x0203);
        assert_eq!(r.be_u24().unwrap(), 0x04_0506);
        assert_eq!(r.position(), 6);
        assert_eq!(r.remaining(), 3);

        let mut r = Reader::at(&buf, 3);
        assert_eq!(r.be_u48().unwrap(), 0x0405_0607_0809);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn short_read_fails_without_advancing() {
        let buf = [0xAA, 0xBB, 0xCC];
        let mut r = Reader::at(&buf, 1);
        let err = r.be_u32().unwrap_err();
        assert_eq!(
            err,
            ParseError::Snapped {
                offset: 1,
                needed: 4,
                captured: 3
            }
        );
        assert_eq!(r.position(), 1);
        assert_eq!(r.be_u16().unwrap(), 0xBBCC);
    }

    #[test]
    fn offset_past_end_is_snapped() {
        let buf = [0u8; 4];
        let r = Reader::at(&buf, 10);
        assert_eq!(r.remaining(), 0);
        assert!(matches!(r.peek_u8(), Err(ParseError::Snapped { .. })));
    }

    #[test]
    fn bytes_borrows_slice() {
        let buf = [1u8, 2, 3, 4, 5];
        let mut r = Reader::new(&buf);
        r.skip(1).unwrap();
        assert_eq!(r.bytes(3).unwrap(), &[2, 3, 4]);
        assert_eq!(r.peek_u8().unwrap(), 5);
        assert!(r.bytes(2).is_err());
    }
}

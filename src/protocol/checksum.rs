//! Internet checksum (RFC 1071) arithmetic.
//!
//! Sums are accumulated in a `u64` so pseudo-header and payload words can be
//! added together before folding.

/// Sum `data` as big-endian 16-bit words. An odd trailing byte is padded
/// with zero.
pub fn sum_words(data: &[u8]) -> u64 {
    let mut chunks = data.chunks_exact(2);
    let mut sum: u64 = chunks
        .by_ref()
        .map(|w| u16::from_be_bytes([w[0], w[1]]) as u64)
        .sum();
    if let [last] = chunks.remainder() {
        sum += u64::from(u16::from_be_bytes([*last, 0]));
    }
    sum
}

/// Fold carries back into the low 16 bits.
pub fn fold(mut sum: u64) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

/// One's complement of the folded sum. Zero when the covered data,
/// including its transmitted checksum, is intact.
pub fn finish(sum: u64) -> u16 {
    !fold(sum)
}

/// The checksum value that would have made `computed` come out as zero,
/// given the `transmitted` checksum that produced it.
pub fn should_be(transmitted: u16, computed: u16) -> u16 {
    fold(u64::from(transmitted) + u64::from(computed))
}

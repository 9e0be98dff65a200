//! Additive container checksum.
//!
//! Plain wrapping sum of every byte from [`CHECKSUM_START`] to end of file,
//! stored little-endian at [`CHECKSUM_OFFSET`]. The stored value sits before
//! the summed range, so it never covers itself.

use byteorder::{ByteOrder, LittleEndian};

/// Absolute offset of the 4-byte checksum field.
pub const CHECKSUM_OFFSET: usize = 27;
/// First byte covered by the checksum.
pub const CHECKSUM_START:  usize = 31;

/// Unsigned sum, modulo 2^32, of `stream[from..]`. Empty when `from` is past
/// the end.
pub fn sum(stream: &[u8], from: usize) -> u32 {
    stream
        .get(from..)
        .unwrap_or_default()
        .iter()
        .fold(0u32, |acc, &b| acc.wrapping_add(b as u32))
}

/// Compute the checksum of `container` and store it at [`CHECKSUM_OFFSET`].
///
/// # Panics
/// If `container` is shorter than [`CHECKSUM_START`]. The encoder guarantees
/// this through the header template length check.
pub fn patch(container: &mut [u8]) -> u32 {
    let value = sum(container, CHECKSUM_START);
    LittleEndian::write_u32(&mut container[CHECKSUM_OFFSET..CHECKSUM_START], value);
    value
}

/// Checksum currently stored in `container`, if it is long enough to hold one.
pub fn stored(container: &[u8]) -> Option<u32> {
    container
        .get(CHECKSUM_OFFSET..CHECKSUM_START)
        .map(LittleEndian::read_u32)
}

/// True when the stored checksum matches the contents.
pub fn verify(container: &[u8]) -> bool {
    stored(container) == Some(sum(container, CHECKSUM_START))
}

//! Forward byte-signature scan over an in-memory buffer.
//!
//! The scan tests every position in turn and advances by one byte on a
//! mismatch. The patterns used here have no self-overlap, so no skip table
//! is needed.

use thiserror::Error;

use crate::preset::tag_display;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Signature {} not found", tag_display(.pattern))]
    SignatureNotFound { pattern: [u8; 4] },
}

/// Find the first occurrence of `pattern` in `stream` at or after `from`.
///
/// Returns the offset just past the match, i.e. the match occupies
/// `[pos - 4, pos)`. Buffers with fewer than 4 bytes left never match.
pub fn find_first(stream: &[u8], pattern: &[u8; 4], from: usize) -> Result<usize, ScanError> {
    let mut pos = from;
    while pos + pattern.len() <= stream.len() {
        if &stream[pos..pos + pattern.len()] == pattern {
            return Ok(pos + pattern.len());
        }
        pos += 1;
    }
    Err(ScanError::SignatureNotFound { pattern: *pattern })
}

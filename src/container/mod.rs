//! Graph container codec.
//!
//! # Layout
//!
//! ```text
//! header1 | displayName\0 | header2 | <PLUGIN file="..."/>\0 | 07 00 |
//! blob length (u64 LE) | preset blob | footer1 | displayName\0 | footer2
//! ```
//!
//! `displayName` is `"<preset base name> (<plugin name>)"`. Offset 27 holds the
//! little-endian additive checksum of bytes 31..EOF (see [`crate::checksum`]).
//!
//! [`ContainerEncoder`] builds this layout from a preset blob;
//! [`ContainerDecoder`] finds the embedded blob again by scanning for the
//! `CcnK` chunk magic. The decoder never looks at the checksum.

pub mod decoder;
pub mod encoder;

pub use decoder::{ContainerDecoder, DecodedPreset, EmbeddedBlob};
pub use encoder::ContainerEncoder;

use thiserror::Error;

use crate::preset::PresetError;
use crate::scanner::ScanError;

/// Type/marker pair written immediately before the blob length field.
pub const BLOB_MARKER: [u8; 2] = [0x07, 0x00];
/// Width of the blob length field.
pub const LENGTH_FIELD_LEN: usize = 8;
/// A chunk-magic match must end at least this many bytes before EOF.
pub const DECODE_MARGIN: usize = 5;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Embedded preset: {0}")]
    Preset(#[from] PresetError),
    #[error("Chunk magic at offset {magic_offset} leaves no room for the length field")]
    MissingLengthField { magic_offset: usize },
    #[error("Embedded blob at offset {offset} declares {declared} bytes but only {available} remain")]
    LengthOutOfBounds { offset: usize, declared: u64, available: usize },
}

/// `"<base> (<plugin>)"`, shared by the display name and node name.
pub fn display_name(base_name: &str, plugin_name: &str) -> String {
    format!("{base_name} ({plugin_name})")
}

/// `<PLUGIN file="<filename>"/>`
pub fn plugin_tag(filename: &str) -> String {
    format!("<PLUGIN file=\"{filename}\"/>")
}

/// Append `text` followed by a zero terminator.
fn push_cstr(buf: &mut Vec<u8>, text: &str) {
    buf.extend_from_slice(text.as_bytes());
    buf.push(0);
}

//! Read-only view over a VST preset blob (`.fxp` program or `.fxb` bank).
//!
//! Only the first 20 bytes are ever interpreted:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0      | 4    | chunk magic `CcnK` |
//! | 4      | 4    | body size (ignored) |
//! | 8      | 4    | kind tag (`FxCk`, `FPCh`, `FxBk`, `FBCh`) |
//! | 12     | 4    | format version, big-endian |
//! | 16     | 4    | plugin identifier |
//!
//! Everything after byte 20 is copied verbatim and never inspected.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

pub const CHUNK_MAGIC: &[u8; 4] = b"CcnK";

pub const TAG_PROGRAM:       &[u8; 4] = b"FxCk";
pub const TAG_PROGRAM_CHUNK: &[u8; 4] = b"FPCh";
pub const TAG_BANK:          &[u8; 4] = b"FxBk";
pub const TAG_BANK_CHUNK:    &[u8; 4] = b"FBCh";

/// The only format version the graph host loads.
pub const PATCHED_VERSION: u32 = 1;

/// Smallest blob that carries every interpreted field.
pub const MIN_BLOB_LEN: usize = 20;

const KIND_OFFSET:      usize = 8;
const VERSION_OFFSET:   usize = 12;
const PLUGIN_ID_OFFSET: usize = 16;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PresetError {
    #[error("Preset blob too short: {len} bytes (minimum {MIN_BLOB_LEN})")]
    TooShort { len: usize },
}

/// Kind tag found at bytes 8..12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetKind {
    Program,
    ProgramChunk,
    Bank,
    BankChunk,
    Unknown([u8; 4]),
}

impl PresetKind {
    pub fn from_tag(tag: &[u8; 4]) -> Self {
        match tag {
            t if t == TAG_PROGRAM       => PresetKind::Program,
            t if t == TAG_PROGRAM_CHUNK => PresetKind::ProgramChunk,
            t if t == TAG_BANK          => PresetKind::Bank,
            t if t == TAG_BANK_CHUNK    => PresetKind::BankChunk,
            other                       => PresetKind::Unknown(*other),
        }
    }

    /// Output classification. Only chunk-encoded programs map to a single
    /// program file; every other tag, recognised or not, is a bank.
    pub fn class(self) -> PresetClass {
        match self {
            PresetKind::ProgramChunk => PresetClass::Program,
            _                        => PresetClass::Bank,
        }
    }

    pub fn name(self) -> String {
        match self {
            PresetKind::Program      => "program".into(),
            PresetKind::ProgramChunk => "program (chunk)".into(),
            PresetKind::Bank         => "bank".into(),
            PresetKind::BankChunk    => "bank (chunk)".into(),
            PresetKind::Unknown(t)   => format!("unknown ({})", tag_display(&t)),
        }
    }
}

/// Program vs. bank, used to pick the output extension after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetClass {
    Program,
    Bank,
}

/// An owned preset blob. Construction guarantees at least [`MIN_BLOB_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetBlob {
    bytes: Vec<u8>,
}

impl PresetBlob {
    pub fn new(bytes: Vec<u8>) -> Result<Self, PresetError> {
        if bytes.len() < MIN_BLOB_LEN {
            return Err(PresetError::TooShort { len: bytes.len() });
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    pub fn into_bytes(self) -> Vec<u8> { self.bytes }

    pub fn len(&self) -> usize { self.bytes.len() }

    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    pub fn has_chunk_magic(&self) -> bool {
        &self.bytes[..4] == CHUNK_MAGIC
    }

    pub fn kind_tag(&self) -> [u8; 4] {
        field(&self.bytes, KIND_OFFSET)
    }

    pub fn kind(&self) -> PresetKind {
        PresetKind::from_tag(&self.kind_tag())
    }

    pub fn version(&self) -> u32 {
        BigEndian::read_u32(&self.bytes[VERSION_OFFSET..VERSION_OFFSET + 4])
    }

    pub fn plugin_id(&self) -> [u8; 4] {
        field(&self.bytes, PLUGIN_ID_OFFSET)
    }

    /// Plugin identifier as the 4-character lookup token.
    pub fn plugin_token(&self) -> String {
        String::from_utf8_lossy(&self.plugin_id()).into_owned()
    }

    /// Overwrite the version field with [`PATCHED_VERSION`]. The previous
    /// value is discarded.
    pub fn patch_version(&mut self) {
        BigEndian::write_u32(
            &mut self.bytes[VERSION_OFFSET..VERSION_OFFSET + 4],
            PATCHED_VERSION,
        );
    }
}

fn field(bytes: &[u8], offset: usize) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&bytes[offset..offset + 4]);
    out
}

/// Printable form of a 4-byte tag: the text when it is printable ASCII,
/// otherwise hex.
pub fn tag_display(tag: &[u8; 4]) -> String {
    if tag.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        String::from_utf8_lossy(tag).into_owned()
    } else {
        format!("0x{}", hex::encode(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(tag: &[u8; 4], version: [u8; 4], id: &[u8; 4]) -> Vec<u8> {
        let mut v = Vec::new();
        v.extend_from_slice(CHUNK_MAGIC);
        v.extend_from_slice(&[0, 0, 0, 0]);
        v.extend_from_slice(tag);
        v.extend_from_slice(&version);
        v.extend_from_slice(id);
        v.extend_from_slice(&[0xAA; 8]);
        v
    }

    #[test]
    fn rejects_short_blob() {
        assert_eq!(
            PresetBlob::new(vec![0u8; 19]).unwrap_err(),
            PresetError::TooShort { len: 19 }
        );
        assert!(PresetBlob::new(vec![0u8; 20]).is_ok());
    }

    #[test]
    fn reads_fields() {
        let b = PresetBlob::new(blob(TAG_BANK_CHUNK, [0, 0, 0, 2], b"abcd")).unwrap();
        assert!(b.has_chunk_magic());
        assert_eq!(b.kind(), PresetKind::BankChunk);
        assert_eq!(b.version(), 2);
        assert_eq!(b.plugin_token(), "abcd");
    }

    #[test]
    fn patch_version_touches_only_version_field() {
        let raw = blob(TAG_PROGRAM_CHUNK, [9, 8, 7, 6], b"abcd");
        let mut b = PresetBlob::new(raw.clone()).unwrap();
        b.patch_version();
        assert_eq!(&b.as_bytes()[12..16], &[0, 0, 0, 1]);
        assert_eq!(&b.as_bytes()[..12], &raw[..12]);
        assert_eq!(&b.as_bytes()[16..], &raw[16..]);
    }

    #[test]
    fn only_chunk_program_classifies_as_program() {
        assert_eq!(PresetKind::from_tag(TAG_PROGRAM_CHUNK).class(), PresetClass::Program);
        assert_eq!(PresetKind::from_tag(TAG_PROGRAM).class(), PresetClass::Bank);
        assert_eq!(PresetKind::from_tag(TAG_BANK).class(), PresetClass::Bank);
        assert_eq!(PresetKind::from_tag(b"zzzz").class(), PresetClass::Bank);
    }

    #[test]
    fn tag_display_falls_back_to_hex() {
        assert_eq!(tag_display(b"FPCh"), "FPCh");
        assert_eq!(tag_display(&[0, 1, 2, 0xff]), "0x000102ff");
    }
}

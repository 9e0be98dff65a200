use byteorder::{ByteOrder, LittleEndian};

use crate::preset::{PresetBlob, PresetClass, PresetKind, CHUNK_MAGIC};
use crate::scanner;

use super::{ContainerError, DECODE_MARGIN, LENGTH_FIELD_LEN};

/// Where the embedded blob sits inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedBlob {
    /// Offset just past the chunk magic, as reported by the scanner.
    pub magic_end:     usize,
    /// First byte of the blob (the chunk magic itself).
    pub blob_offset:   usize,
    /// Offset of the 8-byte little-endian length field.
    pub length_offset: usize,
    /// Declared blob length.
    pub length:        u64,
}

/// Result of [`ContainerDecoder::decode`].
#[derive(Debug, Clone)]
pub struct DecodedPreset {
    pub blob:  PresetBlob,
    pub kind:  PresetKind,
    pub class: PresetClass,
}

/// Recovers preset blobs from graph containers. Stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContainerDecoder;

impl ContainerDecoder {
    pub fn new() -> Self { Self }

    /// Find the first chunk magic and read the length field in front of it.
    ///
    /// The match must end at least [`DECODE_MARGIN`] bytes before EOF.
    pub fn locate(&self, container: &[u8]) -> Result<EmbeddedBlob, ContainerError> {
        let limit = container.len().saturating_sub(DECODE_MARGIN);
        let magic_end = scanner::find_first(&container[..limit], CHUNK_MAGIC, 0)?;
        let blob_offset = magic_end - CHUNK_MAGIC.len();

        let length_offset = blob_offset
            .checked_sub(LENGTH_FIELD_LEN)
            .ok_or(ContainerError::MissingLengthField { magic_offset: blob_offset })?;
        let length = LittleEndian::read_u64(&container[length_offset..blob_offset]);

        log::debug!("chunk magic at {blob_offset}, length field at {length_offset} = {length}");
        Ok(EmbeddedBlob { magic_end, blob_offset, length_offset, length })
    }

    /// Extract the embedded preset and classify it.
    ///
    /// The checksum is not verified and the version field is returned as
    /// stored (the encoder's patch is not reverted).
    pub fn decode(&self, container: &[u8]) -> Result<DecodedPreset, ContainerError> {
        let loc = self.locate(container)?;

        let available = container.len() - loc.blob_offset;
        let end = usize::try_from(loc.length)
            .ok()
            .filter(|n| *n <= available)
            .map(|n| loc.blob_offset + n)
            .ok_or(ContainerError::LengthOutOfBounds {
                offset:   loc.blob_offset,
                declared: loc.length,
                available,
            })?;

        let blob  = PresetBlob::new(container[loc.blob_offset..end].to_vec())?;
        let kind  = blob.kind();
        let class = kind.class();
        log::debug!("decoded {} byte blob, kind {}", blob.len(), kind.name());
        Ok(DecodedPreset { blob, kind, class })
    }
}

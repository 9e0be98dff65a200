//! Reference template segments compiled into the binary.
//!
//! The bytes are opaque to this crate. The only structural requirement is
//! that [`HEADER1`] reserves the checksum field at offsets 27..31.

/// Document header up to (not including) the display name.
pub const HEADER1: &[u8] = &[
    // document magic + revision
    0x47, 0x52, 0x50, 0x48, 0x02, 0x00, 0x00, 0x00,
    // node table descriptor
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00,
    // checksum placeholder (27..31)
    0x00, 0x00, 0x00, 0x00,
    // node record: type = plugin, name follows
    0x4e, 0x4f, 0x44, 0x45, 0x01, 0x00, 0x03, 0x00,
];

/// Between display name and plugin tag.
pub const HEADER2: &[u8] = &[
    0x00, 0x00, 0x80, 0x3f, 0x00, 0x00, 0x80, 0x3f,
    0x02, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00,
    0x50, 0x4c, 0x55, 0x47, 0x04, 0x00,
];

/// Between embedded blob and node name.
pub const FOOTER1: &[u8] = &[
    0x50, 0x4f, 0x53, 0x4e, 0x08, 0x00, 0x00, 0x00,
    0x00, 0x00, 0xc8, 0x42, 0x00, 0x00, 0x48, 0x42,
    0x4c, 0x42, 0x4c, 0x30, 0x03, 0x00,
];

/// Trailer after the node name.
pub const FOOTER2: &[u8] = &[
    0x43, 0x4f, 0x4e, 0x4e, 0x00, 0x00, 0x00, 0x00,
    0x57, 0x49, 0x4e, 0x44, 0x10, 0x00, 0x00, 0x00,
    0x64, 0x00, 0x00, 0x00, 0x64, 0x00, 0x00, 0x00,
    0x20, 0x03, 0x00, 0x00, 0x58, 0x02, 0x00, 0x00,
    0x45, 0x4e, 0x44, 0x21,
];

use byteorder::{ByteOrder, LittleEndian};

use crate::checksum;
use crate::directory::PluginDirectory;
use crate::preset::PresetBlob;
use crate::template::{Segment, TemplateSet};

use super::{display_name, plugin_tag, push_cstr, BLOB_MARKER, LENGTH_FIELD_LEN};

/// Wraps preset blobs in graph containers.
///
/// Borrows the template table and plugin directory; both are loaded once
/// per process and shared read-only across conversions.
pub struct ContainerEncoder<'a> {
    templates: &'a TemplateSet,
    directory: &'a PluginDirectory,
}

impl<'a> ContainerEncoder<'a> {
    pub fn new(templates: &'a TemplateSet, directory: &'a PluginDirectory) -> Self {
        Self { templates, directory }
    }

    /// Build a complete container around `blob`.
    ///
    /// The blob's version field is forced to 1 before embedding. An unknown
    /// plugin id is not an error: name and file name are left empty.
    pub fn encode(&self, mut blob: PresetBlob, base_name: &str) -> Vec<u8> {
        let token = blob.plugin_token();
        let plugin_name = self.directory.resolve_name(&token);
        let plugin_file = self.directory.resolve_filename(&token);
        if plugin_name.is_empty() {
            log::warn!("{base_name}: unknown plugin id '{token}', leaving plugin name empty");
        }

        blob.patch_version();

        let name = display_name(base_name, plugin_name);
        let tag  = plugin_tag(&plugin_file);

        let mut out = Vec::with_capacity(
            self.templates.fixed_len()
                + 2 * (name.len() + 1)
                + tag.len() + 1
                + BLOB_MARKER.len()
                + LENGTH_FIELD_LEN
                + blob.len(),
        );

        out.extend_from_slice(self.templates.get(Segment::Header1));
        push_cstr(&mut out, &name);
        out.extend_from_slice(self.templates.get(Segment::Header2));
        push_cstr(&mut out, &tag);
        out.extend_from_slice(&BLOB_MARKER);

        let mut len_field = [0u8; LENGTH_FIELD_LEN];
        LittleEndian::write_u64(&mut len_field, blob.len() as u64);
        out.extend_from_slice(&len_field);

        let blob_offset = out.len();
        out.extend_from_slice(blob.as_bytes());

        out.extend_from_slice(self.templates.get(Segment::Footer1));
        push_cstr(&mut out, &name);
        out.extend_from_slice(self.templates.get(Segment::Footer2));

        // The placeholder lies before the summed range, so whatever header1
        // carries there does not affect the result.
        let sum = checksum::patch(&mut out);

        log::debug!(
            "encoded '{name}': blob {} bytes at {blob_offset}, container {} bytes, checksum {sum:#010x}",
            blob.len(),
            out.len(),
        );
        out
    }
}

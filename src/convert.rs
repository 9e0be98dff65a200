//! Conversion dispatch: preset files are wrapped, graph containers are
//! unwrapped. No I/O happens here; callers supply bytes and get bytes back
//! together with the extension the output should carry.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::container::{ContainerDecoder, ContainerEncoder, ContainerError};
use crate::directory::PluginDirectory;
use crate::preset::{PresetBlob, PresetClass, PresetError};
use crate::template::TemplateSet;

pub const PROGRAM_EXT: &str = "fxp";
pub const BANK_EXT:    &str = "fxb";
pub const GRAPH_EXT:   &str = "fxgraph";

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error("Invalid preset: {0}")]
    Preset(#[from] PresetError),
    #[error("Unsupported file extension: '{0}'")]
    UnsupportedExtension(String),
}

/// The three file kinds this tool reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Program,
    Bank,
    Graph,
}

impl FileKind {
    pub fn extension(self) -> &'static str {
        match self {
            FileKind::Program => PROGRAM_EXT,
            FileKind::Bank    => BANK_EXT,
            FileKind::Graph   => GRAPH_EXT,
        }
    }

    /// Case-insensitive extension lookup.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            PROGRAM_EXT => Some(FileKind::Program),
            BANK_EXT    => Some(FileKind::Bank),
            GRAPH_EXT   => Some(FileKind::Graph),
            _           => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConvertError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| ConvertError::UnsupportedExtension(ext.to_owned()))
    }

    pub fn is_preset(self) -> bool {
        matches!(self, FileKind::Program | FileKind::Bank)
    }

    /// Output path: same directory (or `out_dir`) and stem, this kind's extension.
    pub fn output_path(self, input: &Path, out_dir: Option<&Path>) -> PathBuf {
        let mut name = input.file_stem().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(self.extension());
        let dir = out_dir
            .or_else(|| input.parent())
            .unwrap_or_else(|| Path::new(""));
        dir.join(name)
    }
}

impl From<PresetClass> for FileKind {
    fn from(class: PresetClass) -> Self {
        match class {
            PresetClass::Program => FileKind::Program,
            PresetClass::Bank    => FileKind::Bank,
        }
    }
}

/// Output of one conversion.
#[derive(Debug, Clone)]
pub struct Converted {
    pub bytes: Vec<u8>,
    pub kind:  FileKind,
}

impl Converted {
    pub fn extension(&self) -> &'static str { self.kind.extension() }
}

/// Owns the process-wide template table and plugin directory. Read-only
/// after construction, so one service can be shared across threads.
#[derive(Debug, Clone)]
pub struct ConversionService {
    templates: TemplateSet,
    directory: PluginDirectory,
}

impl ConversionService {
    pub fn new(templates: TemplateSet, directory: PluginDirectory) -> Self {
        Self { templates, directory }
    }

    pub fn templates(&self) -> &TemplateSet { &self.templates }

    pub fn directory(&self) -> &PluginDirectory { &self.directory }

    pub fn encoder(&self) -> ContainerEncoder<'_> {
        ContainerEncoder::new(&self.templates, &self.directory)
    }

    pub fn decoder(&self) -> ContainerDecoder { ContainerDecoder::new() }

    /// Convert `bytes` of kind `source`. `base_name` is the preset name shown
    /// in the container; it is unused when decoding.
    pub fn convert(&self, bytes: Vec<u8>, source: FileKind, base_name: &str) -> Result<Converted, ConvertError> {
        match source {
            FileKind::Program | FileKind::Bank => {
                let blob = PresetBlob::new(bytes)?;
                Ok(Converted {
                    bytes: self.encoder().encode(blob, base_name),
                    kind:  FileKind::Graph,
                })
            }
            FileKind::Graph => {
                let decoded = self.decoder().decode(&bytes)?;
                Ok(Converted {
                    bytes: decoded.blob.into_bytes(),
                    kind:  decoded.class.into(),
                })
            }
        }
    }
}

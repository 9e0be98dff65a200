pub mod preset;
pub mod scanner;
pub mod checksum;
pub mod template;
pub mod directory;
pub mod container;
pub mod convert;
pub mod batch;

pub use preset::{PresetBlob, PresetClass, PresetKind};
pub use template::TemplateSet;
pub use directory::PluginDirectory;
pub use container::{ContainerDecoder, ContainerEncoder, ContainerError};
pub use convert::{ConversionService, Converted, FileKind};

//! Fixed template segments spliced around the variable parts of a graph
//! container.
//!
//! A [`TemplateSet`] is a small read-only table keyed by [`Segment`]. The
//! built-in set ships with the binary; [`TemplateSet::load_dir`] substitutes
//! a set read from disk. A missing or malformed set means a broken
//! installation, not bad input, so callers treat [`TemplateError`] as fatal.

pub mod builtin;

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::checksum::CHECKSUM_START;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template segment '{name}' not found in {dir}")]
    Missing { name: &'static str, dir: String },
    #[error("header1 template is {len} bytes; it must cover the checksum field (at least {CHECKSUM_START})")]
    HeaderTooShort { len: usize },
    #[error("IO error reading template: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Header1,
    Header2,
    Footer1,
    Footer2,
}

impl Segment {
    pub const ALL: [Segment; 4] = [
        Segment::Header1,
        Segment::Header2,
        Segment::Footer1,
        Segment::Footer2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Segment::Header1 => "header1",
            Segment::Header2 => "header2",
            Segment::Footer1 => "footer1",
            Segment::Footer2 => "footer2",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.bin", self.name())
    }
}

#[derive(Debug, Clone)]
pub struct TemplateSet {
    header1: Vec<u8>,
    header2: Vec<u8>,
    footer1: Vec<u8>,
    footer2: Vec<u8>,
}

impl TemplateSet {
    pub fn new(
        header1: Vec<u8>,
        header2: Vec<u8>,
        footer1: Vec<u8>,
        footer2: Vec<u8>,
    ) -> Result<Self, TemplateError> {
        if header1.len() < CHECKSUM_START {
            return Err(TemplateError::HeaderTooShort { len: header1.len() });
        }
        Ok(Self { header1, header2, footer1, footer2 })
    }

    pub fn builtin() -> Self {
        Self {
            header1: builtin::HEADER1.to_vec(),
            header2: builtin::HEADER2.to_vec(),
            footer1: builtin::FOOTER1.to_vec(),
            footer2: builtin::FOOTER2.to_vec(),
        }
    }

    /// Read `header1.bin`, `header2.bin`, `footer1.bin` and `footer2.bin`
    /// from `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, TemplateError> {
        let read = |seg: Segment| -> Result<Vec<u8>, TemplateError> {
            let path = dir.join(seg.file_name());
            match std::fs::read(&path) {
                Ok(bytes) => {
                    log::debug!("template {}: {} bytes from {}", seg.name(), bytes.len(), path.display());
                    Ok(bytes)
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => Err(TemplateError::Missing {
                    name: seg.name(),
                    dir:  dir.display().to_string(),
                }),
                Err(e) => Err(e.into()),
            }
        };
        Self::new(
            read(Segment::Header1)?,
            read(Segment::Header2)?,
            read(Segment::Footer1)?,
            read(Segment::Footer2)?,
        )
    }

    pub fn get(&self, seg: Segment) -> &[u8] {
        match seg {
            Segment::Header1 => &self.header1,
            Segment::Header2 => &self.header2,
            Segment::Footer1 => &self.footer1,
            Segment::Footer2 => &self.footer2,
        }
    }

    /// Combined length of all four segments.
    pub fn fixed_len(&self) -> usize {
        Segment::ALL.iter().map(|s| self.get(*s).len()).sum()
    }
}

impl Default for TemplateSet {
    fn default() -> Self { Self::builtin() }
}

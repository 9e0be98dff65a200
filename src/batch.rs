//! File-level driver: read each input, convert it, write the result next to
//! it (or into an output directory).
//!
//! A failure converts into a [`FileOutcome::Failed`] entry and the batch
//! moves on to the next file. Directories given as inputs are expanded one
//! level deep; nested directories are not visited.
//!
//! Output paths are worked out before anything is written. A file whose
//! output would land on another input of the same batch (`a.fxp` next to
//! `a.fxgraph` in auto mode) fails instead of clobbering that input.
//!
//! With the `parallel` feature the files are converted on the Rayon pool.
//! The [`ConversionService`] is fully built before the batch starts and is
//! only read afterwards.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::convert::{ConversionService, FileKind};

/// Which inputs a batch converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// Presets are wrapped, containers are unwrapped.
    #[default]
    Auto,
    /// Only wrap `.fxp`/`.fxb` files.
    Encode,
    /// Only unwrap graph containers.
    Decode,
}

impl Mode {
    pub fn accepts(self, kind: FileKind) -> bool {
        match self {
            Mode::Auto   => true,
            Mode::Encode => kind.is_preset(),
            Mode::Decode => kind == FileKind::Graph,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub mode:    Mode,
    /// Write outputs here instead of next to each input.
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub enum FileOutcome {
    Converted { input: PathBuf, output: PathBuf },
    Skipped   { input: PathBuf, reason: String },
    Failed    { input: PathBuf, error: anyhow::Error },
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o, FileOutcome::Converted { .. })).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o, FileOutcome::Skipped { .. })).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o, FileOutcome::Failed { .. })).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} converted, {} skipped, {} failed",
            self.converted(),
            self.skipped(),
            self.failed(),
        )
    }
}

/// Expand directories one level. Plain files pass through unchanged.
pub fn collect_inputs(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries = Vec::new();
            for entry in std::fs::read_dir(path)
                .with_context(|| format!("Failed to list directory {}", path.display()))?
            {
                let entry = entry.with_context(|| format!("Failed to list directory {}", path.display()))?;
                if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                    entries.push(entry.path());
                }
            }
            entries.sort();
            out.extend(entries);
        } else {
            out.push(path.clone());
        }
    }
    Ok(out)
}

/// Convert a single file and write the result. Returns the output path.
pub fn convert_file(service: &ConversionService, input: &Path, out_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let kind = FileKind::from_path(input)?;
    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let base_name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let converted = service
        .convert(bytes, kind, &base_name)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    let output = converted.kind.output_path(input, out_dir);
    std::fs::write(&output, &converted.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(output)
}

/// Every path converting `input` may write. A container's class is only
/// known once it is decoded, so both preset extensions count.
fn candidate_outputs(kind: FileKind, input: &Path, out_dir: Option<&Path>) -> Vec<PathBuf> {
    match kind {
        FileKind::Graph => vec![
            FileKind::Program.output_path(input, out_dir),
            FileKind::Bank.output_path(input, out_dir),
        ],
        FileKind::Program | FileKind::Bank => vec![FileKind::Graph.output_path(input, out_dir)],
    }
}

/// Inputs the batch will actually read, given its mode.
fn converted_inputs(inputs: &[PathBuf], mode: Mode) -> HashSet<PathBuf> {
    inputs
        .iter()
        .filter(|p| FileKind::from_path(p).map(|k| mode.accepts(k)).unwrap_or(false))
        .cloned()
        .collect()
}

fn process_one(
    service: &ConversionService,
    input: &Path,
    opts: &BatchOptions,
    converting: &HashSet<PathBuf>,
) -> FileOutcome {
    let input_buf = input.to_path_buf();
    let kind = match FileKind::from_path(input) {
        Ok(k) => k,
        Err(e) => {
            log::debug!("skip {}: {e}", input.display());
            return FileOutcome::Skipped { input: input_buf, reason: e.to_string() };
        }
    };
    if !opts.mode.accepts(kind) {
        log::debug!("skip {}: excluded by {:?} mode", input.display(), opts.mode);
        return FileOutcome::Skipped {
            input:  input_buf,
            reason: format!("excluded by {:?} mode", opts.mode),
        };
    }

    let clash = candidate_outputs(kind, input, opts.out_dir.as_deref())
        .into_iter()
        .find(|out| converting.contains(out));
    if let Some(clash) = clash {
        let error = anyhow::anyhow!(
            "Refusing to convert {}: output {} is also an input of this batch",
            input.display(),
            clash.display(),
        );
        log::error!("{error:#}");
        return FileOutcome::Failed { input: input_buf, error };
    }

    match convert_file(service, input, opts.out_dir.as_deref()) {
        Ok(output) => {
            log::info!("{} -> {}", input.display(), output.display());
            FileOutcome::Converted { input: input_buf, output }
        }
        Err(error) => {
            log::error!("{error:#}");
            FileOutcome::Failed { input: input_buf, error }
        }
    }
}

/// Convert every input. Never stops early; see [`BatchReport`] for results.
pub fn run(service: &ConversionService, inputs: &[PathBuf], opts: &BatchOptions) -> BatchReport {
    let converting = converted_inputs(inputs, opts.mode);

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let outcomes = inputs
            .par_iter()
            .map(|input| process_one(service, input, opts, &converting))
            .collect();
        BatchReport { outcomes }
    }

    #[cfg(not(feature = "parallel"))]
    {
        let outcomes = inputs
            .iter()
            .map(|input| process_one(service, input, opts, &converting))
            .collect();
        BatchReport { outcomes }
    }
}

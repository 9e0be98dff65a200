use anyhow::Context;
use clap::{Parser, Subcommand};
use fxgraph::batch::{self, BatchOptions, Mode};
use fxgraph::checksum;
use fxgraph::directory::BUILTIN_TABLE;
use fxgraph::preset::tag_display;
use fxgraph::{ConversionService, FileKind, PluginDirectory, TemplateSet};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fxgraph", about = "Convert VST presets to and from graph containers")]
struct Cli {
    /// Plugin name override table (JSON). Defaults to plugins.json next to the executable.
    #[arg(long, global = true)]
    plugins: Option<PathBuf>,
    /// Do not rewrite the override table in canonical form after loading it
    #[arg(long, global = true)]
    no_write_back: bool,
    /// Directory holding header1.bin, header2.bin, footer1.bin, footer2.bin
    #[arg(long, global = true)]
    templates: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert .fxp/.fxb files to graph containers and back
    Convert {
        /// Files or directories (directories are not descended into)
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,
        /// Write outputs here instead of next to each input
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Mode::Auto)]
        mode: Mode,
    },
    /// Show what a preset or graph container holds
    Info {
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug for layout offsets
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Templates and directory are loaded once, before any conversion.
    let templates = match &cli.templates {
        Some(dir) => TemplateSet::load_dir(dir)?,
        None      => TemplateSet::builtin(),
    };
    let override_path = cli.plugins.clone().or_else(default_override_path);
    let directory = PluginDirectory::load(BUILTIN_TABLE, override_path.as_deref(), !cli.no_write_back)?;
    log::debug!("plugin table: {} entries", directory.len());
    let service = ConversionService::new(templates, directory);

    match cli.command {

        // ── Convert ──────────────────────────────────────────────────────────
        Commands::Convert { input, output_dir, mode } => {
            if let Some(dir) = &output_dir {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
            let inputs = batch::collect_inputs(&input)?;
            let opts = BatchOptions { mode, out_dir: output_dir };
            let report = batch::run(&service, &inputs, &opts);
            println!("{}", report.summary());
            if report.failed() > 0 {
                std::process::exit(1);
            }
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input } => {
            print_info(&service, &input)?;
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn default_override_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .map(|exe| exe.with_file_name("plugins.json"))
}

/// Stored checksum and whether it matches, or `n/a` if the file is too short.
fn checksum_label(bytes: &[u8]) -> String {
    match checksum::stored(bytes) {
        Some(c) => format!("{c:#010x} ({})", if checksum::verify(bytes) { "ok" } else { "mismatch" }),
        None    => "n/a".into(),
    }
}

fn print_info(service: &ConversionService, path: &Path) -> anyhow::Result<()> {
    let kind = FileKind::from_path(path)?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    println!("── {} ─────────────────────────────────────────", path.display());
    println!("  Size           {} B", bytes.len());

    let blob = if kind == FileKind::Graph {
        let decoder = service.decoder();
        let loc = decoder.locate(&bytes)?;
        println!("  Blob offset    {}", loc.blob_offset);
        println!("  Blob length    {} B", loc.length);
        println!("  Checksum       {}", checksum_label(&bytes));
        decoder.decode(&bytes)?.blob
    } else {
        fxgraph::PresetBlob::new(bytes)?
    };

    let token = blob.plugin_token();
    let name = service.directory().resolve_name(&token);
    println!("  Chunk magic    {}", if blob.has_chunk_magic() { "ok" } else { "missing" });
    println!("  Kind           {}", blob.kind().name());
    println!("  Version        {}", blob.version());
    println!("  Plugin id      {}", tag_display(&blob.plugin_id()));
    println!("  Plugin         {}", if name.is_empty() { "(unknown)" } else { name });
    println!("  Module         {}", service.directory().resolve_filename(&token));
    let output = if kind == FileKind::Graph { FileKind::from(blob.kind().class()) } else { FileKind::Graph };
    println!("  Converts to    .{}", output.extension());
    Ok(())
}

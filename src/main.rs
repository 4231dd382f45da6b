//! WSM-EXPORT: WS1 room to brush map converter
//!
//! Reads `.wsm` rooms written by the WS1 2D level editor and writes
//! brush-based `.map` files next to them:
//! - Polygon brushes become extruded convex solids
//! - `light` entities keep their radius and color
//! - Material names are mapped to map textures through a RON config
//!
//! Usage:
//!   wsm-export room1.wsm room2.wsm
//!   wsm-export --config textures.ron --output-dir maps/ rooms/*.wsm

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod map;
mod room;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use map::ExportConfig;
use room::{DecodeError, DecodeParams};

const INPUT_EXTENSION: &str = "wsm";
const OUTPUT_EXTENSION: &str = "map";

#[derive(Parser, Debug)]
#[command(name = "wsm-export", version)]
#[command(about = "Convert WS1 .wsm rooms into brush-based .map files")]
struct Cli {
    /// Room files to convert
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Export config (RON). Defaults to the user config file when present.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Game name written into the map header
    #[arg(long)]
    game: Option<String>,

    /// Texture for materials without an override ("" keeps material names)
    #[arg(long, value_name = "TEXTURE")]
    default_texture: Option<String>,

    /// Map a material to a texture (repeatable)
    #[arg(long = "texture", value_name = "MATERIAL=TEXTURE", value_parser = parse_override)]
    textures: Vec<(String, String)>,

    /// Write raw entity data as wsm_* properties
    #[arg(long)]
    entity_data: bool,

    /// Accept files without the WSM header
    #[arg(long)]
    no_magic_check: bool,

    /// Directory for output files (default: next to each input)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Also write the decoded room as <name>.room.ron
    #[arg(long)]
    dump: bool,

    /// Log decoder details
    #[arg(short, long)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Everything one conversion needs besides the input path
struct Job {
    config: ExportConfig,
    params: DecodeParams,
    output_dir: Option<PathBuf>,
    dump: bool,
}

fn parse_override(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((material, texture)) if !material.is_empty() => {
            Ok((material.to_string(), texture.to_string()))
        }
        _ => Err(format!("expected MATERIAL=TEXTURE, got \"{}\"", s)),
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else if cli.quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    let filter = format!("{}={}", env!("CARGO_CRATE_NAME"), level.as_str().to_lowercase());

    // RUST_LOG wins over the command line
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .init();
}

/// Built-in defaults, then the config file, then command line overrides
fn build_config(cli: &Cli) -> Result<ExportConfig> {
    let mut config = match &cli.config {
        Some(path) => ExportConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => match ExportConfig::user_config_path().filter(|p| p.is_file()) {
            Some(path) => {
                info!("using config {}", path.display());
                ExportConfig::load(&path)
                    .with_context(|| format!("failed to load config {}", path.display()))?
            }
            None => ExportConfig::default(),
        },
    };
    apply_overrides(cli, &mut config);
    Ok(config)
}

fn apply_overrides(cli: &Cli, config: &mut ExportConfig) {
    if let Some(game) = &cli.game {
        config.game_name = game.clone();
    }
    if let Some(texture) = &cli.default_texture {
        config.default_texture = texture.clone();
    }
    for (material, texture) in &cli.textures {
        config.texture_overrides.insert(material.clone(), texture.clone());
    }
    if cli.entity_data {
        config.emit_entity_data = true;
    }
}

/// Input path with its extension replaced, optionally moved into `output_dir`
fn output_path(input: &Path, output_dir: Option<&Path>, extension: &str) -> PathBuf {
    let renamed = input.with_extension(extension);
    match (output_dir, renamed.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => renamed,
    }
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(INPUT_EXTENSION))
        .unwrap_or(false)
}

/// Convert one room file, returning the written map path
fn convert_file(input: &Path, job: &Job) -> Result<PathBuf> {
    if !has_input_extension(input) {
        bail!("input file must be a .{} file", INPUT_EXTENSION);
    }

    let bytes = fs::read(input).context("failed to read input")?;
    let room = room::decode_with(&bytes, &job.params).map_err(|e| {
        let hint = match e {
            DecodeError::BadMagic { .. } => " (use --no-magic-check to accept it)",
            _ => "",
        };
        anyhow::Error::new(e).context(format!("failed to decode room{}", hint))
    })?;
    debug!(
        "{}: {} materials, {} brushes, {} entities",
        input.display(),
        room.materials.len(),
        room.brushes.len(),
        room.entities.len()
    );

    let output = output_path(input, job.output_dir.as_deref(), OUTPUT_EXTENSION);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let file = File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    map::export(&room, &job.config, &mut writer)
        .and_then(|_| writer.flush())
        .with_context(|| format!("failed to write {}", output.display()))?;

    if job.dump {
        let dump_path = output.with_extension("room.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(6)
            .indentor("  ".to_string());
        let text = ron::ser::to_string_pretty(&room, pretty).context("failed to serialize room")?;
        fs::write(&dump_path, text)
            .with_context(|| format!("failed to write {}", dump_path.display()))?;
    }

    Ok(output)
}

/// Convert every file; returns the number of failures
fn run(files: &[PathBuf], job: &Job, pb: &ProgressBar) -> usize {
    let mut failures = 0;
    for input in files {
        pb.set_message(input.display().to_string());
        match convert_file(input, job) {
            Ok(output) => pb.println(format!("Created {}", output.display())),
            Err(e) => {
                failures += 1;
                pb.println(format!("Failed to convert {}: {:#}", input.display(), e));
            }
        }
        pb.inc(1);
    }
    failures
}

fn main() -> ExitCode {
    // Initialize crash logging FIRST (before any other code)
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    let cli = Cli::parse();
    init_logging(&cli);
    info!("wsm-export v{}", VERSION);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let job = Job {
        config,
        params: DecodeParams {
            require_magic: !cli.no_magic_check,
        },
        output_dir: cli.output_dir.clone(),
        dump: cli.dump,
    };

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(cli.files.len() as u64)
    };
    if let Ok(style) = ProgressStyle::default_bar().template("Converting [{bar:30}] {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("█▓░"));
    }

    let failures = run(&cli.files, &job, &pb);
    pb.finish_with_message(format!("{} converted, {} failed", cli.files.len() - failures, failures));

    if failures > 0 {
        warn!("{} of {} files failed", failures, cli.files.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#![deny(unsafe_code)]
//! CLI binary for the flowfield particle sketch.
//!
//! Subcommands:
//! - `render` runs the sketch headless for N frames and writes a PNG
//! - `replay <seed.json>` re-renders a saved seed
//! - `list` prints palettes and key bindings

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use flowfield_core::seed::parse_key_script;
use flowfield_core::{Seed, Sketch};
use flowfield_raster::{snapshot, BlendMode, RasterCanvas};
use flowfield_sim::command::KEY_BINDINGS;
use flowfield_sim::{FlowSketch, PaletteMode};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "flowfield", about = "Perlin-noise flow-field particle sketch")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the sketch for N frames and write a PNG of the trails.
    Render {
        /// Canvas width in pixels.
        #[arg(short = 'W', long, default_value_t = 800)]
        width: usize,

        /// Canvas height in pixels.
        #[arg(short = 'H', long, default_value_t = 600)]
        height: usize,

        /// Number of frames to draw.
        #[arg(short, long, default_value_t = 600)]
        frames: u64,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Initial palette (rainbow, ocean, fire, monochrome, base-hue).
        #[arg(short, long)]
        palette: Option<String>,

        /// Sketch parameters as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Key presses as `frame:key` pairs, e.g. "200:+,400:3,500:space".
        #[arg(long, default_value = "")]
        keys: String,

        /// Output file path.
        #[arg(short, long, default_value = "flowfield.png")]
        output: PathBuf,

        /// Also write the replayable seed JSON here.
        #[arg(long)]
        seed_out: Option<PathBuf>,
    },
    /// Re-render a seed file written by `render --seed-out`.
    Replay {
        /// Path to the seed JSON.
        seed: PathBuf,

        /// Output file path.
        #[arg(short, long, default_value = "flowfield.png")]
        output: PathBuf,
    },
    /// List palettes and key bindings.
    List,
}

/// What a finished render reports.
#[derive(Debug)]
struct RenderSummary {
    frames: u64,
    particles: usize,
    palette: PaletteMode,
}

/// Builds the seed for `render` from its flags.
fn build_seed(
    width: usize,
    height: usize,
    frames: u64,
    seed: u64,
    palette: Option<&str>,
    params: &str,
    keys: &str,
) -> Result<Seed, CliError> {
    let mut params: Value = serde_json::from_str(params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    let map = params
        .as_object_mut()
        .ok_or_else(|| CliError::Input("--params must be a JSON object".into()))?;
    if let Some(name) = palette {
        let mode = PaletteMode::from_name(name)?;
        map.insert("palette".into(), Value::from(mode.name()));
    }

    let mut s = Seed::new(width, height, seed);
    s.params = params;
    s.frames = frames;
    s.keys = parse_key_script(keys)?;
    s.validate()?;
    Ok(s)
}

/// Runs the sketch described by `seed` on a fresh canvas and saves the PNG.
///
/// Key presses recorded for frame `n` are delivered before frame `n` is drawn;
/// presses scheduled at or after `seed.frames` never fire.
fn render_seed(seed: &Seed, output: &Path) -> Result<RenderSummary, CliError> {
    seed.validate()?;
    let mut sketch = FlowSketch::from_json(seed.width, seed.height, seed.seed, &seed.params)?;
    let mut canvas = RasterCanvas::new(seed.width, seed.height, BlendMode::Additive)?;

    for frame in 0..seed.frames {
        for key in seed.keys_at(frame) {
            if !sketch.press_key(key, &mut canvas) {
                debug!(frame, key = %key.escape_debug(), "unbound key ignored");
            }
        }
        sketch.frame(&mut canvas)?;
    }

    snapshot::write_png(&canvas, output)?;
    Ok(RenderSummary {
        frames: sketch.frames(),
        particles: sketch.particles().len(),
        palette: sketch.palette(),
    })
}

fn read_seed(path: &Path) -> Result<Seed, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid seed file {}: {e}", path.display())))
}

fn write_seed(seed: &Seed, path: &Path) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(seed)?;
    std::fs::write(path, text).map_err(|e| CliError::Io(format!("{}: {e}", path.display())))
}

fn report(seed: &Seed, summary: &RenderSummary, output: &Path, json: bool) -> Result<(), CliError> {
    info!(
        width = seed.width,
        height = seed.height,
        frames = summary.frames,
        seed = seed.seed,
        particles = summary.particles,
        palette = %summary.palette,
        output = %output.display(),
        "render complete"
    );
    if json {
        let info = serde_json::json!({
            "width": seed.width,
            "height": seed.height,
            "frames": summary.frames,
            "seed": seed.seed,
            "particles": summary.particles,
            "palette": summary.palette.name(),
            "output": output.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let palettes = PaletteMode::list_names();
            if cli.json {
                let keys: serde_json::Map<String, Value> = KEY_BINDINGS
                    .iter()
                    .map(|(k, d)| ((*k).to_owned(), Value::from(*d)))
                    .collect();
                let info = serde_json::json!({
                    "palettes": palettes,
                    "keys": keys,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Palettes:");
                println!("  {}", palettes.join(", "));
                println!("Keys:");
                for (key, description) in KEY_BINDINGS {
                    println!("  {key:<6} {description}");
                }
            }
        }
        Command::Render {
            width,
            height,
            frames,
            seed,
            palette,
            params,
            keys,
            output,
            seed_out,
        } => {
            let seed = build_seed(
                width,
                height,
                frames,
                seed,
                palette.as_deref(),
                &params,
                &keys,
            )?;
            let summary = render_seed(&seed, &output)?;
            if let Some(path) = seed_out {
                write_seed(&seed, &path)?;
                debug!(path = %path.display(), "seed written");
            }
            report(&seed, &summary, &output, cli.json)?;
        }
        Command::Replay { seed, output } => {
            let seed = read_seed(&seed)?;
            let summary = render_seed(&seed, &output)?;
            report(&seed, &summary, &output, cli.json)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(keys: &str) -> Seed {
        build_seed(64, 48, 30, 9, None, "{\"particle_count\": 150}", keys).unwrap()
    }

    #[test]
    fn cli_parses_render_flags() {
        let cli = Cli::try_parse_from([
            "flowfield", "render", "-W", "320", "-H", "200", "--frames", "10", "--keys", "5:+",
        ])
        .unwrap();
        match cli.command {
            Command::Render {
                width,
                height,
                frames,
                keys,
                ..
            } => {
                assert_eq!((width, height, frames), (320, 200, 10));
                assert_eq!(keys, "5:+");
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn build_seed_records_palette_in_params() {
        let s = build_seed(10, 10, 1, 1, Some("fire"), "{}", "").unwrap();
        assert_eq!(s.params["palette"], "fire");
    }

    #[test]
    fn build_seed_rejects_unknown_palette_as_input() {
        let err = build_seed(10, 10, 1, 1, Some("sunset"), "{}", "").unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn build_seed_rejects_non_object_params() {
        let err = build_seed(10, 10, 1, 1, None, "[1, 2]", "").unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn build_seed_rejects_bad_key_script() {
        let err = build_seed(10, 10, 1, 1, None, "{}", "abc").unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn build_seed_rejects_zero_width() {
        let err = build_seed(0, 10, 1, 1, None, "{}", "").unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn render_applies_scheduled_keys() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.png");
        let summary = render_seed(&seed("3:+,10:2"), &out).unwrap();
        assert!(out.exists());
        assert_eq!(summary.frames, 30);
        assert_eq!(summary.particles, 250);
        assert_eq!(summary.palette, PaletteMode::Ocean);
    }

    #[test]
    fn keys_past_the_last_frame_never_fire() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.png");
        let summary = render_seed(&seed("30:+"), &out).unwrap();
        assert_eq!(summary.particles, 150);
    }

    #[test]
    fn replay_of_written_seed_is_bit_identical() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.png");
        let second = dir.path().join("second.png");
        let seed_path = dir.path().join("seed.json");

        let s = seed("5:space,12:-,20:4");
        render_seed(&s, &first).unwrap();
        write_seed(&s, &seed_path).unwrap();
        let replayed = read_seed(&seed_path).unwrap();
        assert_eq!(replayed, s);
        render_seed(&replayed, &second).unwrap();

        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }

    #[test]
    fn missing_seed_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_seed(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.exit_code(), 11);
    }

    #[test]
    fn malformed_seed_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"width\": 3").unwrap();
        assert_eq!(read_seed(&path).unwrap_err().exit_code(), 12);
    }

    #[test]
    fn png_to_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("out.png");
        assert_eq!(render_seed(&seed(""), &out).unwrap_err().exit_code(), 11);
    }
}

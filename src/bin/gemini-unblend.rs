use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::LevelFilter;

use gemini_unblend::{
    default_output_path, ProcessOptions, ProcessResult, WatermarkEngine, WatermarkSize,
};

#[derive(Parser)]
#[command(
    name = "gemini-unblend",
    about = "Strip the visible Gemini sparkle overlay by inverting its alpha compositing",
    version,
    after_help = "Simple usage: gemini-unblend <image>  (writes {name}_cleaned.png)\n\n\
                  Output is always PNG. The overlay position and size are derived\n\
                  from the image dimensions; images too small to hold the overlay\n\
                  are copied unchanged.\n\
                  RUST_LOG overrides the -v/-q log level."
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Input image file or directory
    input: String,

    /// Output PNG file or directory (default: {name}_cleaned.png)
    #[arg(short, long)]
    output: Option<String>,

    /// Force 48x48 watermark size (for images <= 1024px)
    #[arg(long)]
    force_small: bool,

    /// Force 96x96 watermark size (for images > 1024px)
    #[arg(long)]
    force_large: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Error
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if cli.force_small && cli.force_large {
        eprintln!("Error: Cannot specify both --force-small and --force-large");
        process::exit(1);
    }

    let force_size = if cli.force_small {
        Some(WatermarkSize::Small)
    } else if cli.force_large {
        Some(WatermarkSize::Large)
    } else {
        None
    };
    let opts = ProcessOptions { force_size };

    let engine = WatermarkEngine::new();
    if let Err(e) = engine.preload() {
        eprintln!("Fatal: Failed to initialize engine: {e}");
        process::exit(1);
    }

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: gemini-unblend <input_dir> -o <output_dir>");
            process::exit(1);
        };
        engine.process_directory(input_path, &output_dir, &opts)
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_output_path(input_path),
        };
        vec![engine.process_file(input_path, &output_path, &opts)]
    };

    let mut tally = Tally::default();
    for r in &results {
        tally.record(r);
        report(r, &cli);
    }

    if results.len() > 1 && !cli.quiet {
        eprintln!("\n{tally}");
    }

    if tally.failed > 0 {
        process::exit(1);
    }
}

/// Per-run counts, one bucket per [`ProcessResult`] state.
#[derive(Default)]
struct Tally {
    cleaned: usize,
    copied: usize,
    failed: usize,
}

impl Tally {
    fn record(&mut self, result: &ProcessResult) {
        match (result.success, result.skipped) {
            (true, false) => self.cleaned += 1,
            (true, true) => self.copied += 1,
            (false, _) => self.failed += 1,
        }
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total = self.cleaned + self.copied + self.failed;
        write!(
            f,
            "{total} file(s): {} cleaned, {} copied unchanged, {} failed",
            self.cleaned, self.copied, self.failed
        )
    }
}

fn report(result: &ProcessResult, cli: &Cli) {
    let name = result
        .path
        .file_name()
        .map_or_else(|| result.path.to_string_lossy(), |f| f.to_string_lossy());

    match (result.success, result.skipped) {
        (false, _) => eprintln!("[FAIL] {name}: {}", result.message),
        _ if cli.quiet => {}
        (true, true) => eprintln!("[SKIP] {name}: {}", result.message),
        (true, false) if cli.verbose => eprintln!("[OK] {name}: {}", result.message),
        (true, false) => eprintln!("[OK] {name}"),
    }
}

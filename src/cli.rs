// ============================================================================
// ColorFE CLI — headless export of colored pages via command-line arguments
// ============================================================================
//
// Usage examples:
//   colorfe --input drawing/eagle.png --output eagle-colored.png
//   colorfe -i drawing/eagle.png                  (output path derived from input)
//   colorfe -i drawing/eagle.png --clear          (wipe stored coloring state)
//   colorfe -i page.png --state-dir ./state -v
//
// No interactive host is involved: the page is decoded, any persisted
// coloring state is restored and composited, and the result is written as a
// PNG. All processing runs synchronously on the current thread.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::io;
use crate::palette::Palette;
use crate::session::ColoringSession;
use crate::store::{FileStore, PixelStore};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// ColorFE headless page exporter.
///
/// Restore saved coloring state for a page and export the composed image.
#[derive(Parser, Debug)]
#[command(
    name = "colorfe",
    about = "ColorFE headless coloring-page exporter",
    long_about = "Decode a coloring page, restore its saved coloring state, and write\n\
                  the composed result (line art + colored layer) as a PNG — no host\n\
                  UI required.\n\n\
                  Example:\n  \
                  colorfe --input drawing/eagle.png --output eagle-colored.png\n  \
                  colorfe -i drawing/eagle.png --clear"
)]
pub struct CliArgs {
    /// Input coloring page (PNG or JPEG). Its path doubles as the image
    /// identity used to key stored coloring state.
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output PNG path. Defaults to "<input stem>.colored.png" next to the
    /// input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory holding stored coloring state. Defaults to the OS data
    /// directory (ColorFE/state).
    #[arg(long, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Wipe the stored coloring state for the input page instead of
    /// exporting.
    #[arg(long)]
    pub clear: bool,

    /// Print per-step timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the headless export and return an OS exit code.
/// `0` = success, `1` = decode/export failure.
pub fn run(args: CliArgs) -> ExitCode {
    let started = Instant::now();
    let image_id = args.input.to_string_lossy().to_string();

    let root = args
        .state_dir
        .clone()
        .unwrap_or_else(FileStore::default_root);
    let mut store = FileStore::new(root);

    if args.clear {
        return match store.clear(&image_id) {
            Ok(()) => {
                println!("cleared stored state for '{}'", image_id);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: could not clear stored state: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let page = match io::decode_page(&args.input) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if args.verbose {
        println!(
            "decoded {}x{} in {:.1?}",
            page.width(),
            page.height(),
            started.elapsed()
        );
    }

    let session = ColoringSession::open(image_id, page, Palette::default(), Box::new(store));
    if args.verbose {
        println!(
            "restored {} colored pixels ({} paintable)",
            session.colored().len(),
            session.allowed().paintable_count()
        );
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("colored.png"));
    let composed = session.composed();
    if let Err(e) = io::write_png(&composed, &output) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    if args.verbose {
        println!("wrote {} in {:.1?} total", output.display(), started.elapsed());
    } else {
        println!("wrote {}", output.display());
    }
    ExitCode::SUCCESS
}

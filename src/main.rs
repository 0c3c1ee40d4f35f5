use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use eanscan::{BarcodeScanner, ImageSource, LocatorConfig, ReaderConfig};

#[derive(Parser)]
#[command(name = "eanscan")]
#[command(about = "Locate and decode EAN-13 barcodes in photos")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Maximum angle between parallel bar edges, in degrees
    #[arg(long, default_value_t = 2.0)]
    angle_tolerance: f64,

    /// How many times each crop's rows are sampled per threshold
    #[arg(long, default_value_t = 2)]
    passes: usize,

    /// Reject decodes whose check digit does not match
    #[arg(long)]
    require_checksum: bool,

    /// Only read barcodes left to right
    #[arg(long)]
    no_reverse: bool,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let default = if verbose { "eanscan=debug" } else { "eanscan=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    if args.verbose {
        println!("Loading image: {:?}", args.image_path);
    }

    let img = ImageSource::from_path(&args.image_path)
        .decode()
        .context("Failed to decode image")?;

    if args.verbose {
        println!("Image loaded: {}x{}\n", img.width(), img.height());
    }

    let locator = LocatorConfig::default().with_angle_tolerance(args.angle_tolerance);
    let reader = ReaderConfig::default()
        .with_sampling_passes(args.passes)
        .with_try_reversed(!args.no_reverse)
        .with_require_valid_checksum(args.require_checksum);

    let mut scanner = BarcodeScanner::new(locator, reader).with_verbose(args.verbose);
    if let Some(debug_dir) = args.debug_out {
        scanner = scanner.with_debug(debug_dir);
    }

    let candidates = scanner.candidates(&img)?;
    if args.verbose {
        println!("\n{} scanlines decoded in total", candidates.len());
    }

    match eanscan::majority_vote(&candidates) {
        Some(code) => {
            let votes = candidates.iter().filter(|c| **c == code).count();
            if args.verbose {
                println!("Barcode found: {} ({} of {} votes)", code, votes, candidates.len());
            } else {
                println!("{}", code);
            }
            Ok(())
        }
        None => {
            eprintln!("No barcode found");
            std::process::exit(1);
        }
    }
}

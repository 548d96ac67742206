//! ssim-compare CLI - structural similarity of two images

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod compare;

/// Compare two images and print their SSIM score.
///
/// The score lies between -1 and 1 (1 = identical). Images of different size
/// are cropped to their common top-left region; a grayscale image compared
/// with a color image makes both grayscale.
#[derive(Debug, Parser)]
#[command(name = "ssim-compare")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to image one
    pub image1: PathBuf,

    /// Path to image two
    pub image2: PathBuf,

    /// Convert images to gray before comparison
    #[arg(short, long)]
    pub gray: bool,

    /// Show initial arguments and logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Show nothing, not even the score of the comparison
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the comparison report as JSON
    #[arg(long, conflicts_with = "quiet")]
    pub json: bool,

    /// SSIM configuration file (JSON); flags below override its values
    #[arg(long, env = "SSIM_COMPARE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Window side length (odd)
    #[arg(long)]
    pub window_size: Option<usize>,

    /// Standard deviation of the Gaussian window
    #[arg(long, conflicts_with = "uniform")]
    pub sigma: Option<f64>,

    /// Use a uniform window instead of a Gaussian one
    #[arg(long)]
    pub uniform: bool,

    /// Dynamic range of the samples (default: from the image bit depth)
    #[arg(long)]
    pub dynamic_range: Option<f64>,

    /// Luminance stabilization factor
    #[arg(long)]
    pub k1: Option<f64>,

    /// Contrast stabilization factor
    #[arg(long)]
    pub k2: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        println!("ssim-compare: {}", env!("CARGO_PKG_VERSION"));
        println!("{cli:#?}");

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    compare::run(&cli)
}

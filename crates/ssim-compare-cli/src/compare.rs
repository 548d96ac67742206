//! Compare command.

use std::path::Path;

use anyhow::{Context, Result};
use ssim_compare::{
    CompareOptions, Comparison, DecoderRegistry, SsimConfig, Weighting, compare_files,
};
use tracing::debug;

use crate::Cli;

pub fn run(cli: &Cli) -> Result<()> {
    let options = CompareOptions {
        gray: cli.gray,
        ssim: ssim_config(cli)?,
    };

    let registry = DecoderRegistry::with_defaults();
    debug!(decoders = ?registry.names(), "decoders available");

    let comparison = compare_files(&cli.image1, &cli.image2, &options, &registry)
        .with_context(|| {
            format!(
                "Failed to compare {} with {}",
                cli.image1.display(),
                cli.image2.display()
            )
        })?;

    if let Some(warning) = downgrade_warning(&comparison, cli) {
        eprintln!("{warning}");
    }
    if let Some(output) = render(&comparison, cli)? {
        println!("{output}");
    }

    Ok(())
}

/// Text printed to stdout for a finished comparison, `None` when quiet.
///
/// Scores use `{:?}` so whole numbers keep their decimal point (`1.0`).
fn render(comparison: &Comparison, cli: &Cli) -> Result<Option<String>> {
    if cli.quiet {
        return Ok(None);
    }
    let output = if cli.json {
        serde_json::to_string_pretty(comparison)?
    } else if cli.verbose {
        format!("Score: {:?}", comparison.score)
    } else {
        format!("{:?}", comparison.score)
    };
    Ok(Some(output))
}

/// Stderr notice when the inputs were converted to grayscale.
///
/// Verbose runs already log the conversion through `tracing`.
fn downgrade_warning(comparison: &Comparison, cli: &Cli) -> Option<&'static str> {
    (comparison.downgraded_to_gray && !cli.quiet && !cli.verbose).then_some(
        "WARNING: images given have different dimensions\n\
         \tConverted given images to Black/White before comparison",
    )
}

/// Build the SSIM configuration from the optional config file and flags.
fn ssim_config(cli: &Cli) -> Result<SsimConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SsimConfig::default(),
    };

    if let Some(size) = cli.window_size {
        config.window_size = size;
    }
    if cli.uniform {
        config.weighting = Weighting::Uniform;
    } else if let Some(sigma) = cli.sigma {
        config.weighting = Weighting::Gaussian { sigma };
    }
    if let Some(range) = cli.dynamic_range {
        config.dynamic_range = Some(range);
    }
    if let Some(k1) = cli.k1 {
        config.k1 = k1;
    }
    if let Some(k2) = cli.k2 {
        config.k2 = k2;
    }

    Ok(config)
}

fn load_config(path: &Path) -> Result<SsimConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as SSIM configuration", path.display()))
}

//! End-to-end comparison of two image files.
//!
//! Decodes both files, downgrades them to grayscale when their channel
//! layouts differ, crops them to a common size and runs the SSIM engine.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::array::ImageArray;
use crate::crop::crop_to_smallest;
use crate::decode::{DecodeOptions, DecoderRegistry};
use crate::error::Result;
use crate::metrics::{SsimConfig, SsimResult, structural_similarity};

/// Options for [`compare_files`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Convert both images to grayscale before comparing.
    pub gray: bool,
    /// SSIM engine settings.
    pub ssim: SsimConfig,
}

/// Result of comparing two files.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    /// Mean SSIM score.
    pub score: f64,
    /// Mean SSIM per channel.
    pub channel_scores: Vec<f64>,
    /// Shape both arrays were compared at.
    pub compared_shape: Vec<usize>,
    /// Spatial shape of the similarity map.
    pub map_shape: (usize, usize),
    /// Whether the inputs were converted to grayscale because their channel
    /// layouts differed.
    pub downgraded_to_gray: bool,
    /// Full engine output, including the similarity map.
    #[serde(skip)]
    pub ssim: SsimResult,
}

/// Compare two image files.
///
/// # Errors
///
/// Propagates decoder errors ([`Error::FileNotFound`](crate::Error::FileNotFound),
/// [`Error::Decode`](crate::Error::Decode)) and engine errors unchanged.
pub fn compare_files(
    path_a: &Path,
    path_b: &Path,
    options: &CompareOptions,
    registry: &DecoderRegistry,
) -> Result<Comparison> {
    let decode = DecodeOptions { gray: options.gray };
    let mut a = registry.decode(path_a, decode)?;
    let mut b = registry.decode(path_b, decode)?;

    let mut downgraded = false;
    if a.ndim() != b.ndim() {
        warn!(
            left = ?a.shape(),
            right = ?b.shape(),
            "images have different dimensions, converting both to grayscale"
        );
        let gray = DecodeOptions { gray: true };
        a = registry.decode(path_a, gray)?;
        b = registry.decode(path_b, gray)?;
        downgraded = true;
    }

    let mut comparison = compare_arrays(&a, &b, &options.ssim)?;
    comparison.downgraded_to_gray |= downgraded;
    Ok(comparison)
}

/// Compare two in-memory arrays, harmonizing their layout and size first.
///
/// Arrays with different channel counts are both converted to grayscale,
/// then cropped to their smallest common height and width. Arrays of
/// different sample types are rescaled to `[0, 1]` unless `config` carries an
/// explicit dynamic range.
pub fn compare_arrays(a: &ImageArray, b: &ImageArray, config: &SsimConfig) -> Result<Comparison> {
    let mut downgraded = false;
    let (a, b) = if a.ndim() != b.ndim() || a.channels() != b.channels() {
        debug!(left = ?a.shape(), right = ?b.shape(), "channel layouts differ");
        downgraded = true;
        crop_to_smallest(&a.to_gray(), &b.to_gray())?
    } else {
        crop_to_smallest(a, b)?
    };

    let (a, b) = if a.sample_type() != b.sample_type() && config.dynamic_range.is_none() {
        debug!(
            left = %a.sample_type(),
            right = %b.sample_type(),
            "sample types differ, rescaling both to unit range"
        );
        (a.to_unit_range(), b.to_unit_range())
    } else {
        (a, b)
    };

    let ssim = structural_similarity(&a, &b, config)?;
    Ok(Comparison {
        score: ssim.score,
        channel_scores: ssim.channel_scores.clone(),
        compared_shape: a.shape(),
        map_shape: ssim.map_shape(),
        downgraded_to_gray: downgraded,
        ssim,
    })
}

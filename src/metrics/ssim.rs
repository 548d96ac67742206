//! SSIM engine.
//!
//! Local means, variances and covariance are estimated with the configured
//! window in "valid" mode, combined into the SSIM index at every window
//! position, and averaged per channel and then across channels.

use ndarray::{Array2, ArrayView2, Zip};
use rayon::prelude::*;
use tracing::debug;

use super::window::Window;
use super::{SsimConfig, SsimResult};
use crate::array::ImageArray;
use crate::error::{Error, Result};

/// Calculate SSIM between two images of identical shape.
///
/// # Arguments
///
/// * `a` - First image.
/// * `b` - Second image, same shape as `a`.
/// * `config` - Window and stabilization settings.
///
/// # Returns
///
/// An [`SsimResult`] whose score is the unweighted mean of the per-channel
/// scores and whose map is the channel-wise mean of the per-channel maps.
/// Identical inputs score 1.0.
///
/// # Errors
///
/// - [`Error::ShapeMismatch`] if the shapes differ.
/// - [`Error::InvalidConfiguration`] if the window does not fit the images or
///   a parameter is out of range.
/// - [`Error::SampleTypeMismatch`] if no dynamic range is configured and the
///   sample types differ.
pub fn structural_similarity(
    a: &ImageArray,
    b: &ImageArray,
    config: &SsimConfig,
) -> Result<SsimResult> {
    if a.shape() != b.shape() {
        return Err(Error::ShapeMismatch {
            expected: a.shape(),
            actual: b.shape(),
        });
    }

    config.validate(a.height(), a.width())?;

    let dynamic_range = match config.dynamic_range {
        Some(range) => range,
        None if a.sample_type() == b.sample_type() => a.sample_type().dynamic_range(),
        None => {
            return Err(Error::SampleTypeMismatch {
                left: a.sample_type().to_string(),
                right: b.sample_type().to_string(),
            });
        }
    };

    let (c1, c2) = config.constants(dynamic_range);
    let window = Window::new(config.window_size, config.weighting);
    debug!(
        shape = ?a.shape(),
        window_size = config.window_size,
        dynamic_range,
        c1,
        c2,
        "structural_similarity"
    );

    let channel_map = |c: usize| ssim_channel(a.channel(c), b.channel(c), &window, c1, c2);
    let maps: Vec<Array2<f64>> = if config.parallel && a.channels() > 1 {
        (0..a.channels()).into_par_iter().map(channel_map).collect()
    } else {
        (0..a.channels()).map(channel_map).collect()
    };

    let channel_scores: Vec<f64> = maps.iter().map(mean).collect();
    for (channel, score) in channel_scores.iter().enumerate() {
        debug!(channel, score, "channel ssim");
    }

    let score = channel_scores.iter().sum::<f64>() / channel_scores.len() as f64;
    let map = channel_mean(maps);

    Ok(SsimResult {
        score,
        channel_scores,
        map,
    })
}

/// SSIM map of a single channel pair.
///
/// `a` and `b` must have the same shape and be at least as large as the
/// window. The map has shape `(H - size + 1, W - size + 1)`.
#[must_use]
pub fn ssim_channel(
    a: ArrayView2<'_, f64>,
    b: ArrayView2<'_, f64>,
    window: &Window,
    c1: f64,
    c2: f64,
) -> Array2<f64> {
    let aa = &a * &a;
    let bb = &b * &b;
    let ab = &a * &b;

    let mu_a = window.filter_valid(a);
    let mu_b = window.filter_valid(b);
    let e_aa = window.filter_valid(aa.view());
    let e_bb = window.filter_valid(bb.view());
    let e_ab = window.filter_valid(ab.view());

    let mut map = Array2::<f64>::zeros(mu_a.dim());
    Zip::from(&mut map)
        .and(&mu_a)
        .and(&mu_b)
        .and(&e_aa)
        .and(&e_bb)
        .and(&e_ab)
        .for_each(|out, &ma, &mb, &eaa, &ebb, &eab| {
            let var_a = eaa - ma * ma;
            let var_b = ebb - mb * mb;
            let cov = eab - ma * mb;

            let numerator = (2.0 * ma * mb + c1) * (2.0 * cov + c2);
            let denominator = (ma * ma + mb * mb + c1) * (var_a + var_b + c2);
            *out = numerator / denominator;
        });

    map
}

fn mean(map: &Array2<f64>) -> f64 {
    map.sum() / map.len() as f64
}

fn channel_mean(maps: Vec<Array2<f64>>) -> Array2<f64> {
    let count = maps.len();
    let mut iter = maps.into_iter();
    let Some(mut acc) = iter.next() else {
        return Array2::zeros((0, 0));
    };
    if count == 1 {
        return acc;
    }
    for map in iter {
        acc += &map;
    }
    acc / count as f64
}

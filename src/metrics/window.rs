//! Sliding-window weighting for local statistics.
//!
//! Windows are separable: the 2-D weights are the outer product of a
//! normalized 1-D kernel with itself, so filtering runs as a horizontal pass
//! followed by a vertical pass.

use ndarray::{Array2, ArrayView2, Axis, Zip};

use super::Weighting;

/// 1-D Gaussian kernel of `size` taps centered on the middle tap, normalized
/// to sum to one.
#[must_use]
pub fn gaussian_kernel(size: usize, sigma: f64) -> Vec<f64> {
    let radius = (size / 2) as f64;
    let denom = 2.0 * sigma * sigma;
    let raw: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - radius;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|v| v / sum).collect()
}

/// 1-D box kernel of `size` equal taps.
#[must_use]
pub fn uniform_kernel(size: usize) -> Vec<f64> {
    vec![1.0 / size as f64; size]
}

/// A square, separable weighting window.
#[derive(Debug, Clone)]
pub struct Window {
    kernel: Vec<f64>,
}

impl Window {
    /// Build a window of side `size`.
    ///
    /// `size` must be positive; [`SsimConfig::validate`](super::SsimConfig::validate)
    /// checks that before the engine builds a window.
    #[must_use]
    pub fn new(size: usize, weighting: Weighting) -> Self {
        let kernel = match weighting {
            Weighting::Gaussian { sigma } => gaussian_kernel(size, sigma),
            Weighting::Uniform => uniform_kernel(size),
        };
        Self { kernel }
    }

    /// Side length of the window.
    #[must_use]
    pub fn size(&self) -> usize {
        self.kernel.len()
    }

    /// The normalized 1-D kernel.
    #[must_use]
    pub fn kernel(&self) -> &[f64] {
        &self.kernel
    }

    /// Weighted average of `input` at every position where the window fits
    /// entirely inside it.
    ///
    /// Output shape is `(H - size + 1, W - size + 1)`; the caller guarantees
    /// the window is no larger than the input.
    #[must_use]
    pub fn filter_valid(&self, input: ArrayView2<'_, f64>) -> Array2<f64> {
        let size = self.size();
        let (h, w) = input.dim();
        let out_h = h + 1 - size;
        let out_w = w + 1 - size;

        // Horizontal pass: (h, w) -> (h, out_w)
        let mut rows = Array2::<f64>::zeros((h, out_w));
        for (k, &weight) in self.kernel.iter().enumerate() {
            let shifted = input.slice(ndarray::s![.., k..k + out_w]);
            Zip::from(&mut rows)
                .and(&shifted)
                .for_each(|acc, &v| *acc += weight * v);
        }

        // Vertical pass: (h, out_w) -> (out_h, out_w)
        let mut out = Array2::<f64>::zeros((out_h, out_w));
        for (k, &weight) in self.kernel.iter().enumerate() {
            let shifted = rows.slice_axis(Axis(0), (k..k + out_h).into());
            Zip::from(&mut out)
                .and(&shifted)
                .for_each(|acc, &v| *acc += weight * v);
        }

        out
    }
}

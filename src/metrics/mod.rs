//! Structural similarity metric.
//!
//! This module provides the SSIM engine and its configuration:
//!
//! - [`SsimConfig`]: window size, weighting, dynamic range and the `k1`/`k2`
//!   stabilization constants
//! - [`structural_similarity`]: the engine itself
//! - [`SsimResult`]: mean score, per-channel scores and the similarity map
//!
//! ## Defaults
//!
//! | Parameter | Default | Notes |
//! |-----------|---------|-------|
//! | `window_size` | 11 | Odd, at most the smaller image side |
//! | `weighting` | Gaussian, sigma 1.5 | `Uniform` gives a box window |
//! | `dynamic_range` | from sample type | 255 for u8, 65535 for u16, 1.0 for float |
//! | `k1` | 0.01 | `C1 = (k1 * L)^2` |
//! | `k2` | 0.03 | `C2 = (k2 * L)^2` |
//!
//! Only window positions that fit entirely inside the image contribute, so a
//! `(H, W)` input yields a `(H - window_size + 1, W - window_size + 1)` map.

pub mod ssim;
pub mod window;

pub use ssim::{ssim_channel, structural_similarity};
pub use window::Window;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default window side length.
pub const DEFAULT_WINDOW_SIZE: usize = 11;
/// Default Gaussian standard deviation.
pub const DEFAULT_SIGMA: f64 = 1.5;
/// Default luminance stabilization factor.
pub const DEFAULT_K1: f64 = 0.01;
/// Default contrast stabilization factor.
pub const DEFAULT_K2: f64 = 0.03;

/// Weighting applied to samples inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Weighting {
    /// Gaussian weights with the given standard deviation.
    Gaussian {
        /// Standard deviation in pixels.
        sigma: f64,
    },
    /// Equal weights for every sample.
    Uniform,
}

impl Default for Weighting {
    fn default() -> Self {
        Self::Gaussian {
            sigma: DEFAULT_SIGMA,
        }
    }
}

/// Configuration for an SSIM comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsimConfig {
    /// Side length of the square window (odd).
    pub window_size: usize,
    /// Window weighting.
    pub weighting: Weighting,
    /// Span of valid sample values. `None` derives it from the sample type.
    pub dynamic_range: Option<f64>,
    /// Luminance stabilization factor.
    pub k1: f64,
    /// Contrast stabilization factor.
    pub k2: f64,
    /// Process channels on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SsimConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            weighting: Weighting::default(),
            dynamic_range: None,
            k1: DEFAULT_K1,
            k2: DEFAULT_K2,
            parallel: true,
        }
    }
}

impl SsimConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> SsimConfigBuilder {
        SsimConfigBuilder::default()
    }

    /// Check that the configuration is usable for a `height` x `width` image.
    pub fn validate(&self, height: usize, width: usize) -> Result<()> {
        let w = self.window_size;
        if w == 0 {
            return Err(invalid("window_size must be positive"));
        }
        if w % 2 == 0 {
            return Err(invalid(format!("window_size must be odd, got {w}")));
        }
        if w > height || w > width {
            return Err(invalid(format!(
                "window_size {w} exceeds image size {height}x{width}"
            )));
        }

        if let Weighting::Gaussian { sigma } = self.weighting {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(invalid(format!("sigma must be positive, got {sigma}")));
            }
        }

        for (name, k) in [("k1", self.k1), ("k2", self.k2)] {
            if !(k.is_finite() && k > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {k}")));
            }
        }

        if let Some(range) = self.dynamic_range {
            if !(range.is_finite() && range > 0.0) {
                return Err(invalid(format!(
                    "dynamic_range must be positive, got {range}"
                )));
            }
        }

        Ok(())
    }

    /// Stabilization constants `(C1, C2)` for the given dynamic range.
    #[must_use]
    pub fn constants(&self, dynamic_range: f64) -> (f64, f64) {
        let c1 = (self.k1 * dynamic_range).powi(2);
        let c2 = (self.k2 * dynamic_range).powi(2);
        (c1, c2)
    }
}

fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidConfiguration(reason.into())
}

/// Builder for [`SsimConfig`].
#[derive(Debug, Default)]
pub struct SsimConfigBuilder {
    window_size: Option<usize>,
    weighting: Option<Weighting>,
    dynamic_range: Option<f64>,
    k1: Option<f64>,
    k2: Option<f64>,
    parallel: Option<bool>,
}

impl SsimConfigBuilder {
    /// Set the window side length.
    #[must_use]
    pub fn window_size(mut self, size: usize) -> Self {
        self.window_size = Some(size);
        self
    }

    /// Use a Gaussian window with the given standard deviation.
    #[must_use]
    pub fn gaussian(mut self, sigma: f64) -> Self {
        self.weighting = Some(Weighting::Gaussian { sigma });
        self
    }

    /// Use a uniform (box) window.
    #[must_use]
    pub fn uniform(mut self) -> Self {
        self.weighting = Some(Weighting::Uniform);
        self
    }

    /// Set an explicit dynamic range.
    #[must_use]
    pub fn dynamic_range(mut self, range: f64) -> Self {
        self.dynamic_range = Some(range);
        self
    }

    /// Set the luminance stabilization factor.
    #[must_use]
    pub fn k1(mut self, k1: f64) -> Self {
        self.k1 = Some(k1);
        self
    }

    /// Set the contrast stabilization factor.
    #[must_use]
    pub fn k2(mut self, k2: f64) -> Self {
        self.k2 = Some(k2);
        self
    }

    /// Enable or disable per-channel parallelism.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Build the configuration. Unset fields take their defaults.
    #[must_use]
    pub fn build(self) -> SsimConfig {
        let defaults = SsimConfig::default();
        SsimConfig {
            window_size: self.window_size.unwrap_or(defaults.window_size),
            weighting: self.weighting.unwrap_or(defaults.weighting),
            dynamic_range: self.dynamic_range.or(defaults.dynamic_range),
            k1: self.k1.unwrap_or(defaults.k1),
            k2: self.k2.unwrap_or(defaults.k2),
            parallel: self.parallel.unwrap_or(defaults.parallel),
        }
    }
}

/// Outcome of an SSIM comparison.
#[derive(Debug, Clone, Serialize)]
pub struct SsimResult {
    /// Mean SSIM over all channels.
    pub score: f64,
    /// Mean SSIM of each channel, in channel order.
    pub channel_scores: Vec<f64>,
    /// Per-position SSIM, averaged over channels.
    pub map: Array2<f64>,
}

impl SsimResult {
    /// Spatial shape of the similarity map.
    #[must_use]
    pub fn map_shape(&self) -> (usize, usize) {
        self.map.dim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SsimConfig::default();
        assert_eq!(config.window_size, 11);
        assert_eq!(config.weighting, Weighting::Gaussian { sigma: 1.5 });
        assert_eq!(config.dynamic_range, None);
        assert!((config.k1 - 0.01).abs() < f64::EPSILON);
        assert!((config.k2 - 0.03).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder() {
        let config = SsimConfig::builder()
            .window_size(7)
            .uniform()
            .dynamic_range(1.0)
            .parallel(false)
            .build();

        assert_eq!(config.window_size, 7);
        assert_eq!(config.weighting, Weighting::Uniform);
        assert_eq!(config.dynamic_range, Some(1.0));
        assert!(!config.parallel);
        assert!((config.k2 - DEFAULT_K2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_constants() {
        let (c1, c2) = SsimConfig::default().constants(255.0);
        assert!((c1 - 6.5025).abs() < 1e-9);
        assert!((c2 - 58.5225).abs() < 1e-9);
    }

    #[test]
    fn test_validate_window() {
        let config = SsimConfig::default();
        assert!(config.validate(11, 11).is_ok());
        assert!(matches!(config.validate(10, 20), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(config.validate(20, 10), Err(Error::InvalidConfiguration(_))));

        let even = SsimConfig::builder().window_size(8).build();
        assert!(matches!(even.validate(20, 20), Err(Error::InvalidConfiguration(_))));

        let zero = SsimConfig::builder().window_size(0).build();
        assert!(matches!(zero.validate(20, 20), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_validate_parameters() {
        let bad_sigma = SsimConfig::builder().gaussian(0.0).build();
        assert!(bad_sigma.validate(20, 20).is_err());

        let bad_k = SsimConfig::builder().k1(-0.1).build();
        assert!(bad_k.validate(20, 20).is_err());

        // Zero constants leave flat patches at 0/0.
        let zero_k1 = SsimConfig::builder().k1(0.0).build();
        assert!(matches!(zero_k1.validate(20, 20), Err(Error::InvalidConfiguration(_))));
        let zero_k2 = SsimConfig::builder().k2(0.0).build();
        assert!(matches!(zero_k2.validate(20, 20), Err(Error::InvalidConfiguration(_))));

        let bad_range = SsimConfig::builder().dynamic_range(f64::NAN).build();
        assert!(bad_range.validate(20, 20).is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: SsimConfig =
            serde_json::from_str(r#"{"window_size": 7, "weighting": {"kind": "uniform"}}"#)
                .unwrap();
        assert_eq!(config.window_size, 7);
        assert_eq!(config.weighting, Weighting::Uniform);
        assert!((config.k1 - DEFAULT_K1).abs() < f64::EPSILON);
        assert!(config.parallel);
    }

    #[test]
    fn test_config_json_roundtrip_gaussian() {
        let json = serde_json::to_string(&SsimConfig::default()).unwrap();
        assert!(json.contains(r#""kind":"gaussian""#));
        let back: SsimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SsimConfig::default());
    }
}

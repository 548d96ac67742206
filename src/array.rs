//! Dense image arrays handed to the SSIM engine.
//!
//! An [`ImageArray`] always stores its samples as `f64` in `(height, width,
//! channels)` layout. Grayscale arrays keep a single channel and report two
//! dimensions, color arrays report three. The original sample domain is kept
//! as a [`SampleType`] so the engine can derive a dynamic range.

use std::fmt;

use imgref::ImgRef;
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis, s};
use rgb::{RGB, RGB16, RGB8};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// BT.601 luma weights (same as PIL's `convert('L')`).
const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Numeric domain of the decoded samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    /// 8-bit unsigned samples (0-255).
    U8,
    /// 16-bit unsigned samples (0-65535).
    U16,
    /// Floating point samples (0.0-1.0).
    F32,
}

impl SampleType {
    /// Span of valid sample values for this type.
    #[must_use]
    pub fn dynamic_range(self) -> f64 {
        match self {
            Self::U8 => 255.0,
            Self::U16 => 65535.0,
            Self::F32 => 1.0,
        }
    }

    /// Whether samples of this type are integers.
    #[must_use]
    pub fn is_integer(self) -> bool {
        !matches!(self, Self::F32)
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::F32 => write!(f, "f32"),
        }
    }
}

/// Whether an array is single-channel (2-D) or multi-channel (3-D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Shape `(H, W)`.
    Gray,
    /// Shape `(H, W, C)`.
    Color,
}

/// A non-empty image array with `f64` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageArray {
    data: Array3<f64>,
    mode: ColorMode,
    sample_type: SampleType,
}

impl ImageArray {
    /// Create a grayscale array from `(H, W)` samples.
    pub fn from_gray(data: Array2<f64>, sample_type: SampleType) -> Result<Self> {
        Self::new(data.insert_axis(Axis(2)), ColorMode::Gray, sample_type)
    }

    /// Create a color array from `(H, W, C)` samples.
    pub fn from_color(data: Array3<f64>, sample_type: SampleType) -> Result<Self> {
        Self::new(data, ColorMode::Color, sample_type)
    }

    /// Create a grayscale array from an 8-bit luma buffer.
    pub fn from_gray8(img: ImgRef<'_, u8>) -> Result<Self> {
        let data = Array2::from_shape_fn((img.height(), img.width()), |(y, x)| {
            f64::from(img.buf()[y * img.stride() + x])
        });
        Self::from_gray(data, SampleType::U8)
    }

    /// Create a grayscale array from a 16-bit luma buffer.
    pub fn from_gray16(img: ImgRef<'_, u16>) -> Result<Self> {
        let data = Array2::from_shape_fn((img.height(), img.width()), |(y, x)| {
            f64::from(img.buf()[y * img.stride() + x])
        });
        Self::from_gray(data, SampleType::U16)
    }

    /// Create a 3-channel color array from an RGB8 buffer.
    pub fn from_rgb8(img: ImgRef<'_, RGB8>) -> Result<Self> {
        let data = Array3::from_shape_fn((img.height(), img.width(), 3), |(y, x, c)| {
            let px = img.buf()[y * img.stride() + x];
            f64::from([px.r, px.g, px.b][c])
        });
        Self::from_color(data, SampleType::U8)
    }

    /// Create a 3-channel color array from an RGB16 buffer.
    pub fn from_rgb16(img: ImgRef<'_, RGB16>) -> Result<Self> {
        let data = Array3::from_shape_fn((img.height(), img.width(), 3), |(y, x, c)| {
            let px = img.buf()[y * img.stride() + x];
            f64::from([px.r, px.g, px.b][c])
        });
        Self::from_color(data, SampleType::U16)
    }

    /// Create a grayscale array from a floating point luma buffer.
    pub fn from_gray_f32(img: ImgRef<'_, f32>) -> Result<Self> {
        let data = Array2::from_shape_fn((img.height(), img.width()), |(y, x)| {
            f64::from(img.buf()[y * img.stride() + x])
        });
        Self::from_gray(data, SampleType::F32)
    }

    /// Create a 3-channel color array from a floating point RGB buffer.
    pub fn from_rgb_f32(img: ImgRef<'_, RGB<f32>>) -> Result<Self> {
        let data = Array3::from_shape_fn((img.height(), img.width(), 3), |(y, x, c)| {
            let px = img.buf()[y * img.stride() + x];
            f64::from([px.r, px.g, px.b][c])
        });
        Self::from_color(data, SampleType::F32)
    }

    fn new(data: Array3<f64>, mode: ColorMode, sample_type: SampleType) -> Result<Self> {
        let array = Self {
            data,
            mode,
            sample_type,
        };
        if array.data.is_empty() {
            return Err(Error::EmptyImage(array.shape()));
        }
        Ok(array)
    }

    /// Image height (first axis).
    #[must_use]
    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    /// Image width (second axis).
    #[must_use]
    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    /// Number of channels; always 1 for grayscale arrays.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// Number of dimensions: 2 for grayscale, 3 for color.
    #[must_use]
    pub fn ndim(&self) -> usize {
        match self.mode {
            ColorMode::Gray => 2,
            ColorMode::Color => 3,
        }
    }

    /// Shape as `[H, W]` or `[H, W, C]`.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        let (h, w, c) = self.data.dim();
        match self.mode {
            ColorMode::Gray => vec![h, w],
            ColorMode::Color => vec![h, w, c],
        }
    }

    /// Whether the array is gray or color.
    #[must_use]
    pub fn color_mode(&self) -> ColorMode {
        self.mode
    }

    /// Sample type the values were decoded from.
    #[must_use]
    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    /// View of a single channel as a `(H, W)` plane.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= self.channels()`.
    #[must_use]
    pub fn channel(&self, channel: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(2), channel)
    }

    /// View of all samples in `(H, W, C)` layout.
    #[must_use]
    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    /// Copy of the top-left `height` x `width` region.
    pub(crate) fn cropped(&self, height: usize, width: usize) -> Result<Self> {
        let data = self.data.slice(s![..height, ..width, ..]).to_owned();
        Self::new(data, self.mode, self.sample_type)
    }

    /// Convert to a single-channel grayscale array.
    ///
    /// RGB(A) arrays are reduced with BT.601 luma weights, gray+alpha arrays
    /// keep their first channel. Integer sample types are rounded so the
    /// result stays in the original domain.
    #[must_use]
    pub fn to_gray(&self) -> Self {
        if self.mode == ColorMode::Gray {
            return self.clone();
        }

        let (h, w, c) = self.data.dim();
        let round = self.sample_type.is_integer();
        let data = match c {
            1 | 2 => self.channel(0).to_owned(),
            _ => Array2::from_shape_fn((h, w), |(y, x)| {
                let luma: f64 = LUMA_WEIGHTS
                    .iter()
                    .enumerate()
                    .map(|(ch, weight)| weight * self.data[[y, x, ch]])
                    .sum();
                if round { luma.round() } else { luma }
            }),
        };

        Self {
            data: data.insert_axis(Axis(2)),
            mode: ColorMode::Gray,
            sample_type: self.sample_type,
        }
    }

    /// Rescale the values to `[0, 1]` by the sample type's dynamic range.
    ///
    /// The result is tagged [`SampleType::F32`], so arrays decoded at
    /// different bit depths become directly comparable.
    #[must_use]
    pub fn to_unit_range(&self) -> Self {
        let range = self.sample_type.dynamic_range();
        Self {
            data: &self.data / range,
            mode: self.mode,
            sample_type: SampleType::F32,
        }
    }
}

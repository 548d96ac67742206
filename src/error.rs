//! Error types for ssim-compare operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ssim-compare operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or comparing images.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The two arrays handed to the SSIM engine differ in shape.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Shape of the first array.
        expected: Vec<usize>,
        /// Shape of the second array.
        actual: Vec<usize>,
    },

    /// The arrays differ in number of dimensions or channels and cannot be
    /// cropped to a common shape.
    #[error("Dimensionality mismatch: {left:?} vs {right:?}")]
    DimensionalityMismatch {
        /// Shape of the first array.
        left: Vec<usize>,
        /// Shape of the second array.
        right: Vec<usize>,
    },

    /// The sample types differ, so no dynamic range can be derived.
    #[error("Sample type mismatch: {left} vs {right} (set an explicit dynamic range)")]
    SampleTypeMismatch {
        /// Sample type of the first array.
        left: String,
        /// Sample type of the second array.
        right: String,
    },

    /// The SSIM configuration is unusable for the given input.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An image array has a zero-sized axis.
    #[error("Empty image: shape {0:?}")]
    EmptyImage(Vec<usize>),

    /// The image path does not exist.
    #[error("No such file or directory: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A decoder could not turn the file into an array.
    #[error("Image could not be decoded by {decoder}: {}: {reason}", .path.display())]
    Decode {
        /// Name of the decoder that failed.
        decoder: &'static str,
        /// Path of the image.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// No decoder is registered (all decoder features disabled).
    #[error("No image decoder available; enable the `image-decode` or `jpeg-decode` feature")]
    NoDecoder,

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

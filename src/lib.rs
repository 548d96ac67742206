//! # ssim-compare
//!
//! Structural similarity (SSIM) comparison of two images.
//!
//! The [`metrics`] module holds the SSIM engine, a pure function of two
//! same-shaped arrays and a configuration. Everything else is glue: decoders
//! that turn files into arrays, a shape harmonizer that crops both arrays to a
//! common size, and a file-level pipeline used by the CLI.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ssim_compare::{CompareOptions, DecoderRegistry, compare_files};
//!
//! let registry = DecoderRegistry::with_defaults();
//! let comparison = compare_files(
//!     "reference.png".as_ref(),
//!     "test.jpg".as_ref(),
//!     &CompareOptions::default(),
//!     &registry,
//! )?;
//! println!("{}", comparison.score);
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`array`]: Image arrays and grayscale conversion
//! - [`crop`]: Cropping two arrays to their common size
//! - [`metrics`]: The SSIM engine and its configuration
//! - [`decode`]: Swappable image decoders
//! - [`compare`]: File and array comparison pipeline
//!
//! ## Logging
//!
//! The library emits [`tracing`] events and never installs a subscriber;
//! binaries decide whether and where events are recorded.

pub mod array;
pub mod compare;
pub mod crop;
pub mod decode;
pub mod error;
pub mod metrics;

// Re-export commonly used types
pub use array::{ColorMode, ImageArray, SampleType};
pub use compare::{CompareOptions, Comparison, compare_arrays, compare_files};
pub use crop::crop_to_smallest;
pub use decode::{DecodeOptions, DecoderRegistry, ImageDecoder};
pub use error::{Error, Result};
pub use metrics::{SsimConfig, SsimResult, Weighting, structural_similarity};

//! Image decoders producing [`ImageArray`]s.
//!
//! Decoding is a swappable capability: every decoder implements
//! [`ImageDecoder`], and a [`DecoderRegistry`] tries them in priority order.
//! Two decoders are compiled in by default:
//!
//! | Decoder | Feature | Formats | Priority |
//! |---------|---------|---------|----------|
//! | [`ImageCrateDecoder`] | `image-decode` | everything the `image` crate reads | preferred |
//! | [`JpegDecoder`] | `jpeg-decode` | JPEG | fallback |
//!
//! # Example
//!
//! ```ignore
//! use ssim_compare::decode::{DecodeOptions, DecoderRegistry};
//!
//! let registry = DecoderRegistry::with_defaults();
//! let image = registry.decode("photo.png".as_ref(), DecodeOptions { gray: true })?;
//! assert_eq!(image.ndim(), 2);
//! ```

use std::path::Path;

use tracing::{debug, info};

use crate::array::ImageArray;
use crate::error::{Error, Result};

/// Options passed to every decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Return a 2-D grayscale array instead of a 3-D color array.
    pub gray: bool,
}

/// A way of turning an image file into an [`ImageArray`].
///
/// Implementations must return a 2-D array when `options.gray` is set and a
/// 3-D array with a channel axis otherwise. A file the decoder cannot handle
/// is reported as [`Error::Decode`] so the registry can try the next decoder.
pub trait ImageDecoder: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &'static str;

    /// Decode the file at `path`.
    fn decode(&self, path: &Path, options: DecodeOptions) -> Result<ImageArray>;
}

/// Ordered set of decoders; earlier entries are preferred.
#[derive(Default)]
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn ImageDecoder>>,
}

impl DecoderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every compiled-in decoder, `image` crate first.
    #[must_use]
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "image-decode")]
        registry.register(Box::new(ImageCrateDecoder));
        #[cfg(feature = "jpeg-decode")]
        registry.register(Box::new(JpegDecoder));
        registry
    }

    /// Append a decoder with lower priority than those already registered.
    pub fn register(&mut self, decoder: Box<dyn ImageDecoder>) -> &mut Self {
        debug!(decoder = decoder.name(), "registered decoder");
        self.decoders.push(decoder);
        self
    }

    /// Names of the registered decoders in priority order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.decoders.iter().map(|d| d.name()).collect()
    }

    /// Number of registered decoders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Whether no decoder is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decode `path` with the first decoder that succeeds.
    ///
    /// # Errors
    ///
    /// - [`Error::FileNotFound`] if `path` does not exist.
    /// - [`Error::NoDecoder`] if the registry is empty.
    /// - The last [`Error::Decode`] if every decoder rejected the file.
    /// - Any other decoder error unchanged.
    pub fn decode(&self, path: &Path, options: DecodeOptions) -> Result<ImageArray> {
        info!(path = %path.display(), gray = options.gray, "decoding image");
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let resolved = path.canonicalize()?;

        let mut last_error = None;
        for decoder in &self.decoders {
            match decoder.decode(&resolved, options) {
                Ok(image) => {
                    debug!(decoder = decoder.name(), shape = ?image.shape(), "decoded");
                    return Ok(image);
                }
                Err(err @ Error::Decode { .. }) => {
                    debug!(decoder = decoder.name(), error = %err, "decoder failed, trying next");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or(Error::NoDecoder))
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("decoders", &self.names())
            .finish()
    }
}

/// Decoder backed by the `image` crate.
///
/// Color output drops alpha and always has three channels; 16-bit and float
/// images keep their sample type.
#[cfg(feature = "image-decode")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

#[cfg(feature = "image-decode")]
impl ImageDecoder for ImageCrateDecoder {
    fn name(&self) -> &'static str {
        "image"
    }

    fn decode(&self, path: &Path, options: DecodeOptions) -> Result<ImageArray> {
        use ::image::DynamicImage;
        use imgref::ImgRef;
        use rgb::FromSlice;

        let img = ::image::open(path).map_err(|e| Error::Decode {
            decoder: self.name(),
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let width = img.width() as usize;
        let height = img.height() as usize;

        let high_depth = matches!(
            img,
            DynamicImage::ImageLuma16(_)
                | DynamicImage::ImageLumaA16(_)
                | DynamicImage::ImageRgb16(_)
                | DynamicImage::ImageRgba16(_)
        );
        let float = matches!(
            img,
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)
        );

        if options.gray {
            if high_depth {
                let luma = img.to_luma16();
                ImageArray::from_gray16(ImgRef::new(luma.as_raw().as_slice(), width, height))
            } else if float {
                let luma = img.to_luma32f();
                ImageArray::from_gray_f32(ImgRef::new(luma.as_raw().as_slice(), width, height))
            } else {
                let luma = img.to_luma8();
                ImageArray::from_gray8(ImgRef::new(luma.as_raw().as_slice(), width, height))
            }
        } else if high_depth {
            let rgb = img.to_rgb16();
            ImageArray::from_rgb16(ImgRef::new(rgb.as_raw().as_rgb(), width, height))
        } else if float {
            let rgb = img.to_rgb32f();
            ImageArray::from_rgb_f32(ImgRef::new(rgb.as_raw().as_rgb(), width, height))
        } else {
            let rgb = img.to_rgb8();
            ImageArray::from_rgb8(ImgRef::new(rgb.as_raw().as_rgb(), width, height))
        }
    }
}

/// JPEG-only decoder backed by `jpeg-decoder`.
///
/// Grayscale JPEGs are expanded to RGB for color output; grayscale output of
/// color JPEGs uses [`ImageArray::to_gray`]. CMYK JPEGs are rejected.
#[cfg(feature = "jpeg-decode")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegDecoder;

#[cfg(feature = "jpeg-decode")]
impl ImageDecoder for JpegDecoder {
    fn name(&self) -> &'static str {
        "jpeg-decoder"
    }

    fn decode(&self, path: &Path, options: DecodeOptions) -> Result<ImageArray> {
        use std::io::BufReader;

        use imgref::ImgVec;
        use jpeg_decoder::PixelFormat;
        use rgb::{RGB8, RGB16};

        let fail = |reason: String| Error::Decode {
            decoder: self.name(),
            path: path.to_path_buf(),
            reason,
        };

        let file = std::fs::File::open(path)?;
        let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(file));
        let pixels = decoder.decode().map_err(|e| fail(e.to_string()))?;
        let info = decoder
            .info()
            .ok_or_else(|| fail("Missing JPEG info after decode".to_string()))?;

        let width = usize::from(info.width);
        let height = usize::from(info.height);

        let array = match info.pixel_format {
            PixelFormat::L8 => {
                let gray = ImgVec::new(pixels, width, height);
                if options.gray {
                    return ImageArray::from_gray8(gray.as_ref());
                }
                let rgb: Vec<RGB8> = gray.pixels().map(|g| RGB8::new(g, g, g)).collect();
                ImageArray::from_rgb8(ImgVec::new(rgb, width, height).as_ref())?
            }
            PixelFormat::L16 => {
                // Big-endian sample pairs
                let samples: Vec<u16> = pixels
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                let gray = ImgVec::new(samples, width, height);
                if options.gray {
                    return ImageArray::from_gray16(gray.as_ref());
                }
                let rgb: Vec<RGB16> = gray.pixels().map(|g| RGB16::new(g, g, g)).collect();
                ImageArray::from_rgb16(ImgVec::new(rgb, width, height).as_ref())?
            }
            PixelFormat::RGB24 => {
                let rgb: Vec<RGB8> = pixels
                    .chunks_exact(3)
                    .map(|c| RGB8::new(c[0], c[1], c[2]))
                    .collect();
                ImageArray::from_rgb8(ImgVec::new(rgb, width, height).as_ref())?
            }
            PixelFormat::CMYK32 => {
                return Err(fail("CMYK JPEGs are not supported".to_string()));
            }
        };

        Ok(if options.gray { array.to_gray() } else { array })
    }
}

//! Shape harmonization before comparison.

use tracing::{debug, trace};

use crate::array::ImageArray;
use crate::error::{Error, Result};

/// Crop both arrays to their smallest common height and width.
///
/// Cropping is top-left aligned and leaves the channel axis untouched. Arrays
/// that already have the common size are returned unchanged.
///
/// # Errors
///
/// Returns [`Error::DimensionalityMismatch`] if the arrays differ in number
/// of dimensions or channels.
pub fn crop_to_smallest(a: &ImageArray, b: &ImageArray) -> Result<(ImageArray, ImageArray)> {
    if a.ndim() != b.ndim() || a.channels() != b.channels() {
        return Err(Error::DimensionalityMismatch {
            left: a.shape(),
            right: b.shape(),
        });
    }

    trace!(height = a.height(), width = a.width(), "crop_to_smallest: first array");
    trace!(height = b.height(), width = b.width(), "crop_to_smallest: second array");

    let height = a.height().min(b.height());
    let width = a.width().min(b.width());

    let a = crop_if_needed(a, height, width)?;
    let b = crop_if_needed(b, height, width)?;

    debug!(height, width, "crop_to_smallest: cropped arrays");
    Ok((a, b))
}

fn crop_if_needed(array: &ImageArray, height: usize, width: usize) -> Result<ImageArray> {
    if array.height() == height && array.width() == width {
        Ok(array.clone())
    } else {
        array.cropped(height, width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::SampleType;
    use ndarray::{Array2, Array3};

    fn gray(height: usize, width: usize) -> ImageArray {
        let data = Array2::from_shape_fn((height, width), |(y, x)| (y * width + x) as f64);
        ImageArray::from_gray(data, SampleType::U8).unwrap()
    }

    #[test]
    fn test_crop_to_common_size() {
        let (a, b) = crop_to_smallest(&gray(100, 80), &gray(90, 85)).unwrap();
        assert_eq!(a.shape(), vec![90, 80]);
        assert_eq!(b.shape(), vec![90, 80]);
    }

    #[test]
    fn test_crop_is_top_left_aligned() {
        let original = gray(10, 12);
        let (a, _) = crop_to_smallest(&original, &gray(4, 5)).unwrap();

        assert_eq!(a.channel(0)[[0, 0]], 0.0);
        assert_eq!(a.channel(0)[[3, 4]], original.channel(0)[[3, 4]]);
    }

    #[test]
    fn test_same_size_unchanged() {
        let original = gray(8, 8);
        let (a, b) = crop_to_smallest(&original, &original).unwrap();
        assert_eq!(a, original);
        assert_eq!(b, original);
    }

    #[test]
    fn test_channels_untouched() {
        let a = ImageArray::from_color(Array3::zeros((20, 30, 3)), SampleType::U8).unwrap();
        let b = ImageArray::from_color(Array3::zeros((25, 10, 3)), SampleType::U8).unwrap();
        let (a, b) = crop_to_smallest(&a, &b).unwrap();
        assert_eq!(a.shape(), vec![20, 10, 3]);
        assert_eq!(b.shape(), vec![20, 10, 3]);
    }

    #[test]
    fn test_dimensionality_mismatch() {
        let color = ImageArray::from_color(Array3::zeros((20, 30, 3)), SampleType::U8).unwrap();
        let result = crop_to_smallest(&gray(20, 30), &color);
        assert!(matches!(result, Err(Error::DimensionalityMismatch { .. })));
    }
}

//! File-level comparison through the default decoders.

#![cfg(feature = "image-decode")]

use std::path::{Path, PathBuf};

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use ssim_compare::{
    CompareOptions, DecodeOptions, DecoderRegistry, Error, SampleType, SsimConfig, compare_files,
};
use tempfile::TempDir;

fn pattern(x: u32, y: u32) -> u8 {
    ((x * 7 + y * 13) % 200 + (x * y) % 50) as u8
}

fn save_rgb(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(width, height, |x, y| {
        let v = pattern(x, y);
        Rgb([v, v.wrapping_add(30), 255 - v])
    })
    .save(&path)
    .unwrap();
    path
}

fn save_gray(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    GrayImage::from_fn(width, height, |x, y| Luma([pattern(x, y)]))
        .save(&path)
        .unwrap();
    path
}

fn save_rgb16(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    ImageBuffer::<Rgb<u16>, Vec<u16>>::from_fn(width, height, |x, y| {
        let v = pattern(x, y);
        Rgb([v, v.wrapping_add(30), 255 - v].map(|c| u16::from(c) * 257))
    })
    .save(&path)
    .unwrap();
    path
}

#[test]
fn test_same_file_scores_one() {
    let dir = TempDir::new().unwrap();
    let path = save_rgb(dir.path(), "a.png", 40, 30);
    let registry = DecoderRegistry::with_defaults();

    let comparison =
        compare_files(&path, &path, &CompareOptions::default(), &registry).unwrap();
    assert!((comparison.score - 1.0).abs() < 1e-9);
    assert_eq!(comparison.compared_shape, vec![30, 40, 3]);
    assert_eq!(comparison.map_shape, (20, 30));
    assert_eq!(comparison.channel_scores.len(), 3);
}

#[test]
fn test_different_sizes_are_cropped() {
    let dir = TempDir::new().unwrap();
    // (height, width) = (100, 80) and (90, 85)
    let a = save_gray(dir.path(), "a.png", 80, 100);
    let b = save_gray(dir.path(), "b.png", 85, 90);
    let registry = DecoderRegistry::with_defaults();
    let options = CompareOptions {
        gray: true,
        ..CompareOptions::default()
    };

    let comparison = compare_files(&a, &b, &options, &registry).unwrap();
    assert_eq!(comparison.compared_shape, vec![90, 80]);
    // Same pattern, so the common region is identical.
    assert!((comparison.score - 1.0).abs() < 1e-9);
}

#[test]
fn test_gray_flag_gives_single_channel() {
    let dir = TempDir::new().unwrap();
    let a = save_rgb(dir.path(), "a.png", 32, 32);
    let registry = DecoderRegistry::with_defaults();

    let image = registry.decode(&a, DecodeOptions { gray: true }).unwrap();
    assert_eq!(image.ndim(), 2);

    let options = CompareOptions {
        gray: true,
        ..CompareOptions::default()
    };
    let comparison = compare_files(&a, &a, &options, &registry).unwrap();
    assert_eq!(comparison.compared_shape, vec![32, 32]);
    assert!(!comparison.downgraded_to_gray);
}

#[test]
fn test_eight_and_sixteen_bit_copies_compare() {
    let dir = TempDir::new().unwrap();
    let a8 = save_rgb(dir.path(), "a8.png", 40, 30);
    let a16 = save_rgb16(dir.path(), "a16.png", 40, 30);
    let registry = DecoderRegistry::with_defaults();

    let decoded = registry.decode(&a16, DecodeOptions::default()).unwrap();
    assert_eq!(decoded.sample_type(), SampleType::U16);

    let comparison = compare_files(&a8, &a16, &CompareOptions::default(), &registry).unwrap();
    assert_eq!(comparison.compared_shape, vec![30, 40, 3]);
    assert!((comparison.score - 1.0).abs() < 1e-9, "score = {}", comparison.score);
}

#[test]
fn test_lossy_copy_scores_below_one() {
    let dir = TempDir::new().unwrap();
    let png = save_rgb(dir.path(), "a.png", 64, 48);
    let jpg = dir.path().join("a.jpg");
    image::open(&png).unwrap().save(&jpg).unwrap();
    let registry = DecoderRegistry::with_defaults();

    let comparison = compare_files(&png, &jpg, &CompareOptions::default(), &registry).unwrap();
    assert!(comparison.score < 1.0);
    assert!(comparison.score > 0.0, "score = {}", comparison.score);
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let a = save_gray(dir.path(), "a.png", 20, 20);
    let missing = dir.path().join("missing.png");
    let registry = DecoderRegistry::with_defaults();

    let result = compare_files(&a, &missing, &CompareOptions::default(), &registry);
    assert!(matches!(result, Err(Error::FileNotFound(path)) if path == missing));
}

#[test]
fn test_window_larger_than_images() {
    let dir = TempDir::new().unwrap();
    let a = save_gray(dir.path(), "a.png", 8, 8);
    let registry = DecoderRegistry::with_defaults();

    let result = compare_files(&a, &a, &CompareOptions::default(), &registry);
    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));

    let options = CompareOptions {
        gray: false,
        ssim: SsimConfig::builder().window_size(3).build(),
    };
    assert!(compare_files(&a, &a, &options, &registry).is_ok());
}

#[test]
fn test_undecodable_file() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("bogus.png");
    std::fs::write(&bogus, b"not an image at all").unwrap();
    let registry = DecoderRegistry::with_defaults();

    let result = registry.decode(&bogus, DecodeOptions::default());
    assert!(matches!(result, Err(Error::Decode { .. })));
}

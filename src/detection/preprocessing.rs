use image::{DynamicImage, GrayImage, Luma};
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;
use imageproc::map::{map_colors, map_colors2};
use imageproc::morphology::{grayscale_erode, Mask};

use crate::models::{BinaryImage, ThresholdStrategy};

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Inverted global threshold: pixels at or below `level` become 255.
pub fn threshold_inverted(img: &GrayImage, level: u8) -> GrayImage {
    map_colors(img, |Luma([v])| {
        if v <= level { Luma([255u8]) } else { Luma([0u8]) }
    })
}

/// Locally normalized threshold.
///
/// Each pixel is compared against a Gaussian-weighted mean of its
/// `block_size` neighborhood minus `offset`; brighter pixels become 255.
pub fn adaptive_threshold(img: &GrayImage, block_size: u32, offset: i16) -> GrayImage {
    let kernel = gaussian_kernel(block_size);
    let local_mean: GrayImage = separable_filter_equal(img, &kernel);
    map_colors2(img, &local_mean, |Luma([v]), Luma([m])| {
        if v as i16 > m as i16 - offset {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Normalized Gaussian taps spanning exactly `block_size` pixels (odd, at least 3).
/// Sigma follows from the width, not the other way round.
pub fn gaussian_kernel(block_size: u32) -> Vec<f32> {
    let size = (block_size.max(3) | 1) as i32;
    let sigma = gaussian_sigma_for_block(size as u32);
    let half = size / 2;
    let taps: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = taps.iter().sum();
    taps.into_iter().map(|t| t / sum).collect()
}

/// Sigma that a Gaussian kernel of width `block_size` implies.
fn gaussian_sigma_for_block(block_size: u32) -> f32 {
    0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Produce every binarized variant of `gray`: adaptive first, then one per
/// fixed level in order.
pub fn binarize_variants(
    gray: &GrayImage,
    block_size: u32,
    offset: i16,
    levels: &[u8],
) -> Vec<BinaryImage> {
    let mut variants = Vec::with_capacity(levels.len() + 1);
    variants.push(BinaryImage {
        image: adaptive_threshold(gray, block_size, offset),
        strategy: ThresholdStrategy::Adaptive { block_size, offset },
    });
    for &level in levels {
        variants.push(BinaryImage {
            image: threshold_inverted(gray, level),
            strategy: ThresholdStrategy::Fixed(level),
        });
    }
    variants
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Erode white regions with a 2x2 square anchored at its lower right cell,
/// so a pixel survives only if its left, upper and upper-left neighbors
/// are white too. Bars lose one pixel of width.
pub fn thin(img: &GrayImage) -> GrayImage {
    let square = GrayImage::from_pixel(2, 2, Luma([255u8]));
    grayscale_erode(img, &Mask::from_image(&square, 1, 1))
}

/// Levels `start, start + step, ...` up to and including `end`.
pub fn threshold_levels(start: u8, end: u8, step: u8) -> Vec<u8> {
    (start..=end).step_by(step.max(1) as usize).collect()
}

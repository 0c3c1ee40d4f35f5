use image::{DynamicImage, GrayImage};

use crate::decoding::ReaderConfig;
use crate::detection::preprocessing;
use crate::error::{BarcodeError, Result};
use crate::models::Scanline;

/// One row of a binary image as bits; white (255) becomes 1.
pub fn row_bits(binary: &GrayImage, y: u32) -> Scanline {
    let width = binary.width() as usize;
    let start = y as usize * width;
    binary.as_raw()[start..start + width]
        .iter()
        .map(|v| u8::from(*v == 255))
        .collect()
}

/// Sample scanlines from a barcode crop.
///
/// For every threshold level the crop is binarized (bars become 1) and
/// optionally thinned. Rows are taken every `height / rows_per_pass` pixels
/// starting at the top, and the row sweep is repeated `sampling_passes`
/// times. Each row yields the thinned line (if enabled) followed by the
/// raw line.
pub fn sample_scanlines(crop: &DynamicImage, config: &ReaderConfig) -> Result<Vec<Scanline>> {
    let gray = crop.to_luma8();
    let (width, height) = gray.dimensions();
    if width < config.min_dimension || height < config.min_dimension {
        return Err(BarcodeError::ImageTooSmall {
            width,
            height,
            min: config.min_dimension,
        });
    }

    let row_step = (height / config.rows_per_pass.max(1)).max(1) as usize;
    let mut lines = Vec::new();

    for &level in &config.levels {
        let binary = preprocessing::threshold_inverted(&gray, level);
        let thinned = config.thin.then(|| preprocessing::thin(&binary));

        for _ in 0..config.sampling_passes {
            for y in (0..height).step_by(row_step) {
                if let Some(thinned) = &thinned {
                    lines.push(row_bits(thinned, y));
                }
                lines.push(row_bits(&binary, y));
            }
        }
    }

    Ok(lines)
}

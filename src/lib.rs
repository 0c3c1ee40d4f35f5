//! Locate and decode EAN-13 barcodes in photographs.
//!
//! Localization binarizes the photo several ways, looks for a cluster of
//! parallel, evenly spaced edge segments in each variant and crops the
//! region it covers. Reading samples scanlines from each crop, quantizes
//! them into 95 modules and decodes the digits. The final answer is the
//! value decoded most often.

pub mod decoding;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod source;

use anyhow::Context;
use image::DynamicImage;
use std::path::PathBuf;

pub use decoding::{BarcodeReader, ReaderConfig, majority_vote};
pub use detection::{BarcodeLocator, LocatorConfig};
pub use error::{BarcodeError, Result};
pub use models::{BinaryImage, Ean13, Scanline, Segment, SegmentGroup, ThresholdStrategy};
pub use pipeline::{MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep};
pub use source::ImageSource;

/// Full locate-and-read configuration with optional verbose and debug output.
#[derive(Debug, Clone, Default)]
pub struct BarcodeScanner {
    pub locator: BarcodeLocator,
    pub reader: BarcodeReader,
    debug_out: Option<PathBuf>,
}

impl BarcodeScanner {
    pub fn new(locator: LocatorConfig, reader: ReaderConfig) -> Self {
        Self {
            locator: BarcodeLocator::new(locator),
            reader: BarcodeReader::new(reader),
            debug_out: None,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.locator = self.locator.with_verbose(verbose);
        self
    }

    /// Save every intermediate image under `dir` (must be empty or absent).
    pub fn with_debug(mut self, dir: PathBuf) -> Self {
        self.debug_out = Some(dir);
        self
    }

    /// All scanline decodes across all crops, in crop order.
    pub fn candidates(&self, img: &DynamicImage) -> anyhow::Result<Vec<String>> {
        let mut pipeline = self.locator.pipeline_with_reader(self.reader.clone());
        if let Some(dir) = &self.debug_out {
            pipeline = pipeline.with_debug(dir.clone())?;
        }
        let crops = pipeline.run(img.clone()).context("barcode pipeline failed")?;
        tracing::debug!(crops = crops.len(), "localization finished");

        Ok(crops
            .iter()
            .filter_map(|item| item.get_list("candidates"))
            .flat_map(|list| list.iter().cloned())
            .collect())
    }

    /// Majority vote over every scanline decode of every crop.
    pub fn scan(&self, img: &DynamicImage) -> anyhow::Result<Option<Ean13>> {
        let candidates = self.candidates(img)?;
        Ok(majority_vote(&candidates).and_then(Ean13::new))
    }
}

/// Crops of every barcode candidate found in `image` (possibly none).
pub fn locate_barcode(image: &DynamicImage) -> Vec<DynamicImage> {
    match BarcodeLocator::default().locate(image) {
        Ok(crops) => crops,
        Err(err) => {
            tracing::warn!("localization failed: {err:#}");
            Vec::new()
        }
    }
}

/// Decode a single barcode crop.
pub fn read_barcode(crop: &DynamicImage) -> Option<Ean13> {
    BarcodeReader::default().read(crop)
}

/// Locate and decode the barcode in `image`.
pub fn get_barcode_from_image(image: &DynamicImage) -> Option<Ean13> {
    match BarcodeScanner::default().scan(image) {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!("scan failed: {err:#}");
            None
        }
    }
}

/// Decode `source` and scan it. Unreadable input is the only hard failure;
/// everything else ends as [`BarcodeError::NoBarcodeDecoded`].
pub fn scan_source(source: &ImageSource) -> Result<Ean13> {
    let image = source.decode()?;
    get_barcode_from_image(&image).ok_or(BarcodeError::NoBarcodeDecoded)
}

pub mod crop;
pub mod grouping;
pub mod preprocessing;
pub mod segments;
pub mod steps;

use anyhow::Result;
use image::DynamicImage;
use std::sync::Arc;

use crate::decoding::BarcodeReader;
use crate::pipeline::{Pipeline, PipelineData};
use grouping::GroupParams;
use segments::SegmentParams;
use steps::{BinarizeStep, GrayscaleStep, LocateStep, ReadStep};

/// Settings for finding barcode regions in a photo.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Neighborhood width of the adaptive threshold.
    pub adaptive_block_size: u32,
    /// Constant subtracted from the local mean.
    pub adaptive_offset: i16,
    /// Inverted global thresholds, tried after the adaptive one.
    pub levels: Vec<u8>,
    pub segments: SegmentParams,
    pub grouping: GroupParams,
    /// Variants yielding fewer segments are skipped before grouping.
    pub min_segments: usize,
    /// Fraction by which the enclosing rectangle is grown before cropping.
    pub inflation: f64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            adaptive_block_size: 11,
            adaptive_offset: 2,
            levels: preprocessing::threshold_levels(10, 250, 20),
            segments: SegmentParams::default(),
            grouping: GroupParams::default(),
            min_segments: 4,
            inflation: 0.05,
        }
    }
}

impl LocatorConfig {
    pub fn with_angle_tolerance(mut self, degrees: f64) -> Self {
        self.grouping = self.grouping.with_angle_tolerance(degrees);
        self
    }
}

/// Finds barcode crops in a photo.
#[derive(Debug, Clone, Default)]
pub struct BarcodeLocator {
    pub config: LocatorConfig,
    pub verbose: bool,
}

impl BarcodeLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self {
            config,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Grayscale, binarize, then locate and crop in every variant.
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new()
            .with_verbose(self.verbose)
            .add_step(Arc::new(GrayscaleStep))
            .add_step(Arc::new(BinarizeStep {
                block_size: self.config.adaptive_block_size,
                offset: self.config.adaptive_offset,
                levels: self.config.levels.clone(),
            }))
            .add_step(Arc::new(LocateStep {
                config: self.config.clone(),
            }))
    }

    /// The localization pipeline followed by reading every crop.
    pub fn pipeline_with_reader(&self, reader: BarcodeReader) -> Pipeline {
        self.pipeline().add_step(Arc::new(ReadStep { reader }))
    }

    /// Crops of every located barcode, one per binarization variant that found one.
    pub fn locate(&self, img: &DynamicImage) -> Result<Vec<DynamicImage>> {
        let located = self.pipeline().run(img.clone())?;
        Ok(located.into_iter().map(|item: PipelineData| item.image).collect())
    }
}

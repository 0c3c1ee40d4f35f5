use crate::decoding::BarcodeReader;
use crate::detection::crop::crop_barcode;
use crate::detection::{grouping, preprocessing, segments, LocatorConfig};
use crate::pipeline::{MetadataValue, PipelineContext, PipelineData, PipelineStep};
use anyhow::Result;
use image::DynamicImage;
use rayon::prelude::*;

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(data
            .into_iter()
            .map(|item| {
                let gray = preprocessing::to_grayscale(&item.image);
                item.derive(DynamicImage::ImageLuma8(gray))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Split each grayscale image into its binarized variants (1 → many)
pub struct BinarizeStep {
    pub block_size: u32,
    pub offset: i16,
    pub levels: Vec<u8>,
}

impl PipelineStep for BinarizeStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = item.image.to_luma8();
            for variant in preprocessing::binarize_variants(&gray, self.block_size, self.offset, &self.levels) {
                let strategy = variant.strategy.to_string();
                result.push(
                    item.derive(DynamicImage::ImageLuma8(variant.image))
                        .with_metadata("strategy", MetadataValue::String(strategy)),
                );
            }
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Binarization"
    }
}

/// Find the bar group in each binary variant and crop it from the original.
/// Variants without a barcode are dropped.
pub struct LocateStep {
    pub config: LocatorConfig,
}

impl LocateStep {
    fn locate(&self, item: PipelineData) -> Option<PipelineData> {
        let strategy = item.get_string("strategy").unwrap_or("unknown").to_string();
        let binary = item.image.to_luma8();
        let min_dimension = binary.width().min(binary.height());

        let found = segments::extract_segments(&binary, &self.config.segments);
        if found.len() < self.config.min_segments {
            tracing::debug!(%strategy, segments = found.len(), "too few segments");
            return None;
        }

        let group = match grouping::find_parallel_group(&found, min_dimension, &self.config.grouping) {
            Ok(group) => group,
            Err(err) => {
                tracing::debug!(%strategy, segments = found.len(), "{err}");
                return None;
            }
        };

        let Some((crop, rect)) = crop_barcode(&item.original, &group, self.config.inflation) else {
            tracing::debug!(%strategy, "crop window empty");
            return None;
        };
        tracing::debug!(%strategy, segments = found.len(), group = group.len(), ?rect, "barcode located");

        let mut located = item.derive(crop);
        located.bbox = Some(rect);
        Some(
            located
                .with_metadata("segments", MetadataValue::Int(found.len() as i32))
                .with_metadata("group_size", MetadataValue::Int(group.len() as i32)),
        )
    }
}

impl PipelineStep for LocateStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let located: Vec<Option<PipelineData>> =
            data.into_par_iter().map(|item| self.locate(item)).collect();
        Ok(located.into_iter().flatten().collect())
    }

    fn name(&self) -> &str {
        "Barcode Localization"
    }
}

/// Decode every crop and record all scanline results as "candidates".
/// Crops are kept even when nothing decodes.
pub struct ReadStep {
    pub reader: BarcodeReader,
}

impl PipelineStep for ReadStep {
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let total = data.len();
        let read: Vec<PipelineData> = data
            .into_par_iter()
            .map(|item| {
                let candidates = match self.reader.decode_candidates(&item.image) {
                    Ok(found) => found.into_iter().map(|ean| ean.into_string()).collect(),
                    Err(err) => {
                        tracing::debug!("crop skipped: {err}");
                        Vec::new()
                    }
                };
                item.with_metadata("candidates", MetadataValue::List(candidates))
            })
            .collect();

        if context.verbose {
            for (i, item) in read.iter().enumerate() {
                let decoded = item.get_list("candidates").map_or(0, |c| c.len());
                let strategy = item.get_string("strategy").unwrap_or("unknown");
                let group = item.get_int("group_size").unwrap_or(0);
                match item.bbox {
                    Some(rect) => println!(
                        "  Crop {} of {} ({}, {} edges at {},{} {}x{}): {} scanlines decoded",
                        i + 1,
                        total,
                        strategy,
                        group,
                        rect.x,
                        rect.y,
                        rect.width,
                        rect.height,
                        decoded
                    ),
                    None => println!("  Crop {} of {} ({}): {} scanlines decoded", i + 1, total, strategy, decoded),
                }
            }
        }

        Ok(read)
    }

    fn name(&self) -> &str {
        "Barcode Reading"
    }
}

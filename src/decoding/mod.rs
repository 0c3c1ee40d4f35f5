pub mod ean13;
pub mod modules;
pub mod scanlines;

use image::DynamicImage;
use std::collections::HashMap;
use std::hash::Hash;

use crate::detection::preprocessing::threshold_levels;
use crate::error::{BarcodeError, Result};
use crate::models::Ean13;

/// Settings for reading digits out of a barcode crop.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Crops narrower or shorter than this are rejected.
    pub min_dimension: u32,
    /// Inverted global thresholds applied to the crop.
    pub levels: Vec<u8>,
    /// Rows are sampled every `height / rows_per_pass` pixels.
    pub rows_per_pass: u32,
    /// How many times the row sweep is repeated per threshold.
    pub sampling_passes: usize,
    /// Also sample an eroded copy of each binary crop.
    pub thin: bool,
    /// Foreground runs that may be skipped while looking for the start guard.
    pub max_guard_retries: usize,
    /// Retry a failed scanline right-to-left.
    pub try_reversed: bool,
    /// Drop decodes whose check digit does not match.
    pub require_valid_checksum: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            min_dimension: 10,
            levels: threshold_levels(10, 250, 20),
            rows_per_pass: 5,
            sampling_passes: 2,
            thin: true,
            max_guard_retries: 50,
            try_reversed: true,
            require_valid_checksum: false,
        }
    }
}

impl ReaderConfig {
    pub fn with_sampling_passes(mut self, passes: usize) -> Self {
        self.sampling_passes = passes;
        self
    }

    pub fn with_try_reversed(mut self, try_reversed: bool) -> Self {
        self.try_reversed = try_reversed;
        self
    }

    pub fn with_require_valid_checksum(mut self, require: bool) -> Self {
        self.require_valid_checksum = require;
        self
    }
}

/// Decodes barcode crops into EAN-13 values.
#[derive(Debug, Clone, Default)]
pub struct BarcodeReader {
    pub config: ReaderConfig,
}

impl BarcodeReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Decode one scanline read left to right.
    pub fn decode_scanline(&self, line: &[u8]) -> Result<Ean13> {
        let bit_width = modules::determine_bit_width(line, self.config.max_guard_retries)?;
        let code = modules::read_modules(line, bit_width)?;
        let ean = ean13::decode_ean13(&code)?;
        if self.config.require_valid_checksum && !ean.has_valid_checksum() {
            return Err(BarcodeError::ChecksumMismatch {
                digits: ean.into_string(),
            });
        }
        Ok(ean)
    }

    /// Decode one scanline, falling back to right-to-left if enabled.
    pub fn decode_either_direction(&self, line: &[u8]) -> Result<Ean13> {
        match self.decode_scanline(line) {
            Ok(ean) => Ok(ean),
            Err(err) if self.config.try_reversed => {
                let reversed: Vec<u8> = line.iter().rev().copied().collect();
                self.decode_scanline(&reversed).map_err(|_| err)
            }
            Err(err) => Err(err),
        }
    }

    /// Every successful scanline decode of the crop, in sampling order.
    ///
    /// Fails only if the crop is too small to sample; individual scanline
    /// failures are logged and skipped.
    pub fn decode_candidates(&self, crop: &DynamicImage) -> Result<Vec<Ean13>> {
        let lines = scanlines::sample_scanlines(crop, &self.config)?;
        let total = lines.len();
        let mut results = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            match self.decode_either_direction(line) {
                Ok(ean) => results.push(ean),
                Err(err) => tracing::trace!(scanline = index, "scanline skipped: {err}"),
            }
        }
        tracing::debug!(scanlines = total, decoded = results.len(), "crop read");
        Ok(results)
    }

    /// The most frequent decode of the crop, if any scanline decoded.
    pub fn read(&self, crop: &DynamicImage) -> Option<Ean13> {
        match self.decode_candidates(crop) {
            Ok(candidates) => majority_vote(&candidates),
            Err(err) => {
                tracing::debug!("crop rejected: {err}");
                None
            }
        }
    }
}

/// The value occurring most often; ties go to the one seen first.
pub fn majority_vote<T: Eq + Hash + Clone>(items: &[T]) -> Option<T> {
    let mut counts: HashMap<&T, usize> = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }

    let mut best: Option<(&T, usize)> = None;
    for item in items {
        let count = counts[item];
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((item, count));
        }
    }
    best.map(|(item, _)| item.clone())
}

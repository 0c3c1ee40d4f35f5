use crate::decoding::ean13::{EDGE_GUARD, MODULE_COUNT};
use crate::error::{BarcodeError, Result};

/// Module width estimate and where the start guard begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitWidth {
    pub width: f64,
    pub start: usize,
}

/// Run-length view of a scanline: (bit, run length) pairs.
pub fn runs(line: &[u8]) -> impl Iterator<Item = (u8, usize)> + '_ {
    line.chunk_by(|a, b| a == b).map(|run| (run[0], run.len()))
}

/// Start of the `skip`-th foreground run (0-based).
fn foreground_run_start(line: &[u8], skip: usize) -> Option<usize> {
    let mut pos = 0;
    let mut seen = 0;
    for (bit, len) in runs(line) {
        if bit == 1 {
            if seen == skip {
                return Some(pos);
            }
            seen += 1;
        }
        pos += len;
    }
    None
}

/// Lengths of the three runs at `start` that should read 1, 0, 1.
fn guard_run_lengths(line: &[u8], start: usize) -> [usize; 3] {
    let mut pos = start;
    let mut lengths = [0usize; 3];
    for (k, &bit) in EDGE_GUARD.iter().enumerate() {
        let len = line[pos..].iter().take_while(|b| **b == bit).count();
        lengths[k] = len;
        pos += len;
    }
    lengths
}

/// Estimate the module width from the start guard.
///
/// Tries successive foreground runs as the guard's first bar, skipping
/// up to `max_retries` runs of leading noise. A candidate is accepted when
/// each of the three guard runs is within 0.5x..1.5x of their mean.
pub fn determine_bit_width(line: &[u8], max_retries: usize) -> Result<BitWidth> {
    for skip in 0..=max_retries {
        let Some(start) = foreground_run_start(line, skip) else {
            break;
        };
        let lengths = guard_run_lengths(line, start);
        let width = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
        if width > 0.0
            && lengths.iter().all(|len| {
                let ratio = *len as f64 / width;
                0.5 < ratio && ratio < 1.5
            })
        {
            return Ok(BitWidth { width, start });
        }
    }

    Err(BarcodeError::BitWidthEstimationFailed {
        attempts: max_retries + 1,
    })
}

/// Quantize the runs from `start` onward into exactly 95 modules.
pub fn read_modules(line: &[u8], bit_width: BitWidth) -> Result<Vec<u8>> {
    let mut bits = Vec::with_capacity(MODULE_COUNT);
    let tail = line.get(bit_width.start..).unwrap_or_default();

    for (bit, len) in runs(tail) {
        let count = (len as f64 / bit_width.width).round() as usize;
        bits.extend(std::iter::repeat_n(bit, count));
        if bits.len() >= MODULE_COUNT {
            bits.truncate(MODULE_COUNT);
            return Ok(bits);
        }
    }

    Err(BarcodeError::InsufficientModules { found: bits.len() })
}

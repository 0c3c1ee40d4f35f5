//! Error types for barcode localization and decoding.
//!
//! Only [`BarcodeError::ImageDecode`] and [`BarcodeError::Io`] are hard
//! failures. Everything else describes why one binarization variant, crop
//! or scanline was discarded, and is recovered by moving on to the next
//! candidate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarcodeError {
    /// The input could not be read or decoded into pixels.
    #[error("failed to decode image")]
    ImageDecode(#[source] image::ImageError),

    /// Writing debug output failed.
    #[error("failed to write debug output")]
    Io(#[from] std::io::Error),

    #[error("image too small: {width}x{height} (need at least {min}x{min})")]
    ImageTooSmall { width: u32, height: u32, min: u32 },

    #[error("no candidate segments found")]
    NoSegmentsFound,

    #[error("no parallel segment group found (largest group had {largest} segments)")]
    NoParallelGroupFound { largest: usize },

    #[error("start guard did not validate after {attempts} attempts")]
    BitWidthEstimationFailed { attempts: usize },

    #[error("only {found} of 95 modules extracted")]
    InsufficientModules { found: usize },

    #[error("{section} group {index} has no matching code: {bits}")]
    InvalidCodeGroup {
        section: Section,
        index: usize,
        bits: String,
    },

    #[error("parity pattern {pattern} is not a valid EAN-13 first digit")]
    InvalidParityPattern { pattern: String },

    #[error("checksum mismatch for {digits}")]
    ChecksumMismatch { digits: String },

    #[error("no barcode decoded")]
    NoBarcodeDecoded,
}

/// Half of an EAN-13 symbol, used to locate decode errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Left,
    Right,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Left => write!(f, "left"),
            Section::Right => write!(f, "right"),
        }
    }
}

pub type Result<T, E = BarcodeError> = std::result::Result<T, E>;

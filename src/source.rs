use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::path::PathBuf;

use crate::error::{BarcodeError, Result};

/// Where an input photo comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ImageSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ImageSource::Path(path.into())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        ImageSource::Bytes(bytes.into())
    }

    /// Decode the source into a color pixel grid.
    pub fn decode(&self) -> Result<DynamicImage> {
        match self {
            ImageSource::Path(path) => ImageReader::open(path)
                .map_err(|e| BarcodeError::ImageDecode(e.into()))?
                .decode()
                .map_err(BarcodeError::ImageDecode),
            ImageSource::Bytes(bytes) => ImageReader::new(Cursor::new(bytes.as_slice()))
                .with_guessed_format()
                .map_err(|e| BarcodeError::ImageDecode(e.into()))?
                .decode()
                .map_err(BarcodeError::ImageDecode),
        }
    }
}

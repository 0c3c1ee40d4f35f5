use image::GrayImage;
use imageproc::point::Point;

/// How a [`BinaryImage`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdStrategy {
    /// Gaussian-weighted local mean over a `block_size` square, minus `offset`.
    Adaptive { block_size: u32, offset: i16 },
    /// Global threshold, inverted: pixels at or below the level become white.
    Fixed(u8),
}

impl std::fmt::Display for ThresholdStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdStrategy::Adaptive { block_size, offset } => {
                write!(f, "adaptive_{}x{}_c{}", block_size, block_size, offset)
            }
            ThresholdStrategy::Fixed(level) => write!(f, "fixed_{:03}", level),
        }
    }
}

/// A black/white image where every pixel is 0 or 255.
#[derive(Debug, Clone)]
pub struct BinaryImage {
    pub image: GrayImage,
    pub strategy: ThresholdStrategy,
}

/// A straight edge between two integer endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: Point<i32>,
    pub end: Point<i32>,
}

impl Segment {
    pub fn new(start: Point<i32>, end: Point<i32>) -> Self {
        Self { start, end }
    }

    pub fn from_coords(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    pub fn length(&self) -> f64 {
        distance(self.start, self.end)
    }

    /// Direction in degrees, in (-180, 180].
    pub fn angle_degrees(&self) -> f64 {
        let dx = (self.end.x - self.start.x) as f64;
        let dy = (self.end.y - self.start.y) as f64;
        dy.atan2(dx).to_degrees()
    }

    /// The four endpoint-to-endpoint distances to `other`, ascending.
    pub fn endpoint_distances(&self, other: &Segment) -> [f64; 4] {
        let mut d = [
            distance(self.start, other.start),
            distance(self.start, other.end),
            distance(self.end, other.start),
            distance(self.end, other.end),
        ];
        d.sort_by(f64::total_cmp);
        d
    }
}

pub(crate) fn distance(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Segments believed to be the parallel bar edges of one barcode.
#[derive(Debug, Clone, Default)]
pub struct SegmentGroup {
    pub segments: Vec<Segment>,
}

impl SegmentGroup {
    pub fn seeded(seed: Segment) -> Self {
        Self {
            segments: vec![seed],
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All endpoints, in segment order.
    pub fn points(&self) -> Vec<Point<i32>> {
        self.segments
            .iter()
            .flat_map(|s| [s.start, s.end])
            .collect()
    }
}

/// One sampled row of a binarized crop; `1` is bar, `0` is space.
pub type Scanline = Vec<u8>;

/// A decoded 13-digit EAN-13 value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ean13(String);

impl Ean13 {
    /// Wrap a digit string. Returns `None` unless it is exactly 13 ASCII digits.
    pub fn new(digits: impl Into<String>) -> Option<Self> {
        let digits = digits.into();
        if digits.len() == 13 && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(digits))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Mod-10 check: odd positions weigh 1, even positions weigh 3.
    pub fn has_valid_checksum(&self) -> bool {
        let digits: Vec<u32> = self.0.bytes().map(|b| (b - b'0') as u32).collect();
        let sum: u32 = digits[..12]
            .iter()
            .enumerate()
            .map(|(i, d)| if i % 2 == 0 { *d } else { d * 3 })
            .sum();
        (10 - sum % 10) % 10 == digits[12]
    }
}

impl std::fmt::Display for Ean13 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ean13 {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

use crate::error::{BarcodeError, Result};
use crate::models::{Segment, SegmentGroup};

/// Parameters for clustering parallel bar edges.
#[derive(Debug, Clone)]
pub struct GroupParams {
    /// Maximum angular difference in degrees, modulo 180.
    pub angle_tolerance: f64,
    /// Length window relative to the group's running average, exclusive.
    pub length_ratio: (f64, f64),
    /// Adjacency radius is `min_dimension / adjacency_divisor` (integer division).
    pub adjacency_divisor: u32,
    /// How many of the four endpoint distances to a member must fall
    /// inside the adjacency radius.
    pub close_endpoints: usize,
    /// Groups smaller than this are not barcodes.
    pub min_group_size: usize,
}

impl Default for GroupParams {
    fn default() -> Self {
        Self {
            angle_tolerance: 2.0,
            length_ratio: (0.5, 1.5),
            adjacency_divisor: 20,
            close_endpoints: 2,
            min_group_size: 10,
        }
    }
}

impl GroupParams {
    pub fn with_angle_tolerance(mut self, degrees: f64) -> Self {
        self.angle_tolerance = degrees;
        self
    }
}

/// True when two directions are parallel or anti-parallel within `tolerance`.
pub fn is_parallel(theta1: f64, theta2: f64, tolerance: f64) -> bool {
    let diff = (theta1 - theta2).abs() % 180.0;
    diff < tolerance || (180.0 - diff) < tolerance
}

/// Grow one group per seed segment and return the largest.
///
/// Each seed is compared against every other segment exactly once, in
/// input order. A candidate joins if its length fits the group's running
/// average, its direction matches the seed, and it lies next to some
/// member already in the group. Membership is therefore order-dependent
/// and not transitive. Among equally large groups the first seed wins.
///
/// "Next to" means the `close_endpoints` smallest endpoint distances to
/// that member are all inside the adjacency radius. The default of 2 is
/// stricter than a single close endpoint: both ends of the candidate must
/// line up with the member's ends. Set it to 1 to accept any one close
/// endpoint pair.
pub fn find_parallel_group(
    segments: &[Segment],
    min_dimension: u32,
    params: &GroupParams,
) -> Result<SegmentGroup> {
    if segments.is_empty() {
        return Err(BarcodeError::NoSegmentsFound);
    }

    let adjacency = (min_dimension / params.adjacency_divisor.max(1)) as f64;
    let (low, high) = params.length_ratio;
    let lengths: Vec<f64> = segments.iter().map(Segment::length).collect();
    let angles: Vec<f64> = segments.iter().map(Segment::angle_degrees).collect();

    let mut best: Option<SegmentGroup> = None;

    for (i, seed) in segments.iter().enumerate() {
        let mut group = SegmentGroup::seeded(*seed);
        let mut length_sum = lengths[i];

        for (j, candidate) in segments.iter().enumerate() {
            if i == j {
                continue;
            }

            let avg_length = length_sum / group.len() as f64;
            let length = lengths[j];
            if !(avg_length * low < length && length < avg_length * high) {
                continue;
            }

            if !is_parallel(angles[i], angles[j], params.angle_tolerance) {
                continue;
            }

            let adjacent = group.segments.iter().any(|member| {
                member
                    .endpoint_distances(candidate)
                    .iter()
                    .take(params.close_endpoints.max(1))
                    .all(|d| *d < adjacency)
            });
            if adjacent {
                group.segments.push(*candidate);
                length_sum += length;
            }
        }

        if best.as_ref().is_none_or(|b| group.len() > b.len()) {
            best = Some(group);
        }
    }

    match best {
        Some(group) if group.len() >= params.min_group_size => Ok(group),
        Some(group) => Err(BarcodeError::NoParallelGroupFound {
            largest: group.len(),
        }),
        None => Err(BarcodeError::NoSegmentsFound),
    }
}

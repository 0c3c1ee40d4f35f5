use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use std::ops::RangeInclusive;

use crate::detection::preprocessing;
use crate::models::{distance, Segment};

/// Parameters for turning a binary image into straight edge segments.
#[derive(Debug, Clone)]
pub struct SegmentParams {
    pub canny_low: f32,
    pub canny_high: f32,
    /// Polygon tolerance as a fraction of the contour perimeter.
    pub epsilon_fraction: f64,
    /// Accepted vertex counts after approximation.
    pub vertex_range: RangeInclusive<usize>,
    /// Segments must be longer than `min_dimension / min_length_divisor`.
    pub min_length_divisor: u32,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            epsilon_fraction: 0.03,
            vertex_range: 2..=9,
            min_length_divisor: 20,
        }
    }
}

/// Edge-detect `binary`, trace contours and emit the long polygon edges.
pub fn extract_segments(binary: &GrayImage, params: &SegmentParams) -> Vec<Segment> {
    let edges = preprocessing::detect_edges(binary, params.canny_low, params.canny_high);
    let min_dimension = binary.width().min(binary.height());
    let min_length = min_dimension as f64 / params.min_length_divisor.max(1) as f64;
    segments_from_edges(&edges, min_length, params)
}

fn segments_from_edges(edges: &GrayImage, min_length: f64, params: &SegmentParams) -> Vec<Segment> {
    let mut segments = Vec::new();

    for contour in find_contours::<i32>(edges) {
        let Some(poly) = approximate_contour(&contour.points, params.epsilon_fraction) else {
            continue;
        };
        if !params.vertex_range.contains(&poly.len()) {
            continue;
        }
        // Open polyline: the closing edge back to the first vertex is not emitted.
        for pair in poly.windows(2) {
            let segment = Segment::new(pair[0], pair[1]);
            if segment.length() > min_length {
                segments.push(segment);
            }
        }
    }

    segments
}

/// Douglas-Peucker approximation of a closed contour.
///
/// The contour is split at the point farthest from its first point and
/// each half is simplified as an open curve, so the start and end of the
/// simplified chains never coincide.
pub fn approximate_contour(points: &[Point<i32>], epsilon_fraction: f64) -> Option<Vec<Point<i32>>> {
    if points.len() < 3 {
        return None;
    }
    let epsilon = epsilon_fraction * arc_length(points, true);
    if epsilon <= 0.0 {
        return None;
    }

    let first = points[0];
    let (split, _) = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, distance(first, *p)))
        .max_by(|a, b| a.1.total_cmp(&b.1))?;
    if split == 0 {
        return None;
    }

    let mut there = approximate_polygon_dp(&points[..=split], epsilon, false);
    let mut back: Vec<Point<i32>> = points[split..].to_vec();
    back.push(first);
    let mut back = approximate_polygon_dp(&back, epsilon, false);

    // Both chains repeat their shared endpoints.
    there.pop();
    back.pop();
    there.append(&mut back);
    Some(there)
}

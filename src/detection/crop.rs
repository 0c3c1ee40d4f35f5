use image::DynamicImage;
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;

use crate::models::SegmentGroup;

/// Axis-aligned crop window in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Minimum-area rectangle around every endpoint of the group.
pub fn enclosing_rect(group: &SegmentGroup) -> Option<[Point<i32>; 4]> {
    let points = group.points();
    if points.is_empty() {
        return None;
    }
    if all_collinear(&points) {
        let min_x = points.iter().map(|p| p.x).min()?;
        let max_x = points.iter().map(|p| p.x).max()?;
        let min_y = points.iter().map(|p| p.y).min()?;
        let max_y = points.iter().map(|p| p.y).max()?;
        return Some([
            Point::new(min_x, min_y),
            Point::new(max_x, min_y),
            Point::new(max_x, max_y),
            Point::new(min_x, max_y),
        ]);
    }
    Some(min_area_rect(&points))
}

fn all_collinear(points: &[Point<i32>]) -> bool {
    let a = points[0];
    let Some(b) = points.iter().copied().find(|p| *p != a) else {
        return true;
    };
    points.iter().all(|p| {
        let cross = (b.x - a.x) as i64 * (p.y - a.y) as i64 - (b.y - a.y) as i64 * (p.x - a.x) as i64;
        cross == 0
    })
}

/// Push every corner away from the rectangle center by `fraction` of its offset.
pub fn inflate(corners: [Point<i32>; 4], fraction: f64) -> [Point<i32>; 4] {
    let cx = corners.iter().map(|p| p.x as f64).sum::<f64>() / 4.0;
    let cy = corners.iter().map(|p| p.y as f64).sum::<f64>() / 4.0;
    corners.map(|p| {
        let x = p.x as f64 + fraction * (p.x as f64 - cx);
        let y = p.y as f64 + fraction * (p.y as f64 - cy);
        Point::new(x as i32, y as i32)
    })
}

/// Crop window spanned by the corners: the two leftmost corners give the
/// left edge and the vertical extent, the upper right corner gives the
/// right edge. Clamped to the image; `None` if nothing is left.
pub fn crop_window(corners: [Point<i32>; 4], width: u32, height: u32) -> Option<CropRect> {
    let mut sorted = corners;
    sorted.sort_by_key(|p| p.x);
    let (mut left, mut right) = ([sorted[0], sorted[1]], [sorted[2], sorted[3]]);
    left.sort_by_key(|p| p.y);
    right.sort_by_key(|p| p.y);

    let (top_left, bottom_left, top_right) = (left[0], left[1], right[0]);

    let x0 = top_left.x.min(top_right.x).clamp(0, width as i32);
    let x1 = top_left.x.max(top_right.x).clamp(0, width as i32);
    let y0 = top_left.y.min(bottom_left.y).clamp(0, height as i32);
    let y1 = top_left.y.max(bottom_left.y).clamp(0, height as i32);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(CropRect {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}

/// Cut the group's region out of `original` and turn it so bars run vertically.
pub fn crop_barcode(
    original: &DynamicImage,
    group: &SegmentGroup,
    inflation: f64,
) -> Option<(DynamicImage, CropRect)> {
    let corners = inflate(enclosing_rect(group)?, inflation);
    let rect = crop_window(corners, original.width(), original.height())?;
    let cropped = original.crop_imm(rect.x, rect.y, rect.width, rect.height);
    let upright = if cropped.height() > cropped.width() {
        cropped.rotate270()
    } else {
        cropped
    };
    Some((upright, rect))
}

//! Fallback region: the central 60% of the frame.
//!
//! Used only when every data-driven strategy came back empty, on the
//! assumption that the subject of a photo is usually centered.

use crate::types::{Dimensions, Point, Polygon};

/// Fraction of each dimension left as padding on either side.
pub const PADDING_RATIO: f64 = 0.2;

/// Axis-aligned rectangle inset by [`PADDING_RATIO`] on every side,
/// clockwise from the top-left corner.
///
/// Padding is floored to whole pixels.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn center_rectangle(dimensions: Dimensions) -> Polygon {
    let pad = |extent: u32| (f64::from(extent) * PADDING_RATIO).floor() as i32;
    let w = i32::try_from(dimensions.width).unwrap_or(i32::MAX);
    let h = i32::try_from(dimensions.height).unwrap_or(i32::MAX);
    let (pad_w, pad_h) = (pad(dimensions.width), pad(dimensions.height));
    let (x1, y1) = (pad_w, pad_h);
    let (x2, y2) = (w - pad_w, h - pad_h);

    Polygon::new(vec![
        Point::new(x1, y1),
        Point::new(x2, y1),
        Point::new(x2, y2),
        Point::new(x1, y2),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn coords(poly: &Polygon) -> Vec<[i32; 2]> {
        poly.points().iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn square_image() {
        let poly = center_rectangle(dims(100, 100));
        assert_eq!(coords(&poly), vec![[20, 20], [80, 20], [80, 80], [20, 80]]);
    }

    #[test]
    fn non_square_image() {
        let poly = center_rectangle(dims(640, 480));
        assert_eq!(coords(&poly), vec![[128, 96], [512, 96], [512, 384], [128, 384]]);
    }

    #[test]
    fn odd_sizes_floor_padding() {
        // 0.2 * 33 = 6.6 and 0.2 * 7 = 1.4.
        let poly = center_rectangle(dims(33, 7));
        assert_eq!(coords(&poly), vec![[6, 1], [27, 1], [27, 6], [6, 6]]);
    }

    #[test]
    fn covers_central_sixty_percent() {
        let poly = center_rectangle(dims(200, 100));
        assert!((poly.area() - 120.0 * 60.0).abs() < f64::EPSILON);
    }
}

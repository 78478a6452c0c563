//! Polygon geometry: shoelace area, closed perimeter, and contour
//! simplification.
//!
//! Simplification is a closed-ring variant of Ramer-Douglas-Peucker.
//! The ring is split at the vertex farthest from the first point and
//! both halves are reduced independently, so the result does not
//! depend on an arbitrary open-path endpoint pair.

use crate::types::{Point, Polygon};

/// Default simplification tolerance as a fraction of the contour
/// perimeter.
pub const DEFAULT_EPSILON_RATIO: f64 = 0.02;

/// Unsigned enclosed area of a closed ring (shoelace formula).
///
/// The last point wraps to the first. Fewer than 3 points enclose
/// nothing and yield `0.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
        .sum();
    twice.unsigned_abs() as f64 / 2.0
}

/// Length of the closed ring through `points`.
#[must_use]
pub fn perimeter(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&a, &b)| a.distance(b))
        .sum()
}

/// Reduce a dense pixel contour to a coarse polygon.
///
/// The tolerance is `epsilon_ratio * perimeter(contour)`. Returns `None`
/// when fewer than 3 vertices survive, since that is not a region.
#[must_use = "returns the simplified polygon"]
pub fn simplify(contour: &[Point], epsilon_ratio: f64) -> Option<Polygon> {
    if contour.len() < 3 {
        return None;
    }
    let tolerance = epsilon_ratio * perimeter(contour);

    let first = contour[0];
    let far = contour
        .iter()
        .enumerate()
        .skip(1)
        .fold((0, 0.0), |(best, best_d), (i, &p)| {
            let d = first.distance(p);
            if d > best_d { (i, d) } else { (best, best_d) }
        })
        .0;
    if far == 0 {
        return None;
    }

    // Close the ring explicitly so the second half ends back at `first`.
    let n = contour.len();
    let mut ring = Vec::with_capacity(n + 1);
    ring.extend_from_slice(contour);
    ring.push(first);

    let mut kept = vec![false; n + 1];
    kept[0] = true;
    kept[far] = true;
    rdp_recurse(&ring, 0, far, tolerance, &mut kept);
    rdp_recurse(&ring, far, n, tolerance, &mut kept);

    let points: Vec<Point> = ring[..n]
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect();

    (points.len() >= 3).then(|| Polygon::new(points))
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Keeps the point between `start` and `end` farthest from the chord
/// when it lies beyond `tolerance`, then recurses into both halves.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Perpendicular distance from `p` to the line through `a` and `b`.
///
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(f64::from(a.y - p.y), -(dy * f64::from(a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pts(coords: &[(i32, i32)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    /// Every boundary pixel of the axis-aligned square `[lo, hi]²`,
    /// walked clockwise from the top-left corner.
    fn square_outline(lo: i32, hi: i32) -> Vec<Point> {
        let mut out = Vec::new();
        out.extend((lo..hi).map(|x| Point::new(x, lo)));
        out.extend((lo..hi).map(|y| Point::new(hi, y)));
        out.extend((lo + 1..=hi).rev().map(|x| Point::new(x, hi)));
        out.extend((lo + 1..=hi).rev().map(|y| Point::new(lo, y)));
        out
    }

    #[test]
    fn area_of_unit_square() {
        let square = pts(&[(0, 0), (1, 0), (1, 1), (0, 1)]);
        assert!((polygon_area(&square) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn area_ignores_winding() {
        let cw = pts(&[(0, 0), (10, 0), (10, 5), (0, 5)]);
        let ccw: Vec<Point> = cw.iter().rev().copied().collect();
        assert!((polygon_area(&cw) - 50.0).abs() < f64::EPSILON);
        assert!((polygon_area(&ccw) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn area_of_degenerate_rings_is_zero() {
        assert!(polygon_area(&[]).abs() < f64::EPSILON);
        assert!(polygon_area(&pts(&[(0, 0), (5, 5)])).abs() < f64::EPSILON);
        assert!(polygon_area(&pts(&[(0, 0), (1, 1), (2, 2)])).abs() < f64::EPSILON);
    }

    #[test]
    fn perimeter_is_closed() {
        let square = pts(&[(0, 0), (3, 0), (3, 3), (0, 3)]);
        assert!((perimeter(&square) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn perimeter_of_short_input_is_zero() {
        assert!(perimeter(&[]).abs() < f64::EPSILON);
        assert!(perimeter(&pts(&[(4, 4)])).abs() < f64::EPSILON);
    }

    #[test]
    fn square_outline_collapses_to_corners() {
        let outline = square_outline(10, 40);
        let poly = simplify(&outline, DEFAULT_EPSILON_RATIO).unwrap();
        assert_eq!(poly.len(), 4);
        for corner in [(10, 10), (40, 10), (40, 40), (10, 40)] {
            assert!(
                poly.points().contains(&Point::new(corner.0, corner.1)),
                "missing corner {corner:?} in {poly:?}",
            );
        }
        assert!((poly.area() - 900.0).abs() < f64::EPSILON);
    }

    #[test]
    fn too_few_points_rejected() {
        assert!(simplify(&pts(&[(0, 0), (5, 0)]), DEFAULT_EPSILON_RATIO).is_none());
    }

    #[test]
    fn collinear_contour_rejected() {
        // A one-pixel-wide line traces out and back along itself.
        let line = pts(&[(0, 0), (1, 0), (2, 0), (3, 0), (2, 0), (1, 0)]);
        assert!(simplify(&line, DEFAULT_EPSILON_RATIO).is_none());
    }

    #[test]
    fn coincident_points_rejected() {
        let dot = pts(&[(3, 3), (3, 3), (3, 3)]);
        assert!(simplify(&dot, DEFAULT_EPSILON_RATIO).is_none());
    }

    #[test]
    fn zero_ratio_keeps_every_corner() {
        let zigzag = pts(&[(0, 0), (2, 3), (4, 0), (6, 3), (8, 0), (8, 8), (0, 8)]);
        let poly = simplify(&zigzag, 0.0).unwrap();
        assert_eq!(poly.len(), zigzag.len());
    }

    #[test]
    fn perpendicular_distance_on_axis() {
        let d = perpendicular_distance(Point::new(1, 3), Point::new(0, 0), Point::new(2, 0));
        assert!((d - 3.0).abs() < 1e-10);
    }

    #[test]
    fn perpendicular_distance_coincident_endpoints() {
        let d = perpendicular_distance(Point::new(3, 4), Point::new(0, 0), Point::new(0, 0));
        assert!((d - 5.0).abs() < 1e-10);
    }
}

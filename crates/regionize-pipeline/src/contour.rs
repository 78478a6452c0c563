//! Contour tracing and contour-to-polygon conversion.
//!
//! [`trace_external`] extracts the outermost boundaries of every
//! foreground component in a binary mask. [`to_regions`] turns those
//! raw pixel boundaries into a region set: area-filtered, simplified,
//! sorted largest first and capped in count.

use image::GrayImage;
use imageproc::contours::BorderType;

use crate::geometry::{self, DEFAULT_EPSILON_RATIO};
use crate::types::{Point, Polygon, RegionLimits};

/// Trace the external (outermost) contours of a binary mask.
///
/// Any nonzero pixel is foreground. Hole borders and components nested
/// inside holes are skipped. Contours are returned in discovery order
/// (raster scan of their first pixel).
///
/// Components touching the image border are traced like any other:
/// the mask is framed with one row and column of background on every
/// side before tracing, and the frame offset is removed afterwards.
#[must_use]
pub fn trace_external(mask: &GrayImage) -> Vec<Vec<Point>> {
    let mut framed = GrayImage::new(mask.width() + 2, mask.height() + 2);
    image::imageops::replace(&mut framed, mask, 1, 1);

    imageproc::contours::find_contours::<i32>(&framed)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            c.points
                .into_iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect()
        })
        .collect()
}

/// Convert raw contours into a region set.
///
/// A contour is kept when its raw area reaches `limits.min_area`, it
/// simplifies to at least 3 vertices, and the simplified polygon still
/// reaches `limits.min_area`. Survivors are stably sorted by descending
/// area, so equal areas keep discovery order, then truncated to
/// `limits.max_regions`.
#[must_use]
pub fn to_regions(contours: &[Vec<Point>], limits: &RegionLimits) -> Vec<Polygon> {
    let mut accepted: Vec<(f64, Polygon)> = contours
        .iter()
        .filter(|c| geometry::polygon_area(c) >= limits.min_area)
        .filter_map(|c| geometry::simplify(c, DEFAULT_EPSILON_RATIO))
        .map(|poly| (poly.area(), poly))
        .filter(|(area, _)| *area >= limits.min_area)
        .collect();

    accepted.sort_by(|a, b| b.0.total_cmp(&a.0));
    accepted.truncate(limits.max_regions);
    accepted.into_iter().map(|(_, poly)| poly).collect()
}

/// Trace a mask and convert its external contours in one step.
#[must_use]
pub fn mask_to_regions(mask: &GrayImage, limits: &RegionLimits) -> Vec<Polygon> {
    to_regions(&trace_external(mask), limits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(min_area: f64, max_regions: usize) -> RegionLimits {
        RegionLimits {
            min_area,
            max_regions,
        }
    }

    fn fill_rect(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, image::Luma([255]));
            }
        }
    }

    fn rect_contour(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    #[test]
    fn empty_mask_has_no_contours() {
        let img = GrayImage::new(10, 10);
        assert!(trace_external(&img).is_empty());
    }

    #[test]
    fn holes_are_not_external() {
        // A filled square with a hole punched in the middle.
        let mut img = GrayImage::new(30, 30);
        fill_rect(&mut img, 5, 5, 25, 25);
        for y in 10..20 {
            for x in 10..20 {
                img.put_pixel(x, y, image::Luma([0]));
            }
        }
        let contours = trace_external(&img);
        assert_eq!(contours.len(), 1);
    }

    #[test]
    fn island_inside_hole_is_skipped() {
        let mut img = GrayImage::new(40, 40);
        fill_rect(&mut img, 2, 2, 38, 38);
        for y in 8..32 {
            for x in 8..32 {
                img.put_pixel(x, y, image::Luma([0]));
            }
        }
        fill_rect(&mut img, 15, 15, 25, 25);
        assert_eq!(trace_external(&img).len(), 1);
    }

    #[test]
    fn component_at_origin_is_traced() {
        let mut img = GrayImage::new(39, 40);
        fill_rect(&mut img, 0, 0, 13, 40);
        let contours = trace_external(&img);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].contains(&Point::new(0, 0)));
        assert!((geometry::polygon_area(&contours[0]) - 12.0 * 39.0).abs() < f64::EPSILON);
    }

    #[test]
    fn full_frame_mask_is_one_contour() {
        let img = GrayImage::from_pixel(20, 20, image::Luma([255]));
        let contours = trace_external(&img);
        assert_eq!(contours.len(), 1);
        for p in &contours[0] {
            assert!((0..20).contains(&p.x) && (0..20).contains(&p.y), "{p:?}");
        }
        let regions = to_regions(&contours, &limits(100.0, 20));
        assert_eq!(regions.len(), 1);
        assert!((regions[0].area() - 361.0).abs() < f64::EPSILON);
    }

    #[test]
    fn component_on_far_edges_keeps_coordinates() {
        let mut img = GrayImage::new(30, 30);
        fill_rect(&mut img, 20, 20, 30, 30);
        let contours = trace_external(&img);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].contains(&Point::new(29, 29)));
        assert!(contours[0].contains(&Point::new(20, 20)));
    }

    #[test]
    fn separate_blobs_each_traced() {
        let mut img = GrayImage::new(40, 20);
        fill_rect(&mut img, 2, 2, 12, 12);
        fill_rect(&mut img, 20, 2, 35, 15);
        assert_eq!(trace_external(&img).len(), 2);
    }

    #[test]
    fn small_contours_filtered() {
        let contours = vec![rect_contour(0, 0, 2, 2), rect_contour(0, 0, 20, 20)];
        let regions = to_regions(&contours, &limits(10.0, 20));
        assert_eq!(regions.len(), 1);
        assert!((regions[0].area() - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sorted_largest_first_and_truncated() {
        let contours = vec![
            rect_contour(0, 0, 10, 10),
            rect_contour(0, 0, 30, 30),
            rect_contour(0, 0, 20, 20),
        ];
        let regions = to_regions(&contours, &limits(1.0, 2));
        assert_eq!(regions.len(), 2);
        assert!((regions[0].area() - 900.0).abs() < f64::EPSILON);
        assert!((regions[1].area() - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn equal_areas_keep_discovery_order() {
        let first = rect_contour(0, 0, 10, 10);
        let second = rect_contour(50, 50, 60, 60);
        let regions = to_regions(&[first.clone(), second.clone()], &limits(1.0, 20));
        assert_eq!(regions[0].points(), first.as_slice());
        assert_eq!(regions[1].points(), second.as_slice());

        let regions = to_regions(&[second.clone(), first.clone()], &limits(1.0, 20));
        assert_eq!(regions[0].points(), second.as_slice());
        assert_eq!(regions[1].points(), first.as_slice());
    }

    #[test]
    fn degenerate_contours_rejected() {
        let line = vec![Point::new(0, 0), Point::new(10, 0), Point::new(20, 0)];
        assert!(to_regions(&[line], &limits(0.0, 20)).is_empty());
    }

    #[test]
    fn mask_round_trip_produces_rectangle() {
        let mut img = GrayImage::new(50, 50);
        fill_rect(&mut img, 10, 10, 40, 30);
        let regions = mask_to_regions(&img, &limits(100.0, 20));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].len(), 4);
        // Pixel-centre boundary of a 30x20 block spans 29x19.
        assert!((regions[0].area() - 551.0).abs() < f64::EPSILON);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed 2D contours over continuous grid coordinates.
//!
//! Grid positions map onto the plane as `x = col`, `y = row`, so a cell's
//! centre is the point at its own row/column and fractional coordinates
//! (block centroids, hand-drawn hall corners) fall between cells.

use nalgebra::Point2;

/// Plane point for a fractional `(row, col)` grid coordinate.
pub fn grid_point(row: f64, col: f64) -> Point2<f64> {
    Point2::new(col, row)
}

/// Check if a point is inside a contour using even-odd ray casting.
///
/// Contours with fewer than 3 points contain nothing.
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Signed area of a contour (shoelace).
/// Positive = counter-clockwise, Negative = clockwise
pub fn signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Area-weighted centroid of a simple contour.
///
/// Falls back to the vertex average for degenerate (zero-area) input.
pub fn contour_centroid(contour: &[Point2<f64>]) -> Option<Point2<f64>> {
    if contour.is_empty() {
        return None;
    }

    let area = signed_area(contour);
    if area.abs() < 1e-12 {
        let sum = contour
            .iter()
            .fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
        return Some(Point2::from(sum / contour.len() as f64));
    }

    let n = contour.len();
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let a = &contour[i];
        let b = &contour[(i + 1) % n];
        let cross = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    let factor = 1.0 / (6.0 * area);
    Some(Point2::new(cx * factor, cy * factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(min: f64, max: f64) -> Vec<Point2<f64>> {
        vec![
            grid_point(min, min),
            grid_point(min, max),
            grid_point(max, max),
            grid_point(max, min),
        ]
    }

    #[test]
    fn rectangle_hall_contains_centre_not_far_point() {
        let hall = square(1.0, 10.0);
        assert!(point_in_contour(&grid_point(5.0, 5.0), &hall));
        assert!(!point_in_contour(&grid_point(15.0, 15.0), &hall));
        assert!(point_in_contour(&grid_point(2.5, 3.0), &hall));
    }

    #[test]
    fn concave_contour() {
        // L-shape: the notch at the top right is outside
        let contour = vec![
            grid_point(0.0, 0.0),
            grid_point(0.0, 4.0),
            grid_point(2.0, 4.0),
            grid_point(2.0, 2.0),
            grid_point(6.0, 2.0),
            grid_point(6.0, 0.0),
        ];
        assert!(point_in_contour(&grid_point(1.0, 3.0), &contour));
        assert!(point_in_contour(&grid_point(5.0, 1.0), &contour));
        assert!(!point_in_contour(&grid_point(5.0, 3.0), &contour));
    }

    #[test]
    fn degenerate_contours_contain_nothing() {
        let line = vec![grid_point(0.0, 0.0), grid_point(5.0, 5.0)];
        assert!(!point_in_contour(&grid_point(1.0, 1.0), &line));
        assert!(!point_in_contour(&grid_point(1.0, 1.0), &[]));
    }

    #[test]
    fn area_and_centroid() {
        let contour = square(0.0, 4.0);
        assert_relative_eq!(signed_area(&contour).abs(), 16.0);

        let c = contour_centroid(&contour).unwrap();
        assert_relative_eq!(c.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, 2.0, epsilon = 1e-9);

        let flat = vec![grid_point(0.0, 0.0), grid_point(0.0, 4.0)];
        let c = contour_centroid(&flat).unwrap();
        assert_relative_eq!(c.x, 2.0);
        assert!(contour_centroid(&[]).is_none());
    }
}

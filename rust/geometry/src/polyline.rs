// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Open polylines over grid cells.

use venuemap_core::GridPos;

fn cross(prev: GridPos, curr: GridPos, next: GridPos) -> i64 {
    let (px, py) = (i64::from(prev.col), i64::from(prev.row));
    let (cx, cy) = (i64::from(curr.col), i64::from(curr.row));
    let (nx, ny) = (i64::from(next.col), i64::from(next.row));
    (cx - px) * (ny - py) - (cy - py) * (nx - px)
}

fn same_direction(prev: GridPos, curr: GridPos, next: GridPos) -> bool {
    let d1 = (
        i64::from(curr.col) - i64::from(prev.col),
        i64::from(curr.row) - i64::from(prev.row),
    );
    let d2 = (
        i64::from(next.col) - i64::from(curr.col),
        i64::from(next.row) - i64::from(curr.row),
    );
    d1.0 * d2.0 + d1.1 * d2.1 > 0
}

/// Remove repeated points and intermediate points lying on a straight run.
///
/// Endpoints are always kept. A point where the path doubles back on itself
/// is kept even though it is collinear, so the drawn shape is unchanged.
pub fn simplify_polyline(points: &[GridPos]) -> Vec<GridPos> {
    let mut deduped: Vec<GridPos> = Vec::with_capacity(points.len());
    for &p in points {
        if deduped.last() != Some(&p) {
            deduped.push(p);
        }
    }
    if deduped.len() <= 2 {
        return deduped;
    }

    let mut result = Vec::with_capacity(deduped.len());
    result.push(deduped[0]);
    for i in 1..deduped.len() - 1 {
        let prev = *result.last().unwrap_or(&deduped[0]);
        let curr = deduped[i];
        let next = deduped[i + 1];
        if cross(prev, curr, next) != 0 || !same_direction(prev, curr, next) {
            result.push(curr);
        }
    }
    result.push(deduped[deduped.len() - 1]);
    result
}

/// Euclidean length of a polyline in cell units.
pub fn polyline_length(points: &[GridPos]) -> f64 {
    points
        .windows(2)
        .map(|w| {
            let dr = f64::from(w[0].row) - f64::from(w[1].row);
            let dc = f64::from(w[0].col) - f64::from(w[1].col);
            (dr * dr + dc * dc).sqrt()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: u32, col: u32) -> GridPos {
        GridPos::new(row, col)
    }

    #[test]
    fn straight_run_collapses_to_endpoints() {
        let path = vec![p(2, 2), p(2, 3), p(2, 4), p(2, 5)];
        assert_eq!(simplify_polyline(&path), vec![p(2, 2), p(2, 5)]);
    }

    #[test]
    fn corners_are_kept() {
        let path = vec![p(2, 2), p(2, 3), p(2, 4), p(3, 4), p(4, 4), p(5, 4), p(5, 5)];
        assert_eq!(
            simplify_polyline(&path),
            vec![p(2, 2), p(2, 4), p(5, 4), p(5, 5)]
        );
    }

    #[test]
    fn duplicates_and_trivial_inputs() {
        assert_eq!(simplify_polyline(&[]), Vec::<GridPos>::new());
        assert_eq!(simplify_polyline(&[p(1, 1), p(1, 1)]), vec![p(1, 1)]);
        assert_eq!(simplify_polyline(&[p(1, 1), p(1, 2)]), vec![p(1, 1), p(1, 2)]);
    }

    #[test]
    fn reversal_point_is_preserved() {
        let path = vec![p(1, 1), p(1, 3), p(1, 2)];
        assert_eq!(simplify_polyline(&path), path);
    }

    #[test]
    fn length() {
        let path = vec![p(1, 1), p(1, 4), p(5, 4)];
        assert!((polyline_length(&path) - 7.0).abs() < 1e-9);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Route drawing between consecutive visit targets.
//!
//! Each leg is searched on the 4-connected cell lattice with Dijkstra. A
//! search state is a cell plus the direction it was entered from, so a
//! small penalty per change of direction steers the search towards paths
//! with fewer bends. The cell path is then reduced to its corner points.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use venuemap_core::{GridPos, Side, VenueMap};
use venuemap_detection::ItemResolution;
use venuemap_geometry::{polyline_length, simplify_polyline};

use crate::sequence::VisitOrder;

/// Cells a route may not pass through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleMap {
    rows: u32,
    cols: u32,
    blocked: Vec<bool>,
}

impl ObstacleMap {
    /// No obstacles on a grid the size of `map`.
    pub fn empty(map: &VenueMap) -> Self {
        Self {
            rows: map.rows,
            cols: map.cols,
            blocked: vec![false; map.cell_count()],
        }
    }

    /// Label merges and number cells of every block on the map.
    pub fn from_blocks(map: &VenueMap) -> Self {
        let mut obstacles = Self::empty(map);
        for (_, block) in map.blocks() {
            for pos in block.bounds().positions() {
                let is_label = map
                    .merged_region_at(pos)
                    .is_some_and(|region| !region.value.is_empty());
                if is_label {
                    obstacles.insert(pos);
                }
            }
            for cell in block.number_cells() {
                obstacles.insert(cell.pos());
            }
        }
        debug!(blocked = obstacles.count(), "obstacle map built from blocks");
        obstacles
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        let inside = pos.row >= 1 && pos.col >= 1 && pos.row <= self.rows && pos.col <= self.cols;
        inside.then(|| (pos.row - 1) as usize * self.cols as usize + (pos.col - 1) as usize)
    }

    /// Returns false for positions off the grid.
    pub fn insert(&mut self, pos: GridPos) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.blocked[idx] = true;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, pos: GridPos) {
        if let Some(idx) = self.index(pos) {
            self.blocked[idx] = false;
        }
    }

    pub fn is_blocked(&self, pos: GridPos) -> bool {
        self.index(pos).is_some_and(|idx| self.blocked[idx])
    }

    pub fn count(&self) -> usize {
        self.blocked.iter().filter(|b| **b).count()
    }
}

/// Route search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Extra cost per change of direction, in cell steps
    pub turn_penalty: f64,
    /// Reduce each routed leg to its corner points
    pub simplify: bool,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            turn_penalty: 0.5,
            simplify: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Identical or edge-adjacent targets; no search was needed.
    Trivial,
    /// Found by the lattice search.
    Routed,
    /// No obstacle-free path exists, or a target is off the map. Only the
    /// two endpoints are given; the renderer decides how to show it.
    Unreachable,
}

/// One leg of the route between two consecutive targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub from: GridPos,
    pub to: GridPos,
    /// Polyline from `from` to `to`, both included.
    pub points: Vec<GridPos>,
    pub kind: SegmentKind,
}

impl RouteSegment {
    fn trivial(from: GridPos, to: GridPos) -> Self {
        let points = if from == to { vec![from] } else { vec![from, to] };
        Self {
            from,
            to,
            points,
            kind: SegmentKind::Trivial,
        }
    }

    fn unreachable(from: GridPos, to: GridPos) -> Self {
        Self {
            from,
            to,
            points: vec![from, to],
            kind: SegmentKind::Unreachable,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.kind != SegmentKind::Unreachable
    }

    pub fn length(&self) -> f64 {
        polyline_length(&self.points)
    }
}

/// Target cells for every resolved item in visit order. Orphans are skipped.
pub fn visit_targets(order: &VisitOrder, resolution: &ItemResolution) -> Vec<GridPos> {
    order.iter().filter_map(|id| resolution.cell_of(id)).collect()
}

/// One segment per consecutive pair of targets.
pub fn build_route(
    targets: &[GridPos],
    map: &VenueMap,
    obstacles: &ObstacleMap,
    config: &RouteConfig,
) -> Vec<RouteSegment> {
    let segments: Vec<RouteSegment> = targets
        .windows(2)
        .map(|pair| route_segment(pair[0], pair[1], map, obstacles, config))
        .collect();

    let unreachable = segments.iter().filter(|s| !s.is_reachable()).count();
    debug!(targets = targets.len(), segments = segments.len(), unreachable, "route built");
    segments
}

fn route_segment(
    from: GridPos,
    to: GridPos,
    map: &VenueMap,
    obstacles: &ObstacleMap,
    config: &RouteConfig,
) -> RouteSegment {
    if from == to {
        return RouteSegment::trivial(from, to);
    }
    if !map.contains(from) || !map.contains(to) {
        warn!(%from, %to, "route target outside the map");
        return RouteSegment::unreachable(from, to);
    }
    if from.is_adjacent(&to) {
        return RouteSegment::trivial(from, to);
    }

    match find_path(map, obstacles, from, to, config.turn_penalty) {
        Some(path) => {
            let points = if config.simplify {
                simplify_polyline(&path)
            } else {
                path
            };
            RouteSegment {
                from,
                to,
                points,
                kind: SegmentKind::Routed,
            }
        }
        None => {
            debug!(%from, %to, "no obstacle-free path");
            RouteSegment::unreachable(from, to)
        }
    }
}

const NO_DIRECTION: usize = 4;
const SLOTS: usize = 5;

/// Dijkstra over (cell, entry direction) states.
///
/// Obstacles may be left (at `from`) and entered (at `to`) but never
/// crossed. Returns every cell on the path, endpoints included.
pub fn find_path(
    map: &VenueMap,
    obstacles: &ObstacleMap,
    from: GridPos,
    to: GridPos,
    turn_penalty: f64,
) -> Option<Vec<GridPos>> {
    let start = map.index_of(from)?;
    let goal = map.index_of(to)?;
    if start == goal {
        return Some(vec![from]);
    }

    let n = map.cell_count() * SLOTS;
    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut heap = BinaryHeap::new();

    let origin = start * SLOTS + NO_DIRECTION;
    dist[origin] = 0.0;
    heap.push(SearchState {
        cost: 0.0,
        state: origin,
    });

    let mut reached = None;
    while let Some(SearchState { cost, state }) = heap.pop() {
        let (idx, entered) = (state / SLOTS, state % SLOTS);
        if idx == goal {
            reached = Some(state);
            break;
        }
        if cost > dist[state] {
            continue;
        }

        let pos = map.pos_of(idx);
        for (dir, side) in Side::ALL.into_iter().enumerate() {
            let Some(next) = map.neighbor(pos, side) else {
                continue;
            };
            if next != to && obstacles.is_blocked(next) {
                continue;
            }
            let Some(next_idx) = map.index_of(next) else {
                continue;
            };

            let turn = if entered != NO_DIRECTION && entered != dir {
                turn_penalty
            } else {
                0.0
            };
            let next_cost = cost + 1.0 + turn;
            let next_state = next_idx * SLOTS + dir;
            if next_cost < dist[next_state] {
                dist[next_state] = next_cost;
                prev[next_state] = Some(state);
                heap.push(SearchState {
                    cost: next_cost,
                    state: next_state,
                });
            }
        }
    }

    // Reconstruct path
    let mut current = reached?;
    let mut path = vec![map.pos_of(current / SLOTS)];
    while let Some(p) = prev[current] {
        path.push(map.pos_of(p / SLOTS));
        current = p;
    }
    path.reverse();
    Some(path)
}

/// Internal state for Dijkstra's priority queue (min-heap by cost).
#[derive(Debug, Clone, PartialEq)]
struct SearchState {
    cost: f64,
    state: usize,
}

impl Eq for SearchState {}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; ties broken by state for stable output
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.state.cmp(&self.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use venuemap_core::{build_venue_map, Block, BlockOrigin, GridRect, NumberCell, RawSheet, RawValue};

    fn pos(row: u32, col: u32) -> GridPos {
        GridPos::new(row, col)
    }

    fn open_map(rows: u32, cols: u32) -> VenueMap {
        let mut sheet = RawSheet::new("1日目");
        sheet.range = Some(GridRect::spanning(pos(1, 1), pos(rows, cols)).to_string());
        sheet.set_value(pos(rows, cols), RawValue::Text("x".into()));
        build_venue_map(&sheet).unwrap()
    }

    #[test]
    fn degenerate_targets() {
        let map = open_map(10, 10);
        let obstacles = ObstacleMap::empty(&map);
        let route = build_route(
            &[pos(2, 2), pos(2, 2), pos(5, 5)],
            &map,
            &obstacles,
            &RouteConfig::default(),
        );

        assert_eq!(route.len(), 2);
        assert_eq!(route[0].kind, SegmentKind::Trivial);
        assert_eq!(route[0].points, vec![pos(2, 2)]);

        let leg = &route[1];
        assert_eq!(leg.kind, SegmentKind::Routed);
        assert_eq!(leg.points.first(), Some(&pos(2, 2)));
        assert_eq!(leg.points.last(), Some(&pos(5, 5)));
        // One bend is enough on an open grid
        assert_eq!(leg.points.len(), 3);
        assert_relative_eq!(leg.length(), 6.0);
    }

    #[test]
    fn adjacent_targets_are_trivial() {
        let map = open_map(5, 5);
        let route = build_route(
            &[pos(1, 1), pos(1, 2)],
            &map,
            &ObstacleMap::empty(&map),
            &RouteConfig::default(),
        );
        assert_eq!(route[0].kind, SegmentKind::Trivial);
        assert_eq!(route[0].points, vec![pos(1, 1), pos(1, 2)]);
    }

    #[test]
    fn fewer_than_two_targets_give_no_segments() {
        let map = open_map(3, 3);
        let obstacles = ObstacleMap::empty(&map);
        assert!(build_route(&[], &map, &obstacles, &RouteConfig::default()).is_empty());
        assert!(build_route(&[pos(1, 1)], &map, &obstacles, &RouteConfig::default()).is_empty());
    }

    #[test]
    fn path_goes_around_a_wall() {
        let map = open_map(5, 5);
        let mut obstacles = ObstacleMap::empty(&map);
        for row in 1..=4 {
            obstacles.insert(pos(row, 3));
        }

        let path = find_path(&map, &obstacles, pos(1, 1), pos(1, 5), 0.5).unwrap();
        assert_eq!(path.len(), 13);
        assert!(path.iter().all(|p| !obstacles.is_blocked(*p)));
        assert!(path.windows(2).all(|w| w[0].is_adjacent(&w[1])));

        let route = build_route(&[pos(1, 1), pos(1, 5)], &map, &obstacles, &RouteConfig::default());
        assert_eq!(
            route[0].points,
            vec![pos(1, 1), pos(5, 1), pos(5, 5), pos(1, 5)]
        );
    }

    #[test]
    fn obstacle_endpoints_are_allowed() {
        let map = open_map(5, 5);
        let mut obstacles = ObstacleMap::empty(&map);
        obstacles.insert(pos(1, 1));
        obstacles.insert(pos(1, 4));

        let route = build_route(&[pos(1, 1), pos(1, 4)], &map, &obstacles, &RouteConfig::default());
        assert_eq!(route[0].kind, SegmentKind::Routed);
        assert_eq!(route[0].points, vec![pos(1, 1), pos(1, 4)]);
    }

    #[test]
    fn enclosed_target_is_unreachable() {
        let map = open_map(5, 5);
        let mut obstacles = ObstacleMap::empty(&map);
        for p in [pos(2, 3), pos(4, 3), pos(3, 2), pos(3, 4)] {
            obstacles.insert(p);
        }

        let route = build_route(&[pos(1, 1), pos(3, 3)], &map, &obstacles, &RouteConfig::default());
        assert_eq!(route[0].kind, SegmentKind::Unreachable);
        assert_eq!(route[0].points, vec![pos(1, 1), pos(3, 3)]);
        assert!(!route[0].is_reachable());
    }

    #[test]
    fn off_map_target_is_unreachable() {
        let map = open_map(3, 3);
        let route = build_route(
            &[pos(1, 1), pos(9, 9)],
            &map,
            &ObstacleMap::empty(&map),
            &RouteConfig::default(),
        );
        assert_eq!(route[0].kind, SegmentKind::Unreachable);
        assert_eq!(route[0].points, vec![pos(1, 1), pos(9, 9)]);
    }

    #[test]
    fn unsimplified_route_keeps_every_cell() {
        let map = open_map(4, 4);
        let config = RouteConfig {
            simplify: false,
            ..Default::default()
        };
        let route = build_route(&[pos(1, 1), pos(1, 4)], &map, &ObstacleMap::empty(&map), &config);
        assert_eq!(route[0].points, vec![pos(1, 1), pos(1, 2), pos(1, 3), pos(1, 4)]);
    }

    #[test]
    fn block_labels_and_numbers_are_obstacles() {
        let mut sheet = RawSheet::new("1日目");
        sheet.range = Some("A1:E5".into());
        sheet
            .set_value(pos(2, 2), RawValue::Text("A".into()))
            .merge(GridRect::spanning(pos(2, 2), pos(3, 3)))
            .set_value(pos(2, 4), RawValue::Number(5.0))
            .set_value(pos(5, 5), RawValue::Text("x".into()));
        let mut map = build_venue_map(&sheet).unwrap();
        map.insert_block(Block::new(
            "A",
            GridRect::spanning(pos(2, 2), pos(3, 4)),
            vec![NumberCell { row: 2, col: 4, label: 5 }],
            BlockOrigin::Manual,
        ));

        let obstacles = ObstacleMap::from_blocks(&map);
        assert_eq!(obstacles.count(), 5);
        assert!(obstacles.is_blocked(pos(3, 3)));
        assert!(obstacles.is_blocked(pos(2, 4)));
        assert!(!obstacles.is_blocked(pos(3, 4)));
        assert!(!obstacles.is_blocked(pos(9, 9)));
    }
}

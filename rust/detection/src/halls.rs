// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hall partitioning
//!
//! A hall is a named polygon drawn over the venue grid. Every block belongs
//! to the first hall, in definition order, whose outline contains the centre
//! of the block's bounds. Membership is always derived from the current
//! outlines and never stored.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};
use venuemap_core::{BlockKey, Rgb, VenueMap};
use venuemap_geometry::{contour_centroid, grid_point, point_in_contour, Point2};

/// Fewest vertices an outline needs before it takes part in membership.
pub const MIN_HALL_VERTICES: usize = 4;
/// Vertices beyond this count are ignored.
pub const MAX_HALL_VERTICES: usize = 6;

/// Stable identifier of a hall within its [`HallSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HallId(pub u32);

/// A polygon vertex in continuous grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HallVertex {
    pub row: f64,
    pub col: f64,
}

impl HallVertex {
    pub const fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    fn to_point(self) -> Point2<f64> {
        grid_point(self.row, self.col)
    }
}

pub type HallVertices = SmallVec<[HallVertex; MAX_HALL_VERTICES]>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hall {
    pub id: HallId,
    pub name: String,
    vertices: HallVertices,
    pub color: Rgb,
}

impl Hall {
    pub fn vertices(&self) -> &[HallVertex] {
        &self.vertices
    }

    /// Outlines with fewer than four vertices are kept but never match.
    pub fn is_valid(&self) -> bool {
        self.vertices.len() >= MIN_HALL_VERTICES
    }

    /// Replace the outline, keeping at most [`MAX_HALL_VERTICES`] points.
    pub fn set_vertices(&mut self, vertices: &[HallVertex]) {
        if vertices.len() > MAX_HALL_VERTICES {
            warn!(
                hall = %self.name,
                given = vertices.len(),
                kept = MAX_HALL_VERTICES,
                "hall outline has too many vertices, extra ones ignored"
            );
        }
        self.vertices = vertices.iter().take(MAX_HALL_VERTICES).copied().collect();
    }

    pub fn contour(&self) -> Vec<Point2<f64>> {
        self.vertices.iter().map(|v| v.to_point()).collect()
    }

    /// Even-odd membership of a fractional `(row, col)` point.
    pub fn contains(&self, row: f64, col: f64) -> bool {
        self.is_valid() && point_in_contour(&grid_point(row, col), &self.contour())
    }

    /// Where a renderer should put the hall's name, as `(row, col)`.
    pub fn label_anchor(&self) -> Option<(f64, f64)> {
        contour_centroid(&self.contour()).map(|p| (p.y, p.x))
    }
}

/// Ordered list of halls for one venue day.
///
/// The list order decides which hall wins when outlines overlap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HallSet {
    halls: Vec<Hall>,
    next_id: u32,
}

impl HallSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new hall and return its id.
    pub fn add(&mut self, name: impl Into<String>, vertices: &[HallVertex], color: Rgb) -> HallId {
        let id = HallId(self.next_id);
        self.next_id += 1;
        let mut hall = Hall {
            id,
            name: name.into(),
            vertices: SmallVec::new(),
            color,
        };
        hall.set_vertices(vertices);
        self.halls.push(hall);
        id
    }

    pub fn remove(&mut self, id: HallId) -> Option<Hall> {
        let idx = self.position(id)?;
        Some(self.halls.remove(idx))
    }

    pub fn get(&self, id: HallId) -> Option<&Hall> {
        self.halls.iter().find(|hall| hall.id == id)
    }

    pub fn get_mut(&mut self, id: HallId) -> Option<&mut Hall> {
        self.halls.iter_mut().find(|hall| hall.id == id)
    }

    fn position(&self, id: HallId) -> Option<usize> {
        self.halls.iter().position(|hall| hall.id == id)
    }

    /// Returns false when no hall has this id.
    pub fn rename(&mut self, id: HallId, name: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(hall) => {
                hall.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn set_vertices(&mut self, id: HallId, vertices: &[HallVertex]) -> bool {
        match self.get_mut(id) {
            Some(hall) => {
                hall.set_vertices(vertices);
                true
            }
            None => false,
        }
    }

    pub fn set_color(&mut self, id: HallId, color: Rgb) -> bool {
        match self.get_mut(id) {
            Some(hall) => {
                hall.color = color;
                true
            }
            None => false,
        }
    }

    /// Move a hall to `index` in the definition list (clamped to the end).
    pub fn move_hall(&mut self, id: HallId, index: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let hall = self.halls.remove(from);
        let to = index.min(self.halls.len());
        self.halls.insert(to, hall);
        true
    }

    pub fn len(&self) -> usize {
        self.halls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.halls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hall> {
        self.halls.iter()
    }

    /// Ids in definition order.
    pub fn ids(&self) -> Vec<HallId> {
        self.halls.iter().map(|hall| hall.id).collect()
    }

    /// First valid hall containing the point.
    pub fn find_containing(&self, row: f64, col: f64) -> Option<HallId> {
        let mut matches = self.halls.iter().filter(|hall| hall.contains(row, col));
        let first = matches.next()?;
        let others = matches.count();
        if others > 0 {
            debug!(hall = %first.name, others, row, col, "point lies in overlapping halls, first one wins");
        }
        Some(first.id)
    }
}

/// Derived block → hall membership.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HallAssignment {
    halls: FxHashMap<BlockKey, Option<HallId>>,
}

impl HallAssignment {
    /// Hall of a block; `None` for hall-less or unknown blocks.
    pub fn hall_of(&self, block: BlockKey) -> Option<HallId> {
        self.halls.get(&block).copied().flatten()
    }

    pub fn contains_block(&self, block: BlockKey) -> bool {
        self.halls.contains_key(&block)
    }

    /// Blocks assigned to `hall`.
    pub fn blocks_in(&self, hall: HallId) -> impl Iterator<Item = BlockKey> + '_ {
        self.halls
            .iter()
            .filter(move |(_, assigned)| **assigned == Some(hall))
            .map(|(key, _)| *key)
    }

    pub fn len(&self) -> usize {
        self.halls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.halls.is_empty()
    }
}

/// Assign every block on the map to a hall by its bounds centroid.
pub fn assign_halls(map: &VenueMap, halls: &HallSet) -> HallAssignment {
    let assigned: FxHashMap<BlockKey, Option<HallId>> = map
        .blocks()
        .map(|(key, block)| {
            let (row, col) = block.bounds().centroid();
            (key, halls.find_containing(row, col))
        })
        .collect();

    let hall_less = assigned.values().filter(|hall| hall.is_none()).count();
    debug!(blocks = assigned.len(), hall_less, halls = halls.len(), "hall assignment computed");
    HallAssignment { halls: assigned }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use venuemap_core::{Block, BlockOrigin, GridPos, GridRect};

    fn square(min: f64, max: f64) -> Vec<HallVertex> {
        vec![
            HallVertex::new(min, min),
            HallVertex::new(min, max),
            HallVertex::new(max, max),
            HallVertex::new(max, min),
        ]
    }

    fn block(name: &str, a: (u32, u32), b: (u32, u32)) -> Block {
        Block::new(
            name,
            GridRect::spanning(GridPos::new(a.0, a.1), GridPos::new(b.0, b.1)),
            Vec::new(),
            BlockOrigin::Manual,
        )
    }

    #[test]
    fn square_hall_membership() {
        let mut set = HallSet::new();
        let id = set.add("East", &square(1.0, 10.0), Rgb::new(200, 0, 0));
        assert_eq!(set.find_containing(5.0, 5.0), Some(id));
        assert_eq!(set.find_containing(15.0, 15.0), None);
    }

    #[test]
    fn triangles_never_match() {
        let mut set = HallSet::new();
        let id = set.add(
            "Tri",
            &[
                HallVertex::new(0.0, 0.0),
                HallVertex::new(0.0, 20.0),
                HallVertex::new(20.0, 0.0),
            ],
            Rgb::BLACK,
        );
        assert!(!set.get(id).unwrap().is_valid());
        assert_eq!(set.find_containing(2.0, 2.0), None);
    }

    #[test]
    fn vertices_beyond_six_are_dropped() {
        let mut set = HallSet::new();
        let outline: Vec<HallVertex> = (0..8).map(|i| HallVertex::new(i as f64, 0.0)).collect();
        let id = set.add("Big", &outline, Rgb::BLACK);
        let hall = set.get(id).unwrap();
        assert_eq!(hall.vertices().len(), MAX_HALL_VERTICES);
        assert_eq!(hall.vertices()[5], HallVertex::new(5.0, 0.0));
    }

    #[test]
    fn overlapping_halls_resolve_by_list_order() {
        let mut set = HallSet::new();
        let west = set.add("West", &square(0.0, 10.0), Rgb::BLACK);
        let east = set.add("East", &square(5.0, 15.0), Rgb::BLACK);
        assert_eq!(set.find_containing(7.0, 7.0), Some(west));

        assert!(set.move_hall(east, 0));
        assert_eq!(set.ids(), vec![east, west]);
        assert_eq!(set.find_containing(7.0, 7.0), Some(east));
        assert!(!set.move_hall(HallId(99), 0));
    }

    #[test]
    fn edits_by_id() {
        let mut set = HallSet::new();
        let a = set.add("A", &square(0.0, 4.0), Rgb::BLACK);
        let b = set.add("B", &square(0.0, 4.0), Rgb::BLACK);
        assert_ne!(a, b);

        assert!(set.rename(a, "Hall A"));
        assert!(set.set_color(a, Rgb::WHITE));
        assert!(set.set_vertices(b, &square(10.0, 20.0)));
        assert_eq!(set.get(a).unwrap().name, "Hall A");
        assert_eq!(set.get(a).unwrap().color, Rgb::WHITE);
        assert_eq!(set.find_containing(15.0, 15.0), Some(b));

        assert!(set.remove(a).is_some());
        assert!(!set.rename(a, "gone"));
        let c = set.add("C", &[], Rgb::BLACK);
        assert_ne!(c, a);
    }

    #[test]
    fn label_anchor_is_polygon_centroid() {
        let mut set = HallSet::new();
        let id = set.add("A", &square(2.0, 6.0), Rgb::BLACK);
        let (row, col) = set.get(id).unwrap().label_anchor().unwrap();
        assert_relative_eq!(row, 4.0, epsilon = 1e-9);
        assert_relative_eq!(col, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn blocks_take_hall_of_their_centroid() {
        let mut map = VenueMap::default();
        let inside = map.insert_block(block("A", (2, 2), (3, 4)));
        let outside = map.insert_block(block("B", (30, 30), (31, 31)));

        let mut set = HallSet::new();
        let hall = set.add("Main", &square(1.0, 10.0), Rgb::BLACK);
        let assignment = assign_halls(&map, &set);

        assert_eq!(assignment.hall_of(inside), Some(hall));
        assert_eq!(assignment.hall_of(outside), None);
        assert!(assignment.contains_block(outside));
        assert_eq!(assignment.blocks_in(hall).collect::<Vec<_>>(), vec![inside]);
    }
}

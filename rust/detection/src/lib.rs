// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor block detection and hall partitioning
//!
//! This crate turns a [`VenueMap`](venuemap_core::VenueMap) into addressable
//! vendor areas:
//! 1. Detecting blocks as border-bounded regions seeded by label merges
//! 2. Assigning blocks to halls drawn as polygons over the grid
//! 3. Resolving catalogue items to a block, stall cell and hall
//!
//! # Usage
//!
//! ```rust,ignore
//! use venuemap_detection::{assign_halls, install_detected_blocks, resolve_items, DetectionConfig};
//!
//! let mut map = build_venue_map(sheet)?;
//! install_detected_blocks(&mut map, &DetectionConfig::default());
//!
//! let assignment = assign_halls(&map, &halls);
//! let resolution = resolve_items(&map, &assignment, &catalogue);
//! ```

pub mod blocks;
pub mod halls;
pub mod items;
pub mod types;

// Re-export commonly used types and functions
pub use blocks::{
    collect_number_cells, detect_blocks, flood_fill, install_detected_blocks, is_label_token,
};
pub use halls::{
    assign_halls, Hall, HallAssignment, HallId, HallSet, HallVertex, HallVertices,
    MAX_HALL_VERTICES, MIN_HALL_VERTICES,
};
pub use items::{
    resolve_items, CatalogueItem, ItemId, ItemResolution, ItemStatus, OrphanReason, Priority,
};
pub use types::{DetectedBlock, DetectionConfig, DetectionOutcome};

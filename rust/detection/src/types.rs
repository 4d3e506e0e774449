// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for block detection

use serde::{Deserialize, Serialize};
use venuemap_core::{GridPos, GridRect, NumberCell};

/// A block recovered from the grid, before it is installed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedBlock {
    /// Label text of the seeding merged cell
    pub name: String,
    /// Top-left cell of the seeding merged cell
    pub anchor: GridPos,
    /// Bounding rectangle of the filled region
    pub bounds: GridRect,
    /// Numbered stalls inside `bounds`, row-major
    pub number_cells: Vec<NumberCell>,
    /// Number of cells reached by the fill
    pub region_cells: usize,
}

/// Result of a detection run.
///
/// An empty result is not an error: callers may fall back to defining
/// blocks by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DetectionOutcome {
    Detected(Vec<DetectedBlock>),
    NoBlocksDetected,
}

impl DetectionOutcome {
    pub fn into_blocks(self) -> Vec<DetectedBlock> {
        match self {
            DetectionOutcome::Detected(blocks) => blocks,
            DetectionOutcome::NoBlocksDetected => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DetectionOutcome::Detected(blocks) => blocks.len(),
            DetectionOutcome::NoBlocksDetected => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Configuration for block detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Minimum merged-cell area (in cells) for a label seed
    pub min_seed_area: u64,
    /// Maximum label length in characters
    pub max_label_len: usize,
    /// Minimum number of cells a filled region must reach
    pub min_block_cells: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_seed_area: 4,
            max_label_len: 3,
            min_block_cells: 4,
        }
    }
}

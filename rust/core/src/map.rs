// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The venue map: a bounded cell grid plus the vendor blocks placed on it.
//!
//! Cells live in a flat row-major vector so neighbour access during region
//! growth and path search is a single index computation. Blocks are stored in
//! a slot map so keys handed to renderers and hall assignments stay valid
//! while other blocks are added or removed.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::address::{GridPos, GridRect};
use crate::cell::{Cell, MergedRegion};
use crate::error::{Error, Result};
use crate::style::{BorderKind, Side};

new_key_type! {
    /// Key for a vendor block on a venue map.
    pub struct BlockKey;
}

/// A numbered stall inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumberCell {
    pub row: u32,
    pub col: u32,
    pub label: u32,
}

impl NumberCell {
    pub fn pos(&self) -> GridPos {
        GridPos::new(self.row, self.col)
    }
}

/// How a block came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockOrigin {
    Detected,
    Manual,
}

/// An addressable vendor area: a short name plus numbered stalls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
    bounds: GridRect,
    number_cells: Vec<NumberCell>,
    pub origin: BlockOrigin,
}

impl Block {
    /// Create a block. Number cells outside `bounds` are dropped.
    pub fn new(
        name: impl Into<String>,
        bounds: GridRect,
        number_cells: Vec<NumberCell>,
        origin: BlockOrigin,
    ) -> Self {
        let mut block = Self {
            name: name.into(),
            bounds,
            number_cells: Vec::new(),
            origin,
        };
        block.set_number_cells(number_cells);
        block
    }

    pub fn bounds(&self) -> GridRect {
        self.bounds
    }

    pub fn number_cells(&self) -> &[NumberCell] {
        &self.number_cells
    }

    /// Move the block's bounds, discarding stalls that fall outside.
    pub fn set_bounds(&mut self, bounds: GridRect) {
        self.bounds = bounds;
        self.number_cells.retain(|cell| bounds.contains(cell.pos()));
    }

    pub fn set_number_cells(&mut self, mut cells: Vec<NumberCell>) {
        let bounds = self.bounds;
        cells.retain(|cell| bounds.contains(cell.pos()));
        cells.sort_by_key(|cell| (cell.row, cell.col));
        cells.dedup_by_key(|cell| (cell.row, cell.col));
        self.number_cells = cells;
    }

    /// First stall carrying `label`.
    pub fn find_label(&self, label: u32) -> Option<&NumberCell> {
        self.number_cells.iter().find(|cell| cell.label == label)
    }
}

/// The authoritative grid for one venue and day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "StoredMap")]
pub struct VenueMap {
    pub rows: u32,
    pub cols: u32,
    cells: Vec<Cell>,
    merged_regions: Vec<MergedRegion>,
    blocks: SlotMap<BlockKey, Block>,
}

/// Unchecked serialized form; converted only when the cell list fits the grid.
#[derive(Deserialize)]
struct StoredMap {
    rows: u32,
    cols: u32,
    cells: Vec<Cell>,
    merged_regions: Vec<MergedRegion>,
    blocks: SlotMap<BlockKey, Block>,
}

impl TryFrom<StoredMap> for VenueMap {
    type Error = Error;

    fn try_from(stored: StoredMap) -> Result<Self> {
        let expected = stored.rows as usize * stored.cols as usize;
        if stored.cells.len() != expected {
            return Err(Error::CellCountMismatch {
                expected,
                found: stored.cells.len(),
            });
        }
        Ok(Self {
            rows: stored.rows,
            cols: stored.cols,
            cells: stored.cells,
            merged_regions: stored.merged_regions,
            blocks: stored.blocks,
        })
    }
}

impl VenueMap {
    /// Assemble a map from row-major cells. Used by the grid builder.
    pub(crate) fn from_parts(
        rows: u32,
        cols: u32,
        cells: Vec<Cell>,
        merged_regions: Vec<MergedRegion>,
    ) -> Self {
        debug_assert_eq!(cells.len(), rows as usize * cols as usize);
        Self {
            rows,
            cols,
            cells,
            merged_regions,
            blocks: SlotMap::with_key(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn bounds(&self) -> Option<GridRect> {
        (!self.is_empty())
            .then(|| GridRect::spanning(GridPos::new(1, 1), GridPos::new(self.rows, self.cols)))
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.row >= 1 && pos.col >= 1 && pos.row <= self.rows && pos.col <= self.cols
    }

    /// Flat index of a position: `(row - 1) * cols + (col - 1)`.
    pub fn index_of(&self, pos: GridPos) -> Option<usize> {
        self.contains(pos)
            .then(|| (pos.row - 1) as usize * self.cols as usize + (pos.col - 1) as usize)
    }

    pub fn pos_of(&self, index: usize) -> GridPos {
        let cols = self.cols as usize;
        GridPos::new((index / cols) as u32 + 1, (index % cols) as u32 + 1)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cell_at(GridPos::new(row, col))
    }

    pub fn cell_at(&self, pos: GridPos) -> Option<&Cell> {
        self.cells.get(self.index_of(pos)?)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cell_at_mut(&mut self, pos: GridPos) -> Option<&mut Cell> {
        let idx = self.index_of(pos)?;
        self.cells.get_mut(idx)
    }

    pub(crate) fn set_merged_regions(&mut self, regions: Vec<MergedRegion>) {
        self.merged_regions = regions;
    }

    pub fn merged_regions(&self) -> &[MergedRegion] {
        &self.merged_regions
    }

    /// Merged region covering `pos`, if any.
    pub fn merged_region_at(&self, pos: GridPos) -> Option<&MergedRegion> {
        let anchor = self.cell_at(pos)?.merge_anchor?;
        self.merged_regions.iter().find(|m| m.anchor() == anchor)
    }

    /// The neighbouring position across `side`, if it lies on the map.
    pub fn neighbor(&self, pos: GridPos, side: Side) -> Option<GridPos> {
        let (dr, dc) = side.delta();
        let row = u32::try_from(i64::from(pos.row) + dr).ok()?;
        let col = u32::try_from(i64::from(pos.col) + dc).ok()?;
        let next = GridPos::new(row, col);
        self.contains(next).then_some(next)
    }

    /// Weight of the border on the edge shared by `pos` and its neighbour
    /// across `side`: the stronger of the two facing sides.
    pub fn edge_border(&self, pos: GridPos, side: Side) -> BorderKind {
        let own = self
            .cell_at(pos)
            .map(|c| c.borders.kind(side))
            .unwrap_or_default();
        let other = self
            .neighbor(pos, side)
            .and_then(|n| self.cell_at(n))
            .map(|c| c.borders.kind(side.opposite()))
            .unwrap_or_default();
        own.max(other)
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    pub fn blocks(&self) -> impl Iterator<Item = (BlockKey, &Block)> {
        self.blocks.iter()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block(&self, key: BlockKey) -> Option<&Block> {
        self.blocks.get(key)
    }

    /// Every block whose name equals `name` exactly, ordered by the top-left
    /// corner of their bounds so the order does not depend on key reuse.
    pub fn blocks_named(&self, name: &str) -> Vec<(BlockKey, &Block)> {
        let mut named: Vec<_> = self
            .blocks
            .iter()
            .filter(|(_, block)| block.name == name)
            .collect();
        named.sort_by_key(|(_, block)| {
            let b = block.bounds();
            (b.min_row, b.min_col, b.max_row, b.max_col)
        });
        named
    }

    /// The first of [`VenueMap::blocks_named`].
    pub fn block_by_name(&self, name: &str) -> Option<(BlockKey, &Block)> {
        self.blocks_named(name).into_iter().next()
    }

    pub fn insert_block(&mut self, block: Block) -> BlockKey {
        self.blocks.insert(block)
    }

    pub fn remove_block(&mut self, key: BlockKey) -> Option<Block> {
        self.blocks.remove(key)
    }

    pub fn block_mut(&mut self, key: BlockKey) -> Option<&mut Block> {
        self.blocks.get_mut(key)
    }

    /// Swap out every detected block for a fresh detection result.
    /// Manually defined blocks are kept.
    pub fn replace_detected_blocks(&mut self, blocks: Vec<Block>) -> Vec<BlockKey> {
        self.blocks
            .retain(|_, block| block.origin != BlockOrigin::Detected);
        blocks
            .into_iter()
            .map(|block| self.blocks.insert(block))
            .collect()
    }
}

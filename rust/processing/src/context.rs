// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planning context for one event day.
//!
//! A [`DayContext`] owns the day's map, halls and visit list together with
//! everything derived from them: hall membership, item resolution and the
//! drawn route. Every edit recomputes what lies downstream of it before
//! returning, so queries always reflect the latest state.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use venuemap_core::{
    build_venue_map, Block, BlockKey, BlockOrigin, Cell, GridPos, GridRect, RawSheet, RawWorkbook,
    Rgb, VenueMap,
};
use venuemap_detection::{
    assign_halls, collect_number_cells, install_detected_blocks, resolve_items, CatalogueItem,
    DetectionConfig, DetectionOutcome, HallAssignment, HallId, HallSet, HallVertex, ItemId,
    ItemResolution,
};
use venuemap_route::{
    build_route, visit_targets, GroupKey, MoveResult, ObstacleMap, RouteConfig, RouteSegment,
    SubOrders, VisitOrder,
};

use crate::error::{Error, Result};
use crate::store::{DayKey, DayState, DayStore};

/// What a renderer should show on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VisitStatus {
    Unvisited,
    /// `position` is the 1-based stop number in the visit order.
    Planned { position: usize },
}

/// Tunables for the derived computations.
#[derive(Debug, Clone, Default)]
pub struct ContextConfig {
    pub detection: DetectionConfig,
    pub route: RouteConfig,
}

pub struct DayContext {
    key: DayKey,
    state: DayState,
    catalogue: Vec<CatalogueItem>,
    config: ContextConfig,

    // Derived
    assignment: HallAssignment,
    resolution: ItemResolution,
    obstacles: Option<ObstacleMap>,
    route: Vec<RouteSegment>,
    planned: FxHashMap<GridPos, usize>,
}

impl DayContext {
    pub fn new(key: DayKey, state: DayState, catalogue: Vec<CatalogueItem>) -> Self {
        Self::with_config(key, state, catalogue, ContextConfig::default())
    }

    pub fn with_config(
        key: DayKey,
        state: DayState,
        catalogue: Vec<CatalogueItem>,
        config: ContextConfig,
    ) -> Self {
        let mut ctx = Self {
            key,
            state,
            catalogue,
            config,
            assignment: HallAssignment::default(),
            resolution: ItemResolution::default(),
            obstacles: None,
            route: Vec::new(),
            planned: FxHashMap::default(),
        };
        ctx.recompute();
        ctx
    }

    /// Load the day from `store`, starting empty if nothing was saved.
    pub fn load(store: &impl DayStore, key: DayKey, catalogue: Vec<CatalogueItem>) -> Result<Self> {
        let state = store.load(&key)?.unwrap_or_default();
        Ok(Self::new(key, state, catalogue))
    }

    pub fn save(&self, store: &mut impl DayStore) -> Result<()> {
        store.save(&self.key, &self.state)?;
        info!(key = %self.key, "day saved");
        Ok(())
    }

    pub fn key(&self) -> &DayKey {
        &self.key
    }

    pub fn state(&self) -> &DayState {
        &self.state
    }

    pub fn into_state(self) -> DayState {
        self.state
    }

    // =========================================================================
    // Map import and block editing
    // =========================================================================

    /// Replace the day's map with one built from `sheet` and detect its blocks.
    ///
    /// A sheet without a usable range fails and leaves the current map in place.
    pub fn import_sheet(&mut self, sheet: &RawSheet) -> Result<DetectionOutcome> {
        let mut map = build_venue_map(sheet)?;
        let outcome = install_detected_blocks(&mut map, &self.config.detection);
        info!(
            key = %self.key,
            sheet = %sheet.name,
            rows = map.rows,
            cols = map.cols,
            blocks = map.block_count(),
            "venue map imported"
        );
        self.state.map = Some(map);
        self.recompute();
        Ok(outcome)
    }

    /// Import the sheet named for this context's day.
    pub fn import_workbook(&mut self, book: &RawWorkbook) -> Result<DetectionOutcome> {
        let sheet = book
            .sheet_for_day(self.key.day)
            .ok_or(Error::UnknownDay(self.key.day))?;
        self.import_sheet(sheet)
    }

    /// Replace the day's map with one that already carries its blocks.
    pub fn install_map(&mut self, map: VenueMap) {
        debug!(key = %self.key, blocks = map.block_count(), "venue map installed");
        self.state.map = Some(map);
        self.recompute();
    }

    /// Detect again on the current map. Manually defined blocks survive.
    pub fn redetect_blocks(&mut self) -> Result<DetectionOutcome> {
        let map = self.state.map.as_mut().ok_or(Error::NoMap)?;
        let outcome = install_detected_blocks(map, &self.config.detection);
        self.recompute();
        Ok(outcome)
    }

    /// Define a block by hand. Its stalls are the numbered cells inside `bounds`.
    pub fn define_block(&mut self, name: impl Into<String>, bounds: GridRect) -> Result<BlockKey> {
        let map = self.state.map.as_mut().ok_or(Error::NoMap)?;
        let cells = collect_number_cells(map, &bounds);
        let key = map.insert_block(Block::new(name, bounds, cells, BlockOrigin::Manual));
        self.recompute();
        Ok(key)
    }

    /// Move a block's bounds and rescan its stalls.
    pub fn update_block_bounds(&mut self, key: BlockKey, bounds: GridRect) -> Result<()> {
        let map = self.state.map.as_mut().ok_or(Error::NoMap)?;
        let cells = collect_number_cells(map, &bounds);
        let block = map.block_mut(key).ok_or(Error::UnknownBlock(key))?;
        block.set_bounds(bounds);
        block.set_number_cells(cells);
        self.recompute();
        Ok(())
    }

    pub fn remove_block(&mut self, key: BlockKey) -> Result<Block> {
        let map = self.state.map.as_mut().ok_or(Error::NoMap)?;
        let block = map.remove_block(key).ok_or(Error::UnknownBlock(key))?;
        self.recompute();
        Ok(block)
    }

    // =========================================================================
    // Halls
    // =========================================================================

    pub fn add_hall(&mut self, name: impl Into<String>, vertices: &[HallVertex], color: Rgb) -> HallId {
        let id = self.state.halls.add(name, vertices, color);
        self.recompute();
        id
    }

    pub fn set_hall_vertices(&mut self, id: HallId, vertices: &[HallVertex]) -> Result<()> {
        if !self.state.halls.set_vertices(id, vertices) {
            return Err(Error::UnknownHall(id));
        }
        self.recompute();
        Ok(())
    }

    pub fn rename_hall(&mut self, id: HallId, name: impl Into<String>) -> Result<()> {
        // Names do not affect membership
        if self.state.halls.rename(id, name) {
            Ok(())
        } else {
            Err(Error::UnknownHall(id))
        }
    }

    pub fn set_hall_color(&mut self, id: HallId, color: Rgb) -> Result<()> {
        if self.state.halls.set_color(id, color) {
            Ok(())
        } else {
            Err(Error::UnknownHall(id))
        }
    }

    /// Move a hall within the definition list, changing overlap precedence.
    pub fn move_hall(&mut self, id: HallId, index: usize) -> Result<()> {
        if !self.state.halls.move_hall(id, index) {
            return Err(Error::UnknownHall(id));
        }
        self.recompute();
        Ok(())
    }

    pub fn remove_hall(&mut self, id: HallId) -> Result<()> {
        self.state.halls.remove(id).ok_or(Error::UnknownHall(id))?;
        self.recompute();
        Ok(())
    }

    // =========================================================================
    // Catalogue and visit order
    // =========================================================================

    /// Swap in a fresh catalogue. Deleted items leave the visit order.
    pub fn set_catalogue(&mut self, catalogue: Vec<CatalogueItem>) {
        self.catalogue = catalogue;
        let known: FxHashSet<ItemId> = self.catalogue.iter().map(|item| item.id).collect();
        let dropped = self.state.visit_order.retain_known(|id| known.contains(&id));
        self.state.sub_orders.retain_known(|id| known.contains(&id));
        if dropped > 0 {
            debug!(key = %self.key, dropped, "items no longer in the catalogue left the visit order");
        }
        self.recompute();
    }

    pub fn catalogue(&self) -> &[CatalogueItem] {
        &self.catalogue
    }

    /// Add items to the visit order, ordered as in `candidates`.
    pub fn append_visits(&mut self, selected: &[ItemId], candidates: &[ItemId]) -> usize {
        let added = self.state.visit_order.append(selected, candidates);
        if added > 0 {
            self.rebuild_route();
        }
        added
    }

    pub fn remove_visits(&mut self, ids: &[ItemId]) -> usize {
        let removed = self.state.visit_order.remove(ids);
        if removed > 0 {
            self.rebuild_route();
        }
        removed
    }

    pub fn move_up(&mut self, ids: &[ItemId]) -> MoveResult {
        let result = self.state.visit_order.move_up(ids, &self.resolution);
        if result.is_moved() {
            self.rebuild_route();
        }
        result
    }

    pub fn move_down(&mut self, ids: &[ItemId]) -> MoveResult {
        let result = self.state.visit_order.move_down(ids, &self.resolution);
        if result.is_moved() {
            self.rebuild_route();
        }
        result
    }

    /// Record the group order used by [`DayContext::reorder_by_hall_order`].
    pub fn set_group_order(&mut self, order: Vec<GroupKey>) {
        self.state.group_order = order;
    }

    pub fn set_sub_order(&mut self, group: GroupKey, items: Vec<ItemId>) {
        self.state.sub_orders.set(group, items);
    }

    /// Regroup the visit order by the recorded group order and sub-orders.
    pub fn reorder_by_hall_order(&mut self) {
        let DayState {
            visit_order,
            group_order,
            sub_orders,
            ..
        } = &mut self.state;
        visit_order.reorder_by_hall_order(group_order, sub_orders, &self.resolution);
        self.rebuild_route();
    }

    pub fn visit_order(&self) -> &VisitOrder {
        &self.state.visit_order
    }

    pub fn group_order(&self) -> &[GroupKey] {
        &self.state.group_order
    }

    pub fn sub_orders(&self) -> &SubOrders {
        &self.state.sub_orders
    }

    // =========================================================================
    // Renderer queries
    // =========================================================================

    pub fn map(&self) -> Option<&VenueMap> {
        self.state.map.as_ref()
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.map()?.cell(row, col)
    }

    pub fn cell_visit_status(&self, row: u32, col: u32) -> VisitStatus {
        match self.planned.get(&GridPos::new(row, col)) {
            Some(&position) => VisitStatus::Planned { position },
            None => VisitStatus::Unvisited,
        }
    }

    pub fn block_hall(&self, key: BlockKey) -> Option<HallId> {
        self.assignment.hall_of(key)
    }

    pub fn hall_of_item(&self, id: ItemId) -> Option<HallId> {
        self.resolution.hall_of(id)
    }

    pub fn route_segments(&self) -> &[RouteSegment] {
        &self.route
    }

    pub fn halls(&self) -> &HallSet {
        &self.state.halls
    }

    pub fn resolution(&self) -> &ItemResolution {
        &self.resolution
    }

    pub fn obstacles(&self) -> Option<&ObstacleMap> {
        self.obstacles.as_ref()
    }

    // =========================================================================
    // Recomputation
    // =========================================================================

    /// Rebuild hall membership, item resolution and the route.
    fn recompute(&mut self) {
        let empty = VenueMap::default();
        let map = self.state.map.as_ref().unwrap_or(&empty);
        self.assignment = assign_halls(map, &self.state.halls);
        self.resolution = resolve_items(map, &self.assignment, &self.catalogue);
        self.obstacles = self.state.map.as_ref().map(ObstacleMap::from_blocks);
        self.rebuild_route();
    }

    fn rebuild_route(&mut self) {
        let targets = visit_targets(&self.state.visit_order, &self.resolution);

        self.planned.clear();
        for (idx, target) in targets.iter().enumerate() {
            self.planned.entry(*target).or_insert(idx + 1);
        }

        self.route = match (&self.state.map, &self.obstacles) {
            (Some(map), Some(obstacles)) => build_route(&targets, map, obstacles, &self.config.route),
            _ => Vec::new(),
        };
        debug!(
            key = %self.key,
            visits = self.state.visit_order.len(),
            targets = targets.len(),
            segments = self.route.len(),
            "route rebuilt"
        );
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Catalogue item resolution
//!
//! Catalogue entries name a block (`"A"`) and a stall label (`"5-1"`). An
//! item resolves when a block with exactly that name exists and one of its
//! number cells carries the leading number of the label. Items that do not
//! resolve are orphans: they stay in the catalogue but take no part in hall
//! grouping or routing.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use venuemap_core::{day_of_sheet, leading_number, parse_all_digits, BlockKey, GridPos, VenueMap};

use crate::halls::{HallAssignment, HallId};

/// Catalogue identifier of an item the user may visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// User-assigned urgency of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    #[serde(alias = "none")]
    Normal,
    #[serde(alias = "priority")]
    High,
    Highest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueItem {
    pub id: ItemId,
    pub block_name: String,
    /// Stall label as written in the catalogue, e.g. `5-1` or `１２a`.
    pub number_label: String,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub priority: Priority,
}

impl CatalogueItem {
    pub fn new(id: u64, block_name: impl Into<String>, number_label: impl Into<String>) -> Self {
        Self {
            id: ItemId(id),
            block_name: block_name.into(),
            number_label: number_label.into(),
            event_date: None,
            priority: Priority::Normal,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_event_date(mut self, date: impl Into<String>) -> Self {
        self.event_date = Some(date.into());
        self
    }

    /// Day named by `event_date`, written like a day sheet (`2日目`) or as a
    /// bare number. `None` when undated or written some other way.
    pub fn event_day(&self) -> Option<u32> {
        let date = self.event_date.as_deref()?.trim();
        day_of_sheet(date).or_else(|| parse_all_digits(date))
    }

    /// Items without a recognisable day belong to every day.
    pub fn is_for_day(&self, day: u32) -> bool {
        self.event_day().map_or(true, |event_day| event_day == day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrphanReason {
    /// No block carries the item's block name.
    UnknownBlock,
    /// The stall label does not start with a digit.
    NoNumber,
    /// The block has no number cell with that label.
    UnknownNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Resolved {
        block: BlockKey,
        cell: GridPos,
        hall: Option<HallId>,
    },
    Orphan(OrphanReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResolvedItem {
    status: ItemStatus,
    priority: Priority,
}

/// Resolution of every catalogue item against one map and hall assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemResolution {
    items: FxHashMap<ItemId, ResolvedItem>,
}

impl ItemResolution {
    /// `None` when the item is not in the catalogue.
    pub fn status(&self, id: ItemId) -> Option<ItemStatus> {
        self.items.get(&id).map(|item| item.status)
    }

    pub fn is_known(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Unknown items count as orphans.
    pub fn is_orphan(&self, id: ItemId) -> bool {
        !matches!(self.status(id), Some(ItemStatus::Resolved { .. }))
    }

    pub fn hall_of(&self, id: ItemId) -> Option<HallId> {
        match self.status(id)? {
            ItemStatus::Resolved { hall, .. } => hall,
            ItemStatus::Orphan(_) => None,
        }
    }

    pub fn cell_of(&self, id: ItemId) -> Option<GridPos> {
        match self.status(id)? {
            ItemStatus::Resolved { cell, .. } => Some(cell),
            ItemStatus::Orphan(_) => None,
        }
    }

    pub fn block_of(&self, id: ItemId) -> Option<BlockKey> {
        match self.status(id)? {
            ItemStatus::Resolved { block, .. } => Some(block),
            ItemStatus::Orphan(_) => None,
        }
    }

    pub fn priority_of(&self, id: ItemId) -> Priority {
        self.items
            .get(&id)
            .map(|item| item.priority)
            .unwrap_or_default()
    }

    /// Orphaned items, sorted by id.
    pub fn orphans(&self) -> Vec<(ItemId, OrphanReason)> {
        let mut orphans: Vec<_> = self
            .items
            .iter()
            .filter_map(|(id, item)| match item.status {
                ItemStatus::Orphan(reason) => Some((*id, reason)),
                ItemStatus::Resolved { .. } => None,
            })
            .collect();
        orphans.sort_by_key(|(id, _)| *id);
        orphans
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Resolve catalogue items against the map's blocks.
pub fn resolve_items(
    map: &VenueMap,
    assignment: &HallAssignment,
    items: &[CatalogueItem],
) -> ItemResolution {
    let resolved: FxHashMap<ItemId, ResolvedItem> = items
        .iter()
        .map(|item| {
            let status = resolve_one(map, assignment, item);
            if let ItemStatus::Orphan(reason) = status {
                debug!(item = %item.id, block = %item.block_name, label = %item.number_label, ?reason, "orphan item");
            }
            (
                item.id,
                ResolvedItem {
                    status,
                    priority: item.priority,
                },
            )
        })
        .collect();
    ItemResolution { items: resolved }
}

/// Blocks sharing a name are searched top-left first; the first stall with
/// the label wins.
fn resolve_one(map: &VenueMap, assignment: &HallAssignment, item: &CatalogueItem) -> ItemStatus {
    let candidates = map.blocks_named(&item.block_name);
    if candidates.is_empty() {
        return ItemStatus::Orphan(OrphanReason::UnknownBlock);
    }
    let Some(label) = leading_number(&item.number_label) else {
        return ItemStatus::Orphan(OrphanReason::NoNumber);
    };
    candidates
        .into_iter()
        .find_map(|(key, block)| {
            block.find_label(label).map(|cell| ItemStatus::Resolved {
                block: key,
                cell: cell.pos(),
                hall: assignment.hall_of(key),
            })
        })
        .unwrap_or(ItemStatus::Orphan(OrphanReason::UnknownNumber))
}

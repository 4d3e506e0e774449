// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Visit sequencing
//!
//! A [`VisitOrder`] is the ordered, duplicate-free list of items the user
//! plans to visit on one day. Manual moves must not carry an item past a
//! neighbour from another hall; bulk regrouping arranges the list hall by
//! hall. Every operation is a pure edit of the list.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;
use venuemap_detection::{HallId, ItemId, ItemResolution, Priority};

/// Partition key for regrouping: the item's hall plus its priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GroupKey {
    pub hall: Option<HallId>,
    #[serde(default)]
    pub priority: Priority,
}

impl GroupKey {
    pub const fn new(hall: Option<HallId>, priority: Priority) -> Self {
        Self { hall, priority }
    }

    pub const fn hall(hall: HallId) -> Self {
        Self::new(Some(hall), Priority::Normal)
    }
}

/// Derived group membership of an item.
///
/// Moves compare only [`GroupKey::hall`]; regrouping uses the whole key.
pub trait GroupLookup {
    fn group_of(&self, id: ItemId) -> GroupKey;
}

impl GroupLookup for ItemResolution {
    fn group_of(&self, id: ItemId) -> GroupKey {
        GroupKey::new(self.hall_of(id), self.priority_of(id))
    }
}

/// Explicit table; unlisted items are hall-less with normal priority.
impl GroupLookup for FxHashMap<ItemId, GroupKey> {
    fn group_of(&self, id: ItemId) -> GroupKey {
        self.get(&id).copied().unwrap_or_default()
    }
}

/// One recorded per-group ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubOrder {
    pub group: GroupKey,
    pub items: Vec<ItemId>,
}

/// Explicit item orderings recorded inside individual groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubOrders {
    orders: Vec<SubOrder>,
}

impl SubOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, group: &GroupKey) -> Option<&[ItemId]> {
        self.orders
            .iter()
            .find(|order| order.group == *group)
            .map(|order| order.items.as_slice())
    }

    /// Record the order for `group`, replacing any earlier one.
    pub fn set(&mut self, group: GroupKey, items: Vec<ItemId>) {
        match self.orders.iter_mut().find(|order| order.group == group) {
            Some(order) => order.items = items,
            None => self.orders.push(SubOrder { group, items }),
        }
    }

    pub fn retain_known(&mut self, known: impl Fn(ItemId) -> bool) {
        for order in &mut self.orders {
            order.items.retain(|id| known(*id));
        }
        self.orders.retain(|order| !order.items.is_empty());
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Why a move left the list unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// None of the selected ids is in the list.
    NotPresent,
    /// The selected ids present in the list do not form one unbroken run.
    NotContiguous,
    /// The edge member is already first (or last).
    AtBoundary,
    /// The neighbour on the move side belongs to a different hall.
    HallMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Moved,
    Rejected(RejectReason),
}

impl MoveResult {
    pub fn is_moved(self) -> bool {
        self == MoveResult::Moved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Ordered, duplicate-free list of items to visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ItemId>", into = "Vec<ItemId>")]
pub struct VisitOrder {
    items: Vec<ItemId>,
}

impl From<Vec<ItemId>> for VisitOrder {
    /// Later duplicates are dropped.
    fn from(ids: Vec<ItemId>) -> Self {
        let mut seen = FxHashSet::default();
        let items = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        Self { items }
    }
}

impl From<VisitOrder> for Vec<ItemId> {
    fn from(order: VisitOrder) -> Self {
        order.items
    }
}

impl VisitOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[ItemId] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains(&id)
    }

    /// Zero-based position of `id`.
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| *item == id)
    }

    /// Append the selected ids that are not yet in the list.
    ///
    /// New ids follow their order in `candidates`, not selection order.
    /// Selected ids missing from `candidates` come last, in selection order.
    /// Returns the number of ids added.
    pub fn append(&mut self, selected: &[ItemId], candidates: &[ItemId]) -> usize {
        let wanted: FxHashSet<ItemId> = selected.iter().copied().collect();
        let mut present: FxHashSet<ItemId> = self.items.iter().copied().collect();
        let before = self.items.len();

        for id in candidates.iter().chain(selected.iter()) {
            if wanted.contains(id) && present.insert(*id) {
                self.items.push(*id);
            }
        }
        self.items.len() - before
    }

    /// Remove ids; survivors keep their relative order. Returns the number removed.
    pub fn remove(&mut self, ids: &[ItemId]) -> usize {
        let doomed: FxHashSet<ItemId> = ids.iter().copied().collect();
        let before = self.items.len();
        self.items.retain(|id| !doomed.contains(id));
        before - self.items.len()
    }

    /// Drop ids for which `known` is false, e.g. items deleted from the catalogue.
    pub fn retain_known(&mut self, known: impl Fn(ItemId) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|id| known(*id));
        before - self.items.len()
    }

    pub fn move_up(&mut self, ids: &[ItemId], lookup: &impl GroupLookup) -> MoveResult {
        self.shift(ids, lookup, Direction::Up)
    }

    pub fn move_down(&mut self, ids: &[ItemId], lookup: &impl GroupLookup) -> MoveResult {
        self.shift(ids, lookup, Direction::Down)
    }

    /// Move the selection, an unbroken run of the list, past the neighbour
    /// of its edge member.
    fn shift(&mut self, ids: &[ItemId], lookup: &impl GroupLookup, direction: Direction) -> MoveResult {
        let selected: FxHashSet<ItemId> = ids.iter().copied().collect();
        let positions: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, id)| selected.contains(*id))
            .map(|(idx, _)| idx)
            .collect();
        let (Some(&first), Some(&last)) = (positions.first(), positions.last()) else {
            return MoveResult::Rejected(RejectReason::NotPresent);
        };
        if last - first + 1 != positions.len() {
            return MoveResult::Rejected(RejectReason::NotContiguous);
        }

        let (edge, neighbour) = match direction {
            Direction::Up if first == 0 => return MoveResult::Rejected(RejectReason::AtBoundary),
            Direction::Up => (first, first - 1),
            Direction::Down if last + 1 >= self.items.len() => {
                return MoveResult::Rejected(RejectReason::AtBoundary)
            }
            Direction::Down => (last, last + 1),
        };

        let edge_hall = lookup.group_of(self.items[edge]).hall;
        let neighbour_hall = lookup.group_of(self.items[neighbour]).hall;
        if edge_hall != neighbour_hall {
            debug!(
                item = %self.items[edge],
                neighbour = %self.items[neighbour],
                "move crosses a hall boundary, rejected"
            );
            return MoveResult::Rejected(RejectReason::HallMismatch);
        }

        match direction {
            Direction::Up => self.items[neighbour..=last].rotate_left(1),
            Direction::Down => self.items[first..=neighbour].rotate_right(1),
        }
        MoveResult::Moved
    }

    /// Regroup the list by [`GroupKey`].
    ///
    /// Groups appear in `group_order`; groups missing from it follow in the
    /// order they are first met. Inside a group, a recorded sub-order comes
    /// first and the remaining items keep their relative order. Applying the
    /// same arguments twice changes nothing the second time.
    pub fn reorder_by_hall_order(
        &mut self,
        group_order: &[GroupKey],
        sub_orders: &SubOrders,
        lookup: &impl GroupLookup,
    ) {
        let mut partitions: Vec<(GroupKey, Vec<ItemId>)> = Vec::new();
        for &id in &self.items {
            let key = lookup.group_of(id);
            match partitions.iter_mut().find(|(group, _)| *group == key) {
                Some((_, members)) => members.push(id),
                None => partitions.push((key, vec![id])),
            }
        }

        let mut emitted: Vec<GroupKey> = Vec::with_capacity(partitions.len());
        let keys = group_order
            .iter()
            .copied()
            .chain(partitions.iter().map(|(key, _)| *key))
            .collect::<Vec<_>>();

        let mut reordered = Vec::with_capacity(self.items.len());
        for key in keys {
            if emitted.contains(&key) {
                continue;
            }
            let Some((_, members)) = partitions.iter().find(|(group, _)| *group == key) else {
                continue;
            };
            emitted.push(key);
            reordered.extend(apply_sub_order(members, sub_orders.get(&key)));
        }

        self.items = reordered;
    }
}

/// Members listed in `sub_order` first, in that order, then the rest.
fn apply_sub_order(members: &[ItemId], sub_order: Option<&[ItemId]>) -> Vec<ItemId> {
    let Some(sub_order) = sub_order else {
        return members.to_vec();
    };
    let in_group: FxHashSet<ItemId> = members.iter().copied().collect();
    let mut placed = FxHashSet::default();
    let mut ordered: Vec<ItemId> = sub_order
        .iter()
        .copied()
        .filter(|id| in_group.contains(id) && placed.insert(*id))
        .collect();
    ordered.extend(members.iter().copied().filter(|id| !placed.contains(id)));
    ordered
}

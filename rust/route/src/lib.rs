// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # VenueMap Route
//!
//! The day's visit list and the walking route drawn through it.
//!
//! - [`VisitOrder`]: ordered, duplicate-free item list with hall-aware moves
//!   and regrouping by [`GroupKey`]
//! - [`build_route`]: one obstacle-avoiding [`RouteSegment`] per pair of
//!   consecutive targets, found by a turn-penalised Dijkstra search

pub mod path;
pub mod sequence;

pub use path::{
    build_route, find_path, visit_targets, ObstacleMap, RouteConfig, RouteSegment, SegmentKind,
};
pub use sequence::{
    GroupKey, GroupLookup, MoveResult, RejectReason, SubOrder, SubOrders, VisitOrder,
};

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared venue planning pipeline used by the planner and embedding apps.
//!
//! [`DayContext`] is the single owner of one event day's state; every edit
//! goes through it and eagerly refreshes hall membership, item resolution
//! and the route. [`DayStore`] is the persistence seam.

pub mod context;
pub mod error;
pub mod pipeline;
pub mod store;

pub use context::{ContextConfig, DayContext, VisitStatus};
pub use error::{Error, Result};
pub use pipeline::{process_workbook, BlockSummary, DayMap, DaySummary};
pub use store::{DayKey, DayState, DayStore, JsonDirStore, MemoryStore};

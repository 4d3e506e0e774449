// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON report written to stdout.

use serde::Serialize;
use venuemap_detection::{ItemId, OrphanReason};
use venuemap_processing::{DayContext, DaySummary};
use venuemap_route::RouteSegment;

#[derive(Debug, Serialize)]
pub struct WorkbookReport {
    pub event_id: String,
    pub days: Vec<DayReport>,
    /// Day sheets that could not be turned into a map.
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub struct DayReport {
    #[serde(flatten)]
    pub summary: DaySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanReport>,
}

#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub halls: usize,
    pub stops: Vec<ItemId>,
    pub orphans: Vec<Orphan>,
    pub segments: Vec<RouteSegment>,
    pub unreachable: usize,
    pub length: f64,
}

#[derive(Debug, Serialize)]
pub struct Orphan {
    pub id: ItemId,
    pub reason: OrphanReason,
}

impl PlanReport {
    pub fn from_context(ctx: &DayContext) -> Self {
        let segments = ctx.route_segments().to_vec();
        Self {
            halls: ctx.halls().len(),
            stops: ctx.visit_order().iter().collect(),
            orphans: ctx
                .resolution()
                .orphans()
                .into_iter()
                .map(|(id, reason)| Orphan { id, reason })
                .collect(),
            unreachable: segments.iter().filter(|s| !s.is_reachable()).count(),
            length: segments.iter().map(RouteSegment::length).sum(),
            segments,
        }
    }
}

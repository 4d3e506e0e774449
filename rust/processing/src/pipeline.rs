// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Whole-workbook processing: every day sheet to a map with detected blocks.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};
use venuemap_core::{build_venue_map, RawWorkbook, VenueMap};
use venuemap_detection::{install_detected_blocks, DetectionConfig};

use crate::error::Result;

/// A day sheet turned into a map, blocks installed.
#[derive(Debug, Clone)]
pub struct DayMap {
    pub day: u32,
    pub sheet: String,
    pub map: VenueMap,
}

/// Compact description of a day map for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub day: u32,
    pub sheet: String,
    pub rows: u32,
    pub cols: u32,
    pub merged_regions: usize,
    pub blocks: Vec<BlockSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockSummary {
    pub name: String,
    pub bounds: String,
    pub stalls: Vec<u32>,
}

impl DayMap {
    pub fn summary(&self) -> DaySummary {
        let mut blocks: Vec<BlockSummary> = self
            .map
            .blocks()
            .map(|(_, block)| BlockSummary {
                name: block.name.clone(),
                bounds: block.bounds().to_string(),
                stalls: block.number_cells().iter().map(|cell| cell.label).collect(),
            })
            .collect();
        blocks.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.bounds.cmp(&b.bounds)));

        DaySummary {
            day: self.day,
            sheet: self.sheet.clone(),
            rows: self.map.rows,
            cols: self.map.cols,
            merged_regions: self.map.merged_regions().len(),
            blocks,
        }
    }
}

/// Build and detect every day sheet of a workbook in parallel.
///
/// Results are in day order. One failing sheet does not stop the others.
pub fn process_workbook(book: &RawWorkbook, config: &DetectionConfig) -> Vec<(u32, Result<DayMap>)> {
    let days = book.day_sheets();
    info!(sheets = book.sheets.len(), days = days.len(), "processing workbook");

    days.into_par_iter()
        .map(|(day, sheet)| {
            let result: Result<DayMap> = build_venue_map(sheet)
                .map(|mut map| {
                    if install_detected_blocks(&mut map, config).is_empty() {
                        warn!(day, sheet = %sheet.name, "no blocks detected, define them by hand");
                    }
                    DayMap {
                        day,
                        sheet: sheet.name.clone(),
                        map,
                    }
                })
                .map_err(Into::into);
            (day, result)
        })
        .collect()
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Block detection via border-bounded flood fill
//!
//! Every large merged cell holding a short alphabetic or kana label seeds a
//! region. The region grows cell by cell until it meets a medium-or-stronger
//! border; its bounding rectangle becomes the block and the numeric cells
//! inside become its stalls.

use std::collections::VecDeque;

use rayon::prelude::*;
use tracing::debug;
use venuemap_core::{
    Block, BlockOrigin, CellValue, GridPos, GridRect, MergedRegion, NumberCell, Side, VenueMap,
};

use crate::types::{DetectedBlock, DetectionConfig, DetectionOutcome};

/// Detect vendor blocks on a venue map.
///
/// The map is never mutated; install the result with
/// [`VenueMap::replace_detected_blocks`]. Output is ordered by seed anchor.
pub fn detect_blocks(map: &VenueMap, config: &DetectionConfig) -> DetectionOutcome {
    let seeds = find_seeds(map, config);

    // Each fill is independent of the others
    let candidates: Vec<Option<(DetectedBlock, Vec<usize>)>> = seeds
        .par_iter()
        .map(|seed| grow_block(map, seed, config))
        .collect();

    // A label already swallowed by an earlier block's region is the same block
    let mut claimed: Vec<Vec<usize>> = Vec::new();
    let mut blocks = Vec::new();
    for (block, visited) in candidates.into_iter().flatten() {
        let anchor_idx = map.index_of(block.anchor);
        let absorbed = anchor_idx.is_some_and(|idx| {
            claimed
                .iter()
                .any(|region| region.binary_search(&idx).is_ok())
        });
        if absorbed {
            debug!(name = %block.name, anchor = %block.anchor, "label inside an existing block region, skipped");
            continue;
        }
        claimed.push(visited);
        blocks.push(block);
    }

    debug!(seeds = seeds.len(), blocks = blocks.len(), "block detection finished");
    if blocks.is_empty() {
        DetectionOutcome::NoBlocksDetected
    } else {
        DetectionOutcome::Detected(blocks)
    }
}

/// Detect and install in one step: detected blocks are replaced, manual
/// ones kept. Returns what was detected.
pub fn install_detected_blocks(map: &mut VenueMap, config: &DetectionConfig) -> DetectionOutcome {
    let outcome = detect_blocks(map, config);
    map.replace_detected_blocks(
        outcome
            .clone()
            .into_blocks()
            .into_iter()
            .map(DetectedBlock::into_block)
            .collect(),
    );
    outcome
}

/// Merged regions that qualify as block labels, deduplicated by anchor.
fn find_seeds<'a>(map: &'a VenueMap, config: &DetectionConfig) -> Vec<&'a MergedRegion> {
    let mut seeds: Vec<&MergedRegion> = map
        .merged_regions()
        .iter()
        .filter(|region| region.area() >= config.min_seed_area)
        .filter(|region| match &region.value {
            CellValue::Text(text) => is_label_token(text, config.max_label_len),
            _ => false,
        })
        .collect();
    seeds.sort_by_key(|region| region.anchor());
    seeds.dedup_by_key(|region| region.anchor());
    seeds
}

/// A short token of Latin letters (ASCII or full-width) or kana.
pub fn is_label_token(text: &str, max_len: usize) -> bool {
    let text = text.trim();
    let len = text.chars().count();
    len >= 1 && len <= max_len && text.chars().all(is_label_char)
}

fn is_label_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || matches!(c,
            '\u{FF21}'..='\u{FF3A}'   // full-width A-Z
            | '\u{FF41}'..='\u{FF5A}' // full-width a-z
            | '\u{3041}'..='\u{309F}' // hiragana
            | '\u{30A0}'..='\u{30FF}' // katakana
            | '\u{FF66}'..='\u{FF9F}' // half-width katakana
        )
}

/// Grow one seed into a block candidate.
///
/// Returns the block and the sorted flat indices of its region, or `None`
/// when the region is too small or holds no numbered cell.
fn grow_block(
    map: &VenueMap,
    seed: &MergedRegion,
    config: &DetectionConfig,
) -> Option<(DetectedBlock, Vec<usize>)> {
    let name = seed.value.as_text()?.trim().to_string();
    let anchor = seed.anchor();
    let mut visited = flood_fill(map, anchor);

    if visited.len() < config.min_block_cells {
        debug!(%name, %anchor, cells = visited.len(), "region too small, rejected");
        return None;
    }

    let mut bounds = GridRect::single(anchor);
    for &idx in &visited {
        bounds.include(map.pos_of(idx));
    }

    let number_cells = collect_number_cells(map, &bounds);
    if number_cells.is_empty() {
        debug!(%name, %anchor, %bounds, "no numbered cells inside region, rejected");
        return None;
    }

    let region_cells = visited.len();
    visited.sort_unstable();
    Some((
        DetectedBlock {
            name,
            anchor,
            bounds,
            number_cells,
            region_cells,
        },
        visited,
    ))
}

/// Breadth-first fill from `start`, crossing only unbordered or thin edges.
///
/// Uses a flat `row * cols + col` visited array and an explicit queue so
/// large venues cannot exhaust the stack.
pub fn flood_fill(map: &VenueMap, start: GridPos) -> Vec<usize> {
    let Some(start_idx) = map.index_of(start) else {
        return Vec::new();
    };

    let mut visited = vec![false; map.cell_count()];
    let mut region = Vec::new();
    let mut queue = VecDeque::new();

    visited[start_idx] = true;
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        if let Some(idx) = map.index_of(pos) {
            region.push(idx);
        }

        for side in Side::ALL {
            if map.edge_border(pos, side).blocks_fill() {
                continue;
            }
            let Some(next) = map.neighbor(pos, side) else {
                continue;
            };
            let Some(next_idx) = map.index_of(next) else {
                continue;
            };
            if !visited[next_idx] {
                visited[next_idx] = true;
                queue.push_back(next);
            }
        }
    }

    region
}

/// Every numeric cell inside `bounds`, row by row.
pub fn collect_number_cells(map: &VenueMap, bounds: &GridRect) -> Vec<NumberCell> {
    bounds
        .positions()
        .filter_map(|pos| {
            let label = map.cell_at(pos)?.value.numeric_label()?;
            Some(NumberCell {
                row: pos.row,
                col: pos.col,
                label,
            })
        })
        .collect()
}

impl DetectedBlock {
    pub fn into_block(self) -> Block {
        Block::new(self.name, self.bounds, self.number_cells, BlockOrigin::Detected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use venuemap_core::{build_venue_map, RawSheet, RawValue};

    fn pos(row: u32, col: u32) -> GridPos {
        GridPos::new(row, col)
    }

    fn rect(a: (u32, u32), b: (u32, u32)) -> GridRect {
        GridRect::spanning(pos(a.0, a.1), pos(b.0, b.1))
    }

    /// Merged "A" at B2:C3, stall 5 at D2, thick box around B2:D3.
    fn enclosed_sheet() -> RawSheet {
        let mut sheet = RawSheet::new("1日目");
        sheet.range = Some("A1:J10".into());
        sheet
            .set_value(pos(2, 2), RawValue::Text("A".into()))
            .merge(rect((2, 2), (3, 3)))
            .set_value(pos(2, 4), RawValue::Number(5.0))
            .outline(rect((2, 2), (3, 4)), "thick");
        sheet
    }

    #[test]
    fn detects_enclosed_block() {
        let map = build_venue_map(&enclosed_sheet()).unwrap();
        let blocks = detect_blocks(&map, &DetectionConfig::default()).into_blocks();

        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.name, "A");
        assert_eq!(block.bounds, rect((2, 2), (3, 4)));
        assert_eq!(block.region_cells, 6);
        assert_eq!(block.number_cells, vec![NumberCell { row: 2, col: 4, label: 5 }]);
    }

    #[test]
    fn thin_borders_do_not_stop_the_fill() {
        let mut sheet = RawSheet::new("1日目");
        sheet
            .set_value(pos(2, 2), RawValue::Text("A".into()))
            .merge(rect((2, 2), (3, 3)))
            .set_value(pos(2, 4), RawValue::Number(5.0));
        for cell in rect((2, 2), (3, 4)).positions() {
            sheet.outline(GridRect::single(cell), "thin");
        }
        sheet
            .outline(rect((2, 2), (3, 4)), "double")
            .set_value(pos(3, 5), RawValue::Text("12".into()));
        let map = build_venue_map(&sheet).unwrap();

        let blocks = detect_blocks(&map, &DetectionConfig::default()).into_blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].bounds, rect((2, 2), (3, 4)));
        assert_eq!(blocks[0].number_cells.len(), 1);
    }

    #[test]
    fn rejects_blocks_without_numbers() {
        let mut sheet = RawSheet::new("1日目");
        sheet
            .set_value(pos(2, 2), RawValue::Text("B".into()))
            .merge(rect((2, 2), (3, 3)))
            .outline(rect((2, 2), (3, 4)), "medium");
        let map = build_venue_map(&sheet).unwrap();
        assert_eq!(
            detect_blocks(&map, &DetectionConfig::default()),
            DetectionOutcome::NoBlocksDetected
        );
    }

    #[test]
    fn small_merges_and_long_labels_are_not_seeds() {
        let mut sheet = RawSheet::new("1日目");
        sheet
            .set_value(pos(1, 1), RawValue::Text("A".into()))
            .merge(rect((1, 1), (1, 3)))
            .set_value(pos(5, 1), RawValue::Text("ABCD".into()))
            .merge(rect((5, 1), (6, 2)))
            .set_value(pos(8, 1), RawValue::Text("12".into()))
            .merge(rect((8, 1), (9, 2)))
            .set_value(pos(2, 5), RawValue::Number(1.0));
        let map = build_venue_map(&sheet).unwrap();
        assert!(find_seeds(&map, &DetectionConfig::default()).is_empty());
    }

    #[test]
    fn region_smaller_than_minimum_is_rejected() {
        let config = DetectionConfig {
            min_block_cells: 7,
            ..Default::default()
        };
        let map = build_venue_map(&enclosed_sheet()).unwrap();
        assert!(detect_blocks(&map, &config).into_blocks().is_empty());
    }

    #[test]
    fn second_label_in_same_region_is_absorbed() {
        let mut sheet = RawSheet::new("1日目");
        sheet
            .set_value(pos(2, 2), RawValue::Text("A".into()))
            .merge(rect((2, 2), (3, 3)))
            .set_value(pos(4, 2), RawValue::Text("C".into()))
            .merge(rect((4, 2), (5, 3)))
            .set_value(pos(2, 4), RawValue::Number(5.0))
            .outline(rect((2, 2), (5, 4)), "thick");
        let map = build_venue_map(&sheet).unwrap();

        let blocks = detect_blocks(&map, &DetectionConfig::default()).into_blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "A");
        assert_eq!(blocks[0].bounds, rect((2, 2), (5, 4)));
    }

    #[test]
    fn kana_and_full_width_labels() {
        assert!(is_label_token("あ", 3));
        assert!(is_label_token("ア", 3));
        assert!(is_label_token("Ａb", 3));
        assert!(is_label_token(" ｶ ", 3));
        assert!(!is_label_token("東", 3));
        assert!(!is_label_token("A1", 3));
        assert!(!is_label_token("", 3));
        assert!(!is_label_token("ABCD", 3));
    }

    #[test]
    fn detection_is_deterministic() {
        let map = build_venue_map(&enclosed_sheet()).unwrap();
        let first = detect_blocks(&map, &DetectionConfig::default());
        let second = detect_blocks(&map, &DetectionConfig::default());
        assert_eq!(first, second);
    }

    #[test]
    fn installing_twice_keeps_manual_blocks() {
        let mut map = build_venue_map(&enclosed_sheet()).unwrap();
        let stalls = collect_number_cells(&map, &rect((1, 4), (3, 4)));
        assert_eq!(stalls, vec![NumberCell { row: 2, col: 4, label: 5 }]);
        map.insert_block(Block::new("Z", rect((1, 4), (3, 4)), stalls, BlockOrigin::Manual));

        let config = DetectionConfig::default();
        assert_eq!(install_detected_blocks(&mut map, &config).len(), 1);
        assert_eq!(install_detected_blocks(&mut map, &config).len(), 1);

        assert_eq!(map.block_count(), 2);
        assert_eq!(map.blocks_named("A").len(), 1);
        let (_, manual) = map.block_by_name("Z").unwrap();
        assert_eq!(manual.origin, BlockOrigin::Manual);
    }

    #[test]
    fn flood_fill_outside_map_is_empty() {
        let map = build_venue_map(&enclosed_sheet()).unwrap();
        assert!(flood_fill(&map, pos(40, 40)).is_empty());
    }
}

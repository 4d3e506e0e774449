// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid model builder: raw sheet → [`VenueMap`]
//!
//! The output grid is anchored at `A1` and trimmed to the last row and column
//! that carry anything visible (a value, a fill, a border or a merge).

use rustc_hash::FxHashMap;

use crate::address::{parse_address, parse_range, GridPos, GridRect};
use crate::cell::{Cell, CellValue, MergedRegion};
use crate::error::{Error, Result};
use crate::map::VenueMap;
use crate::raw::{RawBorder, RawCell, RawSheet, RawValue};
use crate::style::{normalize_background, BorderKind, BorderStyle, Borders, Rgb, Side};

/// Largest grid [`build_venue_map`] will allocate, in cells.
pub const DEFAULT_MAX_CELLS: usize = 4_000_000;

/// Build a venue map from one decoded sheet.
///
/// Fails when no address range can be determined, an address is malformed,
/// or the trimmed grid exceeds [`DEFAULT_MAX_CELLS`]. A sheet with nothing on
/// it yields an empty map.
pub fn build_venue_map(sheet: &RawSheet) -> Result<VenueMap> {
    build_venue_map_with_limit(sheet, DEFAULT_MAX_CELLS)
}

/// [`build_venue_map`] with an explicit cap on `rows * cols`.
pub fn build_venue_map_with_limit(sheet: &RawSheet, max_cells: usize) -> Result<VenueMap> {
    let range = sheet_range(sheet)?;

    // Sparse pass: only cells inside the declared range, last write wins
    let mut sparse: FxHashMap<GridPos, Cell> = FxHashMap::default();
    for raw in &sheet.cells {
        let pos = parse_address(&raw.address)?;
        if range.contains(pos) {
            sparse.insert(pos, convert_cell(pos, raw));
        }
    }

    let mut merges = Vec::with_capacity(sheet.merges.len());
    for merge in &sheet.merges {
        if let Some(rect) = parse_range(merge)?.intersect(&range) {
            if rect.area() > 1 {
                merges.push(rect);
            }
        }
    }
    merges.sort_by_key(|rect| (rect.min_row, rect.min_col, rect.max_row, rect.max_col));
    merges.dedup();

    // Trim trailing blank rows/columns
    let mut rows = 0;
    let mut cols = 0;
    for cell in sparse.values().filter(|cell| !cell.is_blank()) {
        rows = rows.max(cell.row);
        cols = cols.max(cell.col);
    }
    for rect in &merges {
        rows = rows.max(rect.max_row);
        cols = cols.max(rect.max_col);
    }

    let total = rows as usize * cols as usize;
    if total > max_cells {
        return Err(Error::GridTooLarge {
            rows,
            cols,
            limit: max_cells,
        });
    }

    let mut cells = Vec::with_capacity(total);
    for row in 1..=rows {
        for col in 1..=cols {
            let pos = GridPos::new(row, col);
            cells.push(sparse.remove(&pos).unwrap_or_else(|| Cell::blank(pos)));
        }
    }

    let mut map = VenueMap::from_parts(rows, cols, cells, Vec::new());
    let regions = apply_merges(&mut map, &merges);
    map.set_merged_regions(regions);
    Ok(map)
}

/// Declared range, or the bounding box of every address on the sheet.
fn sheet_range(sheet: &RawSheet) -> Result<GridRect> {
    if let Some(declared) = sheet.range.as_deref().filter(|r| !r.trim().is_empty()) {
        return parse_range(declared);
    }

    let mut range: Option<GridRect> = None;
    for raw in &sheet.cells {
        let rect = GridRect::single(parse_address(&raw.address)?);
        range = Some(range.map_or(rect, |r| r.union(&rect)));
    }
    for merge in &sheet.merges {
        let rect = parse_range(merge)?;
        range = Some(range.map_or(rect, |r| r.union(&rect)));
    }
    range.ok_or_else(|| Error::NoRange(sheet.name.clone()))
}

fn convert_cell(pos: GridPos, raw: &RawCell) -> Cell {
    let mut cell = Cell::blank(pos);
    cell.value = convert_value(&raw.value);
    cell.background = normalize_background(raw.fill.as_deref());

    let mut borders = Borders::default();
    for (side, border) in [
        (Side::Top, &raw.borders.top),
        (Side::Right, &raw.borders.right),
        (Side::Bottom, &raw.borders.bottom),
        (Side::Left, &raw.borders.left),
    ] {
        borders.set(side, border.as_ref().map(convert_border));
    }
    cell.borders = borders;
    cell
}

fn convert_value(raw: &RawValue) -> CellValue {
    match raw {
        RawValue::Null => CellValue::Empty,
        RawValue::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        RawValue::Number(n) => CellValue::Number(*n),
        RawValue::Text(text) if text.trim().is_empty() => CellValue::Empty,
        RawValue::Text(text) => CellValue::Text(text.clone()),
    }
}

fn convert_border(raw: &RawBorder) -> BorderStyle {
    BorderStyle {
        kind: BorderKind::from_style_name(&raw.style),
        color: raw
            .color
            .as_deref()
            .and_then(|c| Rgb::parse(c).ok().flatten()),
    }
}

/// Stamp merge anchors onto covered cells and collect the merged regions.
///
/// A merge overlapping an earlier one is skipped so that every cell keeps at
/// most one anchor.
fn apply_merges(map: &mut VenueMap, merges: &[GridRect]) -> Vec<MergedRegion> {
    let mut regions = Vec::with_capacity(merges.len());
    for rect in merges {
        let overlaps = rect
            .positions()
            .any(|pos| map.cell_at(pos).is_some_and(|c| c.merge_anchor.is_some()));
        if overlaps {
            continue;
        }

        let anchor = rect.top_left();
        let value = map
            .cell_at(anchor)
            .map(|c| c.value.clone())
            .unwrap_or_default();
        for pos in rect.positions() {
            if let Some(cell) = map.cell_at_mut(pos) {
                cell.is_merged = true;
                cell.merge_anchor = Some(anchor);
                if pos != anchor {
                    cell.value = CellValue::Empty;
                }
            }
        }
        regions.push(MergedRegion::new(*rect, value));
    }
    regions
}

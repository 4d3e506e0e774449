// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded workbook input.
//!
//! These types mirror what a spreadsheet reader hands over after unpacking a
//! workbook: A1 addresses, raw values, fill colours, border style names and
//! merge ranges. Sheets named `<digits>日目` hold the map for that day.

use serde::{Deserialize, Serialize};

use crate::address::{GridPos, GridRect};
use crate::text::digit_value;

/// Raw cell value as stored in the workbook.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Raw border: a style name such as `thin` or `mediumDashed` plus a colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBorder {
    pub style: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawBorders {
    #[serde(default)]
    pub top: Option<RawBorder>,
    #[serde(default)]
    pub right: Option<RawBorder>,
    #[serde(default)]
    pub bottom: Option<RawBorder>,
    #[serde(default)]
    pub left: Option<RawBorder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCell {
    /// A1-style address, e.g. `C7`.
    pub address: String,
    #[serde(default)]
    pub value: RawValue,
    /// Fill colour (`#RRGGBB` / `AARRGGBB`).
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub borders: RawBorders,
}

impl RawCell {
    pub fn new(address: impl Into<String>, value: RawValue) -> Self {
        Self {
            address: address.into(),
            value,
            fill: None,
            borders: RawBorders::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawSheet {
    pub name: String,
    /// Declared used range, e.g. `A1:J10`.
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub cells: Vec<RawCell>,
    /// Merge ranges, e.g. `B2:C3`.
    #[serde(default)]
    pub merges: Vec<String>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn cell_mut(&mut self, pos: GridPos) -> &mut RawCell {
        let address = pos.to_string();
        match self.cells.iter().position(|c| c.address == address) {
            Some(idx) => &mut self.cells[idx],
            None => {
                self.cells.push(RawCell::new(address, RawValue::Null));
                let last = self.cells.len() - 1;
                &mut self.cells[last]
            }
        }
    }

    pub fn set_value(&mut self, pos: GridPos, value: RawValue) -> &mut Self {
        self.cell_mut(pos).value = value;
        self
    }

    pub fn merge(&mut self, rect: GridRect) -> &mut Self {
        self.merges.push(rect.to_string());
        self
    }

    /// Draw a border of the given style name around the outside of `rect`.
    pub fn outline(&mut self, rect: GridRect, style: &str) -> &mut Self {
        let border = || {
            Some(RawBorder {
                style: style.to_string(),
                color: None,
            })
        };
        for col in rect.min_col..=rect.max_col {
            self.cell_mut(GridPos::new(rect.min_row, col)).borders.top = border();
            self.cell_mut(GridPos::new(rect.max_row, col)).borders.bottom = border();
        }
        for row in rect.min_row..=rect.max_row {
            self.cell_mut(GridPos::new(row, rect.min_col)).borders.left = border();
            self.cell_mut(GridPos::new(row, rect.max_col)).borders.right = border();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawWorkbook {
    pub sheets: Vec<RawSheet>,
}

impl RawWorkbook {
    /// Sheets holding per-day venue maps, ordered by day number.
    pub fn day_sheets(&self) -> Vec<(u32, &RawSheet)> {
        let mut days: Vec<_> = self
            .sheets
            .iter()
            .filter_map(|sheet| day_of_sheet(&sheet.name).map(|day| (day, sheet)))
            .collect();
        days.sort_by_key(|(day, _)| *day);
        days
    }

    /// First sheet for a given day.
    pub fn sheet_for_day(&self, day: u32) -> Option<&RawSheet> {
        self.sheets
            .iter()
            .find(|sheet| day_of_sheet(&sheet.name) == Some(day))
    }
}

/// Day number of a sheet named `<digits>日目` (`1日目`, `２日目`).
pub fn day_of_sheet(name: &str) -> Option<u32> {
    let digits = name.trim().strip_suffix("日目")?;
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0u32, |acc, c| {
        acc.checked_mul(10)?.checked_add(digit_value(c)?)
    })
}

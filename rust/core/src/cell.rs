// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cells and merged regions of a venue grid

use serde::{Deserialize, Serialize};

use crate::address::{GridPos, GridRect};
use crate::style::{Borders, Rgb};
use crate::text::parse_all_digits;

/// Displayed value of a cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Integer stall label carried by this value, if any.
    ///
    /// Numbers must be non-negative and integral; text must consist of digits.
    pub fn numeric_label(&self) -> Option<u32> {
        match self {
            CellValue::Number(n) => {
                let n = *n;
                let integral = n.is_finite() && n.fract() == 0.0;
                (integral && n >= 0.0 && n <= f64::from(u32::MAX)).then(|| n as u32)
            }
            CellValue::Text(text) => parse_all_digits(text),
            CellValue::Empty => None,
        }
    }
}

/// One cell of a [`crate::VenueMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub value: CellValue,
    pub background: Option<Rgb>,
    pub borders: Borders,
    pub is_merged: bool,
    /// Top-left cell of the merged region covering this cell.
    pub merge_anchor: Option<GridPos>,
}

impl Cell {
    pub fn blank(pos: GridPos) -> Self {
        Self {
            row: pos.row,
            col: pos.col,
            value: CellValue::Empty,
            background: None,
            borders: Borders::default(),
            is_merged: false,
            merge_anchor: None,
        }
    }

    pub fn pos(&self) -> GridPos {
        GridPos::new(self.row, self.col)
    }

    /// A cell with no value, no fill and no borders.
    pub fn is_blank(&self) -> bool {
        self.value.is_empty() && self.background.is_none() && self.borders.is_empty()
    }

    pub fn is_merge_anchor(&self) -> bool {
        self.merge_anchor == Some(self.pos())
    }
}

/// Rectangular run of cells sharing one displayed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRegion {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
    pub value: CellValue,
}

impl MergedRegion {
    pub fn new(rect: GridRect, value: CellValue) -> Self {
        Self {
            start_row: rect.min_row,
            start_col: rect.min_col,
            end_row: rect.max_row,
            end_col: rect.max_col,
            value,
        }
    }

    pub fn rect(&self) -> GridRect {
        GridRect {
            min_row: self.start_row,
            min_col: self.start_col,
            max_row: self.end_row,
            max_col: self.end_col,
        }
    }

    pub fn anchor(&self) -> GridPos {
        GridPos::new(self.start_row, self.start_col)
    }

    pub fn area(&self) -> u64 {
        self.rect().area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_labels() {
        assert_eq!(CellValue::Number(5.0).numeric_label(), Some(5));
        assert_eq!(CellValue::Number(5.5).numeric_label(), None);
        assert_eq!(CellValue::Number(-1.0).numeric_label(), None);
        assert_eq!(CellValue::Text("12".into()).numeric_label(), Some(12));
        assert_eq!(CellValue::Text("A".into()).numeric_label(), None);
        assert_eq!(CellValue::Empty.numeric_label(), None);
    }

    #[test]
    fn whitespace_text_is_empty() {
        assert!(CellValue::Text("  ".into()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn merged_region_geometry() {
        let rect = GridRect::spanning(GridPos::new(2, 2), GridPos::new(3, 3));
        let region = MergedRegion::new(rect, CellValue::Text("A".into()));
        assert_eq!(region.anchor(), GridPos::new(2, 2));
        assert_eq!(region.area(), 4);
        assert_eq!(region.rect(), rect);
    }
}

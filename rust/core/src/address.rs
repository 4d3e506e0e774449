// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A1-style cell addressing using nom
//!
//! Rows and columns are 1-based, matching spreadsheet notation: `A1` is
//! row 1, column 1. Absolute markers (`$B$2`) are accepted and ignored.

use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, digit1},
    combinator::{all_consuming, map, map_res, opt},
    sequence::{pair, preceded},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Largest row index a sheet may address.
pub const MAX_ROWS: u32 = 1_048_576;
/// Largest column index a sheet may address (`XFD`).
pub const MAX_COLS: u32 = 16_384;

/// A cell position on the venue grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub row: u32,
    pub col: u32,
}

impl GridPos {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Returns true if the two positions share an edge.
    pub fn is_adjacent(&self, other: &GridPos) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row)
    }
}

/// Inclusive rectangle of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub min_row: u32,
    pub min_col: u32,
    pub max_row: u32,
    pub max_col: u32,
}

impl GridRect {
    /// Rectangle spanning two corners given in any order.
    pub fn spanning(a: GridPos, b: GridPos) -> Self {
        Self {
            min_row: a.row.min(b.row),
            min_col: a.col.min(b.col),
            max_row: a.row.max(b.row),
            max_col: a.col.max(b.col),
        }
    }

    pub fn single(pos: GridPos) -> Self {
        Self::spanning(pos, pos)
    }

    pub fn top_left(&self) -> GridPos {
        GridPos::new(self.min_row, self.min_col)
    }

    pub fn height(&self) -> u32 {
        self.max_row - self.min_row + 1
    }

    pub fn width(&self) -> u32 {
        self.max_col - self.min_col + 1
    }

    pub fn area(&self) -> u64 {
        u64::from(self.height()) * u64::from(self.width())
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.row >= self.min_row
            && pos.row <= self.max_row
            && pos.col >= self.min_col
            && pos.col <= self.max_col
    }

    /// Grows the rectangle so that it covers `pos`.
    pub fn include(&mut self, pos: GridPos) {
        self.min_row = self.min_row.min(pos.row);
        self.min_col = self.min_col.min(pos.col);
        self.max_row = self.max_row.max(pos.row);
        self.max_col = self.max_col.max(pos.col);
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &GridRect) -> GridRect {
        GridRect {
            min_row: self.min_row.min(other.min_row),
            min_col: self.min_col.min(other.min_col),
            max_row: self.max_row.max(other.max_row),
            max_col: self.max_col.max(other.max_col),
        }
    }

    /// Intersection of two rectangles, if they overlap.
    pub fn intersect(&self, other: &GridRect) -> Option<GridRect> {
        let rect = GridRect {
            min_row: self.min_row.max(other.min_row),
            min_col: self.min_col.max(other.min_col),
            max_row: self.max_row.min(other.max_row),
            max_col: self.max_col.min(other.max_col),
        };
        (rect.min_row <= rect.max_row && rect.min_col <= rect.max_col).then_some(rect)
    }

    /// Centre of the rectangle as fractional `(row, col)`.
    pub fn centroid(&self) -> (f64, f64) {
        (
            (f64::from(self.min_row) + f64::from(self.max_row)) / 2.0,
            (f64::from(self.min_col) + f64::from(self.max_col)) / 2.0,
        )
    }

    /// Row-major iteration over every position in the rectangle.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        (self.min_row..=self.max_row)
            .flat_map(move |row| (self.min_col..=self.max_col).map(move |col| GridPos::new(row, col)))
    }
}

impl fmt::Display for GridRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            GridPos::new(self.min_row, self.min_col),
            GridPos::new(self.max_row, self.max_col)
        )
    }
}

/// Convert a 1-based column index into its letter form (1 → `A`, 27 → `AA`).
pub fn column_letters(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        letters.push(b'A' + rem);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn column_index(letters: &str) -> std::result::Result<u32, &'static str> {
    let col = letters.bytes().fold(0u32, |acc, b| {
        acc * 26 + u32::from(b.to_ascii_uppercase() - b'A' + 1)
    });
    if col > MAX_COLS {
        Err("column out of range")
    } else {
        Ok(col)
    }
}

fn row_index(digits: &str) -> std::result::Result<u32, &'static str> {
    match digits.parse::<u32>() {
        Ok(row) if row >= 1 && row <= MAX_ROWS => Ok(row),
        _ => Err("row out of range"),
    }
}

/// Parse column letters: B, $AB
fn column(input: &str) -> IResult<&str, u32> {
    map_res(
        preceded(
            opt(char('$')),
            take_while_m_n(1, 3, |c: char| c.is_ascii_alphabetic()),
        ),
        column_index,
    )(input)
}

/// Parse row digits: 12, $12
fn row(input: &str) -> IResult<&str, u32> {
    map_res(preceded(opt(char('$')), digit1), row_index)(input)
}

/// Parse a single cell reference: B12
fn cell_ref(input: &str) -> IResult<&str, GridPos> {
    map(pair(column, row), |(col, row)| GridPos::new(row, col))(input)
}

/// Parse a range reference: A1:J10 or a lone A1
fn range_ref(input: &str) -> IResult<&str, GridRect> {
    map(
        pair(cell_ref, opt(preceded(char(':'), cell_ref))),
        |(start, end)| GridRect::spanning(start, end.unwrap_or(start)),
    )(input)
}

/// Parse a single A1-style address.
pub fn parse_address(input: &str) -> Result<GridPos> {
    all_consuming(cell_ref)(input.trim())
        .map(|(_, pos)| pos)
        .map_err(|_| Error::InvalidAddress(input.to_string()))
}

/// Parse an A1-style range such as `A1:J10`.
///
/// A single address is accepted as a one-cell range.
pub fn parse_range(input: &str) -> Result<GridRect> {
    all_consuming(range_ref)(input.trim())
        .map(|(_, rect)| rect)
        .map_err(|_| Error::InvalidRange(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_addresses() {
        assert_eq!(parse_address("A1").unwrap(), GridPos::new(1, 1));
        assert_eq!(parse_address("b12").unwrap(), GridPos::new(12, 2));
        assert_eq!(parse_address("$AA$3").unwrap(), GridPos::new(3, 27));
        assert_eq!(parse_address("XFD1048576").unwrap(), GridPos::new(MAX_ROWS, MAX_COLS));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(matches!(parse_address(""), Err(Error::InvalidAddress(_))));
        assert!(parse_address("A0").is_err());
        assert!(parse_address("12").is_err());
        assert!(parse_address("XFE1").is_err());
        assert!(parse_address("A1B").is_err());
    }

    #[test]
    fn parses_ranges_in_any_corner_order() {
        let rect = parse_range("J10:A1").unwrap();
        assert_eq!(rect, GridRect::spanning(GridPos::new(1, 1), GridPos::new(10, 10)));
        assert_eq!(rect.area(), 100);

        let single = parse_range("C4").unwrap();
        assert_eq!(single, GridRect::single(GridPos::new(4, 3)));
        assert!(matches!(parse_range("A1:"), Err(Error::InvalidRange(_))));
    }

    #[test]
    fn column_letters_match_spreadsheet_naming() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(MAX_COLS), "XFD");
        assert_eq!(GridPos::new(7, 28).to_string(), "AB7");
    }

    #[test]
    fn rect_geometry() {
        let mut rect = GridRect::spanning(GridPos::new(2, 2), GridPos::new(3, 4));
        assert_eq!(rect.centroid(), (2.5, 3.0));
        assert!(rect.contains(GridPos::new(3, 4)));
        assert!(!rect.contains(GridPos::new(4, 4)));
        assert_eq!(rect.positions().count(), 6);

        rect.include(GridPos::new(5, 1));
        assert_eq!(rect.to_string(), "A2:D5");

        let other = GridRect::spanning(GridPos::new(4, 4), GridPos::new(9, 9));
        assert_eq!(
            rect.intersect(&other),
            Some(GridRect::spanning(GridPos::new(4, 4), GridPos::new(5, 4)))
        );
        assert!(GridRect::single(GridPos::new(20, 20)).intersect(&other).is_none());
    }
}

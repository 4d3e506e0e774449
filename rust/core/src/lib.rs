// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # VenueMap Core
//!
//! Grid model for vendor venues laid out as spreadsheet sheets, with A1
//! address parsing built on [nom](https://docs.rs/nom).
//!
//! ## Overview
//!
//! - **Addressing**: `B2`, `$AA$10`, `A1:J10` into [`GridPos`] / [`GridRect`]
//! - **Raw input**: [`RawWorkbook`] / [`RawSheet`] as handed over by a spreadsheet reader
//! - **Grid model**: [`build_venue_map`] normalises values, fills, borders and merges
//!   into a trimmed [`VenueMap`]
//! - **Blocks**: vendor areas stored on the map under stable [`BlockKey`]s
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use venuemap_core::{build_venue_map, RawWorkbook};
//!
//! let book: RawWorkbook = serde_json::from_str(&json)?;
//! for (day, sheet) in book.day_sheets() {
//!     let map = build_venue_map(sheet)?;
//!     println!("day {}: {}x{} cells", day, map.rows, map.cols);
//! }
//! ```

pub mod address;
pub mod builder;
pub mod cell;
pub mod error;
pub mod map;
pub mod raw;
pub mod style;
pub mod text;

pub use address::{column_letters, parse_address, parse_range, GridPos, GridRect};
pub use builder::{build_venue_map, build_venue_map_with_limit, DEFAULT_MAX_CELLS};
pub use cell::{Cell, CellValue, MergedRegion};
pub use error::{Error, Result};
pub use map::{Block, BlockKey, BlockOrigin, NumberCell, VenueMap};
pub use raw::{day_of_sheet, RawBorder, RawBorders, RawCell, RawSheet, RawValue, RawWorkbook};
pub use style::{normalize_background, BorderKind, BorderStyle, Borders, Rgb, Side};
pub use text::{leading_number, parse_all_digits};

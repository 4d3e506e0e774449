// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for grid model construction.

use thiserror::Error;

/// Result type alias for grid model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while turning a raw sheet into a [`crate::VenueMap`].
///
/// Parse errors mean the sheet could not be addressed at all. The size and
/// cell-count variants reject grids that cannot be held in memory as given.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The sheet declares no range and no cell or merge address was found.
    #[error("sheet '{0}' has no usable address range")]
    NoRange(String),

    #[error("invalid cell address: '{0}'")]
    InvalidAddress(String),

    #[error("invalid range reference: '{0}'")]
    InvalidRange(String),

    #[error("invalid colour: '{0}'")]
    InvalidColor(String),

    #[error("grid of {rows}x{cols} cells exceeds the limit of {limit}")]
    GridTooLarge { rows: u32, cols: u32, limit: usize },

    /// A stored map whose cell list does not cover `rows * cols` exactly.
    #[error("map declares {expected} cells but holds {found}")]
    CellCountMismatch { expected: usize, found: usize },
}

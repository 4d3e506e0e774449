// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for day processing.

use std::path::PathBuf;

use venuemap_core::BlockKey;
use venuemap_detection::HallId;

/// Result type alias for day processing.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The sheet could not be turned into a grid; the import is aborted.
    #[error("map parse error: {0}")]
    Parse(#[from] venuemap_core::Error),

    #[error("store I/O error at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("workbook has no sheet for day {0}")]
    UnknownDay(u32),

    #[error("no venue map has been imported for this day")]
    NoMap,

    #[error("block not found: {0:?}")]
    UnknownBlock(BlockKey),

    #[error("hall not found: {0:?}")]
    UnknownHall(HallId),
}

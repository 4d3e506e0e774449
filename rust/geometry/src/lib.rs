// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! VenueMap Geometry
//!
//! Planar helpers for venue grids using nalgebra: even-odd polygon
//! membership for hall outlines and simplification of routed polylines.

pub mod contour;
pub mod polyline;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use contour::{contour_centroid, grid_point, point_in_contour, signed_area};
pub use polyline::{polyline_length, simplify_polyline};

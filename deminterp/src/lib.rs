//! Elevation profiles along lines and paths over a tiled DEM.
//!
//! The core algorithm walks a line cell by cell across the raster,
//! emitting a height exactly where the line crosses each grid line and
//! at every interior extremum of the bilinear surface along the line,
//! then greedily merges consecutive segments whose grades agree within
//! tolerance. Fixed-step and fixed-sample-count variants cover long
//! lines and multi-leg paths.

mod error;
mod line;
mod path;
mod vertex;

pub use crate::{
    error::InterpError,
    line::interpolate_line,
    path::{interpolate_line_by_steps, interpolate_path},
    vertex::{find_vertex, Vertex},
};
pub use demset::bilinear;

use geo::geometry::Coord;

/// Role of a point within an emitted profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    Start,
    Interior,
    End,
}

/// One point of an elevation profile, in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub coord: Coord<f64>,
    pub height: f64,
    pub kind: PointKind,
}

/// Traversal tuning knobs.
#[derive(Debug, Clone)]
pub struct InterpOptions {
    /// Minimum grade change for a profile point to survive
    /// simplification.
    pub min_grade_delta: f64,

    /// Keep points where the grade changes sign even when the change
    /// is below `min_grade_delta`.
    pub force_local_extrema: bool,

    /// Per-axis line span, in grid units, beyond which the adaptive
    /// walk is skipped in favor of plain sampling. Deployed rasters
    /// have shipped with both 300 and 5000 here.
    pub max_line_distance: f64,

    /// Step budget for one line traversal.
    pub max_line_steps: usize,

    /// Sample budget for one path query.
    pub max_path_steps: usize,

    /// Sample count used when a line falls back to plain sampling.
    pub fallback_samples: usize,
}

impl Default for InterpOptions {
    fn default() -> Self {
        Self {
            min_grade_delta: 0.01,
            force_local_extrema: true,
            max_line_distance: 5000.0,
            max_line_steps: 10_000,
            max_path_steps: 10_000,
            fallback_samples: 11,
        }
    }
}

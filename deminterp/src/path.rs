//! Fixed-step and fixed-sample-count traversal variants.

use crate::{InterpError, InterpOptions, PointKind, TrackPoint};
use demset::DemSet;
use geo::geometry::Coord;

fn lerp(a: Coord<f64>, b: Coord<f64>, t: f64) -> Coord<f64> {
    Coord {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
    }
}

/// Evenly spaced profile of `samples` points from `a` to `b`, both
/// included exactly. The cheap fallback for lines the adaptive walk
/// declines.
pub(crate) fn sampled_line(
    set: &mut DemSet,
    a: Coord<f64>,
    b: Coord<f64>,
    samples: usize,
) -> Result<Vec<TrackPoint>, InterpError> {
    let n = samples.max(2);
    let mut track = Vec::with_capacity(n);
    for i in 0..n {
        let (coord, kind) = if i == 0 {
            (a, PointKind::Start)
        } else if i == n - 1 {
            (b, PointKind::End)
        } else {
            (lerp(a, b, i as f64 / (n - 1) as f64), PointKind::Interior)
        };
        let height = set.interpolated_height(coord)?;
        track.push(TrackPoint {
            coord,
            height,
            kind,
        });
    }
    Ok(track)
}

/// Profile from `a` to `b` at constant `step_size` map-unit spacing.
///
/// Exact `a` and `b` are always the first and last points regardless
/// of step alignment. The step widens if needed so the traversal never
/// exceeds `opts.max_line_steps` points.
pub fn interpolate_line_by_steps(
    set: &mut DemSet,
    a: Coord<f64>,
    b: Coord<f64>,
    step_size: f64,
    opts: &InterpOptions,
) -> Result<Vec<TrackPoint>, InterpError> {
    if step_size.is_nan() || step_size <= 0.0 {
        return Err(InterpError::StepSize);
    }
    let total = (b.x - a.x).hypot(b.y - a.y);
    let mut step = step_size;
    if total / step > opts.max_line_steps as f64 {
        step = total / opts.max_line_steps as f64;
    }

    let mut track = Vec::new();
    track.push(TrackPoint {
        coord: a,
        height: set.interpolated_height(a)?,
        kind: PointKind::Start,
    });
    let mut dist = step;
    while dist < total {
        let coord = lerp(a, b, dist / total);
        track.push(TrackPoint {
            coord,
            height: set.interpolated_height(coord)?,
            kind: PointKind::Interior,
        });
        dist += step;
    }
    track.push(TrackPoint {
        coord: b,
        height: set.interpolated_height(b)?,
        kind: PointKind::End,
    });
    Ok(track)
}

/// Profile of a multi-leg path as `samples` points spaced evenly along
/// its total length.
///
/// The first and last points are the path's literal first and last
/// vertices; interior samples are located by a forward scan through
/// the legs and interpolated within the owning leg. `samples` is
/// clamped to `[2, opts.max_path_steps]`.
pub fn interpolate_path(
    set: &mut DemSet,
    path: &[Coord<f64>],
    samples: usize,
    opts: &InterpOptions,
) -> Result<Vec<TrackPoint>, InterpError> {
    if path.len() < 2 {
        return Err(InterpError::ShortPath);
    }
    let samples = samples.clamp(2, opts.max_path_steps.max(2));

    // Cumulative distance at the start of each vertex.
    let mut leg_start = Vec::with_capacity(path.len());
    let mut total = 0.0;
    leg_start.push(0.0);
    for pair in path.windows(2) {
        total += (pair[1].x - pair[0].x).hypot(pair[1].y - pair[0].y);
        leg_start.push(total);
    }
    let step = total / (samples - 1) as f64;

    let mut track = Vec::with_capacity(samples);
    track.push(TrackPoint {
        coord: path[0],
        height: set.interpolated_height(path[0])?,
        kind: PointKind::Start,
    });
    let mut leg = 0;
    for i in 1..samples - 1 {
        let step_dist = i as f64 * step;
        while leg + 2 < path.len() && step_dist > leg_start[leg + 1] {
            leg += 1;
        }
        let leg_len = leg_start[leg + 1] - leg_start[leg];
        let t = if leg_len > 0.0 {
            (step_dist - leg_start[leg]) / leg_len
        } else {
            0.0
        };
        let coord = lerp(path[leg], path[leg + 1], t);
        track.push(TrackPoint {
            coord,
            height: set.interpolated_height(coord)?,
            kind: PointKind::Interior,
        });
    }
    let last = path[path.len() - 1];
    track.push(TrackPoint {
        coord: last,
        height: set.interpolated_height(last)?,
        kind: PointKind::End,
    });
    Ok(track)
}

//! Adaptive cell-by-cell line traversal.

use crate::{path, vertex, InterpError, InterpOptions, PointKind, TrackPoint};
use demset::{DemError, DemSet, GridTransform};
use geo::geometry::Coord;
use log::debug;

/// Elevation profile along the projected line from `a` to `b`.
///
/// Emits a height exactly where the line crosses each raster grid line
/// and at every interior extremum of the bilinear surface along it,
/// then merges consecutive segments whose grades agree within
/// `opts.min_grade_delta`. Every kept point is an endpoint, a slope
/// sign change, or a grade change exceeding tolerance.
///
/// Lines longer than `opts.max_line_distance` grid units on either
/// axis, or whose traversal exceeds `opts.max_line_steps`, fall back
/// to plain sampling with `opts.fallback_samples` points.
pub fn interpolate_line(
    set: &mut DemSet,
    a: Coord<f64>,
    b: Coord<f64>,
    opts: &InterpOptions,
) -> Result<Vec<TrackPoint>, InterpError> {
    let grid = *set.grid();
    let g0 = grid.to_grid(a);
    let g1 = grid.to_grid(b);
    if (g1.x - g0.x).abs() > opts.max_line_distance
        || (g1.y - g0.y).abs() > opts.max_line_distance
    {
        debug!("line span over {} grid units, sampling", opts.max_line_distance);
        return path::sampled_line(set, a, b, opts.fallback_samples);
    }
    match walk(set, &grid, g0, g1, opts) {
        Ok(track) => Ok(track),
        Err(WalkError::StepBudget) => {
            debug!("line walk over {} steps, sampling", opts.max_line_steps);
            path::sampled_line(set, a, b, opts.fallback_samples)
        }
        Err(WalkError::Dem(e)) => Err(e.into()),
    }
}

enum WalkError {
    StepBudget,
    Dem(DemError),
}

impl From<DemError> for WalkError {
    fn from(e: DemError) -> Self {
        Self::Dem(e)
    }
}

fn walk(
    set: &mut DemSet,
    grid: &GridTransform,
    g0: Coord<f64>,
    g1: Coord<f64>,
    opts: &InterpOptions,
) -> Result<Vec<TrackPoint>, WalkError> {
    let (x0, y0) = (g0.x, g0.y);
    let (x1, y1) = (g1.x, g1.y);
    let dx = x1 - x0;
    let dy = y1 - y0;

    let mut x = x0;
    let mut y = y0;

    let step_x: i32 = if dx >= 0.0 { 1 } else { -1 };
    let step_y: i32 = if dy >= 0.0 { 1 } else { -1 };

    // Direction-relative corner offsets: when an axis decreases, the
    // "minus" corner (nearer the line's origin) is the ceiling, not
    // the floor.
    let xm_off: i32 = if dx < 0.0 { 1 } else { 0 };
    let ym_off: i32 = if dy < 0.0 { 1 } else { 0 };

    let mut x_int_m = x.floor() as i32 + xm_off;
    let mut x_int_p = x.floor() as i32 + (1 - xm_off);
    let mut y_int_m = y.floor() as i32 + ym_off;
    let mut y_int_p = y.floor() as i32 + (1 - ym_off);

    // Grid-aligned corner of the cell holding the endpoint.
    let x1_int_m = x1.floor() as i32 + xm_off;
    let y1_int_m = y1.floor() as i32 + ym_off;

    let mut qmm = f64::from(set.height(x_int_m, y_int_m)?);
    let mut qpm = f64::from(set.height(x_int_p, y_int_m)?);
    let mut qmp = f64::from(set.height(x_int_m, y_int_p)?);
    let mut qpp = f64::from(set.height(x_int_p, y_int_p)?);

    let mut dxm = (x - f64::from(x_int_m)).abs();
    let mut dxp = (f64::from(x_int_p) - x).abs();
    let mut dym = (y - f64::from(y_int_m)).abs();
    let mut dyp = (f64::from(y_int_p) - y).abs();

    let mut q = qmm * dxp * dyp + qpm * dxm * dyp + qmp * dxp * dym + qpp * dxm * dym;

    let mut track: Vec<TrackPoint> = Vec::new();

    // Simplification state: the last emitted point, the one before it,
    // and the grade between them.
    let mut prev: Option<(f64, f64)> = None;
    let mut prev2 = (0.0, 0.0); // valid whenever prev_grade is Some
    let mut prev_grade: Option<f64> = None;

    let mut check_vertex = true;
    let mut kind = PointKind::Start;
    let mut steps = 0usize;

    loop {
        steps += 1;
        if steps > opts.max_line_steps {
            return Err(WalkError::StepBudget);
        }
        debug_assert!(
            (q - (qmm * dxp * dyp + qpm * dxm * dyp + qmp * dxp * dym + qpp * dxm * dym)).abs()
                < 1e-10,
            "tracked height diverged from the bilinear surface at ({x}, {y})",
        );

        let dist = grid.map_distance(g0, Coord { x, y });
        if let Some((prev_q, prev_dist)) = prev {
            // A vertex on the cell's entry boundary emits a
            // zero-distance duplicate whose grade is NaN; both keep
            // tests are false against NaN, so the following point
            // takes the replace branch and flushes the duplicate.
            let mut grade = (q - prev_q) / (dist - prev_dist);
            let keep = match prev_grade {
                None => true,
                Some(g) => {
                    (opts.force_local_extrema && grade * g < 0.0)
                        || (grade - g).abs() >= opts.min_grade_delta
                }
            };
            if keep {
                prev2 = (prev_q, prev_dist);
            } else {
                // The last point is collinear enough: replace it with
                // this one and re-grade against the point before it.
                track.pop();
                grade = (q - prev2.0) / (dist - prev2.1);
            }
            prev_grade = Some(grade);
        }
        prev = Some((q, dist));

        let coord = grid.to_projected(Coord { x, y });
        track.push(TrackPoint {
            coord,
            height: q,
            kind,
        });

        if x == x1 && y == y1 {
            if kind != PointKind::End {
                // Degenerate or corner-exact lines land on the
                // endpoint without passing through the snap step.
                track.push(TrackPoint {
                    coord,
                    height: q,
                    kind: PointKind::End,
                });
            }
            break;
        }
        kind = PointKind::Interior;

        // A cell contributes at most one interior extremum; skip the
        // search on the iteration right after one was emitted.
        if check_vertex {
            if let Some(v) =
                vertex::find_vertex(dxm, dym, dx.abs(), dy.abs(), qmm, qpm, qmp, qpp)
            {
                let vx = f64::from(x_int_m) + v.x.copysign(dx);
                let vy = f64::from(y_int_m) + v.y.copysign(dy);
                // The vertex must lie within the segment's overall
                // span, not just the cell.
                let x_in = if dx >= 0.0 {
                    vx >= x0 && vx <= x1
                } else {
                    vx <= x0 && vx >= x1
                };
                let y_in = if dy >= 0.0 {
                    vy >= y0 && vy <= y1
                } else {
                    vy <= y0 && vy >= y1
                };
                if x_in && y_in {
                    check_vertex = false;
                    x = vx;
                    y = vy;
                    q = v.height;
                    dxm = (x - f64::from(x_int_m)).abs();
                    dxp = (f64::from(x_int_p) - x).abs();
                    dym = (y - f64::from(y_int_m)).abs();
                    dyp = (f64::from(y_int_p) - y).abs();
                    continue;
                }
            }
        }

        if x_int_m == x1_int_m && y_int_m == y1_int_m {
            // Same cell as the endpoint: snap to it exactly rather
            // than stepping past it.
            x = x1;
            y = y1;
            dxm = (x - f64::from(x_int_m)).abs();
            dxp = (f64::from(x_int_p) - x).abs();
            dym = (y - f64::from(y_int_m)).abs();
            dyp = (f64::from(y_int_p) - y).abs();
            q = qmm * dxp * dyp + qpm * dxm * dyp + qmp * dxp * dym + qpp * dxm * dym;
            kind = PointKind::End;
        } else {
            check_vertex = true;

            // Whichever whole grid line is crossed first along the
            // parametrization wins. An axis-parallel line yields an
            // infinite ratio on its degenerate axis and always loses.
            let dx_next = f64::from(x_int_p) - x;
            let dy_next = f64::from(y_int_p) - y;
            if dx_next / dx <= dy_next / dy {
                x_int_m = x_int_p;
                x_int_p += step_x;
                x = f64::from(x_int_m);
                y = y0 + (x - x0) / dx * dy;

                qmm = qpm;
                qmp = qpp;
                qpm = f64::from(set.height(x_int_p, y_int_m)?);
                qpp = f64::from(set.height(x_int_p, y_int_p)?);
                dxm = 0.0;
                dxp = 1.0;
                dym = (y - f64::from(y_int_m)).abs();
                dyp = (f64::from(y_int_p) - y).abs();

                q = qmm * dyp + qmp * dym;
            } else {
                y_int_m = y_int_p;
                y_int_p += step_y;
                y = f64::from(y_int_m);
                x = x0 + (y - y0) / dy * dx;

                qmm = qmp;
                qpm = qpp;
                qmp = f64::from(set.height(x_int_m, y_int_p)?);
                qpp = f64::from(set.height(x_int_p, y_int_p)?);
                dxm = (x - f64::from(x_int_m)).abs();
                dxp = (f64::from(x_int_p) - x).abs();
                dym = 0.0;
                dyp = 1.0;

                q = qmm * dxp + qpm * dxm;
            }
        }
    }
    Ok(track)
}

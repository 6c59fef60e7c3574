//! Interior extrema of a line's restriction to the bilinear surface.

/// A local height extremum strictly inside a unit grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub height: f64,
    pub is_max: bool,
}

/// Finds the interior extremum of the line `(x1, y1) + t * (dx, dy)`
/// restricted to the bilinear surface over the unit cell with corner
/// heights `q00`, `q10`, `q01`, `q11` at (0, 0), (1, 0), (0, 1) and
/// (1, 1).
///
/// The restriction is a quadratic in whichever axis has the larger
/// delta magnitude, which avoids dividing by a near-zero component.
/// Returns `None` when the surface is planar along the line (no true
/// extremum) or when the vertex falls outside the unit cell.
#[allow(clippy::too_many_arguments)]
pub fn find_vertex(
    x1: f64,
    y1: f64,
    dx: f64,
    dy: f64,
    q00: f64,
    q10: f64,
    q01: f64,
    q11: f64,
) -> Option<Vertex> {
    let q_sum = q00 - q10 - q01 + q11;
    let (x, y, a, b, c) = if dx.abs() >= dy.abs() {
        // y = m*x + y0
        let m = dy / dx;
        let y0 = y1 - m * x1;
        let a = q_sum * m;
        if a == 0.0 {
            return None;
        }
        let b = (q01 - q00) * m + q_sum * y0 + (q10 - q00);
        let c = q00 + (q01 - q00) * y0;
        let x = -b / (2.0 * a);
        let y = m * x + y0;
        (x, y, a, b, c)
    } else {
        // x = n*y + x0
        let n = dx / dy;
        let x0 = x1 - n * y1;
        let a = q_sum * n;
        if a == 0.0 {
            return None;
        }
        let b = (q10 - q00) * n + q_sum * x0 + (q01 - q00);
        let c = q00 + (q10 - q00) * x0;
        let y = -b / (2.0 * a);
        let x = n * y + x0;
        (x, y, a, b, c)
    };
    if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
        return None;
    }
    Some(Vertex {
        x,
        y,
        height: (4.0 * a * c - b * b) / (4.0 * a),
        is_max: a < 0.0,
    })
}

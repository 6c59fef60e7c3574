use geo::geometry::Coord;

/// Affine mapping between projected map coordinates and fractional
/// raster grid coordinates.
///
/// The origin is the _center_ of grid sample (0, 0). A negative step
/// means grid coordinates grow in the opposite direction of the
/// projected axis; the reference raster's rows grow southward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTransform {
    /// Projected easting of grid point (0, 0).
    pub origin_e: f64,

    /// Projected northing of grid point (0, 0).
    pub origin_n: f64,

    /// Easting change per grid step in x.
    pub step_e: f64,

    /// Northing change per grid step in y.
    pub step_n: f64,
}

impl GridTransform {
    /// Projected coordinates to fractional grid coordinates.
    pub fn to_grid(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x - self.origin_e) / self.step_e,
            y: (c.y - self.origin_n) / self.step_n,
        }
    }

    /// Fractional grid coordinates back to projected coordinates.
    pub fn to_projected(&self, g: Coord<f64>) -> Coord<f64> {
        Coord {
            x: g.x * self.step_e + self.origin_e,
            y: g.y * self.step_n + self.origin_n,
        }
    }

    /// Map-unit distance between two fractional grid points.
    pub fn map_distance(&self, a: Coord<f64>, b: Coord<f64>) -> f64 {
        let de = (b.x - a.x) * self.step_e;
        let dn = (b.y - a.y) * self.step_n;
        de.hypot(dn)
    }
}

impl Default for GridTransform {
    /// The reference raster: 15 m samples, top-left origin, northing
    /// decreasing down the rows.
    fn default() -> Self {
        Self {
            origin_e: 1_012_007.5,
            origin_n: 6_233_992.5,
            step_e: 15.0,
            step_n: -15.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord, GridTransform};

    #[test]
    fn test_roundtrip() {
        let grid = GridTransform::default();
        let e_n = Coord {
            x: 1_756_223.1,
            y: 5_917_338.4,
        };
        let back = grid.to_projected(grid.to_grid(e_n));
        assert!((back.x - e_n.x).abs() < 1e-6);
        assert!((back.y - e_n.y).abs() < 1e-6);
    }

    #[test]
    fn test_origin_maps_to_zero() {
        let grid = GridTransform::default();
        let g = grid.to_grid(Coord {
            x: 1_012_007.5,
            y: 6_233_992.5,
        });
        assert_eq!(g, Coord { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_map_distance_uses_step_magnitude() {
        let grid = GridTransform::default();
        // One grid step in y is 15 map units regardless of the
        // negative northing step.
        let d = grid.map_distance(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 });
        assert_eq!(d, 15.0);
        let d = grid.map_distance(Coord { x: 0.0, y: 0.0 }, Coord { x: 3.0, y: 4.0 });
        assert_eq!(d, 75.0);
    }
}

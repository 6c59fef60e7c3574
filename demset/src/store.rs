use crate::{
    bilinear,
    blob::BlobStore,
    catalog::{parse_manifest, Catalog},
    grid::GridTransform,
    tile::{BoundsPolicy, Tile},
    DemError,
};
use geo::geometry::Coord;
use std::{collections::VecDeque, io::BufRead};

/// Store construction knobs.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Coarse catalog cell size in samples. Every tile must align to
    /// it on all four sides.
    pub cell_size: i32,

    /// Active-tile budget: at most this many backing handles are open
    /// at once.
    pub max_active: usize,

    /// Read-window capacity per active tile, in bytes.
    pub window_size: usize,

    /// Edge behavior of tile bounds checks.
    pub bounds: BoundsPolicy,

    /// Projected-to-grid mapping of this raster.
    pub grid: GridTransform,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cell_size: 1000,
            max_active: 10,
            window_size: 4 * 1024 * 1024,
            bounds: BoundsPolicy::Closed,
            grid: GridTransform::default(),
        }
    }
}

/// The raster store: a catalog of tiles plus a bounded recency list of
/// active ones.
///
/// All query methods take `&mut self`; a store instance belongs to one
/// worker. Share work by constructing one store per worker rather than
/// locking a shared one.
pub struct DemSet {
    tiles: Vec<Tile>,
    catalog: Catalog,
    blobs: Box<dyn BlobStore>,
    /// Active tile indices, most recently activated first.
    active: VecDeque<usize>,
    config: StoreConfig,
}

impl DemSet {
    /// Builds a store from a catalog manifest.
    ///
    /// Manifest integrity problems are fatal here; a process should
    /// not come up without a consistent catalog.
    pub fn new<R: BufRead>(
        manifest: R,
        blobs: Box<dyn BlobStore>,
        config: StoreConfig,
    ) -> Result<Self, DemError> {
        let specs = parse_manifest(manifest)?;
        let catalog = Catalog::build(&specs, config.cell_size)?;
        let tiles = specs.iter().map(Tile::new).collect();
        Ok(Self {
            tiles,
            catalog,
            blobs,
            active: VecDeque::new(),
            config,
        })
    }

    pub fn grid(&self) -> &GridTransform {
        &self.config.grid
    }

    /// Number of tiles with an open backing handle.
    pub fn active_tiles(&self) -> usize {
        self.active.len()
    }

    /// Height at an integer grid point; strict out-of-range policy.
    ///
    /// Activates the covering tile on a miss, deactivating the least
    /// recently activated tile if the active list is over budget.
    pub fn height(&mut self, x: i32, y: i32) -> Result<f32, DemError> {
        let idx = self
            .catalog
            .lookup(x, y)
            .ok_or(DemError::OutOfRange { x, y })?;
        if !self.tiles[idx].within_bounds(x, y, self.config.bounds) {
            return Err(DemError::OutOfRange { x, y });
        }
        if !self.tiles[idx].is_active() {
            self.tiles[idx].activate(self.blobs.as_ref(), self.config.window_size)?;
            self.active.push_front(idx);
            if self.active.len() > self.config.max_active {
                if let Some(evicted) = self.active.pop_back() {
                    self.tiles[evicted].deactivate();
                }
            }
        }
        self.tiles[idx].sample(x, y)
    }

    /// Lenient variant of [`height`](Self::height): NaN for
    /// out-of-range, anything else still propagates.
    pub fn height_or_nan(&mut self, x: i32, y: i32) -> Result<f32, DemError> {
        match self.height(x, y) {
            Err(DemError::OutOfRange { .. }) => Ok(f32::NAN),
            other => other,
        }
    }

    /// Height of the grid point nearest to projected `(E, N)`.
    pub fn nearest_height(&mut self, c: Coord<f64>) -> Result<f32, DemError> {
        let g = self.config.grid.to_grid(c);
        self.height(g.x.round() as i32, g.y.round() as i32)
    }

    pub fn nearest_height_or_nan(&mut self, c: Coord<f64>) -> Result<f32, DemError> {
        match self.nearest_height(c) {
            Err(DemError::OutOfRange { .. }) => Ok(f32::NAN),
            other => other,
        }
    }

    /// Bilinearly interpolated height at projected `(E, N)`.
    pub fn interpolated_height(&mut self, c: Coord<f64>) -> Result<f64, DemError> {
        let g = self.config.grid.to_grid(c);
        self.interpolated_height_xy(g.x, g.y)
    }

    pub fn interpolated_height_or_nan(&mut self, c: Coord<f64>) -> Result<f64, DemError> {
        match self.interpolated_height(c) {
            Err(DemError::OutOfRange { .. }) => Ok(f64::NAN),
            other => other,
        }
    }

    /// Bilinearly interpolated height at fractional grid `(x, y)`,
    /// blending the four surrounding integer grid points.
    pub fn interpolated_height_xy(&mut self, x: f64, y: f64) -> Result<f64, DemError> {
        let x1 = x.floor() as i32;
        let y1 = y.floor() as i32;
        let q00 = f64::from(self.height(x1, y1)?);
        let q10 = f64::from(self.height(x1 + 1, y1)?);
        let q01 = f64::from(self.height(x1, y1 + 1)?);
        let q11 = f64::from(self.height(x1 + 1, y1 + 1)?);
        Ok(bilinear::sample(
            q00,
            q10,
            q01,
            q11,
            x - f64::from(x1),
            y - f64::from(y1),
        ))
    }
}

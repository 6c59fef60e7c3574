use crate::{
    blob::{BlobStore, WindowedReader},
    catalog::TileSpec,
    DemError,
};
use byteorder::{ByteOrder, LittleEndian as LE};
use log::debug;

/// Edge behavior of tile bounds checks.
///
/// Historical raster builds disagree on whether the low-y edge row
/// belongs to a tile, so both forms are kept selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsPolicy {
    /// `x0 <= x <= xn` and `y0 <= y <= yn`.
    Closed,

    /// `x0 <= x <= xn` and `y0 < y <= yn`.
    HalfOpenY,
}

/// One rectangular block of the raster backed by a single blob.
///
/// The descriptor is immutable for the life of the store; only the
/// open state changes, and only through activate/deactivate.
pub struct Tile {
    path: String,
    width: i32,
    x0: i32,
    y0: i32,
    xn: i32,
    yn: i32,
    data_offset: u64,
    reader: Option<WindowedReader>,
}

impl Tile {
    pub(crate) fn new(spec: &TileSpec) -> Self {
        Self {
            path: spec.path.clone(),
            width: spec.width,
            x0: spec.x0,
            y0: spec.y0,
            xn: spec.xn,
            yn: spec.yn,
            data_offset: spec.data_offset,
            reader: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_active(&self) -> bool {
        self.reader.is_some()
    }

    /// Opens the backing blob and resets the read window.
    ///
    /// Double activation is a caller bug and fails with
    /// [`DemError::AlreadyActive`].
    pub(crate) fn activate(
        &mut self,
        blobs: &dyn BlobStore,
        window_size: usize,
    ) -> Result<(), DemError> {
        if self.reader.is_some() {
            return Err(DemError::AlreadyActive(self.path.clone()));
        }
        debug!("activating tile {}", self.path);
        let source = blobs.open(&self.path)?;
        self.reader = Some(WindowedReader::new(source, window_size));
        Ok(())
    }

    /// Releases the backing handle and read window. Idempotent.
    pub(crate) fn deactivate(&mut self) {
        if self.reader.take().is_some() {
            debug!("deactivating tile {}", self.path);
        }
    }

    /// Integer-coordinate containment test.
    pub fn within_bounds(&self, x: i32, y: i32, policy: BoundsPolicy) -> bool {
        let x_ok = self.x0 <= x && x <= self.xn;
        let y_ok = match policy {
            BoundsPolicy::Closed => self.y0 <= y && y <= self.yn,
            BoundsPolicy::HalfOpenY => self.y0 < y && y <= self.yn,
        };
        x_ok && y_ok
    }

    /// Reads the sample at `(x, y)`.
    ///
    /// The caller must have bounds-checked `(x, y)` and activated the
    /// tile; the store is the only caller and guarantees both. Panics
    /// if the tile is inactive.
    pub(crate) fn sample(&mut self, x: i32, y: i32) -> Result<f32, DemError> {
        let index = i64::from(x - self.x0) + i64::from(y - self.y0) * i64::from(self.width);
        let offset = self.data_offset + index as u64 * 4;
        let reader = self.reader.as_mut().expect("sample() on inactive tile");
        let bytes = reader.read(offset, 4)?;
        Ok(LE::read_f32(bytes))
    }
}

//! Tiled DEM raster store.
//!
//! A raster covering one projected region is cut into rectangular
//! tiles, each backed by a single blob: an opaque header of
//! `data_offset` bytes followed by row-major little-endian `f32`
//! samples. A load-once catalog built from a tab-separated manifest
//! maps coarse grid cells to tiles, and [`DemSet`] answers integer-
//! and fractional-coordinate height queries while keeping at most a
//! fixed number of backing handles open, most recently activated
//! first.

pub mod bilinear;
mod blob;
mod catalog;
mod error;
mod grid;
mod store;
mod tile;

pub use crate::{
    blob::{BlobSource, BlobStore, DirBlobStore, FileBlob, MemBlob, MemBlobStore, WindowedReader},
    catalog::{parse_manifest, Catalog, TileSpec},
    error::DemError,
    grid::GridTransform,
    store::{DemSet, StoreConfig},
    tile::{BoundsPolicy, Tile},
};

#[cfg(test)]
pub(crate) mod testutil {
    use crate::{DemSet, GridTransform, MemBlobStore, StoreConfig};

    /// Identity projected/grid mapping so tests reason in grid units.
    pub(crate) fn unit_grid() -> GridTransform {
        GridTransform {
            origin_e: 0.0,
            origin_n: 0.0,
            step_e: 1.0,
            step_n: 1.0,
        }
    }

    /// Serializes a tile blob: `data_offset` header bytes then
    /// row-major little-endian `f32` samples filled by `fill(x, y)`.
    pub(crate) fn tile_blob<F>(x0: i32, y0: i32, xn: i32, yn: i32, data_offset: usize, fill: F) -> Vec<u8>
    where
        F: Fn(i32, i32) -> f32,
    {
        let mut bytes = vec![0u8; data_offset];
        for y in y0..=yn {
            for x in x0..=xn {
                bytes.extend_from_slice(&fill(x, y).to_le_bytes());
            }
        }
        bytes
    }

    /// Builds a store over in-memory tiles filled by `fill(x, y)`.
    ///
    /// `tiles` rows are `(path, x0, y0, xn, yn)`.
    pub(crate) fn store_with<F>(
        tiles: &[(&str, i32, i32, i32, i32)],
        config: StoreConfig,
        fill: F,
    ) -> DemSet
    where
        F: Fn(i32, i32) -> f32,
    {
        const DATA_OFFSET: usize = 64;
        let mut blobs = MemBlobStore::default();
        let mut manifest = String::from(
            "path\timage_width\timage_height\timage_x0\timage_y0\timage_xn\timage_yn\tdata_offset\torigin_e\torigin_n\n",
        );
        for &(path, x0, y0, xn, yn) in tiles {
            blobs.insert(path, tile_blob(x0, y0, xn, yn, DATA_OFFSET, &fill));
            manifest.push_str(&format!(
                "{path}\t{w}\t{h}\t{x0}\t{y0}\t{xn}\t{yn}\t{DATA_OFFSET}\t0.0\t0.0\n",
                w = xn - x0 + 1,
                h = yn - y0 + 1,
            ));
        }
        DemSet::new(manifest.as_bytes(), Box::new(blobs), config).unwrap()
    }
}

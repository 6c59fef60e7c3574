//! Load-once mapping from coarse grid cells to tiles.
//!
//! The catalog is built from a tab-separated manifest listing every
//! tile's pixel bounds and blob layout. Tiles must tile the plane:
//! each one aligns to the coarse cell grid on all four sides and no
//! two tiles claim the same cell. A manifest that breaks either rule
//! is unusable and fails store construction.

use crate::DemError;
use std::{collections::HashSet, io::BufRead};

/// One row of the catalog manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSpec {
    /// Opaque key into the backing blob store.
    pub path: String,

    /// Raster width and height in samples.
    pub width: i32,
    pub height: i32,

    /// Inclusive pixel bounding box.
    pub x0: i32,
    pub y0: i32,
    pub xn: i32,
    pub yn: i32,

    /// Byte offset of the first sample within the blob.
    pub data_offset: u64,

    /// Geographic origin, carried from the manifest but unused here.
    pub origin_e: f64,
    pub origin_n: f64,
}

/// Column indices resolved from the manifest header row.
struct Columns {
    path: usize,
    width: usize,
    height: usize,
    x0: usize,
    y0: usize,
    xn: usize,
    yn: usize,
    data_offset: usize,
    origin_e: usize,
    origin_n: usize,
}

impl Columns {
    fn from_header(fields: &[&str], line: usize) -> Result<Self, DemError> {
        let find = |name: &str| {
            fields
                .iter()
                .position(|field| *field == name)
                .ok_or_else(|| DemError::Manifest {
                    line,
                    reason: format!("missing column {name}"),
                })
        };
        Ok(Self {
            path: find("path")?,
            width: find("image_width")?,
            height: find("image_height")?,
            x0: find("image_x0")?,
            y0: find("image_y0")?,
            xn: find("image_xn")?,
            yn: find("image_yn")?,
            data_offset: find("data_offset")?,
            origin_e: find("origin_e")?,
            origin_n: find("origin_n")?,
        })
    }
}

fn field<'a>(fields: &[&'a str], idx: usize, line: usize) -> Result<&'a str, DemError> {
    fields.get(idx).copied().ok_or_else(|| DemError::Manifest {
        line,
        reason: "row has fewer fields than the header".to_string(),
    })
}

fn int_field(fields: &[&str], idx: usize, line: usize) -> Result<i32, DemError> {
    let raw = field(fields, idx, line)?;
    raw.parse().map_err(|_| DemError::Manifest {
        line,
        reason: format!("invalid integer {raw:?}"),
    })
}

fn u64_field(fields: &[&str], idx: usize, line: usize) -> Result<u64, DemError> {
    let raw = field(fields, idx, line)?;
    raw.parse().map_err(|_| DemError::Manifest {
        line,
        reason: format!("invalid offset {raw:?}"),
    })
}

fn float_field(fields: &[&str], idx: usize, line: usize) -> Result<f64, DemError> {
    let raw = field(fields, idx, line)?;
    raw.parse().map_err(|_| DemError::Manifest {
        line,
        reason: format!("invalid number {raw:?}"),
    })
}

fn parse_row(fields: &[&str], cols: &Columns, line: usize) -> Result<TileSpec, DemError> {
    let spec = TileSpec {
        path: field(fields, cols.path, line)?.to_string(),
        width: int_field(fields, cols.width, line)?,
        height: int_field(fields, cols.height, line)?,
        x0: int_field(fields, cols.x0, line)?,
        y0: int_field(fields, cols.y0, line)?,
        xn: int_field(fields, cols.xn, line)?,
        yn: int_field(fields, cols.yn, line)?,
        data_offset: u64_field(fields, cols.data_offset, line)?,
        origin_e: float_field(fields, cols.origin_e, line)?,
        origin_n: float_field(fields, cols.origin_n, line)?,
    };
    if spec.width <= 0 || spec.height <= 0 {
        return Err(DemError::Manifest {
            line,
            reason: "tile dimensions must be positive".to_string(),
        });
    }
    if spec.xn - spec.x0 + 1 != spec.width || spec.yn - spec.y0 + 1 != spec.height {
        return Err(DemError::Manifest {
            line,
            reason: format!("bounding box disagrees with dimensions for {}", spec.path),
        });
    }
    Ok(spec)
}

/// Parses a catalog manifest: tab-separated, `#` comments skipped,
/// first remaining line is the header naming each column.
pub fn parse_manifest<R: BufRead>(reader: R) -> Result<Vec<TileSpec>, DemError> {
    let mut columns: Option<Columns> = None;
    let mut seen_paths = HashSet::new();
    let mut specs = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line_num = lineno + 1;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        match &columns {
            None => columns = Some(Columns::from_header(&fields, line_num)?),
            Some(cols) => {
                let spec = parse_row(&fields, cols, line_num)?;
                if !seen_paths.insert(spec.path.clone()) {
                    return Err(DemError::Manifest {
                        line: line_num,
                        reason: format!("duplicate tile path {}", spec.path),
                    });
                }
                specs.push(spec);
            }
        }
    }

    if specs.is_empty() {
        return Err(DemError::Manifest {
            line: 0,
            reason: "manifest lists no tiles".to_string(),
        });
    }
    Ok(specs)
}

/// Static mapping from coarse grid cells to covering tiles.
///
/// Cells are `cell_size`-sample squares addressed by
/// `(x.div_euclid(cell_size), y.div_euclid(cell_size))`. Lookups
/// outside the table's extent are "no tile", not a fault.
pub struct Catalog {
    cell_size: i32,
    cx0: i32,
    cy0: i32,
    cols: i32,
    rows: i32,
    cells: Vec<Option<usize>>,
}

impl Catalog {
    /// Builds the cell table over `specs`.
    pub fn build(specs: &[TileSpec], cell_size: i32) -> Result<Self, DemError> {
        assert!(cell_size > 0, "cell size must be positive");

        for spec in specs {
            if spec.x0.rem_euclid(cell_size) != 0
                || (spec.xn + 1).rem_euclid(cell_size) != 0
                || spec.y0.rem_euclid(cell_size) != 0
                || (spec.yn + 1).rem_euclid(cell_size) != 0
            {
                return Err(DemError::Misaligned {
                    path: spec.path.clone(),
                    cell_size,
                });
            }
        }

        if specs.is_empty() {
            return Ok(Self {
                cell_size,
                cx0: 0,
                cy0: 0,
                cols: 0,
                rows: 0,
                cells: Vec::new(),
            });
        }

        let (mut cx0, mut cy0, mut cx1, mut cy1) = (i32::MAX, i32::MAX, i32::MIN, i32::MIN);
        for spec in specs {
            cx0 = cx0.min(spec.x0.div_euclid(cell_size));
            cy0 = cy0.min(spec.y0.div_euclid(cell_size));
            cx1 = cx1.max(spec.xn.div_euclid(cell_size));
            cy1 = cy1.max(spec.yn.div_euclid(cell_size));
        }

        let cols = cx1 - cx0 + 1;
        let rows = cy1 - cy0 + 1;
        let mut cells: Vec<Option<usize>> = vec![None; cols as usize * rows as usize];
        for (idx, spec) in specs.iter().enumerate() {
            for cy in spec.y0.div_euclid(cell_size)..=spec.yn.div_euclid(cell_size) {
                for cx in spec.x0.div_euclid(cell_size)..=spec.xn.div_euclid(cell_size) {
                    let cell = ((cy - cy0) * cols + (cx - cx0)) as usize;
                    if let Some(prev) = cells[cell] {
                        return Err(DemError::CellConflict {
                            first: specs[prev].path.clone(),
                            second: spec.path.clone(),
                            x: cx * cell_size,
                            y: cy * cell_size,
                        });
                    }
                    cells[cell] = Some(idx);
                }
            }
        }

        Ok(Self {
            cell_size,
            cx0,
            cy0,
            cols,
            rows,
            cells,
        })
    }

    /// Returns the index of the tile covering `(x, y)`, if any.
    pub fn lookup(&self, x: i32, y: i32) -> Option<usize> {
        let cx = x.div_euclid(self.cell_size) - self.cx0;
        let cy = y.div_euclid(self.cell_size) - self.cy0;
        if cx < 0 || cy < 0 || cx >= self.cols || cy >= self.rows {
            return None;
        }
        self.cells[(cy * self.cols + cx) as usize]
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("no DEM covers grid point ({x}, {y})")]
    OutOfRange { x: i32, y: i32 },

    #[error("manifest line {line}: {reason}")]
    Manifest { line: usize, reason: String },

    #[error("tile {path} is not aligned to the {cell_size}-sample catalog grid")]
    Misaligned { path: String, cell_size: i32 },

    #[error("tiles {first} and {second} both cover catalog cell at ({x}, {y})")]
    CellConflict {
        first: String,
        second: String,
        x: i32,
        y: i32,
    },

    #[error("tile {0} is already active")]
    AlreadyActive(String),
}

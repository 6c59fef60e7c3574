use demset::DemError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterpError {
    #[error("{0}")]
    Dem(#[from] DemError),

    #[error("path needs at least two vertices")]
    ShortPath,

    #[error("step size must be positive")]
    StepSize,
}

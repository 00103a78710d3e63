//! Data sources producing interface sections.
pub mod net_dev;

use crate::fsutil::FileOpenError;
use crate::interface;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    FileOpen(#[from] FileOpenError),
    #[error("failed to read interface statistics: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid interface record: {0}")]
    Interface(#[from] interface::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid sector size {0}: must be greater than zero")]
    InvalidSectorSize(usize),

    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read sector {sector} of {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        sector: u64,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// The file this error is scoped to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ScanError::InvalidSectorSize(_) => None,
            ScanError::Open { path, .. } | ScanError::Read { path, .. } => Some(path),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, ScanError::InvalidSectorSize(_))
    }
}

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use adapters::SectorScanner;
pub use domain::{DEFAULT_SECTOR_SIZE, ScanResult};
pub use error::ScanError;

use crate::domain::{FileMetadata, ScanConfig, ScanReport, ScanResult};
use crate::error::ScanError;
use anyhow::Result;
use std::path::Path;

pub trait FileSystemPort {
    fn scan_files(&self, config: &ScanConfig) -> Result<Vec<FileMetadata>>;
}

pub trait SectorScanPort {
    fn sector_size(&self) -> usize;
    fn scan(&mut self, path: &Path) -> std::result::Result<ScanResult, ScanError>;
}

pub trait OutputPort {
    fn write_results(&self, results: &ScanReport) -> Result<()>;
}

pub trait ProgressPort {
    fn start(&self, total_files: u64, total_bytes: u64);
    fn advance(&self, file: &FileMetadata);
    fn finish(&self);
}

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::SystemTime;

pub const DEFAULT_SECTOR_SIZE: usize = 4096;

/// Sector statistics for a single file, produced once per scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanResult {
    pub size: u64,
    pub sector_count: u64,
    pub empty_sector_count: u64,
}

impl ScanResult {
    pub fn new(size: u64, sector_count: u64, empty_sector_count: u64) -> Self {
        debug_assert!(empty_sector_count <= sector_count);
        Self {
            size,
            sector_count,
            empty_sector_count,
        }
    }

    /// Number of sectors a file of `size` bytes spans. A zero-length file has none.
    pub fn sector_count_for(size: u64, sector_size: u64) -> u64 {
        if size == 0 {
            0
        } else {
            (size - 1) / sector_size + 1
        }
    }

    /// Empty sectors over total sectors, 0.0 for files without sectors.
    pub fn empty_ratio(&self) -> f64 {
        if self.sector_count == 0 {
            0.0
        } else {
            self.empty_sector_count as f64 / self.sector_count as f64
        }
    }

    /// Upper bound on the bytes held by empty sectors. The tail sector may be short,
    /// so the estimate is capped at the file size.
    pub fn reclaimable_bytes(&self, sector_size: u64) -> u64 {
        self.empty_sector_count
            .saturating_mul(sector_size)
            .min(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

impl FileMetadata {
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub result: ScanResult,
}

impl FileReport {
    pub fn new(path: PathBuf, result: ScanResult) -> Self {
        Self { path, result }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub paths: Vec<PathBuf>,
    pub sector_size: usize,
    pub min_ratio: f64,
    pub min_size: u64,
    pub max_depth: Option<usize>,
    pub ignore_patterns: HashSet<String>,
    pub cross_filesystem: bool,
    pub cache_file: Option<PathBuf>,
    pub list_all: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from(".")],
            sector_size: DEFAULT_SECTOR_SIZE,
            min_ratio: 0.0,
            min_size: 0,
            max_depth: None,
            ignore_patterns: HashSet::new(),
            cross_filesystem: true,
            cache_file: None,
            list_all: false,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_sector_size(mut self, sector_size: usize) -> Self {
        self.sector_size = sector_size;
        self
    }

    pub fn with_min_ratio(mut self, min_ratio: f64) -> Self {
        self.min_ratio = min_ratio;
        self
    }

    pub fn with_min_size(mut self, size: u64) -> Self {
        self.min_size = size;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_cache_file(mut self, cache_file: PathBuf) -> Self {
        self.cache_file = Some(cache_file);
        self
    }

    pub fn with_list_all(mut self, list_all: bool) -> Self {
        self.list_all = list_all;
        self
    }

    /// A file is reported when it has at least one empty sector and its ratio
    /// strictly exceeds the configured minimum.
    pub fn is_candidate(&self, result: &ScanResult) -> bool {
        result.empty_sector_count > 0 && result.empty_ratio() > self.min_ratio
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedScan {
    pub file: FileMetadata,
    pub result: ScanResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanCache {
    pub entries: Vec<CachedScan>,
    pub sector_size: usize,
    pub last_scan: SystemTime,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanReport {
    pub sector_size: usize,
    pub min_ratio: f64,
    pub candidates: Vec<FileReport>,
    /// Every successfully scanned file in scan order, kept only when listing all files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scanned: Vec<FileReport>,
    pub failures: Vec<ScanFailure>,
    pub total_files_scanned: usize,
    pub total_size_scanned: u64,
    pub total_sectors: u64,
    pub total_empty_sectors: u64,
    pub cached_files: usize,
}

impl ScanReport {
    pub fn new(sector_size: usize, min_ratio: f64) -> Self {
        Self {
            sector_size,
            min_ratio,
            candidates: Vec::new(),
            scanned: Vec::new(),
            failures: Vec::new(),
            total_files_scanned: 0,
            total_size_scanned: 0,
            total_sectors: 0,
            total_empty_sectors: 0,
            cached_files: 0,
        }
    }

    pub fn record(&mut self, report: FileReport, is_candidate: bool) {
        self.total_files_scanned += 1;
        self.total_size_scanned += report.result.size;
        self.total_sectors += report.result.sector_count;
        self.total_empty_sectors += report.result.empty_sector_count;
        if is_candidate {
            self.candidates.push(report);
        }
    }

    pub fn record_failure(&mut self, failure: ScanFailure) {
        self.failures.push(failure);
    }

    /// Orders candidates by descending reclaimable bytes, ties broken by path.
    pub fn sort_candidates(&mut self) {
        let sector_size = self.sector_size as u64;
        self.candidates.sort_by(|a, b| {
            b.result
                .reclaimable_bytes(sector_size)
                .cmp(&a.result.reclaimable_bytes(sector_size))
                .then_with(|| a.path.cmp(&b.path))
        });
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn total_reclaimable_bytes(&self) -> u64 {
        let sector_size = self.sector_size as u64;
        self.candidates
            .iter()
            .map(|c| c.result.reclaimable_bytes(sector_size))
            .sum()
    }
}

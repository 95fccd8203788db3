use crate::adapters::ScanCacheAdapter;
use crate::adapters::cache::CacheIndex;
use crate::domain::{CachedScan, FileReport, ScanConfig, ScanFailure, ScanReport};
use crate::ports::{FileSystemPort, ProgressPort, SectorScanPort};
use anyhow::{Result, bail};
use std::path::Path;
use tracing::{debug, info, warn};

pub struct EmptySectorFinderService<F, S, P> {
    filesystem: F,
    scanner: S,
    progress: P,
    cache: ScanCacheAdapter,
}

impl<F, S, P> EmptySectorFinderService<F, S, P>
where
    F: FileSystemPort,
    S: SectorScanPort,
    P: ProgressPort,
{
    pub fn new(filesystem: F, scanner: S, progress: P) -> Self {
        Self {
            filesystem,
            scanner,
            progress,
            cache: ScanCacheAdapter::new(),
        }
    }

    pub fn find_empty_sectors(&mut self, config: &ScanConfig) -> Result<ScanReport> {
        if config.sector_size != self.scanner.sector_size() {
            bail!(
                "Sector size mismatch: configured {} but scanner uses {}",
                config.sector_size,
                self.scanner.sector_size()
            );
        }
        if !(0.0..=1.0).contains(&config.min_ratio) {
            bail!("Minimum ratio must be between 0 and 1, got {}", config.min_ratio);
        }

        let files = self.filesystem.scan_files(config)?;
        info!(files = files.len(), sector_size = config.sector_size, "starting sector scan");

        let cached = match &config.cache_file {
            Some(cache_path) => self.load_cache_index(cache_path, config.sector_size),
            None => CacheIndex::default(),
        };

        let mut report = ScanReport::new(config.sector_size, config.min_ratio);
        let mut fresh_entries = Vec::with_capacity(files.len());

        let total_bytes = files.iter().map(|f| f.size).sum();
        self.progress.start(files.len() as u64, total_bytes);
        for file in files {
            self.progress.advance(&file);
            let result = match cached.lookup(&file) {
                Some(result) => {
                    report.cached_files += 1;
                    Ok(result)
                }
                None => self.scanner.scan(&file.path),
            };

            match result {
                Ok(result) => {
                    debug!(
                        path = %file.path.display(),
                        sectors = result.sector_count,
                        empty = result.empty_sector_count,
                        "scanned file"
                    );
                    let file_report = FileReport::new(file.path.clone(), result);
                    if config.list_all {
                        report.scanned.push(file_report.clone());
                    }
                    report.record(file_report, config.is_candidate(&result));
                    fresh_entries.push(CachedScan { file, result });
                }
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "skipping file");
                    report.record_failure(ScanFailure {
                        path: file.path,
                        error: e.to_string(),
                    });
                }
            }
        }
        self.progress.finish();

        report.sort_candidates();

        if let Some(cache_path) = &config.cache_file {
            let cache = self.cache.create_cache(fresh_entries, config.sector_size);
            if let Err(e) = self.cache.save_cache(cache_path, &cache) {
                warn!(error = %e, "failed to save scan cache");
            }
        }

        info!(
            scanned = report.total_files_scanned,
            candidates = report.candidate_count(),
            failures = report.failures.len(),
            "sector scan finished"
        );
        Ok(report)
    }

    fn load_cache_index(&self, cache_path: &Path, sector_size: usize) -> CacheIndex {
        match self.cache.load_cache(cache_path) {
            Ok(Some(cache)) if self.cache.is_cache_valid(&cache, sector_size) => {
                let index = self.cache.index(cache);
                debug!(entries = index.len(), "loaded scan cache");
                index
            }
            Ok(Some(_)) => {
                debug!("scan cache is stale, ignoring");
                CacheIndex::default()
            }
            Ok(None) => CacheIndex::default(),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable scan cache");
                CacheIndex::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ProgressBarAdapter;
    use crate::domain::{FileMetadata, ScanResult};
    use crate::error::ScanError;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::io;
    use std::path::PathBuf;
    use std::time::SystemTime;
    use tempfile::TempDir;

    struct FixedFiles(Vec<FileMetadata>);

    impl FileSystemPort for FixedFiles {
        fn scan_files(&self, _config: &ScanConfig) -> Result<Vec<FileMetadata>> {
            Ok(self.0.clone())
        }
    }

    struct FakeScanner {
        results: HashMap<PathBuf, ScanResult>,
        calls: Cell<usize>,
    }

    impl SectorScanPort for FakeScanner {
        fn sector_size(&self) -> usize {
            4096
        }

        fn scan(&mut self, path: &Path) -> std::result::Result<ScanResult, ScanError> {
            self.calls.set(self.calls.get() + 1);
            self.results
                .get(path)
                .copied()
                .ok_or_else(|| ScanError::Open {
                    path: path.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
                })
        }
    }

    fn file(name: &str, size: u64) -> FileMetadata {
        FileMetadata::new(PathBuf::from(name), size, SystemTime::UNIX_EPOCH)
    }

    fn service(
        files: Vec<FileMetadata>,
        results: Vec<(&str, ScanResult)>,
    ) -> EmptySectorFinderService<FixedFiles, FakeScanner, ProgressBarAdapter> {
        let scanner = FakeScanner {
            results: results
                .into_iter()
                .map(|(p, r)| (PathBuf::from(p), r))
                .collect(),
            calls: Cell::new(0),
        };
        EmptySectorFinderService::new(FixedFiles(files), scanner, ProgressBarAdapter::new_quiet())
    }

    #[test]
    fn failing_files_are_recorded_and_skipped() {
        let mut finder = service(
            vec![file("a", 8192), file("locked", 4096), file("b", 4096)],
            vec![
                ("a", ScanResult::new(8192, 2, 2)),
                ("b", ScanResult::new(4096, 1, 0)),
            ],
        );

        let report = finder.find_empty_sectors(&ScanConfig::new()).unwrap();
        assert_eq!(report.total_files_scanned, 2);
        assert_eq!(report.candidate_count(), 1);
        assert_eq!(report.candidates[0].path, PathBuf::from("a"));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, PathBuf::from("locked"));
        assert!(report.failures[0].error.contains("denied"));
    }

    #[test]
    fn list_all_keeps_every_scanned_file_in_order() {
        let files = vec![file("a", 8192), file("b", 4096), file("locked", 4096)];
        let results = vec![
            ("a", ScanResult::new(8192, 2, 0)),
            ("b", ScanResult::new(4096, 1, 1)),
        ];

        let report = service(files.clone(), results.clone())
            .find_empty_sectors(&ScanConfig::new())
            .unwrap();
        assert!(report.scanned.is_empty());

        let report = service(files, results)
            .find_empty_sectors(&ScanConfig::new().with_list_all(true))
            .unwrap();
        let paths: Vec<_> = report.scanned.iter().map(|r| r.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(report.candidate_count(), 1);
    }

    #[test]
    fn min_ratio_filters_candidates() {
        let mut finder = service(
            vec![file("quarter", 16384), file("full", 8192)],
            vec![
                ("quarter", ScanResult::new(16384, 4, 1)),
                ("full", ScanResult::new(8192, 2, 2)),
            ],
        );

        let report = finder
            .find_empty_sectors(&ScanConfig::new().with_min_ratio(0.25))
            .unwrap();
        let paths: Vec<_> = report.candidates.iter().map(|c| c.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("full")]);
        assert_eq!(report.total_empty_sectors, 3);
    }

    #[test]
    fn rejects_mismatched_sector_size_and_bad_ratio() {
        let mut finder = service(vec![], vec![]);
        assert!(
            finder
                .find_empty_sectors(&ScanConfig::new().with_sector_size(512))
                .is_err()
        );
        assert!(
            finder
                .find_empty_sectors(&ScanConfig::new().with_min_ratio(1.5))
                .is_err()
        );
    }

    #[test]
    fn cached_results_skip_rescanning() {
        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("cache.json");
        let config = ScanConfig::new().with_cache_file(cache_path.clone());

        let mut finder = service(
            vec![file("a", 8192)],
            vec![("a", ScanResult::new(8192, 2, 1))],
        );
        finder.find_empty_sectors(&config).unwrap();
        assert_eq!(finder.scanner.calls.get(), 1);
        assert!(cache_path.exists());

        let report = finder.find_empty_sectors(&config).unwrap();
        assert_eq!(finder.scanner.calls.get(), 1);
        assert_eq!(report.cached_files, 1);
        assert_eq!(report.candidate_count(), 1);
    }
}

use crate::domain::{CachedScan, FileMetadata, ScanCache, ScanResult};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const MAX_CACHE_AGE: Duration = Duration::from_secs(24 * 60 * 60);

pub struct ScanCacheAdapter;

impl ScanCacheAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn load_cache(&self, cache_path: &Path) -> Result<Option<ScanCache>> {
        if !cache_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(cache_path)
            .with_context(|| format!("Failed to read cache {}", cache_path.display()))?;
        let cache: ScanCache = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache {}", cache_path.display()))?;
        Ok(Some(cache))
    }

    pub fn save_cache(&self, cache_path: &Path, cache: &ScanCache) -> Result<()> {
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(cache)?;
        fs::write(cache_path, contents)
            .with_context(|| format!("Failed to write cache {}", cache_path.display()))?;
        Ok(())
    }

    pub fn is_cache_valid(&self, cache: &ScanCache, sector_size: usize) -> bool {
        if cache.sector_size != sector_size {
            return false;
        }

        if let Ok(elapsed) = SystemTime::now().duration_since(cache.last_scan) {
            if elapsed > MAX_CACHE_AGE {
                return false;
            }
        }

        cache.version == env!("CARGO_PKG_VERSION")
    }

    pub fn index(&self, cache: ScanCache) -> CacheIndex {
        CacheIndex {
            entries: cache
                .entries
                .into_iter()
                .map(|entry| (entry.file.path.clone(), entry))
                .collect(),
        }
    }

    pub fn create_cache(&self, entries: Vec<CachedScan>, sector_size: usize) -> ScanCache {
        ScanCache {
            entries,
            sector_size,
            last_scan: SystemTime::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for ScanCacheAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Previous results keyed by path.
#[derive(Debug, Default)]
pub struct CacheIndex {
    entries: HashMap<PathBuf, CachedScan>,
}

impl CacheIndex {
    /// Hit only when the file is unchanged in both size and modification time.
    pub fn lookup(&self, file: &FileMetadata) -> Option<ScanResult> {
        self.entries
            .get(&file.path)
            .filter(|entry| entry.file.size == file.size && entry.file.modified == file.modified)
            .map(|entry| entry.result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_entry(path: &str, size: u64) -> CachedScan {
        CachedScan {
            file: FileMetadata::new(PathBuf::from(path), size, SystemTime::UNIX_EPOCH),
            result: ScanResult::new(size, 1, 1),
        }
    }

    #[test]
    fn missing_cache_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let adapter = ScanCacheAdapter::new();
        assert!(adapter.load_cache(&dir.path().join("none.json")).unwrap().is_none());
    }

    #[test]
    fn saved_cache_loads_back_and_validates() {
        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("sub/cache.json");
        let adapter = ScanCacheAdapter::new();

        let cache = adapter.create_cache(vec![sample_entry("/data/a.img", 100)], 4096);
        adapter.save_cache(&cache_path, &cache).unwrap();

        let loaded = adapter.load_cache(&cache_path).unwrap().unwrap();
        assert!(adapter.is_cache_valid(&loaded, 4096));
        assert!(!adapter.is_cache_valid(&loaded, 512));
        assert_eq!(loaded.entries.len(), 1);
    }

    #[test]
    fn stale_cache_is_invalid() {
        let adapter = ScanCacheAdapter::new();
        let mut cache = adapter.create_cache(vec![], 4096);
        cache.last_scan = SystemTime::now() - Duration::from_secs(25 * 60 * 60);
        assert!(!adapter.is_cache_valid(&cache, 4096));
    }

    #[test]
    fn corrupt_cache_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("cache.json");
        fs::write(&cache_path, "not json").unwrap();
        assert!(ScanCacheAdapter::new().load_cache(&cache_path).is_err());
    }

    #[test]
    fn lookup_requires_unchanged_metadata() {
        let adapter = ScanCacheAdapter::new();
        let index = adapter.index(adapter.create_cache(vec![sample_entry("/data/a.img", 100)], 4096));

        let same = FileMetadata::new(PathBuf::from("/data/a.img"), 100, SystemTime::UNIX_EPOCH);
        assert_eq!(index.lookup(&same), Some(ScanResult::new(100, 1, 1)));

        let resized = FileMetadata::new(PathBuf::from("/data/a.img"), 200, SystemTime::UNIX_EPOCH);
        assert_eq!(index.lookup(&resized), None);

        let touched = FileMetadata::new(
            PathBuf::from("/data/a.img"),
            100,
            SystemTime::UNIX_EPOCH + Duration::from_secs(1),
        );
        assert_eq!(index.lookup(&touched), None);
    }
}

use crate::domain::{FileMetadata, ScanConfig};
use crate::ports::FileSystemPort;
use anyhow::{Context, Result, bail};
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use rayon::prelude::*;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, warn};

pub struct FileSystemAdapter;

impl FileSystemAdapter {
    pub fn new() -> Self {
        Self
    }

    fn walk_root(root: &Path, config: &ScanConfig) -> Result<Vec<FileMetadata>> {
        if !root.exists() {
            bail!("Path does not exist: {}", root.display());
        }

        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .max_depth(config.max_depth)
            .same_file_system(!config.cross_filesystem);

        if !config.ignore_patterns.is_empty() {
            let mut overrides = OverrideBuilder::new(root);
            for pattern in &config.ignore_patterns {
                overrides
                    .add(&format!("!{}", pattern))
                    .with_context(|| format!("Invalid ignore pattern: {}", pattern))?;
            }
            builder.overrides(overrides.build()?);
        }

        let entries = builder
            .build()
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable entry");
                        return None;
                    }
                };

                // Symlinks report their own type here since links are not followed.
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    return None;
                }

                let metadata = match entry.metadata() {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!(path = %entry.path().display(), error = %e, "skipping file without metadata");
                        return None;
                    }
                };

                let size = metadata.len();
                if size < config.min_size {
                    return None;
                }

                let modified = modified_time(entry.path(), metadata.modified())?;
                Some(FileMetadata::new(entry.into_path(), size, modified))
            })
            .collect();

        Ok(entries)
    }
}

/// Modification time used for cache keys; files without one are logged and skipped.
fn modified_time(path: &Path, modified: io::Result<SystemTime>) -> Option<SystemTime> {
    match modified {
        Ok(modified) => Some(modified),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping file without modification time");
            None
        }
    }
}

impl Default for FileSystemAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemPort for FileSystemAdapter {
    fn scan_files(&self, config: &ScanConfig) -> Result<Vec<FileMetadata>> {
        let mut files: Vec<FileMetadata> = config
            .paths
            .par_iter()
            .map(|path| Self::walk_root(path, config))
            .collect::<Result<Vec<Vec<FileMetadata>>>>()?
            .into_iter()
            .flatten()
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);

        debug!(count = files.len(), "enumerated files");
        Ok(files)
    }
}

use crate::domain::FileMetadata;
use crate::ports::ProgressPort;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {bytes:>10}/{total_bytes:10} {binary_bytes_per_sec:>12} {wide_msg}";

/// Progress over the bytes to be scanned, showing the file currently in flight.
pub struct ProgressBarAdapter {
    bar: ProgressBar,
}

impl ProgressBarAdapter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        Self { bar }
    }

    /// A hidden bar still tracks position but draws nothing.
    pub fn new_quiet() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn with_quiet(self, quiet: bool) -> Self {
        if quiet { Self::new_quiet() } else { self }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Default for ProgressBarAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressPort for ProgressBarAdapter {
    fn start(&self, total_files: u64, total_bytes: u64) {
        self.bar.set_length(total_bytes);
        self.bar.set_position(0);
        self.bar.set_message(format!("{} files", total_files));
        if !self.bar.is_hidden() {
            self.bar.enable_steady_tick(Duration::from_millis(100));
        }
    }

    fn advance(&self, file: &FileMetadata) {
        self.bar.set_message(file.path.display().to_string());
        self.bar.inc(file.size);
    }

    fn finish(&self) {
        self.bar.disable_steady_tick();
        self.bar.finish_with_message("✓ Scan complete!");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::SystemTime;

    #[test]
    fn advances_by_file_size() {
        let progress = ProgressBarAdapter::new_quiet();
        progress.start(2, 5000);
        progress.advance(&FileMetadata::new(
            PathBuf::from("a.img"),
            4096,
            SystemTime::UNIX_EPOCH,
        ));
        assert_eq!(progress.position(), 4096);
        progress.advance(&FileMetadata::new(
            PathBuf::from("b.img"),
            904,
            SystemTime::UNIX_EPOCH,
        ));
        assert_eq!(progress.position(), 5000);
        progress.finish();
    }

    #[test]
    fn restart_resets_position() {
        let progress = ProgressBarAdapter::new_quiet();
        progress.start(1, 10);
        progress.advance(&FileMetadata::new(PathBuf::from("a"), 10, SystemTime::UNIX_EPOCH));
        progress.start(1, 20);
        assert_eq!(progress.position(), 0);
    }
}

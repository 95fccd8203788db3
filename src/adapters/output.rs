use crate::domain::{FileReport, ScanReport};
use crate::ports::OutputPort;
use anyhow::{Context, Result};
use console::style;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const MB: f64 = 1_048_576.0;

struct OutputWriter {
    output_file: Option<PathBuf>,
}

impl OutputWriter {
    fn new() -> Self {
        Self { output_file: None }
    }

    fn with_file(path: &Path) -> Self {
        Self {
            output_file: Some(path.to_path_buf()),
        }
    }

    fn write_content(&self, content: &str) -> Result<()> {
        match &self.output_file {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            None => {
                print!("{}", content);
            }
        }
        Ok(())
    }
}

/// Ratio rounded to three decimals, as shown in per-file listings.
fn rounded_ratio(report: &FileReport) -> f64 {
    (report.result.empty_ratio() * 1000.0).round() / 1000.0
}

pub struct ConsoleOutputAdapter {
    writer: OutputWriter,
    summary_only: bool,
    paths_only: bool,
    list_all: bool,
}

impl ConsoleOutputAdapter {
    pub fn new() -> Self {
        Self {
            writer: OutputWriter::new(),
            summary_only: false,
            paths_only: false,
            list_all: false,
        }
    }

    pub fn with_file(path: &Path) -> Self {
        Self {
            writer: OutputWriter::with_file(path),
            ..Self::new()
        }
    }

    pub fn with_summary_only(mut self, summary_only: bool) -> Self {
        self.summary_only = summary_only;
        self
    }

    pub fn with_paths_only(mut self, paths_only: bool) -> Self {
        self.paths_only = paths_only;
        self
    }

    /// List every scanned file rather than only the candidates.
    pub fn with_list_all(mut self, list_all: bool) -> Self {
        self.list_all = list_all;
        self
    }

    fn format_text(&self, results: &ScanReport) -> String {
        let mut output = String::new();

        if self.paths_only {
            for candidate in &results.candidates {
                let _ = writeln!(output, "{}", candidate.path.display());
            }
            return output;
        }

        if !self.summary_only {
            let listed = if self.list_all {
                &results.scanned
            } else {
                &results.candidates
            };
            for file in listed {
                let _ = writeln!(
                    output,
                    "{}\t{}\t{}\t{}",
                    file.result.empty_sector_count,
                    file.result.sector_count,
                    rounded_ratio(file),
                    file.path.display()
                );
            }
        }

        let _ = writeln!(output, "\n{}", style("=== Empty Sector Scan Results ===").bold());
        let _ = writeln!(output, "Total files scanned: {}", results.total_files_scanned);
        let _ = writeln!(
            output,
            "Total size scanned: {:.2} MB",
            results.total_size_scanned as f64 / MB
        );
        let _ = writeln!(output, "Sector size: {} bytes", results.sector_size);
        let _ = writeln!(
            output,
            "Empty sectors: {} of {}",
            results.total_empty_sectors, results.total_sectors
        );
        let _ = writeln!(output, "Candidate files: {}", results.candidate_count());
        let _ = writeln!(
            output,
            "Estimated reclaimable space: {}",
            style(format!("{:.2} MB", results.total_reclaimable_bytes() as f64 / MB)).green()
        );
        if results.cached_files > 0 {
            let _ = writeln!(output, "Results served from cache: {}", results.cached_files);
        }

        if results.candidates.is_empty() {
            let _ = writeln!(output, "\nNo files with empty sectors found!");
        }

        if !results.failures.is_empty() {
            let _ = writeln!(
                output,
                "\n{}",
                style(format!("Skipped {} unreadable files:", results.failures.len())).yellow()
            );
            for failure in &results.failures {
                let _ = writeln!(output, "  {}", failure.error);
            }
        }

        output
    }
}

impl Default for ConsoleOutputAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPort for ConsoleOutputAdapter {
    fn write_results(&self, results: &ScanReport) -> Result<()> {
        self.writer.write_content(&self.format_text(results))
    }
}

pub struct JsonOutputAdapter {
    writer: OutputWriter,
}

impl JsonOutputAdapter {
    pub fn with_file(path: &Path) -> Self {
        Self {
            writer: OutputWriter::with_file(path),
        }
    }

    pub fn with_stdout() -> Self {
        Self {
            writer: OutputWriter::new(),
        }
    }
}

impl OutputPort for JsonOutputAdapter {
    fn write_results(&self, results: &ScanReport) -> Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        self.writer.write_content(&format!("{}\n", json))
    }
}

pub struct CsvOutputAdapter {
    writer: OutputWriter,
}

impl CsvOutputAdapter {
    pub fn with_file(path: &Path) -> Self {
        Self {
            writer: OutputWriter::with_file(path),
        }
    }

    pub fn with_stdout() -> Self {
        Self {
            writer: OutputWriter::new(),
        }
    }

    fn escape_field(field: &str) -> String {
        if field.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_csv_string(&self, results: &ScanReport) -> String {
        let sector_size = results.sector_size as u64;
        let mut output = String::new();
        output.push_str(
            "file_path,size,sector_count,empty_sector_count,empty_ratio,reclaimable_bytes\n",
        );
        for candidate in &results.candidates {
            let _ = writeln!(
                output,
                "{},{},{},{},{:.3},{}",
                Self::escape_field(&candidate.path.to_string_lossy()),
                candidate.result.size,
                candidate.result.sector_count,
                candidate.result.empty_sector_count,
                candidate.result.empty_ratio(),
                candidate.result.reclaimable_bytes(sector_size)
            );
        }
        output
    }
}

impl OutputPort for CsvOutputAdapter {
    fn write_results(&self, results: &ScanReport) -> Result<()> {
        let csv_content = self.format_csv_string(results);
        self.writer.write_content(&csv_content)
    }
}

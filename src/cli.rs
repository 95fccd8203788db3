use crate::domain::{DEFAULT_SECTOR_SIZE, ScanConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn parse_ratio(value: &str) -> Result<f64, String> {
    let ratio: f64 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    if (0.0..=1.0).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(format!("ratio must be between 0 and 1, got {}", ratio))
    }
}

#[derive(Parser)]
#[command(name = "diskscan")]
#[command(about = "Find files made mostly of zero-filled sectors")]
#[command(version)]
pub struct Cli {
    #[arg(help = "Paths to scan (default: .)")]
    pub paths: Vec<PathBuf>,

    #[arg(
        short = 'S',
        long = "sector-size",
        help = "Size of sectors to scan for, in bytes",
        default_value_t = DEFAULT_SECTOR_SIZE
    )]
    pub sector_size: usize,

    #[arg(
        short = 'r',
        long = "min-ratio",
        help = "Only report files whose empty sector ratio exceeds this value",
        default_value = "0",
        value_parser = parse_ratio
    )]
    pub min_ratio: f64,

    #[arg(
        short = 'm',
        long = "min-size",
        help = "Minimum file size in bytes to consider",
        default_value = "0"
    )]
    pub min_size: u64,

    #[arg(
        short = 'd',
        long = "max-depth",
        help = "Maximum directory depth to scan"
    )]
    pub max_depth: Option<usize>,

    #[arg(
        short = 'i',
        long = "ignore",
        help = "Ignore files matching this glob pattern",
        action = clap::ArgAction::Append
    )]
    pub ignore_patterns: Vec<String>,

    #[arg(
        long = "no-cross-filesystem",
        help = "Do not cross filesystem boundaries"
    )]
    pub no_cross_filesystem: bool,

    #[arg(
        short = 'c',
        long = "cache",
        help = "Cache file for reusing results of unchanged files"
    )]
    pub cache_file: Option<PathBuf>,

    #[arg(
        short = 'q',
        long = "quiet",
        visible_alias = "silent",
        short_alias = 's',
        help = "Do not print progress"
    )]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long = "verbose",
        help = "Log every scanned file"
    )]
    pub verbose: bool,

    #[arg(
        short = 'f',
        long = "format",
        help = "Output format",
        value_enum,
        default_value = "text"
    )]
    pub output_format: OutputFormat,

    #[arg(
        short = 'o',
        long = "output",
        help = "Output file path (stdout if not specified)"
    )]
    pub output_file: Option<PathBuf>,

    #[arg(
        long = "summary-only",
        help = "Show only summary statistics, not individual files"
    )]
    pub summary_only: bool,

    #[arg(
        short = 'a',
        long = "all",
        help = "List every scanned file, not only those with empty sectors",
        conflicts_with_all = ["summary_only", "paths_only"]
    )]
    pub all: bool,

    #[arg(
        long = "paths-only",
        help = "Print only the paths of matching files",
        conflicts_with = "summary_only"
    )]
    pub paths_only: bool,
}

impl Cli {
    pub fn to_scan_config(&self) -> ScanConfig {
        let paths = if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        };

        let mut config = ScanConfig::new()
            .with_paths(paths)
            .with_sector_size(self.sector_size)
            .with_min_ratio(self.min_ratio)
            .with_min_size(self.min_size)
            .with_list_all(self.all);

        if let Some(max_depth) = self.max_depth {
            config = config.with_max_depth(max_depth);
        }
        if let Some(cache_file) = &self.cache_file {
            config = config.with_cache_file(cache_file.clone());
        }

        config.ignore_patterns.extend(self.ignore_patterns.iter().cloned());
        config.cross_filesystem = !self.no_cross_filesystem;

        config
    }
}

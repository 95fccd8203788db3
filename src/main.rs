use clap::Parser;
use diskscan::adapters::{
    ConsoleOutputAdapter, CsvOutputAdapter, FileSystemAdapter, JsonOutputAdapter,
    ProgressBarAdapter, SectorScanner,
};
use diskscan::cli::{Cli, OutputFormat};
use diskscan::ports::OutputPort;
use diskscan::services::EmptySectorFinderService;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Cli::parse();

    let default_level = if args.verbose { "diskscan=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = args.to_scan_config();
    let scanner = match SectorScanner::new(config.sector_size) {
        Ok(scanner) => scanner,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let filesystem = FileSystemAdapter::new();
    let progress = ProgressBarAdapter::new().with_quiet(args.quiet);

    let mut finder = EmptySectorFinderService::new(filesystem, scanner, progress);

    match finder.find_empty_sectors(&config) {
        Ok(results) => {
            let output: Box<dyn OutputPort> = match (&args.output_format, &args.output_file) {
                (OutputFormat::Text, Some(path)) => Box::new(
                    ConsoleOutputAdapter::with_file(path)
                        .with_summary_only(args.summary_only)
                        .with_paths_only(args.paths_only)
                        .with_list_all(args.all),
                ),
                (OutputFormat::Text, None) => Box::new(
                    ConsoleOutputAdapter::new()
                        .with_summary_only(args.summary_only)
                        .with_paths_only(args.paths_only)
                        .with_list_all(args.all),
                ),
                (OutputFormat::Json, Some(path)) => Box::new(JsonOutputAdapter::with_file(path)),
                (OutputFormat::Json, None) => Box::new(JsonOutputAdapter::with_stdout()),
                (OutputFormat::Csv, Some(path)) => Box::new(CsvOutputAdapter::with_file(path)),
                (OutputFormat::Csv, None) => Box::new(CsvOutputAdapter::with_stdout()),
            };

            if let Err(e) = output.write_results(&results) {
                eprintln!("Error writing results: {:#}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error during scan: {:#}", e);
            process::exit(1);
        }
    }
}

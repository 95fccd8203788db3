pub mod cache;
pub mod filesystem;
pub mod output;
pub mod progress;
pub mod sector_scanner;

pub use cache::ScanCacheAdapter;
pub use filesystem::FileSystemAdapter;
pub use output::{ConsoleOutputAdapter, CsvOutputAdapter, JsonOutputAdapter};
pub use progress::ProgressBarAdapter;
pub use sector_scanner::{SectorBuffer, SectorScanner};

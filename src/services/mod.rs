pub mod empty_sector_finder;

pub use empty_sector_finder::EmptySectorFinderService;

pub mod day_cache;
pub mod meter;
pub mod rollups;

pub use day_cache::DayCacheRepository;
pub use meter::MeterRepository;
pub use rollups::RollupRepository;

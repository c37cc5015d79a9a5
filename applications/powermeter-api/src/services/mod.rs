pub mod date_lookup;
pub mod kwh;
pub mod meter;
pub mod watts;

pub use date_lookup::DateLookupService;
pub use kwh::{KwhCount, KwhService, KwhType};
pub use meter::MeterService;
pub use watts::WattsService;

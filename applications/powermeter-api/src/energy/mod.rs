//! Pure energy arithmetic: unit conversion, date flooring and summaries.

pub mod dates;
pub mod summary;
pub mod units;

pub use dates::{normalize_date, Level};
pub use summary::{summarize, summarize_seconds, KwhStats, SecondsSummary, Summary, WattStats};
pub use units::{kwh_to_watt, pulses_to_kwh, round4};

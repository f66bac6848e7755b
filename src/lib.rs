//! In-memory engine for irregular hydro-meteorological time series:
//! ordered `(timestamp, value, flags)` records, a CSV-like line codec,
//! sorted-container operations, and event identification.

pub mod csv;
pub mod date;
pub mod error;
pub mod events;
pub mod interval;
pub mod line_codec;
pub mod series;
pub mod series_list;
pub mod timestamp_list;

mod sorted;

pub use crate::date::{epoch_to_broken_down, parse as parse_date, BrokenDownTime};
pub use crate::error::{Error, Result};
pub use crate::events::{identify_events, EventConfig};
pub use crate::interval::{Interval, IntervalList};
pub use crate::series::{Record, Series};
pub use crate::series_list::SeriesList;
pub use crate::timestamp_list::TimestampList;

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

/// The earliest timestamp this crate can represent.
pub const LONG_TIME_T_MIN: Timestamp = Timestamp::MIN;
/// The latest timestamp this crate can represent.
pub const LONG_TIME_T_MAX: Timestamp = Timestamp::MAX;

/// This crate's version, mirroring the original's exported `dickinson_version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

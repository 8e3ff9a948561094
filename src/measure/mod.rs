//! Validated measurement types for byte counts and transfer rates.
//!
//! This module provides the two numeric value types the task lifecycle is
//! built on:
//! - [`FileSize`] - a non-negative byte count with unit conversion
//! - [`Speed`] - a non-negative bytes-per-second transfer rate
//!
//! Both parse from `"<number> <UNIT>"` strings (case-insensitive) and format
//! back to human-readable text with trailing-zero decimals stripped.
//!
//! # Example
//!
//! ```
//! use mediadl_core::measure::FileSize;
//!
//! let size = FileSize::from_gigabytes(1.5)?;
//! assert_eq!(size.to_human_readable(), "1.5 GB");
//! assert_eq!("1.5 GB".parse::<FileSize>()?, size);
//! # Ok::<(), mediadl_core::measure::MeasureError>(())
//! ```

mod error;
mod file_size;
mod speed;

pub use error::MeasureError;
pub use file_size::FileSize;
pub use speed::Speed;

/// Scales a raw base-unit value into the largest unit below 1024 and formats
/// it with up to two decimals, stripping trailing zeros.
///
/// At the base unit the value is always whole, so no decimals are shown.
fn format_scaled(raw: u64, units: &[&str]) -> String {
    if raw == 0 {
        return format!("0 {}", units[0]);
    }

    let mut value = raw as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < units.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        return format!("{raw} {}", units[0]);
    }

    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {}", units[unit])
}

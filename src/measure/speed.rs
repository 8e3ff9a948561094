//! Transfer-rate value type with unit conversion, parsing and ETA math.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::format_scaled;
use super::{FileSize, MeasureError};

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * KIB;
const GIB: f64 = 1024.0 * MIB;

/// Display units for [`Speed::to_human_readable`].
const SPEED_UNITS: [&str; 4] = ["B/s", "KB/s", "MB/s", "GB/s"];

/// Regex pattern for speed strings like `"2.5 MB/s"`.
#[allow(clippy::expect_used)]
static SPEED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(B/s|KB/s|MB/s|GB/s)$").expect("speed regex is valid") // Static pattern, safe to panic
});

/// A non-negative transfer rate in bytes per second.
///
/// Fractional inputs are floored to whole bytes per second. Serializes as a
/// plain integer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Speed(u64);

impl Speed {
    /// Creates a speed from a whole bytes-per-second rate.
    #[must_use]
    pub const fn from_bytes_per_second(bps: u64) -> Self {
        Self(bps)
    }

    /// Creates a zero speed.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Creates a speed from kilobytes per second.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::Validation`] if `kbps` is negative or not
    /// finite.
    pub fn from_kilobytes_per_second(kbps: f64) -> Result<Self, MeasureError> {
        Self::from_f64(kbps * KIB)
    }

    /// Creates a speed from megabytes per second.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::Validation`] if `mbps` is negative or not
    /// finite.
    pub fn from_megabytes_per_second(mbps: f64) -> Result<Self, MeasureError> {
        Self::from_f64(mbps * MIB)
    }

    /// Creates a speed from gigabytes per second.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::Validation`] if `gbps` is negative or not
    /// finite.
    pub fn from_gigabytes_per_second(gbps: f64) -> Result<Self, MeasureError> {
        Self::from_f64(gbps * GIB)
    }

    fn from_f64(bps: f64) -> Result<Self, MeasureError> {
        if !bps.is_finite() {
            return Err(MeasureError::not_finite("speed"));
        }
        if bps < 0.0 {
            return Err(MeasureError::negative("speed", bps));
        }
        Ok(Self(bps.floor() as u64))
    }

    /// Returns the rate in whole bytes per second.
    #[must_use]
    pub const fn bytes_per_second(self) -> u64 {
        self.0
    }

    /// Returns the rate in kilobytes per second.
    #[must_use]
    pub fn kilobytes_per_second(self) -> f64 {
        self.0 as f64 / KIB
    }

    /// Returns the rate in megabytes per second.
    #[must_use]
    pub fn megabytes_per_second(self) -> f64 {
        self.0 as f64 / MIB
    }

    /// Returns the rate in gigabytes per second.
    #[must_use]
    pub fn gigabytes_per_second(self) -> f64 {
        self.0 as f64 / GIB
    }

    /// Adds two speeds, saturating at `u64::MAX`.
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Scales the speed by a non-negative factor, flooring the result.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::Validation`] if `factor` is negative or not
    /// finite.
    pub fn multiply(self, factor: f64) -> Result<Self, MeasureError> {
        if !factor.is_finite() {
            return Err(MeasureError::not_finite("multiplier"));
        }
        if factor < 0.0 {
            return Err(MeasureError::negative("multiplier", factor));
        }
        Self::from_f64(self.0 as f64 * factor)
    }

    /// Estimated time to transfer `remaining` at this rate, in milliseconds.
    ///
    /// Returns `f64::INFINITY` when the speed is zero.
    #[must_use]
    pub fn eta_ms(self, remaining: FileSize) -> f64 {
        if self.0 == 0 {
            return f64::INFINITY;
        }
        remaining.bytes() as f64 / self.0 as f64 * 1000.0
    }

    /// Formats the rate with the largest unit that keeps the value below
    /// 1024, e.g. `"2.5 MB/s"`.
    #[must_use]
    pub fn to_human_readable(self) -> String {
        format_scaled(self.0, &SPEED_UNITS)
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human_readable())
    }
}

impl FromStr for Speed {
    type Err = MeasureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let captures = SPEED_PATTERN
            .captures(trimmed)
            .ok_or_else(|| MeasureError::format(trimmed))?;

        let value: f64 = captures[1]
            .parse()
            .map_err(|_| MeasureError::format(trimmed))?;

        match captures[2].to_ascii_uppercase().as_str() {
            "B/S" => Self::from_f64(value),
            "KB/S" => Self::from_kilobytes_per_second(value),
            "MB/S" => Self::from_megabytes_per_second(value),
            "GB/S" => Self::from_gigabytes_per_second(value),
            _ => Err(MeasureError::format(trimmed)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== Construction Tests ====================

    #[test]
    fn test_from_bytes_per_second_and_accessors() {
        let speed = Speed::from_bytes_per_second(2 * 1024 * 1024);
        assert_eq!(speed.bytes_per_second(), 2_097_152);
        assert!((speed.megabytes_per_second() - 2.0).abs() < f64::EPSILON);
        assert!((speed.kilobytes_per_second() - 2048.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_construction_rejected() {
        assert!(matches!(
            Speed::from_kilobytes_per_second(-0.5),
            Err(MeasureError::Validation { .. })
        ));
    }

    #[test]
    fn test_zero() {
        assert_eq!(Speed::zero().bytes_per_second(), 0);
    }

    // ==================== Arithmetic Tests ====================

    #[test]
    fn test_add() {
        let a = Speed::from_bytes_per_second(1000);
        let b = Speed::from_bytes_per_second(250);
        assert_eq!(a.add(b).bytes_per_second(), 1250);
    }

    #[test]
    fn test_multiply_rejects_negative_factor() {
        let speed = Speed::from_bytes_per_second(100);
        assert!(speed.multiply(-1.0).is_err());
        assert_eq!(speed.multiply(1.5).unwrap().bytes_per_second(), 150);
    }

    // ==================== ETA Tests ====================

    #[test]
    fn test_eta_ms() {
        let speed = Speed::from_bytes_per_second(1000);
        let eta = speed.eta_ms(FileSize::from_bytes(500));
        assert!((eta - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_eta_ms_zero_speed_is_infinite() {
        let eta = Speed::zero().eta_ms(FileSize::from_bytes(1000));
        assert!(eta.is_infinite());
    }

    #[test]
    fn test_eta_ms_zero_remaining() {
        let speed = Speed::from_bytes_per_second(1000);
        assert!((speed.eta_ms(FileSize::zero())).abs() < f64::EPSILON);
    }

    // ==================== Formatting Tests ====================

    #[test]
    fn test_human_readable() {
        assert_eq!(Speed::zero().to_human_readable(), "0 B/s");
        assert_eq!(
            Speed::from_bytes_per_second(512).to_human_readable(),
            "512 B/s"
        );
        assert_eq!(
            Speed::from_megabytes_per_second(2.5)
                .unwrap()
                .to_human_readable(),
            "2.5 MB/s"
        );
    }

    // ==================== Parsing Tests ====================

    #[test]
    fn test_parse_round_trip() {
        let speed = Speed::from_megabytes_per_second(1.5).unwrap();
        let parsed: Speed = speed.to_human_readable().parse().unwrap();
        assert_eq!(parsed, speed);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(
            "3 kb/s".parse::<Speed>().unwrap(),
            Speed::from_kilobytes_per_second(3.0).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_size_units() {
        // Plain "MB" is a file size, not a rate
        assert!(matches!(
            "3 MB".parse::<Speed>(),
            Err(MeasureError::Format { .. })
        ));
    }
}

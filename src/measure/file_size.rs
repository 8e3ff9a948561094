//! Byte-count value type with unit conversion and parsing.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::MeasureError;
use super::format_scaled;

/// Bytes per kilobyte (binary units throughout).
const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * KIB;
const GIB: f64 = 1024.0 * MIB;
const TIB: f64 = 1024.0 * GIB;

/// Display units for [`FileSize::to_human_readable`].
const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Regex pattern for size strings like `"1.5 GB"` or `"200KB"`.
#[allow(clippy::expect_used)]
static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(B|KB|MB|GB|TB)$").expect("size regex is valid") // Static pattern, safe to panic
});

/// A non-negative file size in bytes.
///
/// Fractional inputs (from unit constructors or parsing) are floored to whole
/// bytes. Serializes as a plain integer byte count.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FileSize(u64);

impl FileSize {
    /// Creates a file size from a whole byte count.
    #[must_use]
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Creates a zero-byte file size.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Creates a file size from kilobytes.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::Validation`] if `kb` is negative or not finite.
    pub fn from_kilobytes(kb: f64) -> Result<Self, MeasureError> {
        Self::from_f64(kb * KIB)
    }

    /// Creates a file size from megabytes.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::Validation`] if `mb` is negative or not finite.
    pub fn from_megabytes(mb: f64) -> Result<Self, MeasureError> {
        Self::from_f64(mb * MIB)
    }

    /// Creates a file size from gigabytes.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::Validation`] if `gb` is negative or not finite.
    pub fn from_gigabytes(gb: f64) -> Result<Self, MeasureError> {
        Self::from_f64(gb * GIB)
    }

    /// Creates a file size from terabytes.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::Validation`] if `tb` is negative or not finite.
    pub fn from_terabytes(tb: f64) -> Result<Self, MeasureError> {
        Self::from_f64(tb * TIB)
    }

    /// Validates and floors a fractional byte count.
    fn from_f64(bytes: f64) -> Result<Self, MeasureError> {
        if !bytes.is_finite() {
            return Err(MeasureError::not_finite("file size"));
        }
        if bytes < 0.0 {
            return Err(MeasureError::negative("file size", bytes));
        }
        Ok(Self(bytes.floor() as u64))
    }

    /// Returns the size in whole bytes.
    #[must_use]
    pub const fn bytes(self) -> u64 {
        self.0
    }

    /// Returns the size in kilobytes.
    #[must_use]
    pub fn kilobytes(self) -> f64 {
        self.0 as f64 / KIB
    }

    /// Returns the size in megabytes.
    #[must_use]
    pub fn megabytes(self) -> f64 {
        self.0 as f64 / MIB
    }

    /// Returns the size in gigabytes.
    #[must_use]
    pub fn gigabytes(self) -> f64 {
        self.0 as f64 / GIB
    }

    /// Returns the size in terabytes.
    #[must_use]
    pub fn terabytes(self) -> f64 {
        self.0 as f64 / TIB
    }

    /// Adds two sizes, saturating at `u64::MAX`.
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts `other` from this size, clamping at zero.
    #[must_use]
    pub const fn subtract(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Scales the size by a non-negative factor, flooring the result.
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

    /// Formats the size with the largest unit that keeps the value below
    /// 1024, e.g. `"1.5 GB"` or `"512 B"`.
    #[must_use]
    pub fn to_human_readable(self) -> String {
        format_scaled(self.0, &SIZE_UNITS)
    }
}

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human_readable())
    }
}

impl FromStr for FileSize {
    type Err = MeasureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let captures = SIZE_PATTERN
            .captures(trimmed)
            .ok_or_else(|| MeasureError::format(trimmed))?;

        let value: f64 = captures[1]
            .parse()
            .map_err(|_| MeasureError::format(trimmed))?;

        match captures[2].to_ascii_uppercase().as_str() {
            "B" => Self::from_f64(value),
            "KB" => Self::from_kilobytes(value),
            "MB" => Self::from_megabytes(value),
            "GB" => Self::from_gigabytes(value),
            "TB" => Self::from_terabytes(value),
            _ => Err(MeasureError::format(trimmed)),
        }
    }
}

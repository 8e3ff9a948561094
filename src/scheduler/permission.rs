//! Permission gating and network-based quality recommendation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::measure::Speed;
use crate::task::Quality;

/// Network speed below which only SD is recommended (1 MiB/s).
const SD_SPEED_CEILING: u64 = 1024 * 1024;

/// Network speed below which HD is recommended (5 MiB/s).
const HD_SPEED_CEILING: u64 = 5 * 1024 * 1024;

/// A download entitlement granted to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Baseline entitlement required for any download.
    DownloadBasic,
    /// Entitlement for HD downloads.
    DownloadHd,
    /// Entitlement for 4K downloads.
    Download4k,
}

impl Permission {
    /// Returns the entitlement string used by the account provider.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DownloadBasic => "download_basic",
            Self::DownloadHd => "download_hd",
            Self::Download4k => "download_4k",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A download request refused on entitlement grounds.
///
/// The `Display` text is the user-facing reason and is surfaced verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// The account has no download entitlement at all.
    #[error("downloads are not available on this account; upgrade to enable them")]
    BasicRequired,

    /// HD was requested without the HD entitlement.
    #[error("HD downloads require a premium membership")]
    HdRequired,

    /// 4K was requested without the 4K entitlement.
    #[error("4K downloads require a VIP membership")]
    UhdRequired,
}

/// Checks whether `granted` covers a download at `quality`.
///
/// Checks run in order basic, HD, 4K; the first missing entitlement
/// short-circuits with its specific reason.
///
/// # Errors
///
/// Returns the [`PermissionError`] naming the first missing entitlement.
pub fn validate_download_permission(
    quality: Quality,
    granted: &[Permission],
) -> Result<(), PermissionError> {
    if !granted.contains(&Permission::DownloadBasic) {
        return Err(PermissionError::BasicRequired);
    }

    if quality == Quality::Hd && !granted.contains(&Permission::DownloadHd) {
        return Err(PermissionError::HdRequired);
    }

    if quality == Quality::Uhd && !granted.contains(&Permission::Download4k) {
        return Err(PermissionError::UhdRequired);
    }

    Ok(())
}

/// Recommends a quality tier for the measured network speed.
///
/// Below 1 MiB/s prefers SD, below 5 MiB/s prefers HD, otherwise 4K with an
/// HD fallback. When the preferred tier is not available the first available
/// tier is returned; an empty `available` slice yields `None`.
#[must_use]
pub fn recommended_quality(available: &[Quality], network_speed: Speed) -> Option<Quality> {
    let pick = |preferred: Quality| {
        if available.contains(&preferred) {
            Some(preferred)
        } else {
            available.first().copied()
        }
    };

    let bps = network_speed.bytes_per_second();
    if bps < SD_SPEED_CEILING {
        pick(Quality::Sd)
    } else if bps < HD_SPEED_CEILING {
        pick(Quality::Hd)
    } else if available.contains(&Quality::Uhd) {
        Some(Quality::Uhd)
    } else {
        pick(Quality::Hd)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== Permission Tests ====================

    #[test]
    fn test_basic_required_for_any_quality() {
        for quality in [Quality::Sd, Quality::Hd, Quality::Uhd] {
            assert_eq!(
                validate_download_permission(quality, &[]),
                Err(PermissionError::BasicRequired)
            );
        }
    }

    #[test]
    fn test_sd_needs_only_basic() {
        let granted = [Permission::DownloadBasic];
        assert!(validate_download_permission(Quality::Sd, &granted).is_ok());
    }

    #[test]
    fn test_hd_needs_hd_entitlement() {
        let granted = [Permission::DownloadBasic];
        assert_eq!(
            validate_download_permission(Quality::Hd, &granted),
            Err(PermissionError::HdRequired)
        );

        let granted = [Permission::DownloadBasic, Permission::DownloadHd];
        assert!(validate_download_permission(Quality::Hd, &granted).is_ok());
    }

    #[test]
    fn test_uhd_needs_4k_entitlement() {
        let granted = [Permission::DownloadBasic, Permission::DownloadHd];
        assert_eq!(
            validate_download_permission(Quality::Uhd, &granted),
            Err(PermissionError::UhdRequired)
        );

        let granted = [Permission::DownloadBasic, Permission::Download4k];
        assert!(validate_download_permission(Quality::Uhd, &granted).is_ok());
    }

    #[test]
    fn test_basic_check_short_circuits() {
        // Missing basic wins over missing 4K
        assert_eq!(
            validate_download_permission(Quality::Uhd, &[Permission::Download4k]),
            Err(PermissionError::BasicRequired)
        );
    }

    #[test]
    fn test_reasons_are_human_readable() {
        assert!(
            PermissionError::HdRequired
                .to_string()
                .contains("premium membership")
        );
        assert!(PermissionError::UhdRequired.to_string().contains("4K"));
    }

    // ==================== Quality Recommendation Tests ====================

    const ALL: [Quality; 3] = [Quality::Sd, Quality::Hd, Quality::Uhd];

    fn mibps(mib: f64) -> Speed {
        Speed::from_megabytes_per_second(mib).unwrap()
    }

    #[test]
    fn test_slow_network_recommends_sd() {
        assert_eq!(recommended_quality(&ALL, mibps(0.5)), Some(Quality::Sd));
    }

    #[test]
    fn test_mid_network_recommends_hd() {
        assert_eq!(recommended_quality(&ALL, mibps(1.0)), Some(Quality::Hd));
        assert_eq!(recommended_quality(&ALL, mibps(4.9)), Some(Quality::Hd));
    }

    #[test]
    fn test_fast_network_recommends_uhd() {
        assert_eq!(recommended_quality(&ALL, mibps(5.0)), Some(Quality::Uhd));
        assert_eq!(recommended_quality(&ALL, mibps(50.0)), Some(Quality::Uhd));
    }

    #[test]
    fn test_fast_network_falls_back_to_hd_then_first() {
        let no_uhd = [Quality::Sd, Quality::Hd];
        assert_eq!(recommended_quality(&no_uhd, mibps(50.0)), Some(Quality::Hd));

        let sd_only = [Quality::Sd];
        assert_eq!(recommended_quality(&sd_only, mibps(50.0)), Some(Quality::Sd));
    }

    #[test]
    fn test_preferred_tier_unavailable_falls_back_to_first() {
        let hd_only = [Quality::Hd];
        assert_eq!(recommended_quality(&hd_only, mibps(0.5)), Some(Quality::Hd));
    }

    #[test]
    fn test_empty_availability() {
        assert_eq!(recommended_quality(&[], mibps(50.0)), None);
        assert_eq!(recommended_quality(&[], mibps(0.1)), None);
    }
}

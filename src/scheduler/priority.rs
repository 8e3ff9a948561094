//! Priority scoring from user preferences and catalog metadata.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::task::MAX_PRIORITY;

/// Points awarded when the media is in the user's favorites.
const FAVORITE_POINTS: i32 = 20;
/// Points for a rating of at least 8.0.
const HIGH_RATING_POINTS: i32 = 15;
/// Points for a rating of at least 7.0 (below 8.0).
const GOOD_RATING_POINTS: i32 = 10;
/// Points for a release within the last calendar year.
const RECENT_RELEASE_POINTS: i32 = 10;
/// Points for more than this many views.
const POPULARITY_THRESHOLD: u64 = 10_000;
const POPULAR_POINTS: i32 = 10;

/// Per-user download preferences supplied by the catalog provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Media ids the user has marked as favorites.
    pub favorites: Vec<String>,
}

/// Catalog metadata about one media item.
///
/// All fields are optional; missing data simply contributes no points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// Aggregate rating on a 0-10 scale.
    pub rating: Option<f64>,
    /// Release year.
    pub release_year: Option<i32>,
    /// Total view count.
    pub views: Option<u64>,
}

/// Scores a media item into a scheduling priority in `1..=10`.
///
/// Points: 20 for a favorite, 15 for rating >= 8.0 (else 10 for >= 7.0),
/// 10 for a release year within the last calendar year, 10 for more than
/// 10000 views. The total is divided by 5, rounded up, and clamped to
/// `1..=10`.
#[must_use]
pub fn calculate_priority(
    media_id: &str,
    preferences: &UserPreferences,
    media: &MediaMetadata,
) -> u8 {
    calculate_priority_in_year(media_id, preferences, media, Utc::now().year())
}

/// [`calculate_priority`] with an explicit "current" year, so recency
/// scoring stays testable.
fn calculate_priority_in_year(
    media_id: &str,
    preferences: &UserPreferences,
    media: &MediaMetadata,
    current_year: i32,
) -> u8 {
    let mut score = 0;

    if preferences.favorites.iter().any(|id| id == media_id) {
        score += FAVORITE_POINTS;
    }

    match media.rating {
        Some(rating) if rating >= 8.0 => score += HIGH_RATING_POINTS,
        Some(rating) if rating >= 7.0 => score += GOOD_RATING_POINTS,
        _ => {}
    }

    if media
        .release_year
        .is_some_and(|year| year >= current_year - 1)
    {
        score += RECENT_RELEASE_POINTS;
    }

    if media.views.is_some_and(|views| views > POPULARITY_THRESHOLD) {
        score += POPULAR_POINTS;
    }

    // Ceiling division into the 1-10 priority range
    let priority = (score + 4) / 5;
    priority.clamp(1, i32::from(MAX_PRIORITY)) as u8
}

use serde::{Deserialize, Serialize};

use crate::core::Game;

/// Client-facing headroom badge derived from the performance ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Headroom {
    /// At least 20% above the recommended tier
    Excellent,
    /// Meets the recommended tier
    Recommended,
    /// Within 80% of the recommended tier
    Near,
    /// Between 50% and 80% of the recommended tier
    Moderate,
    /// Clears the minimum tier only
    Minimal,
}

impl Headroom {
    pub fn from_ratio(performance_ratio: f64) -> Self {
        if performance_ratio >= 1.2 {
            Headroom::Excellent
        } else if performance_ratio >= 1.0 {
            Headroom::Recommended
        } else if performance_ratio >= 0.8 {
            Headroom::Near
        } else if performance_ratio >= 0.5 {
            Headroom::Moderate
        } else {
            Headroom::Minimal
        }
    }
}

/// A game that the profile can run, with its ranking numbers. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(flatten)]
    pub game: Game,

    /// Ranking heuristic, see `matching::score::tier_score`
    pub score: f64,

    /// Bottleneck ratio against the recommended tier
    pub performance_ratio: f64,

    pub headroom: Headroom,
}

impl MatchResult {
    pub fn new(game: Game, score: f64, performance_ratio: f64) -> Self {
        Self {
            game,
            score,
            performance_ratio,
            headroom: Headroom::from_ratio(performance_ratio),
        }
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        format!(
            "{} - score {:.2}, x{:.2} ({:?})",
            self.game.display_name(),
            self.score,
            self.performance_ratio,
            self.headroom
        )
    }
}

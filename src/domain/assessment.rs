//! Scoring output types.
//!
//! A [`ScoreResult`] is produced fresh for every evaluation and never mutated.

use serde::{Deserialize, Serialize};

use super::RiskModel;

/// Length-of-stay risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LosCategory {
    Low,
    Intermediate,
    High,
    VeryHigh,
}

impl LosCategory {
    pub const ALL: [LosCategory; 4] = [Self::Low, Self::Intermediate, Self::High, Self::VeryHigh];

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Likely candidate for early discharge",
            Self::Intermediate => "Consider close monitoring",
            Self::High => "Prolonged hospitalisation likely",
            Self::VeryHigh => "Extended stay expected - plan discharge support early",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),         // Emerald (#10B981)
            Self::Intermediate => (251, 191, 36), // Amber (#FBBF24)
            Self::High => (249, 115, 22),        // Orange (#F97316)
            Self::VeryHigh => (244, 63, 94),     // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for LosCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Intermediate => write!(f, "INTERMEDIATE"),
            Self::High => write!(f, "HIGH"),
            Self::VeryHigh => write!(f, "VERY HIGH"),
        }
    }
}

/// Predicted stay in whole days, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LosRange {
    pub min_days: u32,
    pub max_days: u32,
}

impl LosRange {
    #[must_use]
    pub const fn days(min_days: u32, max_days: u32) -> Self {
        Self { min_days, max_days }
    }

    #[must_use]
    pub const fn exactly(days: u32) -> Self {
        Self::days(days, days)
    }
}

impl std::fmt::Display for LosRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.min_days == self.max_days {
            let unit = if self.min_days == 1 { "day" } else { "days" };
            write!(f, "{} {unit}", self.min_days)
        } else {
            write!(f, "{}-{} days", self.min_days, self.max_days)
        }
    }
}

/// One rule that fired for a given input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributingFactor {
    /// Tier group the rule belongs to (e.g. `age`, `frailty`)
    pub factor: String,

    pub label: String,

    pub points: u32,
}

/// Result of evaluating one [`super::PatientInput`] against a rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub model: RiskModel,

    pub total_score: u32,

    /// Highest score the table can produce for this input shape
    pub max_score: u32,

    /// Fired rules, in rule-table order
    pub contributing_factors: Vec<ContributingFactor>,

    pub category: LosCategory,

    pub predicted_los: LosRange,
}

impl ScoreResult {
    /// Score as a fraction of the attainable maximum, for gauges.
    #[must_use]
    pub fn score_fraction(&self) -> f64 {
        if self.max_score == 0 {
            0.0
        } else {
            f64::from(self.total_score) / f64::from(self.max_score)
        }
    }
}

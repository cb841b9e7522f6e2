//! Data-driven point tables.
//!
//! A [`RuleTable`] is an ordered list of independent point rules plus the score
//! bands that map a total onto a category and a stay. Every variant of the
//! calculator is a table; [`RuleTable::apply`] is the one fold that evaluates
//! all of them.
//!
//! Rules sharing a `factor` are tiers of the same attribute. Their predicates
//! must be mutually exclusive so a factor contributes at most once.

use serde::{Deserialize, Serialize};

use super::assessment::{ContributingFactor, LosCategory, LosRange, ScoreResult};
use super::patient::PatientInput;
use super::tables;

/// A single conditional point contribution.
#[derive(Clone, Copy)]
pub struct PointRule {
    /// Tier group, e.g. `age`
    pub factor: &'static str,
    pub label: &'static str,
    pub points: u32,
    /// Rule only applies when the procedural block is present
    pub procedural: bool,
    pub applies: fn(&PatientInput) -> bool,
}

impl std::fmt::Debug for PointRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointRule")
            .field("factor", &self.factor)
            .field("label", &self.label)
            .field("points", &self.points)
            .field("procedural", &self.procedural)
            .finish_non_exhaustive()
    }
}

/// Scores from `min_score` up to the next band's minimum.
#[derive(Debug, Clone, Copy)]
pub struct LosBand {
    pub min_score: u32,
    pub category: LosCategory,
    pub los: LosRange,
}

#[derive(Debug)]
pub struct RuleTable {
    pub(super) model: RiskModel,
    pub(super) rules: &'static [PointRule],
    /// Non-empty, strictly ascending `min_score`, first band starts at 0
    pub(super) bands: &'static [LosBand],
}

impl RuleTable {
    /// Build a table, checking the band invariants.
    ///
    /// In a `static` initialiser the check runs at compile time.
    ///
    /// # Panics
    /// Panics if `bands` is empty, does not start at 0, or is not strictly
    /// ascending.
    #[must_use]
    pub const fn new(
        model: RiskModel,
        rules: &'static [PointRule],
        bands: &'static [LosBand],
    ) -> Self {
        assert!(!bands.is_empty(), "rule table needs at least one band");
        assert!(bands[0].min_score == 0, "first band must start at 0");
        let mut i = 1;
        while i < bands.len() {
            assert!(
                bands[i - 1].min_score < bands[i].min_score,
                "bands must be strictly ascending"
            );
            i += 1;
        }

        Self {
            model,
            rules,
            bands,
        }
    }

    #[must_use]
    pub fn model(&self) -> RiskModel {
        self.model
    }

    #[must_use]
    pub fn rules(&self) -> &'static [PointRule] {
        self.rules
    }

    #[must_use]
    pub fn bands(&self) -> &'static [LosBand] {
        self.bands
    }

    /// Score an input without range checks.
    ///
    /// Total over any `PatientInput`; callers that need domain validation go
    /// through [`super::RiskScorer::evaluate`].
    #[must_use]
    pub fn apply(&self, input: &PatientInput) -> ScoreResult {
        let (total_score, contributing_factors) = self
            .rules
            .iter()
            .filter(|rule| (rule.applies)(input))
            .fold((0u32, Vec::new()), |(total, mut factors), rule| {
                factors.push(ContributingFactor {
                    factor: rule.factor.to_string(),
                    label: rule.label.to_string(),
                    points: rule.points,
                });
                (total + rule.points, factors)
            });

        let band = self.band_for(total_score);

        ScoreResult {
            model: self.model,
            total_score,
            max_score: self.max_score(input.procedural.is_some()),
            contributing_factors,
            category: band.category,
            predicted_los: band.los,
        }
    }

    /// Band containing `score`.
    #[must_use]
    pub fn band_for(&self, score: u32) -> &LosBand {
        // `new` guarantees a first band at 0, which matches every score.
        self.bands
            .iter()
            .rev()
            .find(|band| score >= band.min_score)
            .unwrap_or(&self.bands[0])
    }

    /// Highest attainable score: the top tier of every factor in scope.
    #[must_use]
    pub fn max_score(&self, include_procedural: bool) -> u32 {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| include_procedural || !rule.procedural)
            .filter(|(i, rule)| !self.rules[..*i].iter().any(|r| r.factor == rule.factor))
            .map(|(_, rule)| {
                self.rules
                    .iter()
                    .filter(|r| r.factor == rule.factor)
                    .map(|r| r.points)
                    .max()
                    .unwrap_or(0)
            })
            .sum()
    }

    /// Distinct factor names in table order.
    #[cfg(test)]
    pub(crate) fn factors(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules
            .iter()
            .enumerate()
            .filter(|(i, rule)| !self.rules[..*i].iter().any(|r| r.factor == rule.factor))
            .map(|(_, rule)| rule.factor)
    }
}

/// Which calculator variant to score with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskModel {
    /// Weighted pre-procedure risk table, four categories
    PreProcedure,
    /// Count of protective factors, FAST-style early discharge screen
    DischargeReadiness,
    /// Six-factor admission screen
    Admission,
}

impl RiskModel {
    pub const ALL: [RiskModel; 3] = [Self::PreProcedure, Self::DischargeReadiness, Self::Admission];

    #[must_use]
    pub fn table(&self) -> &'static RuleTable {
        match self {
            Self::PreProcedure => &tables::PRE_PROCEDURE,
            Self::DischargeReadiness => &tables::DISCHARGE_READINESS,
            Self::Admission => &tables::ADMISSION,
        }
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::PreProcedure => "Pre-procedure risk score",
            Self::DischargeReadiness => "Early discharge readiness",
            Self::Admission => "Admission screen",
        }
    }

    /// What the total counts, for gauges and headings.
    ///
    /// The discharge-readiness total counts protective factors, so a full
    /// score means the shortest stay.
    #[must_use]
    pub fn score_label(&self) -> &'static str {
        match self {
            Self::DischargeReadiness => "Protective factors",
            Self::PreProcedure | Self::Admission => "Risk score",
        }
    }

    /// Next model in [`RiskModel::ALL`], wrapping.
    #[must_use]
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for RiskModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreProcedure => write!(f, "pre-procedure"),
            Self::DischargeReadiness => write!(f, "discharge-readiness"),
            Self::Admission => write!(f, "admission"),
        }
    }
}

impl std::str::FromStr for RiskModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pre-procedure" | "preprocedure" | "canonical" => Ok(Self::PreProcedure),
            "discharge-readiness" | "discharge" | "fast" => Ok(Self::DischargeReadiness),
            "admission" => Ok(Self::Admission),
            other => Err(format!(
                "Unknown risk model '{other}' (expected pre-procedure, discharge-readiness or admission)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_starts_at_zero_and_is_sorted() {
        for model in RiskModel::ALL {
            let table = model.table();
            assert_eq!(table.model, model);
            assert_eq!(table.bands[0].min_score, 0);
            assert!(table
                .bands
                .windows(2)
                .all(|w| w[0].min_score < w[1].min_score));
        }
    }

    #[test]
    fn test_band_lookup_boundaries() {
        let table = RiskModel::PreProcedure.table();
        assert_eq!(table.band_for(4).category, LosCategory::Low);
        assert_eq!(table.band_for(5).category, LosCategory::Intermediate);
        assert_eq!(table.band_for(8).category, LosCategory::Intermediate);
        assert_eq!(table.band_for(9).category, LosCategory::High);
        assert_eq!(table.band_for(12).category, LosCategory::High);
        assert_eq!(table.band_for(13).category, LosCategory::VeryHigh);
        assert_eq!(table.band_for(u32::MAX).category, LosCategory::VeryHigh);
    }

    #[test]
    fn test_max_scores() {
        let pre = RiskModel::PreProcedure.table();
        assert_eq!(pre.max_score(false), 23);
        assert_eq!(pre.max_score(true), 30);

        assert_eq!(RiskModel::DischargeReadiness.table().max_score(true), 6);
        assert_eq!(RiskModel::Admission.table().max_score(false), 6);
    }

    #[test]
    fn test_factors_are_distinct() {
        let factors: Vec<_> = RiskModel::PreProcedure.table().factors().collect();
        assert_eq!(factors.first(), Some(&"age"));
        assert_eq!(factors.len(), 21);
    }

    #[test]
    fn test_model_parsing() {
        assert_eq!("pre-procedure".parse::<RiskModel>(), Ok(RiskModel::PreProcedure));
        assert_eq!("Discharge_Readiness".parse::<RiskModel>(), Ok(RiskModel::DischargeReadiness));
        assert_eq!(" admission ".parse::<RiskModel>(), Ok(RiskModel::Admission));
        assert!("logistic".parse::<RiskModel>().is_err());

        for model in RiskModel::ALL {
            assert_eq!(model.to_string().parse::<RiskModel>(), Ok(model));
        }
    }

    #[test]
    fn test_model_cycle() {
        assert_eq!(RiskModel::PreProcedure.next(), RiskModel::DischargeReadiness);
        assert_eq!(RiskModel::Admission.next(), RiskModel::PreProcedure);
    }

    #[test]
    fn test_score_label_marks_protective_count() {
        assert_eq!(RiskModel::DischargeReadiness.score_label(), "Protective factors");
        assert_eq!(RiskModel::PreProcedure.score_label(), "Risk score");
    }

    fn always(_: &PatientInput) -> bool {
        true
    }

    static ONE_RULE: [PointRule; 1] = [PointRule {
        factor: "any",
        label: "Any patient",
        points: 1,
        procedural: false,
        applies: always,
    }];

    #[test]
    #[should_panic(expected = "at least one band")]
    fn test_new_rejects_empty_bands() {
        let _ = RuleTable::new(RiskModel::Admission, &ONE_RULE, &[]);
    }

    #[test]
    #[should_panic(expected = "strictly ascending")]
    fn test_new_rejects_unsorted_bands() {
        static BANDS: [LosBand; 2] = [
            LosBand {
                min_score: 0,
                category: LosCategory::Low,
                los: LosRange::exactly(1),
            },
            LosBand {
                min_score: 0,
                category: LosCategory::High,
                los: LosRange::exactly(5),
            },
        ];
        let _ = RuleTable::new(RiskModel::Admission, &ONE_RULE, &BANDS);
    }

    #[test]
    fn test_checked_table_scores() {
        static BANDS: [LosBand; 1] = [LosBand {
            min_score: 0,
            category: LosCategory::Low,
            los: LosRange::exactly(1),
        }];
        let table = RuleTable::new(RiskModel::Admission, &ONE_RULE, &BANDS);
        let result = table.apply(&crate::domain::patient::fixtures::baseline());
        assert_eq!(result.total_score, 1);
        assert_eq!(table.band_for(u32::MAX).category, LosCategory::Low);
        assert_eq!(table.bands().len(), 1);
    }
}

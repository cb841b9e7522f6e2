//! The risk scorer: validated evaluation of a [`PatientInput`] against one
//! rule table.

use super::assessment::ScoreResult;
use super::patient::{InvalidInputError, PatientInput};
use super::rules::{RiskModel, RuleTable};

/// Stateless scorer bound to a static rule table.
///
/// Cheap to copy and safe to share between threads.
#[derive(Debug, Clone, Copy)]
pub struct RiskScorer {
    table: &'static RuleTable,
}

impl RiskScorer {
    #[must_use]
    pub fn new(model: RiskModel) -> Self {
        Self {
            table: model.table(),
        }
    }

    /// Scorer for the weighted pre-procedure table.
    #[must_use]
    pub fn canonical() -> Self {
        Self::new(RiskModel::PreProcedure)
    }

    #[must_use]
    pub fn model(&self) -> RiskModel {
        self.table.model
    }

    #[must_use]
    pub fn table(&self) -> &'static RuleTable {
        self.table
    }

    /// Validate `input`, then score it.
    ///
    /// # Errors
    /// Returns [`InvalidInputError`] if any field is outside its domain; no
    /// partial result is produced.
    pub fn evaluate(&self, input: &PatientInput) -> Result<ScoreResult, InvalidInputError> {
        input.validate()?;
        Ok(self.table.apply(input))
    }
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;
    use crate::domain::patient::fixtures::baseline;
    use crate::domain::{
        AccessApproach, Anaesthesia, Comorbidity, LosCategory, LosRange, ProceduralFactors, Sex,
        ValveType,
    };

    fn with_comorbidities(list: &[Comorbidity]) -> BTreeSet<Comorbidity> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_fit_patient_scores_zero() {
        let result = RiskScorer::canonical()
            .evaluate(&baseline())
            .expect("Should evaluate");

        assert_eq!(result.total_score, 0);
        assert!(result.contributing_factors.is_empty());
        assert_eq!(result.category, LosCategory::Low);
        assert_eq!(result.predicted_los, LosRange::days(0, 1));
        assert_eq!(result.max_score, 23);
    }

    #[test]
    fn test_elderly_woman_with_ckd_is_intermediate() {
        let input = PatientInput {
            age: 86,
            sex: Sex::Female,
            comorbidities: with_comorbidities(&[Comorbidity::ChronicKidneyDisease]),
            ..baseline()
        };

        let result = RiskScorer::canonical().evaluate(&input).expect("Should evaluate");

        assert_eq!(result.total_score, 5);
        assert_eq!(result.category, LosCategory::Intermediate);
        assert_eq!(result.predicted_los, LosRange::days(1, 2));

        let labels: Vec<_> = result
            .contributing_factors
            .iter()
            .map(|f| (f.label.as_str(), f.points))
            .collect();
        assert_eq!(
            labels,
            vec![("Age >= 85", 2), ("Female sex", 1), ("Chronic kidney disease", 2)]
        );
    }

    #[test]
    fn test_frail_transapical_patient_is_intermediate() {
        let input = PatientInput {
            age: 80,
            lvef: 35,
            clinical_frailty_score: 8,
            access_approach: AccessApproach::Transapical,
            ..baseline()
        };

        let result = RiskScorer::canonical().evaluate(&input).expect("Should evaluate");

        assert_eq!(result.total_score, 8);
        assert_eq!(result.category, LosCategory::Intermediate);
        assert_eq!(result.predicted_los, LosRange::days(1, 2));
    }

    #[test]
    fn test_multimorbid_patient_is_very_high() {
        let input = PatientInput {
            age: 90,
            comorbidities: with_comorbidities(&[
                Comorbidity::ChronicKidneyDisease,
                Comorbidity::Copd,
                Comorbidity::AtrialFibrillation,
            ]),
            lvef: 35,
            clinical_frailty_score: 8,
            access_approach: AccessApproach::Other,
            ..baseline()
        };

        let result = RiskScorer::canonical().evaluate(&input).expect("Should evaluate");

        assert_eq!(result.total_score, 13);
        assert_eq!(result.category, LosCategory::VeryHigh);
        assert_eq!(result.predicted_los, LosRange::days(6, 10));
    }

    #[test]
    fn test_unremarkable_procedure_adds_nothing() {
        let input = PatientInput {
            procedural: Some(ProceduralFactors {
                duration_minutes: 40,
                contrast_load_ml: 100,
                valve_type: ValveType::BalloonExpandable,
                vascular_complication: false,
            }),
            ..baseline()
        };

        let result = RiskScorer::canonical().evaluate(&input).expect("Should evaluate");

        assert_eq!(result.total_score, 0);
        assert_eq!(result.category, LosCategory::Low);
        assert_eq!(result.max_score, 30);
    }

    #[test]
    fn test_procedural_tiers() {
        let scorer = RiskScorer::canonical();
        let score_for = |duration_minutes, contrast_load_ml| {
            let input = PatientInput {
                procedural: Some(ProceduralFactors {
                    duration_minutes,
                    contrast_load_ml,
                    valve_type: ValveType::BalloonExpandable,
                    vascular_complication: false,
                }),
                ..baseline()
            };
            scorer.evaluate(&input).expect("Should evaluate").total_score
        };

        assert_eq!(score_for(60, 200), 0);
        assert_eq!(score_for(61, 201), 2);
        assert_eq!(score_for(75, 250), 2);
        assert_eq!(score_for(76, 251), 4);
    }

    #[test]
    fn test_procedural_complications_and_valve() {
        let input = PatientInput {
            procedural: Some(ProceduralFactors {
                duration_minutes: 90,
                contrast_load_ml: 300,
                valve_type: ValveType::SelfExpanding,
                vascular_complication: true,
            }),
            ..baseline()
        };

        let result = RiskScorer::canonical().evaluate(&input).expect("Should evaluate");
        assert_eq!(result.total_score, 7);
        assert_eq!(result.category, LosCategory::Intermediate);
    }

    #[test]
    fn test_care_needs_and_bmi_extremes_score() {
        let scorer = RiskScorer::canonical();

        let care = PatientInput {
            care_needs: true,
            ..baseline()
        };
        assert_eq!(scorer.evaluate(&care).expect("Should evaluate").total_score, 1);

        for bmi in [19.9, 35.0] {
            let input = PatientInput { bmi, ..baseline() };
            assert_eq!(scorer.evaluate(&input).expect("Should evaluate").total_score, 1);
        }
        for bmi in [20.0, 34.9] {
            let input = PatientInput { bmi, ..baseline() };
            assert_eq!(scorer.evaluate(&input).expect("Should evaluate").total_score, 0);
        }
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let input = PatientInput {
            clinical_frailty_score: 10,
            ..baseline()
        };

        let err = RiskScorer::canonical()
            .evaluate(&input)
            .expect_err("Should reject");
        assert_eq!(err.violations.len(), 1);
    }

    #[test]
    fn test_discharge_readiness_counts_protective_factors() {
        let scorer = RiskScorer::new(RiskModel::DischargeReadiness);

        let best = scorer.evaluate(&baseline()).expect("Should evaluate");
        assert_eq!(best.total_score, 6);
        assert_eq!(best.category, LosCategory::Low);
        assert_eq!(best.predicted_los, LosRange::exactly(3));

        let medium = PatientInput {
            age: 88,
            sex: Sex::Female,
            ..baseline()
        };
        let result = scorer.evaluate(&medium).expect("Should evaluate");
        assert_eq!(result.total_score, 4);
        assert_eq!(result.category, LosCategory::Intermediate);
        assert_eq!(result.predicted_los, LosRange::exactly(4));

        let worst = PatientInput {
            age: 88,
            sex: Sex::Female,
            anaesthesia: Anaesthesia::General,
            egfr: 20,
            conduction_disturbance: true,
            bleeding_or_vascular_complication: true,
            ..baseline()
        };
        let result = scorer.evaluate(&worst).expect("Should evaluate");
        assert_eq!(result.total_score, 0);
        assert_eq!(result.category, LosCategory::High);
        assert_eq!(result.predicted_los, LosRange::exactly(5));
    }

    #[test]
    fn test_admission_screen() {
        let scorer = RiskScorer::new(RiskModel::Admission);

        let none = scorer.evaluate(&baseline()).expect("Should evaluate");
        assert_eq!(none.total_score, 0);
        assert_eq!(none.predicted_los, LosRange::exactly(5));

        let two = PatientInput {
            sex: Sex::Female,
            egfr: 32,
            ..baseline()
        };
        let result = scorer.evaluate(&two).expect("Should evaluate");
        assert_eq!(result.total_score, 2);
        assert_eq!(result.predicted_los, LosRange::exactly(6));

        let three = PatientInput {
            comorbidities: with_comorbidities(&[
                Comorbidity::PeripheralArterialDisease,
                Comorbidity::CongestiveHeartFailure,
            ]),
            clinical_frailty_score: 3,
            ..baseline()
        };
        let result = scorer.evaluate(&three).expect("Should evaluate");
        assert_eq!(result.total_score, 3);
        assert_eq!(result.category, LosCategory::High);
        assert_eq!(result.predicted_los, LosRange::exactly(8));
    }

    fn arb_procedural() -> impl Strategy<Value = Option<ProceduralFactors>> {
        proptest::option::of(
            (1u32..=600, 0u32..=1000, any::<bool>(), any::<bool>()).prop_map(
                |(duration_minutes, contrast_load_ml, self_expanding, vascular_complication)| {
                    ProceduralFactors {
                        duration_minutes,
                        contrast_load_ml,
                        valve_type: if self_expanding {
                            ValveType::SelfExpanding
                        } else {
                            ValveType::BalloonExpandable
                        },
                        vascular_complication,
                    }
                },
            ),
        )
    }

    prop_compose! {
        fn arb_patient()(
            age in 18u32..=120,
            female in any::<bool>(),
            bmi in 15.0f64..=50.0,
            clinical_frailty_score in 1u8..=9,
            lvef in 15u32..=70,
            egfr in 0u32..=150,
            flags in proptest::collection::vec(any::<bool>(), Comorbidity::ALL.len()),
            approach in 0usize..AccessApproach::ALL.len(),
            general in any::<bool>(),
            conduction_disturbance in any::<bool>(),
            bleeding_or_vascular_complication in any::<bool>(),
            care_needs in any::<bool>(),
            procedural in arb_procedural(),
        ) -> PatientInput {
            PatientInput {
                age,
                sex: if female { Sex::Female } else { Sex::Male },
                bmi,
                clinical_frailty_score,
                lvef,
                egfr,
                comorbidities: Comorbidity::ALL
                    .iter()
                    .zip(flags)
                    .filter(|(_, set)| *set)
                    .map(|(c, _)| *c)
                    .collect(),
                access_approach: AccessApproach::ALL[approach],
                anaesthesia: if general { Anaesthesia::General } else { Anaesthesia::Local },
                conduction_disturbance,
                bleeding_or_vascular_complication,
                care_needs,
                procedural,
            }
        }
    }

    proptest! {
        #[test]
        fn prop_total_is_sum_of_fired_rules(input in arb_patient()) {
            for model in RiskModel::ALL {
                let table = model.table();
                let result = RiskScorer::new(model).evaluate(&input).expect("valid input");

                let expected: u32 = table
                    .rules
                    .iter()
                    .filter(|r| (r.applies)(&input))
                    .map(|r| r.points)
                    .sum();
                prop_assert_eq!(result.total_score, expected);

                let factor_sum: u32 = result.contributing_factors.iter().map(|f| f.points).sum();
                prop_assert_eq!(result.total_score, factor_sum);
                prop_assert!(result.total_score <= result.max_score);
            }
        }

        #[test]
        fn prop_at_most_one_tier_per_factor(input in arb_patient()) {
            for model in RiskModel::ALL {
                let result = RiskScorer::new(model).evaluate(&input).expect("valid input");
                for factor in model.table().factors() {
                    let fired = result
                        .contributing_factors
                        .iter()
                        .filter(|f| f.factor == factor)
                        .count();
                    prop_assert!(fired <= 1, "factor {} fired {} times", factor, fired);
                }
            }
        }

        #[test]
        fn prop_evaluation_is_idempotent(input in arb_patient()) {
            let scorer = RiskScorer::canonical();
            let first = scorer.evaluate(&input).expect("valid input");
            let second = scorer.evaluate(&input).expect("valid input");
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_category_is_monotone_in_score(a in 0u32..40, b in 0u32..40) {
            for model in [RiskModel::PreProcedure, RiskModel::Admission] {
                let table = model.table();
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(table.band_for(lo).category <= table.band_for(hi).category);
                prop_assert!(table.band_for(lo).los.min_days <= table.band_for(hi).los.min_days);
            }
        }
    }
}

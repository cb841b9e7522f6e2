//! Assessment service: scores patient inputs on behalf of a front-end.
//!
//! Logs the outcome of every evaluation. Raw clinical values never reach the
//! log, only the model, score and category.

use std::io::Read;

use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::domain::{
    DischargeOddsEstimate, DischargeOddsInput, InvalidInputError, PatientInput, PatientRecord,
    RiskModel, RiskScorer, ScoreResult,
};
use crate::TaviLosError;

/// Service wrapping a [`RiskScorer`] for the presentation layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssessmentService {
    scorer: RiskScorer,
}

impl AssessmentService {
    /// Create a new assessment service.
    #[must_use]
    pub fn new(scorer: RiskScorer) -> Self {
        Self { scorer }
    }

    #[must_use]
    pub fn model(&self) -> RiskModel {
        self.scorer.model()
    }

    /// Switch to another rule table.
    pub fn set_model(&mut self, model: RiskModel) {
        if model != self.scorer.model() {
            tracing::info!("Switching risk model: {} -> {}", self.scorer.model(), model);
            self.scorer = RiskScorer::new(model);
        }
    }

    /// Score one patient.
    ///
    /// # Errors
    /// Returns [`TaviLosError::InvalidInput`] if any field is out of range.
    pub fn assess(&self, input: &PatientInput) -> Result<ScoreResult, TaviLosError> {
        match self.scorer.evaluate(input) {
            Ok(result) => {
                tracing::info!(
                    "Assessment complete: model={}, score={}/{}, category={}, factors={}",
                    result.model,
                    result.total_score,
                    result.max_score,
                    result.category,
                    result.contributing_factors.len()
                );
                Ok(result)
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    /// Read one JSON patient document from `reader` and score it.
    ///
    /// Documents that parse as JSON but do not fit the patient shape (wrong
    /// types, unknown enum values, missing fields) are reported as invalid
    /// input, as are numbers outside their clinical range.
    ///
    /// # Errors
    /// Returns [`TaviLosError::InvalidInput`] for a well-formed document with
    /// bad content, [`TaviLosError::Serialization`] for malformed JSON or a
    /// failed read.
    pub fn assess_reader<R: Read>(&self, reader: R) -> Result<ScoreResult, TaviLosError> {
        let record: PatientRecord = self.read_json(reader)?;
        let input = PatientInput::try_from(record).map_err(|e| self.reject(e))?;
        self.assess(&input)
    }

    /// Read one JSON [`DischargeOddsInput`] from `reader` and estimate it.
    ///
    /// # Errors
    /// As for [`AssessmentService::assess_reader`].
    pub fn estimate_discharge_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<DischargeOddsEstimate, TaviLosError> {
        let input: DischargeOddsInput = self.read_json(reader)?;
        Ok(self.estimate_discharge(&input))
    }

    fn read_json<T: DeserializeOwned, R: Read>(&self, reader: R) -> Result<T, TaviLosError> {
        serde_json::from_reader(reader).map_err(|e| {
            if e.classify() == Category::Data {
                self.reject(InvalidInputError {
                    violations: vec![e.to_string()],
                })
            } else {
                e.into()
            }
        })
    }

    /// Logistic estimate of discharge within three days.
    #[must_use]
    pub fn estimate_discharge(&self, input: &DischargeOddsInput) -> DischargeOddsEstimate {
        let estimate = input.estimate();
        tracing::info!(
            "Discharge odds estimate: probability={:.2}, outlook={:?}",
            estimate.probability,
            estimate.outlook
        );
        estimate
    }

    fn reject(&self, e: InvalidInputError) -> TaviLosError {
        tracing::warn!(
            "Rejected assessment input: model={}, violations={}",
            self.scorer.model(),
            e.violations.len()
        );
        e.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessApproach, Anaesthesia, LosCategory, Sex};

    fn patient(age: u32) -> PatientInput {
        PatientInput {
            age,
            sex: Sex::Female,
            bmi: 24.0,
            clinical_frailty_score: 5,
            lvef: 45,
            egfr: 70,
            comorbidities: Default::default(),
            access_approach: AccessApproach::Transfemoral,
            anaesthesia: Anaesthesia::Local,
            conduction_disturbance: false,
            bleeding_or_vascular_complication: false,
            care_needs: true,
            procedural: None,
        }
    }

    #[test]
    fn test_assess_scores_with_current_model() {
        let service = AssessmentService::default();
        assert_eq!(service.model(), RiskModel::PreProcedure);

        // 1 (age) + 1 (female) + 1 (lvef) + 2 (frailty) + 1 (care needs)
        let result = service.assess(&patient(78)).expect("Should assess");
        assert_eq!(result.total_score, 6);
        assert_eq!(result.category, LosCategory::Intermediate);
    }

    #[test]
    fn test_set_model_switches_table() {
        let mut service = AssessmentService::default();
        service.set_model(RiskModel::Admission);

        // female + frailty >= 3
        let result = service.assess(&patient(78)).expect("Should assess");
        assert_eq!(result.model, RiskModel::Admission);
        assert_eq!(result.total_score, 2);
    }

    #[test]
    fn test_invalid_input_maps_to_crate_error() {
        let service = AssessmentService::default();
        let err = service.assess(&patient(12)).expect_err("Should reject");
        assert!(matches!(err, TaviLosError::InvalidInput(_)));
    }

    const VALID: &str = r#"{"age": 78, "sex": "female", "bmi": 24, "clinical_frailty_score": 5,
        "lvef": 45, "egfr": 70, "access_approach": "transfemoral", "anaesthesia": "local",
        "care_needs": true}"#;

    #[test]
    fn test_assess_reader_scores_json() {
        let service = AssessmentService::default();
        let result = service.assess_reader(VALID.as_bytes()).expect("Should assess");
        assert_eq!(result.total_score, 6);
    }

    #[test]
    fn test_assess_reader_negative_age_is_invalid_input() {
        let service = AssessmentService::default();
        let json = VALID.replace("\"age\": 78", "\"age\": -3");

        match service.assess_reader(json.as_bytes()) {
            Err(TaviLosError::InvalidInput(e)) => {
                assert_eq!(e.violations, vec!["Age -3 out of range [18, 120]".to_string()]);
            }
            other => panic!("Expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn test_assess_reader_shape_errors_are_invalid_input() {
        let service = AssessmentService::default();
        let json = VALID.replace("\"female\"", "\"unknown\"");
        assert!(matches!(
            service.assess_reader(json.as_bytes()),
            Err(TaviLosError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_assess_reader_malformed_json_is_serialization_error() {
        let service = AssessmentService::default();
        assert!(matches!(
            service.assess_reader("{\"age\": 78,".as_bytes()),
            Err(TaviLosError::Serialization(_))
        ));
    }

    #[test]
    fn test_estimate_discharge_reader_rejects_wrong_types() {
        let service = AssessmentService::default();
        assert!(matches!(
            service.estimate_discharge_reader(r#"{"complication": "yes"}"#.as_bytes()),
            Err(TaviLosError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_estimate_discharge() {
        let service = AssessmentService::default();
        let estimate = service.estimate_discharge(&DischargeOddsInput {
            complication: true,
            ..Default::default()
        });
        assert!(estimate.probability < 0.3);
    }
}

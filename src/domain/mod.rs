//! Domain layer: Core scoring types and logic.
//!
//! This module contains pure Rust types with no I/O. Inputs are validated
//! against their clinical ranges before any rule table sees them.

mod assessment;
mod logistic;
mod patient;
mod rules;
mod scorer;
mod tables;

pub use assessment::{ContributingFactor, LosCategory, LosRange, ScoreResult};
pub use logistic::{DischargeOddsEstimate, DischargeOddsInput, DischargeOutlook};
pub use patient::{
    AccessApproach, Anaesthesia, BmiCategory, Comorbidity, FrailtyStatus, InvalidInputError,
    LvefClass, PatientInput, PatientRecord, ProceduralFactors, ProceduralRecord, Sex, ValveType,
};
pub use rules::{LosBand, PointRule, RiskModel, RuleTable};
pub use scorer::RiskScorer;

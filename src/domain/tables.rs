//! The shipped point tables.

use super::assessment::{LosCategory, LosRange};
use super::patient::{Anaesthesia, Comorbidity, PatientInput, ProceduralFactors, Sex, ValveType};
use super::rules::{LosBand, PointRule, RiskModel, RuleTable};

/// eGFR below this marks renal dysfunction in the short screens.
const EGFR_RENAL_DYSFUNCTION: u32 = 33;

fn procedural(input: &PatientInput) -> Option<&ProceduralFactors> {
    input.procedural.as_ref()
}

const fn rule(
    factor: &'static str,
    label: &'static str,
    points: u32,
    applies: fn(&PatientInput) -> bool,
) -> PointRule {
    PointRule {
        factor,
        label,
        points,
        procedural: false,
        applies,
    }
}

const fn procedural_rule(
    factor: &'static str,
    label: &'static str,
    points: u32,
    applies: fn(&PatientInput) -> bool,
) -> PointRule {
    PointRule {
        factor,
        label,
        points,
        procedural: true,
        applies,
    }
}

/// Weighted pre-procedure score. Care needs count as a score point.
const PRE_PROCEDURE_RULES: &[PointRule] = &[
    rule("age", "Age >= 85", 2, |p| p.age >= 85),
    rule("age", "Age 75-84", 1, |p| (75..85).contains(&p.age)),
    rule("sex", "Female sex", 1, |p| p.sex == Sex::Female),
    rule("bmi", "BMI < 20 or >= 35", 1, |p| p.bmi < 20.0 || p.bmi >= 35.0),
    rule("diabetes", "Diabetes", 1, |p| p.has(Comorbidity::Diabetes)),
    rule("ckd", "Chronic kidney disease", 2, |p| {
        p.has(Comorbidity::ChronicKidneyDisease)
    }),
    rule("copd", "COPD", 1, |p| p.has(Comorbidity::Copd)),
    rule("af", "Atrial fibrillation", 1, |p| {
        p.has(Comorbidity::AtrialFibrillation)
    }),
    rule("lbbb", "Left bundle branch block", 1, |p| {
        p.has(Comorbidity::LeftBundleBranchBlock)
    }),
    rule("rbbb", "Right bundle branch block", 1, |p| {
        p.has(Comorbidity::RightBundleBranchBlock)
    }),
    rule("prior_cabg", "Prior CABG", 1, |p| p.has(Comorbidity::PriorCabg)),
    rule("prior_pci", "Prior PCI", 1, |p| p.has(Comorbidity::PriorPci)),
    rule("prior_stroke", "Previous stroke/TIA", 1, |p| {
        p.has(Comorbidity::PriorStroke)
    }),
    rule("pulmonary_hypertension", "Pulmonary hypertension", 1, |p| {
        p.has(Comorbidity::PulmonaryHypertension)
    }),
    rule("lvef", "LVEF < 40%", 2, |p| p.lvef < 40),
    rule("lvef", "LVEF 40-49%", 1, |p| (40..50).contains(&p.lvef)),
    rule("frailty", "Clinical frailty 7-9", 3, |p| p.clinical_frailty_score >= 7),
    rule("frailty", "Clinical frailty 5-6", 2, |p| {
        (5..=6).contains(&p.clinical_frailty_score)
    }),
    rule("frailty", "Clinical frailty 4", 1, |p| p.clinical_frailty_score == 4),
    rule("access", "Non-transfemoral access", 2, |p| {
        !p.access_approach.is_transfemoral()
    }),
    rule("care_needs", "New or existing care needs", 1, |p| p.care_needs),
    procedural_rule("duration", "Procedure > 75 min", 2, |p| {
        procedural(p).is_some_and(|f| f.duration_minutes > 75)
    }),
    procedural_rule("duration", "Procedure 61-75 min", 1, |p| {
        procedural(p).is_some_and(|f| (61..=75).contains(&f.duration_minutes))
    }),
    procedural_rule("contrast", "Contrast > 250 mL", 2, |p| {
        procedural(p).is_some_and(|f| f.contrast_load_ml > 250)
    }),
    procedural_rule("contrast", "Contrast 201-250 mL", 1, |p| {
        procedural(p).is_some_and(|f| (201..=250).contains(&f.contrast_load_ml))
    }),
    procedural_rule("vascular_complication", "Vascular complication", 2, |p| {
        procedural(p).is_some_and(|f| f.vascular_complication)
    }),
    procedural_rule("valve_type", "Self-expanding valve", 1, |p| {
        procedural(p).is_some_and(|f| f.valve_type == ValveType::SelfExpanding)
    }),
];

const PRE_PROCEDURE_BANDS: &[LosBand] = &[
    LosBand {
        min_score: 0,
        category: LosCategory::Low,
        los: LosRange::days(0, 1),
    },
    LosBand {
        min_score: 5,
        category: LosCategory::Intermediate,
        los: LosRange::days(1, 2),
    },
    LosBand {
        min_score: 9,
        category: LosCategory::High,
        los: LosRange::days(3, 5),
    },
    LosBand {
        min_score: 13,
        category: LosCategory::VeryHigh,
        los: LosRange::days(6, 10),
    },
];

pub static PRE_PROCEDURE: RuleTable =
    RuleTable::new(RiskModel::PreProcedure, PRE_PROCEDURE_RULES, PRE_PROCEDURE_BANDS);

/// Protective-factor count. More factors, shorter stay.
const DISCHARGE_READINESS_RULES: &[PointRule] = &[
    rule("age", "Age < 85", 1, |p| p.age < 85),
    rule("sex", "Male sex", 1, |p| p.sex == Sex::Male),
    rule("anaesthesia", "Local anaesthesia", 1, |p| {
        p.anaesthesia == Anaesthesia::Local
    }),
    rule("renal", "eGFR >= 33", 1, |p| p.egfr >= EGFR_RENAL_DYSFUNCTION),
    rule("conduction", "No new conduction disturbance", 1, |p| {
        !p.conduction_disturbance
    }),
    rule("bleeding", "No bleeding or vascular complication", 1, |p| {
        !p.bleeding_or_vascular_complication
    }),
];

const DISCHARGE_READINESS_BANDS: &[LosBand] = &[
    LosBand {
        min_score: 0,
        category: LosCategory::High,
        los: LosRange::exactly(5),
    },
    LosBand {
        min_score: 3,
        category: LosCategory::Intermediate,
        los: LosRange::exactly(4),
    },
    LosBand {
        min_score: 5,
        category: LosCategory::Low,
        los: LosRange::exactly(3),
    },
];

pub static DISCHARGE_READINESS: RuleTable =
    RuleTable::new(RiskModel::DischargeReadiness, DISCHARGE_READINESS_RULES, DISCHARGE_READINESS_BANDS);

const ADMISSION_RULES: &[PointRule] = &[
    rule("sex", "Female sex", 1, |p| p.sex == Sex::Female),
    rule("pad", "Peripheral arterial disease", 1, |p| {
        p.has(Comorbidity::PeripheralArterialDisease)
    }),
    rule("chf", "Congestive heart failure on admission", 1, |p| {
        p.has(Comorbidity::CongestiveHeartFailure)
    }),
    rule("af", "Atrial fibrillation", 1, |p| {
        p.has(Comorbidity::AtrialFibrillation)
    }),
    rule("renal", "eGFR < 33", 1, |p| p.egfr < EGFR_RENAL_DYSFUNCTION),
    rule("frailty", "Clinical frailty >= 3", 1, |p| p.clinical_frailty_score >= 3),
];

const ADMISSION_BANDS: &[LosBand] = &[
    LosBand {
        min_score: 0,
        category: LosCategory::Low,
        los: LosRange::exactly(5),
    },
    LosBand {
        min_score: 1,
        category: LosCategory::Intermediate,
        los: LosRange::exactly(6),
    },
    LosBand {
        min_score: 3,
        category: LosCategory::High,
        los: LosRange::exactly(8),
    },
];

pub static ADMISSION: RuleTable =
    RuleTable::new(RiskModel::Admission, ADMISSION_RULES, ADMISSION_BANDS);

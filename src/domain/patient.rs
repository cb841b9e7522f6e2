//! Patient and procedural inputs for length-of-stay scoring.
//!
//! Every field is independent; the only invariants are the per-field
//! clinical ranges enforced by [`PatientInput::validate`].
//!
//! JSON arrives as a [`PatientRecord`], whose numbers are unconstrained `f64`s,
//! so a negative age or a fractional frailty score is reported as a range
//! violation rather than a parse failure.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Biological sex as recorded on admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Comorbidities captured on the assessment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comorbidity {
    Diabetes,
    ChronicKidneyDisease,
    Copd,
    AtrialFibrillation,
    LeftBundleBranchBlock,
    RightBundleBranchBlock,
    PriorCabg,
    PriorPci,
    PriorStroke,
    PulmonaryHypertension,
    PeripheralArterialDisease,
    CongestiveHeartFailure,
}

impl Comorbidity {
    /// All comorbidities in form order.
    pub const ALL: [Comorbidity; 12] = [
        Self::Diabetes,
        Self::ChronicKidneyDisease,
        Self::Copd,
        Self::AtrialFibrillation,
        Self::LeftBundleBranchBlock,
        Self::RightBundleBranchBlock,
        Self::PriorCabg,
        Self::PriorPci,
        Self::PriorStroke,
        Self::PulmonaryHypertension,
        Self::PeripheralArterialDisease,
        Self::CongestiveHeartFailure,
    ];

    /// Form label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Diabetes => "Diabetes mellitus",
            Self::ChronicKidneyDisease => "Chronic kidney disease (stage 3-5)",
            Self::Copd => "COPD / chronic lung disease",
            Self::AtrialFibrillation => "Atrial fibrillation",
            Self::LeftBundleBranchBlock => "Left bundle branch block",
            Self::RightBundleBranchBlock => "Right bundle branch block",
            Self::PriorCabg => "Prior CABG",
            Self::PriorPci => "Prior PCI",
            Self::PriorStroke => "Previous stroke/TIA",
            Self::PulmonaryHypertension => "Pulmonary hypertension",
            Self::PeripheralArterialDisease => "Peripheral arterial disease",
            Self::CongestiveHeartFailure => "Congestive heart failure on admission",
        }
    }
}

/// Planned TAVI access route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessApproach {
    Transfemoral,
    Transapical,
    SubclavianAxillary,
    Other,
}

impl AccessApproach {
    pub const ALL: [AccessApproach; 4] = [
        Self::Transfemoral,
        Self::Transapical,
        Self::SubclavianAxillary,
        Self::Other,
    ];

    #[must_use]
    pub fn is_transfemoral(&self) -> bool {
        matches!(self, Self::Transfemoral)
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transfemoral => "Transfemoral",
            Self::Transapical => "Transapical",
            Self::SubclavianAxillary => "Subclavian/Axillary",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anaesthesia {
    Local,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValveType {
    BalloonExpandable,
    SelfExpanding,
}

/// Intra-procedural measurements, only present when procedural factors are
/// included in the assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProceduralFactors {
    /// Procedure duration in minutes (1-600)
    pub duration_minutes: u32,

    /// Contrast volume in mL (0-1000)
    pub contrast_load_ml: u32,

    pub valve_type: ValveType,

    /// Vascular access-site complication during the procedure
    pub vascular_complication: bool,
}

/// Structured input record for a single scoring request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PatientRecord")]
pub struct PatientInput {
    /// Age in years (18-120)
    pub age: u32,

    pub sex: Sex,

    /// Body mass index in kg/m² (15-50)
    pub bmi: f64,

    /// Clinical Frailty Scale (1-9)
    pub clinical_frailty_score: u8,

    /// Left-ventricular ejection fraction in % (15-70)
    pub lvef: u32,

    /// eGFR in mL/min/1.73 m² (0-150)
    pub egfr: u32,

    #[serde(default)]
    pub comorbidities: BTreeSet<Comorbidity>,

    pub access_approach: AccessApproach,

    pub anaesthesia: Anaesthesia,

    /// New conduction disturbance or pacemaker requirement
    #[serde(default)]
    pub conduction_disturbance: bool,

    #[serde(default)]
    pub bleeding_or_vascular_complication: bool,

    /// Newly identified care needs or an existing care package
    #[serde(default)]
    pub care_needs: bool,

    #[serde(default)]
    pub procedural: Option<ProceduralFactors>,
}

/// Rejected input: one entry per field outside its documented domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid patient input: {}", .violations.join("; "))]
pub struct InvalidInputError {
    pub violations: Vec<String>,
}

impl PatientInput {
    #[must_use]
    pub fn has(&self, comorbidity: Comorbidity) -> bool {
        self.comorbidities.contains(&comorbidity)
    }

    /// Check every field against its clinical range.
    ///
    /// # Errors
    /// Returns all violations at once, never a partial list.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        let mut violations = Vec::new();

        AGE.check(self.age, &mut violations);
        check_bmi(self.bmi, &mut violations);
        FRAILTY.check(u32::from(self.clinical_frailty_score), &mut violations);
        LVEF.check(self.lvef, &mut violations);
        EGFR.check(self.egfr, &mut violations);

        if let Some(procedural) = &self.procedural {
            DURATION.check(procedural.duration_minutes, &mut violations);
            CONTRAST.check(procedural.contrast_load_ml, &mut violations);
        }

        InvalidInputError::from_violations(violations)
    }

    #[must_use]
    pub fn bmi_category(&self) -> BmiCategory {
        BmiCategory::from_bmi(self.bmi)
    }

    #[must_use]
    pub fn frailty_status(&self) -> FrailtyStatus {
        FrailtyStatus::from_score(self.clinical_frailty_score)
    }

    #[must_use]
    pub fn lvef_class(&self) -> LvefClass {
        LvefClass::from_lvef(self.lvef)
    }
}

impl InvalidInputError {
    fn from_violations(violations: Vec<String>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }
}

/// Inclusive range for a whole-number field.
struct Bounds {
    name: &'static str,
    min: u32,
    max: u32,
}

const AGE: Bounds = Bounds { name: "Age", min: 18, max: 120 };
const FRAILTY: Bounds = Bounds { name: "Clinical frailty score", min: 1, max: 9 };
const LVEF: Bounds = Bounds { name: "LVEF", min: 15, max: 70 };
const EGFR: Bounds = Bounds { name: "eGFR", min: 0, max: 150 };
const DURATION: Bounds = Bounds { name: "Procedure duration", min: 1, max: 600 };
const CONTRAST: Bounds = Bounds { name: "Contrast load", min: 0, max: 1000 };

const BMI_MIN: f64 = 15.0;
const BMI_MAX: f64 = 50.0;

impl Bounds {
    fn out_of_range(&self, value: impl std::fmt::Display) -> String {
        format!("{} {} out of range [{}, {}]", self.name, value, self.min, self.max)
    }

    fn check(&self, value: u32, violations: &mut Vec<String>) {
        if !(self.min..=self.max).contains(&value) {
            violations.push(self.out_of_range(value));
        }
    }

    /// Narrow a wire number. Out-of-domain values record a violation and
    /// yield the lower bound, which is never used once a violation exists.
    fn narrow(&self, value: f64, violations: &mut Vec<String>) -> u32 {
        if !value.is_finite() || value.fract() != 0.0 {
            violations.push(format!("{} {} must be a whole number", self.name, value));
            return self.min;
        }
        if value < f64::from(self.min) || value > f64::from(self.max) {
            violations.push(self.out_of_range(value));
            return self.min;
        }
        value as u32
    }
}

fn check_bmi(bmi: f64, violations: &mut Vec<String>) {
    if !bmi.is_finite() || !(BMI_MIN..=BMI_MAX).contains(&bmi) {
        violations.push(format!("BMI {bmi} out of range [15, 50]"));
    }
}

/// WHO adult BMI class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }
}

/// Clinical Frailty Scale grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrailtyStatus {
    /// CFS 1-3
    Fit,
    /// CFS 4-6
    MildlyFrail,
    /// CFS 7-9
    SeverelyFrail,
}

impl FrailtyStatus {
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=3 => Self::Fit,
            4..=6 => Self::MildlyFrail,
            _ => Self::SeverelyFrail,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fit => "Fit",
            Self::MildlyFrail => "Vulnerable to mildly frail",
            Self::SeverelyFrail => "Severely frail",
        }
    }
}

/// Ejection-fraction class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LvefClass {
    /// Below 40%
    Reduced,
    /// 40-49%
    MildlyReduced,
    Normal,
}

impl LvefClass {
    #[must_use]
    pub fn from_lvef(lvef: u32) -> Self {
        match lvef {
            0..=39 => Self::Reduced,
            40..=49 => Self::MildlyReduced,
            _ => Self::Normal,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Reduced => "Reduced",
            Self::MildlyReduced => "Mildly reduced",
            Self::Normal => "Normal",
        }
    }
}

/// Wire form of [`ProceduralFactors`].
#[derive(Debug, Clone, Deserialize)]
pub struct ProceduralRecord {
    pub duration_minutes: f64,
    pub contrast_load_ml: f64,
    pub valve_type: ValveType,
    #[serde(default)]
    pub vascular_complication: bool,
}

/// Wire form of [`PatientInput`] with unconstrained numbers.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientRecord {
    pub age: f64,
    pub sex: Sex,
    pub bmi: f64,
    pub clinical_frailty_score: f64,
    pub lvef: f64,
    pub egfr: f64,
    #[serde(default)]
    pub comorbidities: BTreeSet<Comorbidity>,
    pub access_approach: AccessApproach,
    pub anaesthesia: Anaesthesia,
    #[serde(default)]
    pub conduction_disturbance: bool,
    #[serde(default)]
    pub bleeding_or_vascular_complication: bool,
    #[serde(default)]
    pub care_needs: bool,
    #[serde(default)]
    pub procedural: Option<ProceduralRecord>,
}

impl TryFrom<PatientRecord> for PatientInput {
    type Error = InvalidInputError;

    fn try_from(record: PatientRecord) -> Result<Self, Self::Error> {
        let mut violations = Vec::new();

        let age = AGE.narrow(record.age, &mut violations);
        check_bmi(record.bmi, &mut violations);
        let frailty = FRAILTY.narrow(record.clinical_frailty_score, &mut violations);
        let lvef = LVEF.narrow(record.lvef, &mut violations);
        let egfr = EGFR.narrow(record.egfr, &mut violations);

        let procedural = record.procedural.map(|p| ProceduralFactors {
            duration_minutes: DURATION.narrow(p.duration_minutes, &mut violations),
            contrast_load_ml: CONTRAST.narrow(p.contrast_load_ml, &mut violations),
            valve_type: p.valve_type,
            vascular_complication: p.vascular_complication,
        });

        InvalidInputError::from_violations(violations)?;

        Ok(Self {
            age,
            sex: record.sex,
            bmi: record.bmi,
            // At most 9 after narrowing
            clinical_frailty_score: frailty as u8,
            lvef,
            egfr,
            comorbidities: record.comorbidities,
            access_approach: record.access_approach,
            anaesthesia: record.anaesthesia,
            conduction_disturbance: record.conduction_disturbance,
            bleeding_or_vascular_complication: record.bleeding_or_vascular_complication,
            care_needs: record.care_needs,
            procedural,
        })
    }
}

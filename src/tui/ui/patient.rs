//! Patient assessment form.

use std::collections::BTreeSet;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    AccessApproach, Anaesthesia, BmiCategory, Comorbidity, FrailtyStatus, LvefClass, PatientInput,
    ProceduralFactors, RiskModel, Sex, ValveType,
};
use crate::tui::styles::ClinicalTheme;

const SEX_OPTIONS: &[&str] = &["Male", "Female"];
const APPROACH_OPTIONS: &[&str] = &["Transfemoral", "Transapical", "Subclavian/Axillary", "Other"];
const ANAESTHESIA_OPTIONS: &[&str] = &["Local", "General"];
const VALVE_OPTIONS: &[&str] = &["Balloon-expandable", "Self-expanding"];

/// Which input a form field feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    Age,
    Sex,
    Bmi,
    Frailty,
    Lvef,
    Egfr,
    Comorbidity(Comorbidity),
    Approach,
    Anaesthesia,
    Conduction,
    Bleeding,
    CareNeeds,
    Duration,
    Contrast,
    Valve,
    VascularComplication,
}

impl FieldId {
    fn is_procedural(&self) -> bool {
        matches!(
            self,
            Self::Duration | Self::Contrast | Self::Valve | Self::VascularComplication
        )
    }
}

#[derive(Debug, Clone)]
pub enum FieldValue {
    Number {
        text: String,
        hint: &'static str,
        min: f64,
        max: f64,
        integer: bool,
    },
    Toggle(bool),
    Choice {
        options: &'static [&'static str],
        selected: usize,
    },
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub id: FieldId,
    pub label: &'static str,
    pub value: FieldValue,
}

impl FormField {
    fn number(id: FieldId, label: &'static str, hint: &'static str, min: f64, max: f64) -> Self {
        Self {
            id,
            label,
            value: FieldValue::Number {
                text: String::new(),
                hint,
                min,
                max,
                integer: true,
            },
        }
    }

    fn real(id: FieldId, label: &'static str, hint: &'static str, min: f64, max: f64) -> Self {
        let mut field = Self::number(id, label, hint, min, max);
        if let FieldValue::Number { integer, .. } = &mut field.value {
            *integer = false;
        }
        field
    }

    fn toggle(id: FieldId, label: &'static str) -> Self {
        Self {
            id,
            label,
            value: FieldValue::Toggle(false),
        }
    }

    fn choice(id: FieldId, label: &'static str, options: &'static [&'static str]) -> Self {
        Self {
            id,
            label,
            value: FieldValue::Choice {
                options,
                selected: 0,
            },
        }
    }

    /// Clinical class of the entered value, for BMI, frailty and LVEF.
    fn classification(&self) -> Option<&'static str> {
        let FieldValue::Number { text, min, max, .. } = &self.value else {
            return None;
        };
        let value: f64 = text.parse().ok().filter(|v| (*min..=*max).contains(v))?;

        match self.id {
            FieldId::Bmi => Some(BmiCategory::from_bmi(value).label()),
            FieldId::Frailty if value.fract() == 0.0 => {
                Some(FrailtyStatus::from_score(value as u8).label())
            }
            FieldId::Lvef if value.fract() == 0.0 => Some(LvefClass::from_lvef(value as u32).label()),
            _ => None,
        }
    }

    fn display(&self) -> (String, bool) {
        match &self.value {
            FieldValue::Number { text, hint, .. } if text.is_empty() => (hint.to_string(), false),
            FieldValue::Number { text, .. } => (text.clone(), true),
            FieldValue::Toggle(on) => (if *on { "[x] yes" } else { "[ ] no" }.to_string(), true),
            FieldValue::Choice { options, selected } => {
                (format!("< {} >", options[*selected]), true)
            }
        }
    }
}

/// Assessment form state.
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    /// Index into the visible fields
    pub selected_field: usize,
    pub include_procedural: bool,
    pub error_message: Option<String>,
}

impl PatientFormState {
    #[must_use]
    pub fn new(include_procedural: bool) -> Self {
        let mut fields = vec![
            FormField::number(FieldId::Age, "Age", "years (18-120)", 18.0, 120.0),
            FormField::choice(FieldId::Sex, "Sex", SEX_OPTIONS),
            FormField::real(FieldId::Bmi, "BMI", "kg/m² (15-50)", 15.0, 50.0),
            FormField::number(FieldId::Frailty, "Clinical Frailty Scale", "1-9", 1.0, 9.0),
            FormField::number(FieldId::Lvef, "LVEF", "% (15-70)", 15.0, 70.0),
            FormField::number(FieldId::Egfr, "eGFR", "mL/min/1.73 m² (0-150)", 0.0, 150.0),
        ];
        fields.extend(
            Comorbidity::ALL
                .iter()
                .map(|c| FormField::toggle(FieldId::Comorbidity(*c), c.label())),
        );
        fields.extend([
            FormField::choice(FieldId::Approach, "Planned approach", APPROACH_OPTIONS),
            FormField::choice(FieldId::Anaesthesia, "Anaesthesia", ANAESTHESIA_OPTIONS),
            FormField::toggle(FieldId::Conduction, "New conduction disturbance"),
            FormField::toggle(FieldId::Bleeding, "Bleeding or vascular complication"),
            FormField::toggle(FieldId::CareNeeds, "New or existing care needs"),
            FormField::number(FieldId::Duration, "Procedure duration", "minutes (1-600)", 1.0, 600.0),
            FormField::number(FieldId::Contrast, "Contrast load", "mL (0-1000)", 0.0, 1000.0),
            FormField::choice(FieldId::Valve, "Valve type", VALVE_OPTIONS),
            FormField::toggle(FieldId::VascularComplication, "Procedural vascular complication"),
        ]);

        Self {
            fields,
            selected_field: 0,
            include_procedural,
            error_message: None,
        }
    }

    fn visible(&self) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| self.include_procedural || !f.id.is_procedural())
            .map(|(i, _)| i)
            .collect()
    }

    fn current_mut(&mut self) -> Option<&mut FormField> {
        let idx = *self.visible().get(self.selected_field)?;
        self.fields.get_mut(idx)
    }

    fn field(&self, id: FieldId) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    fn field_mut(&mut self, id: FieldId) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    pub fn next_field(&mut self) {
        let count = self.visible().len();
        self.selected_field = (self.selected_field + 1) % count;
    }

    pub fn prev_field(&mut self) {
        let count = self.visible().len();
        self.selected_field = (self.selected_field + count - 1) % count;
    }

    /// Show or hide the procedural block.
    pub fn toggle_procedural(&mut self) {
        self.include_procedural = !self.include_procedural;
        let count = self.visible().len();
        self.selected_field = self.selected_field.min(count - 1);
        self.error_message = None;
    }

    /// Type into the current numeric field
    pub fn input_char(&mut self, c: char) {
        if let Some(FormField {
            value: FieldValue::Number { text, integer, .. },
            ..
        }) = self.current_mut()
        {
            if c.is_ascii_digit() || (c == '.' && !*integer && !text.contains('.')) {
                text.push(c);
                self.error_message = None;
            }
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(FormField {
            value: FieldValue::Number { text, .. },
            ..
        }) = self.current_mut()
        {
            text.pop();
        }
    }

    pub fn clear_field(&mut self) {
        if let Some(FormField {
            value: FieldValue::Number { text, .. },
            ..
        }) = self.current_mut()
        {
            text.clear();
        }
    }

    /// Flip a toggle or step a choice forward (`forward`) or back.
    pub fn cycle(&mut self, forward: bool) {
        match self.current_mut().map(|f| &mut f.value) {
            Some(FieldValue::Toggle(on)) => *on = !*on,
            Some(FieldValue::Choice { options, selected }) => {
                let n = options.len();
                *selected = if forward { (*selected + 1) % n } else { (*selected + n - 1) % n };
            }
            _ => {}
        }
    }

    /// Wipe all entered values.
    ///
    /// Called once an assessment is scored so inputs do not linger in UI state.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            match &mut field.value {
                FieldValue::Number { text, .. } => text.zeroize(),
                FieldValue::Toggle(on) => *on = false,
                FieldValue::Choice { selected, .. } => *selected = 0,
            }
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    fn number(&self, id: FieldId) -> Result<f64, String> {
        let Some(FormField {
            label,
            value:
                FieldValue::Number {
                    text,
                    min,
                    max,
                    integer,
                    ..
                },
            ..
        }) = self.field(id)
        else {
            return Err(format!("Missing field {id:?}"));
        };

        let value: f64 = text
            .parse()
            .map_err(|_| format!("{label}: Invalid number"))?;
        if *integer && value.fract() != 0.0 {
            return Err(format!("{label}: Must be a whole number"));
        }
        if value < *min || value > *max {
            return Err(format!("{label}: Value must be between {min} and {max}"));
        }
        Ok(value)
    }

    fn whole(&self, id: FieldId) -> Result<u32, String> {
        self.number(id).map(|v| v as u32)
    }

    fn toggled(&self, id: FieldId) -> bool {
        matches!(self.field(id).map(|f| &f.value), Some(FieldValue::Toggle(true)))
    }

    fn choice(&self, id: FieldId) -> usize {
        match self.field(id).map(|f| &f.value) {
            Some(FieldValue::Choice { selected, .. }) => *selected,
            _ => 0,
        }
    }

    /// Validate and convert to a `PatientInput`
    pub fn to_patient_input(&self) -> Result<PatientInput, String> {
        let comorbidities: BTreeSet<Comorbidity> = Comorbidity::ALL
            .iter()
            .copied()
            .filter(|c| self.toggled(FieldId::Comorbidity(*c)))
            .collect();

        let procedural = if self.include_procedural {
            Some(ProceduralFactors {
                duration_minutes: self.whole(FieldId::Duration)?,
                contrast_load_ml: self.whole(FieldId::Contrast)?,
                valve_type: if self.choice(FieldId::Valve) == 1 {
                    ValveType::SelfExpanding
                } else {
                    ValveType::BalloonExpandable
                },
                vascular_complication: self.toggled(FieldId::VascularComplication),
            })
        } else {
            None
        };

        Ok(PatientInput {
            age: self.whole(FieldId::Age)?,
            sex: if self.choice(FieldId::Sex) == 1 {
                Sex::Female
            } else {
                Sex::Male
            },
            bmi: self.number(FieldId::Bmi)?,
            clinical_frailty_score: self.whole(FieldId::Frailty)? as u8,
            lvef: self.whole(FieldId::Lvef)?,
            egfr: self.whole(FieldId::Egfr)?,
            comorbidities,
            access_approach: AccessApproach::ALL
                .get(self.choice(FieldId::Approach))
                .copied()
                .unwrap_or(AccessApproach::Transfemoral),
            anaesthesia: if self.choice(FieldId::Anaesthesia) == 1 {
                Anaesthesia::General
            } else {
                Anaesthesia::Local
            },
            conduction_disturbance: self.toggled(FieldId::Conduction),
            bleeding_or_vascular_complication: self.toggled(FieldId::Bleeding),
            care_needs: self.toggled(FieldId::CareNeeds),
            procedural,
        })
    }

    /// Load sample data for demonstration (typical elective TAVI patient)
    pub fn load_sample_data(&mut self) {
        let numbers = [
            (FieldId::Age, "82"),
            (FieldId::Bmi, "27.5"),
            (FieldId::Frailty, "4"),
            (FieldId::Lvef, "55"),
            (FieldId::Egfr, "48"),
            (FieldId::Duration, "70"),
            (FieldId::Contrast, "180"),
        ];
        for (id, sample) in numbers {
            if let Some(FormField {
                value: FieldValue::Number { text, .. },
                ..
            }) = self.field_mut(id)
            {
                *text = sample.to_string();
            }
        }

        if let Some(FormField {
            value: FieldValue::Choice { selected, .. },
            ..
        }) = self.field_mut(FieldId::Sex)
        {
            *selected = 1;
        }
        if let Some(FormField {
            value: FieldValue::Toggle(on),
            ..
        }) = self.field_mut(FieldId::Comorbidity(Comorbidity::Diabetes))
        {
            *on = true;
        }
        self.error_message = None;
    }
}

impl Default for PatientFormState {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Render the assessment form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState, model: RiskModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0], state, model);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect, state: &PatientFormState, model: RiskModel) {
    let procedural = if state.include_procedural {
        "procedural factors included"
    } else {
        "pre-procedural factors only"
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicalTheme::text()),
        Span::styled("Patient Assessment", ClinicalTheme::title()),
        Span::styled(format!(" │ {} │ {procedural}", model.title()), ClinicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let visible = state.visible();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (visible.len() + 1) / 2;
    render_field_column(f, columns[0], state, &visible[..mid], 0);
    render_field_column(f, columns[1], state, &visible[mid..], mid);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    state: &PatientFormState,
    indices: &[usize],
    offset: usize,
) {
    let lines: Vec<Line> = indices
        .iter()
        .enumerate()
        .map(|(i, &idx)| {
            let field = &state.fields[idx];
            let is_selected = offset + i == state.selected_field;
            let (value, filled) = field.display();

            let label_style = if is_selected {
                ClinicalTheme::focused()
            } else {
                ClinicalTheme::text_secondary()
            };
            let value_style = if filled {
                ClinicalTheme::text()
            } else {
                ClinicalTheme::text_muted()
            };

            let mut spans = vec![
                Span::styled(if is_selected { "▌ " } else { "  " }, ClinicalTheme::focused()),
                Span::styled(format!("{:<38}", field.label), label_style),
                Span::styled(value, value_style),
            ];
            if let Some(class) = field.classification() {
                spans.push(Span::styled(format!("  ({class})"), ClinicalTheme::text_muted()));
            }
            Line::from(spans)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border());
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", ClinicalTheme::danger()),
            Span::styled(err.clone(), ClinicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", ClinicalTheme::key_hint()),
            Span::styled("Navigate ", ClinicalTheme::key_desc()),
            Span::styled("[Space/←→] ", ClinicalTheme::key_hint()),
            Span::styled("Toggle ", ClinicalTheme::key_desc()),
            Span::styled("[P] ", ClinicalTheme::key_hint()),
            Span::styled("Procedural ", ClinicalTheme::key_desc()),
            Span::styled("[S] ", ClinicalTheme::key_hint()),
            Span::styled("Sample ", ClinicalTheme::key_desc()),
            Span::styled("[Enter] ", ClinicalTheme::key_hint()),
            Span::styled("Calculate ", ClinicalTheme::key_desc()),
            Span::styled("[Esc] ", ClinicalTheme::key_hint()),
            Span::styled("Cancel", ClinicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(footer, area);
}

//! Overview screen: model selection and session tally.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{LosCategory, RiskModel};
use crate::tui::styles::ClinicalTheme;

/// Per-category counts for assessments scored in this process.
///
/// Nothing identifying is kept, only the category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTally {
    counts: [u32; 4],
}

impl SessionTally {
    pub fn record(&mut self, category: LosCategory) {
        self.counts[category as usize] += 1;
    }

    #[must_use]
    pub fn count(&self, category: LosCategory) -> u32 {
        self.counts[category as usize]
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

pub struct OverviewState {
    pub model: RiskModel,
    pub include_procedural: bool,
    pub gate_enabled: bool,
    /// Minutes left on the session, when the gate is enabled
    pub session_minutes_left: Option<i64>,
    pub tally: SessionTally,
}

/// Render the overview screen.
pub fn render_overview(f: &mut Frame, area: Rect, state: &OverviewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    render_status_panels(f, body[0], state);
    render_tally(f, body[1], &state.tally);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicalTheme::text()),
        Span::styled("TAVI LOS", ClinicalTheme::title()),
        Span::styled(" │ ", ClinicalTheme::text_muted()),
        Span::styled(
            "Length-of-Stay Risk after Transcatheter Aortic Valve Implantation",
            ClinicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_status_panels(f: &mut Frame, area: Rect, state: &OverviewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Configuration
            Constraint::Min(0),    // Quick actions
        ])
        .margin(1)
        .split(area);

    let session = match (state.gate_enabled, state.session_minutes_left) {
        (false, _) => "gate disabled".to_string(),
        (true, Some(minutes)) => format!("{minutes} min left"),
        (true, None) => "locked".to_string(),
    };

    let status_items = vec![
        status_line("Model", state.model.title().to_string()),
        status_line(
            "Procedural",
            if state.include_procedural { "included" } else { "excluded" }.to_string(),
        ),
        status_line("Session", session),
    ];

    let status_block = Block::default()
        .title(Span::styled(" Configuration ", ClinicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border());
    f.render_widget(Paragraph::new(status_items).block(status_block), chunks[0]);

    let mut actions = vec![
        action_line("[N] ", "New Assessment"),
        action_line("[M] ", "Cycle Model"),
        action_line("[P] ", "Toggle Procedural Factors"),
        action_line("[D] ", "Disclaimer"),
    ];
    if state.gate_enabled {
        actions.push(action_line("[L] ", "Lock"));
    }
    actions.push(action_line("[Q] ", "Quit"));

    let actions_block = Block::default()
        .title(Span::styled(" Quick Actions ", ClinicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border());
    f.render_widget(Paragraph::new(actions).block(actions_block), chunks[1]);
}

fn status_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label}: "), ClinicalTheme::text_secondary()),
        Span::styled(value, ClinicalTheme::text()),
    ])
}

fn action_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(key, ClinicalTheme::key_hint()),
        Span::styled(desc, ClinicalTheme::key_desc()),
    ])
}

fn render_tally(f: &mut Frame, area: Rect, tally: &SessionTally) {
    let block = Block::default()
        .title(Span::styled(" This Session ", ClinicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border());

    if tally.total() == 0 {
        let empty_msg = Paragraph::new(Line::from(Span::styled(
            "No assessments yet. Press [N] to start.",
            ClinicalTheme::text_muted(),
        )))
        .block(block);
        f.render_widget(empty_msg, area);
        return;
    }

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Assessed: ", ClinicalTheme::text_secondary()),
            Span::styled(tally.total().to_string(), ClinicalTheme::text()),
        ]),
        Line::from(""),
    ];
    lines.extend(LosCategory::ALL.iter().map(|&category| {
        Line::from(vec![
            Span::styled(format!("{:<14}", category.to_string()), ClinicalTheme::category(category)),
            Span::styled(tally.count(category).to_string(), ClinicalTheme::text()),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Counts are held in memory only and cleared on exit.",
        ClinicalTheme::text_muted(),
    )));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

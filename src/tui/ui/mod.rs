//! UI module: View components for the TUI.

pub mod access;
pub mod overview;
pub mod patient;
pub mod result;

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::ClinicalTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            "DISCLAIMER: Early-stage decision support. Scores are indicative and do not replace clinical judgment.",
            ClinicalTheme::text_muted(),
        )]),
        Line::from(vec![Span::styled(
            "Point weights are hand-chosen and have not been prospectively validated.",
            ClinicalTheme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(ClinicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

/// Full-screen disclaimer, shown from the overview.
pub fn render_disclaimer_page(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("About these estimates", ClinicalTheme::title())),
        Line::from(""),
        Line::from(Span::styled(
            "Each model adds integer points for risk factors and maps the total onto a \
             length-of-stay band. The weights reflect published associations with \
             prolonged stay after TAVI but were not fitted to local data.",
            ClinicalTheme::text(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Use the result to prompt discharge planning, not to decide it. Local \
             pathways, frailty assessment and the multidisciplinary team take precedence.",
            ClinicalTheme::text(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "No patient data is stored. Logs record only the model, score and category.",
            ClinicalTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Esc] ", ClinicalTheme::key_hint()),
            Span::styled("Back", ClinicalTheme::key_desc()),
        ]),
    ];

    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(" Disclaimer ", ClinicalTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(ClinicalTheme::border()),
        );

    f.render_widget(p, area);
}

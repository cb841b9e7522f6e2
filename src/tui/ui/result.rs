//! Score result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::ScoreResult;
use crate::tui::styles::ClinicalTheme;

/// Render a completed assessment
pub fn render_result(f: &mut Frame, area: Rect, result: &ScoreResult) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0], result);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_summary(f, body[0], result);
    render_factors(f, body[1], result);
    render_result_footer(f, chunks[2]);
}

fn render_result_header(f: &mut Frame, area: Rect, result: &ScoreResult) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicalTheme::text()),
        Span::styled("Length-of-Stay Estimate", ClinicalTheme::title()),
        Span::styled(format!(" │ {}", result.model.title()), ClinicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_summary(f: &mut Frame, area: Rect, result: &ScoreResult) {
    let block = Block::default()
        .title(Span::styled(" Result ", ClinicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Category
            Constraint::Length(3), // Predicted stay
            Constraint::Length(4), // Score gauge
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let category_style = ClinicalTheme::category(result.category);
    let category = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{} RISK", result.category),
            category_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            result.category.description(),
            ClinicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(category, chunks[0]);

    let stay = Paragraph::new(Line::from(vec![
        Span::styled("Predicted stay: ", ClinicalTheme::text_secondary()),
        Span::styled(result.predicted_los.to_string(), ClinicalTheme::text()),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(stay, chunks[1]);

    let fraction = result.score_fraction().clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ", result.model.score_label()),
                    ClinicalTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(ClinicalTheme::border()),
        )
        .gauge_style(category_style)
        .ratio(fraction)
        .label(format!("{} / {}", result.total_score, result.max_score));
    f.render_widget(gauge, chunks[2]);
}

fn render_factors(f: &mut Frame, area: Rect, result: &ScoreResult) {
    let block = Block::default()
        .title(Span::styled(" Contributing Factors ", ClinicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border());

    if result.contributing_factors.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No scoring factors present.",
            ClinicalTheme::text_muted(),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let lines: Vec<Line> = result
        .contributing_factors
        .iter()
        .map(|factor| {
            Line::from(vec![
                Span::styled(format!("  +{:<3}", factor.points), ClinicalTheme::info()),
                Span::styled(factor.label.clone(), ClinicalTheme::text()),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_result_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[Enter] ", ClinicalTheme::key_hint()),
        Span::styled("Return ", ClinicalTheme::key_desc()),
        Span::styled("[N] ", ClinicalTheme::key_hint()),
        Span::styled("New Assessment", ClinicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(footer, area);
}

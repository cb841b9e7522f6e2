//! Lock screen.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::tui::styles::ClinicalTheme;

#[derive(Default)]
pub struct LockState {
    passphrase: String,
    pub message: Option<String>,
}

impl LockState {
    pub fn push(&mut self, c: char) {
        self.passphrase.push(c);
        self.message = None;
    }

    pub fn pop(&mut self) {
        self.passphrase.pop();
    }

    #[must_use]
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    pub fn clear(&mut self) {
        self.passphrase.zeroize();
    }
}

impl Drop for LockState {
    fn drop(&mut self) {
        self.passphrase.zeroize();
    }
}

/// Render the passphrase prompt. Input is masked.
pub fn render_lock(f: &mut Frame, area: Rect, state: &LockState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(9),
            Constraint::Min(0),
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(chunks[1]);

    let masked = "•".repeat(state.passphrase.chars().count());
    let status = match &state.message {
        Some(msg) => Line::from(Span::styled(msg.clone(), ClinicalTheme::danger())),
        None => Line::from(Span::styled(
            "[Enter] Unlock  [Esc] Quit",
            ClinicalTheme::key_desc(),
        )),
    };

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Enter passphrase", ClinicalTheme::text_secondary())),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", ClinicalTheme::focused()),
            Span::styled(masked, ClinicalTheme::text()),
        ]),
        Line::from(""),
        status,
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(Span::styled(" TAVI LOS: Locked ", ClinicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(ClinicalTheme::border_focused()),
    );

    f.render_widget(content, columns[1]);
}

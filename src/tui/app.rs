//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Session expiry and locking

use std::io;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::application::{AccessGate, AssessmentService, Session};
use crate::config::AppConfig;
use crate::domain::{RiskScorer, ScoreResult};

use super::ui::{
    access::{render_lock, LockState},
    overview::{render_overview, OverviewState, SessionTally},
    patient::{render_patient_form, PatientFormState},
    render_disclaimer, render_disclaimer_page,
    result::render_result,
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Locked,
    Overview,
    Assessment,
    Result,
    Disclaimer,
}

/// Main application state
pub struct App {
    screen: Screen,

    should_quit: bool,

    service: AssessmentService,

    gate: AccessGate,

    /// Active session, `None` while locked
    session: Option<Session>,

    /// Procedural block default for new assessments
    include_procedural: bool,

    lock_state: LockState,

    patient_form_state: PatientFormState,

    /// Most recent result, dropped when leaving the result screen
    last_result: Option<ScoreResult>,

    tally: SessionTally,
}

impl App {
    /// Build the application from configuration.
    ///
    /// # Errors
    /// Returns error if the configured passphrase hash or session lifetime is
    /// invalid.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let gate = match &config.access_hash {
            Some(hash) => AccessGate::new(hash.as_str(), config.session_ttl)
                .map_err(|e| anyhow!("Invalid access configuration: {e}"))?,
            None => AccessGate::disabled(),
        };
        let service = AssessmentService::new(RiskScorer::new(config.model));

        Ok(Self::with_dependencies(service, gate, config.include_procedural))
    }

    /// Create application with injected dependencies.
    #[must_use]
    pub fn with_dependencies(
        service: AssessmentService,
        gate: AccessGate,
        include_procedural: bool,
    ) -> Self {
        let mut app = Self {
            screen: Screen::Locked,
            should_quit: false,
            service,
            gate,
            session: None,
            include_procedural,
            lock_state: LockState::default(),
            patient_form_state: PatientFormState::new(include_procedural),
            last_result: None,
            tally: SessionTally::default(),
        };

        if !app.gate.is_enabled() {
            app.try_unlock();
        }
        app
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        self.lock();
        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.check_session(Utc::now());

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                let content_area = chunks[0];
                let disclaimer_area = chunks[1];

                match self.screen {
                    Screen::Locked => render_lock(f, content_area, &self.lock_state),
                    Screen::Overview => render_overview(f, content_area, &self.overview_state()),
                    Screen::Assessment => render_patient_form(
                        f,
                        content_area,
                        &self.patient_form_state,
                        self.service.model(),
                    ),
                    Screen::Result => match &self.last_result {
                        Some(result) => render_result(f, content_area, result),
                        None => render_overview(f, content_area, &self.overview_state()),
                    },
                    Screen::Disclaimer => render_disclaimer_page(f, content_area),
                }

                render_disclaimer(f, disclaimer_area);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn overview_state(&self) -> OverviewState {
        OverviewState {
            model: self.service.model(),
            include_procedural: self.include_procedural,
            gate_enabled: self.gate.is_enabled(),
            session_minutes_left: self
                .session
                .as_ref()
                .map(|s| s.remaining(Utc::now()).num_minutes()),
            tally: self.tally,
        }
    }

    /// Lock when the session has run out at `now`.
    fn check_session(&mut self, now: DateTime<Utc>) {
        if !self.gate.is_enabled() {
            return;
        }
        let expired = match &self.session {
            Some(session) => self.gate.check(session, now).is_err(),
            None => false,
        };
        if expired {
            tracing::info!("Session expired, locking");
            self.lock();
            self.lock_state.message = Some("Session expired".to_string());
        }
    }

    fn lock(&mut self) {
        self.session = None;
        self.patient_form_state.clear_sensitive();
        self.last_result = None;
        self.lock_state.clear();
        if self.gate.is_enabled() {
            self.screen = Screen::Locked;
        }
    }

    fn try_unlock(&mut self) {
        let outcome = self.gate.unlock(self.lock_state.passphrase());
        self.lock_state.clear();

        match outcome {
            Ok(session) => {
                self.session = Some(session);
                self.lock_state.message = None;
                self.screen = Screen::Overview;
            }
            Err(e) => {
                self.lock_state.message = Some(e.to_string());
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Locked => self.handle_lock_key(key),
            Screen::Overview => self.handle_overview_key(key),
            Screen::Assessment => self.handle_patient_form_key(key),
            Screen::Result => self.handle_result_key(key),
            Screen::Disclaimer => {
                if matches!(key, KeyCode::Esc | KeyCode::Enter) {
                    self.screen = Screen::Overview;
                }
            }
        }
    }

    fn handle_lock_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => self.try_unlock(),
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Backspace => self.lock_state.pop(),
            KeyCode::Char(c) => self.lock_state.push(c),
            _ => {}
        }
    }

    fn handle_overview_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => self.start_assessment(),
            KeyCode::Char('m') | KeyCode::Char('M') => {
                let next = self.service.model().next();
                self.service.set_model(next);
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.include_procedural = !self.include_procedural;
            }
            KeyCode::Char('d') | KeyCode::Char('D') => self.screen = Screen::Disclaimer,
            KeyCode::Char('l') | KeyCode::Char('L') if self.gate.is_enabled() => self.lock(),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode) {
        let form = &mut self.patient_form_state;
        match key {
            KeyCode::Esc => {
                form.clear_sensitive();
                self.screen = Screen::Overview;
            }
            KeyCode::Up | KeyCode::BackTab => form.prev_field(),
            KeyCode::Down | KeyCode::Tab => form.next_field(),
            KeyCode::Left => form.cycle(false),
            KeyCode::Right | KeyCode::Char(' ') => form.cycle(true),
            KeyCode::Char('s') | KeyCode::Char('S') => form.load_sample_data(),
            KeyCode::Char('p') | KeyCode::Char('P') => form.toggle_procedural(),
            KeyCode::Char(c) => form.input_char(c),
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Delete => form.clear_field(),
            KeyCode::Enter => self.submit_patient_form(),
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Esc => {
                self.last_result = None;
                self.screen = Screen::Overview;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => self.start_assessment(),
            _ => {}
        }
    }

    fn start_assessment(&mut self) {
        self.last_result = None;
        self.patient_form_state = PatientFormState::new(self.include_procedural);
        self.screen = Screen::Assessment;
    }

    fn submit_patient_form(&mut self) {
        let input = match self.patient_form_state.to_patient_input() {
            Ok(input) => input,
            Err(e) => {
                self.patient_form_state.error_message = Some(e);
                return;
            }
        };

        match self.service.assess(&input) {
            Ok(result) => {
                self.tally.record(result.category);
                self.last_result = Some(result);
                self.screen = Screen::Result;

                // Clear plaintext buffers from the UI immediately.
                self.patient_form_state.clear_sensitive();
            }
            Err(e) => {
                self.patient_form_state.error_message = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::hash_passphrase;
    use crate::domain::{LosCategory, RiskModel};

    fn open_app() -> App {
        App::with_dependencies(AssessmentService::default(), AccessGate::disabled(), false)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn test_disabled_gate_starts_unlocked() {
        let app = open_app();
        assert_eq!(app.screen, Screen::Overview);
        assert!(app.session.is_some());
    }

    #[test]
    fn test_passphrase_unlocks() {
        let hash = hash_passphrase("ward seven").expect("hash");
        let gate = AccessGate::new(hash, Duration::from_secs(60)).expect("gate");
        let mut app = App::with_dependencies(AssessmentService::default(), gate, false);
        assert_eq!(app.screen, Screen::Locked);

        type_text(&mut app, "wrong");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::Locked);
        assert!(app.lock_state.message.is_some());

        type_text(&mut app, "ward seven");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::Overview);
        assert!(app.lock_state.passphrase().is_empty());

        app.handle_key(KeyCode::Char('l'), KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::Locked);
        assert!(app.session.is_none());
    }

    #[test]
    fn test_disabled_gate_keeps_form_past_session_lifetime() {
        let mut app = open_app();
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('s'), KeyModifiers::NONE);

        app.check_session(Utc::now() + chrono::Duration::minutes(31));

        assert_eq!(app.screen, Screen::Assessment);
        assert!(app.session.is_some());
        assert!(app.patient_form_state.to_patient_input().is_ok());
    }

    #[test]
    fn test_expired_session_locks_enabled_gate() {
        let hash = hash_passphrase("ward seven").expect("hash");
        let gate = AccessGate::new(hash, Duration::from_secs(60)).expect("gate");
        let mut app = App::with_dependencies(AssessmentService::default(), gate, false);
        type_text(&mut app, "ward seven");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('s'), KeyModifiers::NONE);

        app.check_session(Utc::now() + chrono::Duration::minutes(2));

        assert_eq!(app.screen, Screen::Locked);
        assert!(app.session.is_none());
        assert!(app.patient_form_state.to_patient_input().is_err());
        assert_eq!(app.lock_state.message.as_deref(), Some("Session expired"));
    }

    #[test]
    fn test_sample_assessment_flow() {
        let mut app = open_app();
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::Assessment);

        app.handle_key(KeyCode::Char('s'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::Result);

        // 82 (+1), female (+1), diabetes (+1), CFS 4 (+1)
        let result = app.last_result.as_ref().expect("result");
        assert_eq!(result.total_score, 4);
        assert_eq!(result.category, LosCategory::Low);
        assert_eq!(app.tally.total(), 1);
        assert!(app.patient_form_state.to_patient_input().is_err());

        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::Overview);
        assert!(app.last_result.is_none());
    }

    #[test]
    fn test_empty_form_reports_error() {
        let mut app = open_app();
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::Assessment);
        assert!(app.patient_form_state.error_message.is_some());
    }

    #[test]
    fn test_model_cycles_from_overview() {
        let mut app = open_app();
        app.handle_key(KeyCode::Char('m'), KeyModifiers::NONE);
        assert_eq!(app.service.model(), RiskModel::DischargeReadiness);
    }

    #[test]
    fn test_ctrl_q_quits_anywhere() {
        let mut app = open_app();
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}

//! TUI module: Terminal User Interface using Ratatui.
//!
//! Screens:
//! - Lock screen when a passphrase is configured
//! - Overview with model selection and a per-session tally
//! - Patient assessment form
//! - Score result with contributing factors

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::ClinicalTheme;

//! # tavi-los
//!
//! Length-of-stay risk scoring for transcatheter aortic valve implantation.
//!
//! This crate provides:
//! - Additive point tables mapping patient and procedural data to a predicted
//!   length-of-stay category
//! - A passphrase gate with session tokens for shared workstations
//! - Terminal UI for bedside use
//!
//! ## Architecture
//!
//! - `domain`: Pure scoring core (PatientInput, rule tables, RiskScorer)
//! - `application`: Use cases wrapping the core (assessment, access gate)
//! - `adapters`: Log sanitization
//! - `config`: Environment configuration
//! - `tui`: Terminal user interface
//!
//! The scores are hand-chosen integer weights, not a fitted model.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod tui;

pub use domain::{LosCategory, PatientInput, RiskModel, RiskScorer, ScoreResult};

/// Result type for tavi-los operations
pub type Result<T> = std::result::Result<T, TaviLosError>;

/// Main error type for tavi-los
#[derive(Debug, thiserror::Error)]
pub enum TaviLosError {
    #[error(transparent)]
    InvalidInput(#[from] domain::InvalidInputError),

    #[error("Access denied: {0}")]
    Access(#[from] application::AccessError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

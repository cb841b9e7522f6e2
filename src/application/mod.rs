//! Application layer: Use cases and services.
//!
//! This module wraps the scoring core for the front-ends and hosts the
//! access gate, which lives outside the core.

mod access;
mod assessment;

pub use access::{hash_passphrase, AccessError, AccessGate, Session, DEFAULT_SESSION_TTL};
pub use assessment::AssessmentService;

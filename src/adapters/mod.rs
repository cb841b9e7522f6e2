//! Adapters layer: integration with external libraries.
//!
//! - `sanitize`: identifier and secret redaction for `tracing` output

pub mod sanitize;

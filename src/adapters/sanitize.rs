//! Log sanitization for patient identifiers and access secrets.
//!
//! Formatted log lines pass through [`SanitizingMakeWriter`] before reaching
//! their sink. The patterns cover:
//! - NHS numbers and hospital/MRN numbers
//! - Dates of birth written day-first
//! - UUIDs and email addresses
//! - Argon2 passphrase hashes and session tokens
//! - `passphrase=...` style key/value secrets
//!
//! The scoring code never logs raw clinical values or identifiers; this is the
//! second line. Input is capped at `TAVI_LOS_SANITIZE_MAX_BYTES` (16 KiB by
//! default) per call.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<RedactionPatterns> = OnceLock::new();

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct RedactionRule {
    regex: Regex,
    replacement: &'static str,
}

struct RedactionPatterns {
    set: RegexSet,
    rules: Vec<RedactionRule>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes.min(input.len());
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var("TAVI_LOS_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn get_patterns() -> &'static RedactionPatterns {
    PATTERNS.get_or_init(|| {
        // Applied in this order; hashes go first so their digits are not
        // half-matched by the number patterns.
        let table: Vec<(&'static str, &'static str)> = vec![
            (
                r"\$argon2(?:id|i|d)\$[A-Za-z0-9=,$+/.-]+",
                "[REDACTED-PASSPHRASE-HASH]",
            ),
            (
                r"(?i)\b(?:passphrase|password|passwd|pwd|secret|token)\b\s*[:=]\s*\S+",
                "[REDACTED-SECRET]",
            ),
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
                "[REDACTED-UUID]",
            ),
            (r"\b[0-9a-fA-F]{32,}\b", "[REDACTED-TOKEN]"),
            (
                r"(?i)\b(?:MRN|hospital\s+(?:no|number)|hosp\s*no)\b[.:#\s]*[A-Z]?\d{5,10}\b",
                "[REDACTED-MRN]",
            ),
            (r"\b\d{3}[ -]?\d{3}[ -]?\d{4}\b", "[REDACTED-NHS]"),
            (r"\b\d{1,2}[/.-]\d{1,2}[/.-](?:19|20)\d{2}\b", "[REDACTED-DATE]"),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
        ];

        let set = RegexSet::new(table.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let rules = table
            .into_iter()
            .map(|(pattern, replacement)| RedactionRule {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        RedactionPatterns { set, rules }
    })
}

/// Replace identifiers and secrets in `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = get_patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let rule = &patterns.rules[idx];
        result = rule.regex.replace_all(&result, rule.replacement).to_string();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// Check if a string contains anything [`sanitize`] would redact.
#[cfg(test)]
fn contains_sensitive(input: &str) -> bool {
    let (prefix, _truncated) = truncate_to_char_boundary(input, max_sanitize_bytes());
    get_patterns().set.is_match(prefix)
}

/// A `tracing_subscriber` writer wrapper that sanitizes formatted log output
/// line by line before it reaches the underlying sink.
#[derive(Debug)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<M: Clone> Clone for SanitizingMakeWriter<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let sanitized = sanitize(&String::from_utf8_lossy(bytes));
        self.inner.write_all(sanitized.as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A line with no newline must not buffer without bound.
        let hard_cap = max_sanitize_bytes().saturating_mul(2);
        if self.buffer.len() > hard_cap {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;

        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }

        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sanitize_nhs_number() {
        for input in ["NHS 943 476 5919", "nhs=9434765919", "id 943-476-5919 seen"] {
            let sanitized = sanitize(input);
            assert!(sanitized.contains("[REDACTED-NHS]"), "{sanitized}");
            assert!(!sanitized.contains("5919"));
        }
    }

    #[test]
    fn test_sanitize_mrn() {
        let sanitized = sanitize("Hospital number: F1234567 admitted");
        assert!(sanitized.contains("[REDACTED-MRN]"));
        assert!(!sanitized.contains("1234567"));
    }

    #[test]
    fn test_sanitize_date_of_birth() {
        let sanitized = sanitize("DOB 03/11/1939");
        assert_eq!(sanitized, "DOB [REDACTED-DATE]");
    }

    #[test]
    fn test_iso_timestamps_survive() {
        let line = "2026-10-17T09:14:03.512345Z  INFO tavi_los: Assessment complete: score=6/23";
        assert_eq!(sanitize(line), line);
        assert!(!contains_sensitive(line));
    }

    #[test]
    fn test_sanitize_passphrase_hash() {
        let input = "hash $argon2id$v=19$m=47104,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNo loaded";
        let sanitized = sanitize(input);
        assert_eq!(sanitized, "hash [REDACTED-PASSPHRASE-HASH] loaded");
    }

    #[test]
    fn test_sanitize_session_token() {
        let token = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
        let sanitized = sanitize(&format!("issued {token}"));
        assert!(sanitized.contains("[REDACTED-TOKEN]"));
        assert!(!sanitized.contains(token));
    }

    #[test]
    fn test_sanitize_contextual_secret() {
        let sanitized = sanitize("passphrase=hunter2 rejected");
        assert_eq!(sanitized, "[REDACTED-SECRET] rejected");
    }

    #[test]
    fn test_sanitize_email_and_uuid() {
        let sanitized =
            sanitize("ward.clerk@nhs.net ref 550e8400-e29b-41d4-a716-446655440000");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(sanitized.contains("[REDACTED-UUID]"));
    }

    #[test]
    fn test_sanitize_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("prefix 943 476 5919 suffix", 10);
        assert!(sanitized.ends_with("[TRUNCATED]"));
    }

    #[test]
    fn test_writer_sanitizes_each_line() {
        let mut sink = Vec::new();
        {
            let mut writer = SanitizingWriter::new(&mut sink);
            writer
                .write_all(b"first 943 476 5919\nsecond line\npartial MRN 1234567")
                .expect("write");
            writer.flush().expect("flush");
        }

        let out = String::from_utf8(sink).expect("utf8");
        assert_eq!(out, "first [REDACTED-NHS]\nsecond line\npartial [REDACTED-MRN]");
    }
}

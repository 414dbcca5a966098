//! Log sanitization for patient identifiers.
//!
//! Log lines pass through [`SanitizingMakeWriter`], which redacts:
//! - record ids (UUIDs)
//! - phone numbers (10-digit, optional `+91`/`0` prefix)
//! - email addresses
//! - patient names in `Name:` summary lines and `name=` fields
//!
//! Sanitizing strings is a fallback. Service code logs store ids and risk
//! labels, never form contents.
//!
//! Input per call is capped (`INTAKECARE_SANITIZE_MAX_BYTES`, default 16 KiB).

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PII_PATTERNS: OnceLock<PiiPatterns> = OnceLock::new();

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

/// Ordered rules: names before phones so `Name: ... 98xxxxxxxx` collapses to one marker.
const RULES: [(&str, &str); 5] = [
    (
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        "[REDACTED-ID]",
    ),
    (r"(?m)\bName:[ \t]*[^\n]*", "Name: [REDACTED-NAME]"),
    (r#"\bname="?[^",}\n]*"?"#, "name=[REDACTED-NAME]"),
    (
        r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
    (r"(?:\+91[-\s]?|\b0|\b)[6-9]\d{4}[-\s]?\d{5}\b", "[REDACTED-PHONE]"),
];

struct PiiPattern {
    regex: Regex,
    replacement: &'static str,
}

struct PiiPatterns {
    set: RegexSet,
    patterns: Vec<PiiPattern>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var("INTAKECARE_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn get_patterns() -> &'static PiiPatterns {
    PII_PATTERNS.get_or_init(|| {
        let set = RegexSet::new(RULES.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let patterns = RULES
            .iter()
            .map(|&(pattern, replacement)| PiiPattern {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();
        PiiPatterns { set, patterns }
    })
}

/// Replace every known identifier pattern in `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = get_patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let pattern = &patterns.patterns[idx];
        result = pattern
            .regex
            .replace_all(&result, pattern.replacement)
            .into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// Check if a string contains a patient identifier.
#[must_use]
pub fn contains_pii(input: &str) -> bool {
    let (prefix, _) = truncate_to_char_boundary(input, max_sanitize_bytes());
    get_patterns().set.is_match(prefix)
}

/// A `tracing_subscriber` writer wrapper that sanitizes formatted log output
/// line by line before it reaches the underlying sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W> SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner.write_all(sanitize(&text).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W> std::io::Write for SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A single line larger than twice the cap is written out truncated.
        if self.buffer.len() > max_sanitize_bytes().saturating_mul(2) {
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
    fn test_sanitize_record_id() {
        let input = "Recorded 550e8400-e29b-41d4-a716-446655440000 as high";
        let sanitized = sanitize(input);
        assert_eq!(sanitized, "Recorded [REDACTED-ID] as high");
    }

    #[test]
    fn test_sanitize_summary_name_line() {
        let input = "PATIENT SUMMARY\nName: Ravi Kumar\nRisk Level: MEDIUM";
        let sanitized = sanitize(input);
        assert!(sanitized.contains("Name: [REDACTED-NAME]\n"));
        assert!(!sanitized.contains("Ravi"));
        assert!(sanitized.contains("Risk Level: MEDIUM"));
    }

    #[test]
    fn test_sanitize_name_field() {
        let sanitized = sanitize(r#"submit name="Meera Iyer", risk=low"#);
        assert!(!sanitized.contains("Meera"));
        assert!(sanitized.contains("risk=low"));
    }

    #[test]
    fn test_sanitize_phone() {
        for input in ["call 9876543210", "call +91 98765 43210", "call 09876543210"] {
            let sanitized = sanitize(input);
            assert_eq!(sanitized, "call [REDACTED-PHONE]", "input: {input}");
        }
    }

    #[test]
    fn test_sanitize_email() {
        let sanitized = sanitize("Contact: nurse@clinic.in");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
    }

    #[test]
    fn test_contains_pii() {
        assert!(contains_pii("ID: 550e8400-e29b-41d4-a716-446655440000"));
        assert!(contains_pii("phone 9876543210"));
        assert!(!contains_pii("Saved patient 12 to sqlite"));
        assert!(!contains_pii("temperature 101.5, pulse 96"));
    }

    #[test]
    fn test_sanitize_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("Saved patient record with long text", 12);
        assert_eq!(sanitized, "Saved patien [TRUNCATED]");
    }

    #[test]
    fn test_writer_sanitizes_per_line() {
        let mut sink = Vec::new();
        {
            let mut writer = SanitizingWriter::new(&mut sink);
            writer.write_all(b"Name: Anil\nok ").expect("Should write");
            writer.write_all(b"9876543210").expect("Should write");
            writer.flush().expect("Should flush");
        }
        let out = String::from_utf8(sink).expect("Should be utf8");
        assert_eq!(out, "Name: [REDACTED-NAME]\nok [REDACTED-PHONE]");
    }
}

// Logging utilities
// Structured logging with JSON and human-readable formats

use log::Level;
use serde_json::json;

use crate::models::form::FormRecord;

/// Mask a value for logs: short values are hidden entirely, longer ones keep 4 chars at each end.
pub fn mask_sensitive(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }

    let visible = 4;
    let start: String = chars[..visible].iter().collect();
    let end: String = chars[chars.len() - visible..].iter().collect();

    format!("{}...{}", start, end)
}

/// One-line description of a record that never carries the entered values verbatim.
pub fn summarize_record(record: &FormRecord) -> String {
    let parts: Vec<String> = record
        .iter()
        .map(|(name, value)| {
            if value.trim().is_empty() {
                format!("{}=<blank>", name)
            } else {
                format!("{}={}", name, mask_sensitive(value))
            }
        })
        .collect();
    format!("{} fields [{}]", record.len(), parts.join(", "))
}

/// Parse phase and step from log message
/// Extracts [PHASE: ...] and [STEP: ...] patterns
pub fn parse_log_metadata(message: &str) -> (Option<String>, Option<String>, String) {
    let mut phase = None;
    let mut step = None;
    let mut cleaned_message = message.to_string();

    if let Some((value, rest)) = extract_tag(&cleaned_message, "[PHASE:") {
        phase = Some(value);
        cleaned_message = rest;
    }

    if let Some((value, rest)) = extract_tag(&cleaned_message, "[STEP:") {
        step = Some(value);
        cleaned_message = rest;
    }

    (phase, step, cleaned_message)
}

fn extract_tag(message: &str, open: &str) -> Option<(String, String)> {
    let start = message.find(open)?;
    let end = message[start..].find(']')?;
    let value = message[start + open.len()..start + end].trim().to_string();
    let rest = format!("{} {}", &message[..start], &message[start + end + 1..])
        .trim()
        .to_string();
    Some((value, rest))
}

/// Format log entry as JSON for structured logging
pub fn format_json_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
) -> String {
    let mut log_entry = json!({
        "timestamp": timestamp,
        "level": level.as_str(),
        "target": target,
        "message": message,
    });

    if let Some(phase) = phase {
        log_entry["phase"] = json!(phase);
    }

    if let Some(step) = step {
        log_entry["step"] = json!(step);
    }

    serde_json::to_string(&log_entry).unwrap_or_else(|_| "{}".to_string())
}

/// Format log entry as human-readable text
pub fn format_human_readable_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
) -> String {
    let mut log_line = format!("[{}] [{}]", timestamp, level.as_str());

    if let Some(phase) = phase {
        log_line.push_str(&format!(" [PHASE: {}]", phase));
    }

    if let Some(step) = step {
        log_line.push_str(&format!(" [STEP: {}]", step));
    }

    log_line.push_str(&format!(" [{}] {}", target, message));
    log_line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    // -------------------------------------------------------------------------
    // A) Phase / step tags
    // -------------------------------------------------------------------------

    #[test]
    fn parse_extracts_phase_and_step() {
        let (phase, step, msg) =
            parse_log_metadata("[PHASE: wizard] [STEP: next] 1 -> 2");
        assert_eq!(phase.as_deref(), Some("wizard"));
        assert_eq!(step.as_deref(), Some("next"));
        assert_eq!(msg, "1 -> 2");
    }

    #[test]
    fn parse_without_tags_leaves_message_alone() {
        let (phase, step, msg) = parse_log_metadata("plain message");
        assert!(phase.is_none());
        assert!(step.is_none());
        assert_eq!(msg, "plain message");
    }

    #[test]
    fn parse_handles_unterminated_tag() {
        let (phase, _, msg) = parse_log_metadata("[PHASE: wizard oops");
        assert!(phase.is_none());
        assert_eq!(msg, "[PHASE: wizard oops");
    }

    #[test]
    fn json_line_carries_structured_fields() {
        let line = format_json_log(
            "2024-01-01T00:00:00Z",
            Level::Info,
            "site_entry_wizard::wizard",
            "1 -> 2",
            Some("wizard"),
            Some("next"),
        );
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["level"], "INFO");
        assert_eq!(v["phase"], "wizard");
        assert_eq!(v["step"], "next");
    }

    #[test]
    fn human_line_layout() {
        let line = format_human_readable_log(
            "2024-01-01 00:00:00.000",
            Level::Warn,
            "t",
            "msg",
            Some("service"),
            None,
        );
        assert_eq!(line, "[2024-01-01 00:00:00.000] [WARN] [PHASE: service] [t] msg");
    }

    // -------------------------------------------------------------------------
    // B) Entered values never reach the logs verbatim
    // -------------------------------------------------------------------------

    #[test]
    fn mask_sensitive_short_values_fully_masked() {
        assert_eq!(mask_sensitive("abc"), "***");
        assert_eq!(mask_sensitive("12345678"), "***");
    }

    #[test]
    fn mask_sensitive_long_values_partially_masked() {
        let masked = mask_sensitive("abcdefghijklmnop");
        assert_eq!(masked, "abcd...mnop");
    }

    #[test]
    fn mask_sensitive_is_char_safe() {
        let masked = mask_sensitive("Müller-Lüdenscheidt");
        assert!(masked.starts_with("Müll"), "{}", masked);
        assert!(masked.ends_with("eidt"), "{}", masked);
    }

    #[test]
    fn record_summary_hides_values() {
        let mut map = BTreeMap::new();
        map.insert("remarks".to_string(), "gate code is 4471-9920".to_string());
        map.insert("site".to_string(), "Harbor".to_string());
        map.insert("idleReason".to_string(), String::new());
        let summary = summarize_record(&FormRecord::from(map));

        assert!(summary.starts_with("3 fields"), "{}", summary);
        assert!(!summary.contains("4471-9920"), "value leaked: {}", summary);
        assert!(summary.contains("site=***"), "{}", summary);
        assert!(summary.contains("idleReason=<blank>"), "{}", summary);
    }
}

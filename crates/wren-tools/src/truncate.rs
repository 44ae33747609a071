//! UTF-8-safe truncation of tool output for context-budget purposes.

use serde_json::Value;

/// Maximum output size, in characters, before truncation.
pub const MAX_OUTPUT_CHARS: usize = 30_000;

/// Truncate a string at the nearest char boundary at or before `max_bytes`.
#[must_use]
pub fn truncate_at_char_boundary(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end = end.saturating_sub(1);
    }
    s[..end].to_string()
}

/// Truncate a tool's text output to [`MAX_OUTPUT_CHARS`], appending a notice
/// when truncation occurred.
#[must_use]
pub fn truncate_output(output: String) -> String {
    if output.len() <= MAX_OUTPUT_CHARS {
        return output;
    }
    let mut truncated = truncate_at_char_boundary(&output, MAX_OUTPUT_CHARS);
    truncated.push_str("\n\n... (output truncated — exceeded 30000 character limit)");
    truncated
}

/// Truncate a JSON result if it is (or contains) a string payload larger
/// than [`MAX_OUTPUT_CHARS`]; other shapes pass through unchanged.
#[must_use]
pub fn truncate_json_result(result: Value) -> Value {
    match result {
        Value::String(text) => Value::String(truncate_output(text)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_string_returned_unchanged() {
        assert_eq!(truncate_at_char_boundary("hello", 200), "hello");
    }

    #[test]
    fn ascii_truncates_at_exact_boundary() {
        let s = "x".repeat(300);
        let result = truncate_at_char_boundary(&s, 200);
        assert_eq!(result.len(), 200);
    }

    #[test]
    fn multi_byte_character_is_not_split() {
        let s = format!("{}🦀", "x".repeat(198));
        assert_eq!(truncate_at_char_boundary(&s, 200), "x".repeat(198));
    }

    #[test]
    fn output_under_limit_is_untouched() {
        let output = "fine".to_string();
        assert_eq!(truncate_output(output.clone()), output);
    }

    #[test]
    fn output_over_limit_gets_a_notice() {
        let output = "x".repeat(MAX_OUTPUT_CHARS + 100);
        let truncated = truncate_output(output);
        assert!(truncated.len() < MAX_OUTPUT_CHARS + 100);
        assert!(truncated.contains("output truncated"));
    }

    #[test]
    fn non_string_json_passes_through() {
        let value = serde_json::json!({"ok": true});
        assert_eq!(truncate_json_result(value.clone()), value);
    }
}

// Oracle response repair
//
// The oracle wraps its JSON payload in prose, markdown fencing, or cuts it
// off at the output-length limit. Repair is an ordered list of pure
// strategies; the first one producing a candidate wins, and the candidate is
// then validated and, if needed, patched. The result is either a string that
// is guaranteed to parse as a JSON object, or `None`. Nothing here panics on
// malformed input.

use once_cell::sync::Lazy;
use regex::Regex;

const MAX_LOG_SNIPPET_LENGTH: usize = 150;

// A fenced code block, optionally tagged `json`, whose interior is an object
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced block pattern is valid")
});

/// Extract and heal the JSON object embedded in a raw oracle response.
///
/// Returns `None` when the text contains no brace-delimited candidate or no
/// repair strategy yields valid JSON.
pub fn repair_response(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }

    let candidate = extract_fenced(raw).or_else(|| slice_braces(raw));

    let Some(candidate) = candidate else {
        tracing::warn!(
            "Oracle response did not contain a recognizable JSON object. Response: {}",
            snippet(raw)
        );
        return None;
    };

    fix_truncated(&candidate)
}

/// Strategy 1: interior of a complete fenced block, if it starts with `{`
fn extract_fenced(text: &str) -> Option<String> {
    let captures = FENCED_BLOCK.captures(text)?;
    let interior = captures.get(1)?.as_str();
    if !interior.trim_start().starts_with('{') {
        return None;
    }
    tracing::debug!("Extracted JSON from a complete markdown block");
    Some(interior.to_string())
}

/// Strategy 2: slice from the first `{` to the last `}`, dropping
/// surrounding prose. A missing closing brace keeps the tail; the truncation
/// fixes deal with it.
fn slice_braces(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let sliced = &text[start..];
    let candidate = match sliced.rfind('}') {
        Some(end) => &sliced[..=end],
        None => sliced,
    };
    tracing::debug!("Parsed response assuming raw JSON. Snippet: {}", snippet(candidate));
    Some(candidate.to_string())
}

/// Validate the candidate, patching common truncation damage if needed
fn fix_truncated(candidate: &str) -> Option<String> {
    let cleaned = candidate.trim();
    if cleaned.is_empty() {
        return None;
    }

    // Parse as-is first
    if parses_as_object(cleaned) {
        tracing::debug!("Direct parse successful, JSON is valid");
        return Some(cleaned.to_string());
    }

    // Cut at the last complete entry (a `},` pattern marks the boundary
    // before the truncation) and close the object
    if let Some(marker) = cleaned.rfind("},") {
        let mut patched = cleaned[..=marker].to_string();
        patched.push('}');

        let patched = if patched.trim_start().starts_with('{') {
            Some(patched)
        } else {
            // Re-anchor on an opening brace if the cut lost it
            patched.find('{').map(|start| patched[start..].to_string())
        };

        if let Some(patched) = patched {
            if parses_as_object(&patched) {
                tracing::debug!("Truncation fix at last complete entry successful");
                return Some(patched);
            }
        }
    }

    // Minimal fallback: an object that simply lost its final brace
    if cleaned.starts_with('{') && !cleaned.ends_with('}') {
        let patched = format!("{}}}", cleaned);
        if parses_as_object(&patched) {
            tracing::debug!("Trailing-brace fix successful");
            return Some(patched);
        }
    }

    tracing::warn!(
        "All repair strategies failed for JSON snippet: {}",
        snippet(cleaned)
    );
    None
}

fn parses_as_object(text: &str) -> bool {
    serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(text).is_ok()
}

fn snippet(text: &str) -> String {
    if text.len() <= MAX_LOG_SNIPPET_LENGTH {
        return format!("{}...", text);
    }
    let mut end = MAX_LOG_SNIPPET_LENGTH;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_json_returned_unchanged() {
        let payload = r#"{"A": {"DescriptiveName": "X"}}"#;
        assert_eq!(repair_response(payload).unwrap(), payload);
    }

    #[test]
    fn test_fenced_block_with_prose() {
        let raw = "Sure, here are the renames:\n```json\n{\"A\": {\"DescriptiveName\": \"X\"}}\n```\nLet me know if you need more.";
        let repaired = repair_response(raw).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(parsed["A"]["DescriptiveName"], "X");
    }

    #[test]
    fn test_fenced_block_without_tag() {
        let raw = "```\n{\"A\": {\"DescriptiveName\": \"X\"}}\n```";
        assert!(repair_response(raw).is_some());
    }

    #[test]
    fn test_bare_json_with_surrounding_prose() {
        let raw = "Here you go: {\"A\": {\"DescriptiveName\": \"X\"}} hope that helps";
        let repaired = repair_response(raw).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(parsed["A"]["DescriptiveName"], "X");
    }

    #[test]
    fn test_truncated_payload_keeps_complete_entries() {
        // Cut off mid-entry by an output-length limit
        let raw = r#"{"A":{"DescriptiveName":"X"},"B":{"DescriptiveName":"Y"#;
        let repaired = repair_response(raw).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(parsed["A"]["DescriptiveName"], "X");
        assert!(parsed.get("B").is_none());
    }

    #[test]
    fn test_missing_final_brace_only() {
        let raw = r#"{"A":{"DescriptiveName":"X"}"#;
        let repaired = repair_response(raw).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(parsed["A"]["DescriptiveName"], "X");
    }

    #[test]
    fn test_no_json_at_all() {
        assert!(repair_response("I could not analyze this module, sorry.").is_none());
        assert!(repair_response("").is_none());
        assert!(repair_response("   \n  ").is_none());
    }

    #[test]
    fn test_unrepairable_garbage() {
        assert!(repair_response("{{{{ nope").is_none());
    }

    #[test]
    fn test_round_trip_preserves_content() {
        let inner = serde_json::json!({
            "Ns.Type": {"DescriptiveName": "Client", "Type": "Class", "Description": "d"},
            "Ns.Type::m()": {"DescriptiveName": "Connect", "Type": "Method", "Description": ""}
        });
        let raw = format!(
            "Analysis complete.\n```json\n{}\n```\nDone.",
            serde_json::to_string_pretty(&inner).unwrap()
        );

        let repaired = repair_response(&raw).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(parsed, inner);
    }

    #[test]
    fn test_input_not_mutated() {
        let raw = String::from(r#"noise {"A":{"DescriptiveName":"X"}, noise"#);
        let before = raw.clone();
        let _ = repair_response(&raw);
        assert_eq!(raw, before);
    }
}

//! Deterministic shrinking of oversized payloads.

use serde_json::Value;
use tracing::debug;

use crate::budget::selector::{FieldPath, ShrinkSelector};

/// Marker field set on a payload that was shrunk.
pub const TRUNCATED_FIELD: &str = "truncated";

/// Field carrying the human-readable trim notice.
pub const GUIDANCE_FIELD: &str = "guidance";

/// Shrink `payload` in place until its serialized form fits `budget_chars`.
///
/// Repeatedly halves the longest string the selector enumerates; on equal
/// lengths the earliest-enumerated candidate wins. Returns whether any
/// shrink was performed. A shrunk payload gets `truncated = true` and a
/// trim notice appended to its `guidance` field; a payload already within
/// budget is left untouched.
///
/// Never fails: when the candidates are exhausted and the payload still
/// exceeds the budget, it is returned as small as it could be made, with
/// `truncated` set.
pub fn enforce(payload: &mut Value, budget_chars: usize, selector: &dyn ShrinkSelector) -> bool {
    let starting_chars = serialized_chars(payload);
    if starting_chars <= budget_chars {
        return false;
    }

    let mut shrunk = false;
    loop {
        let Some(path) = longest_candidate(payload, selector) else {
            break;
        };
        let Some(Value::String(text)) = path.lookup_mut(payload) else {
            break;
        };
        let length = text.chars().count();
        if length == 0 {
            break;
        }
        halve_in_place(text, length);
        shrunk = true;

        if serialized_chars(payload) <= budget_chars {
            break;
        }
    }

    if shrunk {
        mark_truncated(payload, budget_chars);
        debug!(
            budget_chars,
            starting_chars,
            final_chars = serialized_chars(payload),
            "payload trimmed to budget"
        );
    }
    shrunk
}

/// Character length of the payload's canonical serialized form.
fn serialized_chars(payload: &Value) -> usize {
    serde_json::to_string(payload)
        .map(|serialized| serialized.chars().count())
        .unwrap_or(0)
}

/// The eligible string with the strictly greatest length, earliest first
/// on ties. Candidates that no longer resolve to a string are skipped.
fn longest_candidate(payload: &Value, selector: &dyn ShrinkSelector) -> Option<FieldPath> {
    let mut best: Option<(usize, FieldPath)> = None;
    for path in selector.candidates(payload) {
        let Some(Value::String(text)) = path.lookup(payload) else {
            continue;
        };
        let length = text.chars().count();
        if length == 0 {
            continue;
        }
        let beats = match &best {
            Some((best_length, _)) => length > *best_length,
            None => true,
        };
        if beats {
            best = Some((length, path));
        }
    }
    best.map(|(_, path)| path)
}

/// Keep the first half of the string, by character count.
fn halve_in_place(text: &mut String, length: usize) {
    let keep = length / 2;
    if keep == 0 {
        text.clear();
        return;
    }
    if let Some((boundary, _)) = text.char_indices().nth(keep) {
        text.truncate(boundary);
    }
}

/// Flag the payload as trimmed, preserving any existing guidance.
fn mark_truncated(payload: &mut Value, budget_chars: usize) {
    let Some(root) = payload.as_object_mut() else {
        return;
    };
    root.insert(TRUNCATED_FIELD.to_string(), Value::Bool(true));

    let notice = format!(
        "Output was trimmed to fit a {budget_chars}-character budget; long string fields were shortened. Narrow the request for complete values."
    );
    let guidance = match root.get(GUIDANCE_FIELD) {
        Some(Value::String(existing)) if !existing.is_empty() => {
            format!("{existing} {notice}")
        }
        _ => notice,
    };
    root.insert(GUIDANCE_FIELD.to_string(), Value::String(guidance));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::selector::{FieldPath, ListFields, TopLevelFields};
    use serde_json::json;

    #[test]
    fn test_payload_within_budget_is_untouched() {
        let mut payload = json!({"summary": "short"});
        let before = payload.clone();
        let selector = TopLevelFields::new(["summary"]);

        let shrunk = enforce(&mut payload, 10_000, &selector);

        assert!(!shrunk);
        assert_eq!(payload, before);
    }

    #[test]
    fn test_oversized_field_is_halved_until_within_budget() {
        let mut payload = json!({"description": "x".repeat(40_000)});
        let selector = TopLevelFields::new(["description"]);

        let shrunk = enforce(&mut payload, 25_000, &selector);

        assert!(shrunk);
        assert_eq!(payload[TRUNCATED_FIELD], json!(true));
        let remaining = payload["description"].as_str().unwrap_or_default().len();
        assert!(remaining < 40_000);
        assert!(remaining >= 10_000, "halving overshot: {remaining}");
        assert!(payload[GUIDANCE_FIELD].as_str().unwrap_or_default().contains("trimmed"));
    }

    #[test]
    fn test_longest_field_shrinks_first() {
        let mut payload = json!({
            "short": "aaaa",
            "long": "b".repeat(200),
        });
        let budget = serialized_chars(&payload) - 50;
        let selector = TopLevelFields::new(["short", "long"]);

        enforce(&mut payload, budget, &selector);

        assert_eq!(payload["short"], json!("aaaa"));
        assert_eq!(payload["long"].as_str().unwrap_or_default().len(), 100);
    }

    #[test]
    fn test_equal_lengths_shrink_the_earlier_candidate() {
        let mut payload = json!({
            "first": "a".repeat(100),
            "second": "b".repeat(100),
        });
        let budget = serialized_chars(&payload) - 10;
        let selector = TopLevelFields::new(["first", "second"]);

        enforce(&mut payload, budget, &selector);

        assert_eq!(payload["first"].as_str().unwrap_or_default().len(), 50);
        assert_eq!(payload["second"].as_str().unwrap_or_default().len(), 100);
    }

    #[test]
    fn test_exhausted_candidates_degrade_gracefully() {
        let mut payload = json!({
            "note": "tiny",
            "numbers": (0..200).collect::<Vec<u32>>(),
        });
        let selector = TopLevelFields::new(["note"]);

        let shrunk = enforce(&mut payload, 10, &selector);

        assert!(shrunk);
        assert_eq!(payload[TRUNCATED_FIELD], json!(true));
        assert_eq!(payload["note"], json!(""));
        assert!(serialized_chars(&payload) > 10);
    }

    #[test]
    fn test_no_candidates_means_no_shrink() {
        let mut payload = json!({"numbers": (0..200).collect::<Vec<u32>>()});
        let before = payload.clone();
        let selector = TopLevelFields::new(["missing"]);

        let shrunk = enforce(&mut payload, 10, &selector);

        assert!(!shrunk);
        assert_eq!(payload, before);
    }

    #[test]
    fn test_list_fields_shrink_across_elements() {
        let mut payload = json!({
            "items": [
                {"name": "row one", "snippet": "c".repeat(300)},
                {"name": "row two", "snippet": "d".repeat(500)},
            ]
        });
        let budget = serialized_chars(&payload) - 200;
        let selector = ListFields::new("items", ["snippet"]);

        let shrunk = enforce(&mut payload, budget, &selector);

        assert!(shrunk);
        assert_eq!(payload["items"][1]["snippet"].as_str().unwrap_or_default().len(), 250);
        assert_eq!(payload["items"][0]["snippet"].as_str().unwrap_or_default().len(), 300);
    }

    #[test]
    fn test_existing_guidance_is_preserved() {
        let mut payload = json!({
            "guidance": "Use the next_page token to continue.",
            "body": "e".repeat(5_000),
        });
        let selector = TopLevelFields::new(["body"]);

        enforce(&mut payload, 1_000, &selector);

        let guidance = payload[GUIDANCE_FIELD].as_str().unwrap_or_default();
        assert!(guidance.starts_with("Use the next_page token to continue."));
        assert!(guidance.contains("trimmed"));
    }

    #[test]
    fn test_second_pass_on_compliant_payload_is_a_noop() {
        let mut payload = json!({"body": "f".repeat(4_000)});
        let selector = TopLevelFields::new(["body"]);

        assert!(enforce(&mut payload, 3_000, &selector));
        let settled = payload.clone();
        assert!(!enforce(&mut payload, 3_000, &selector));
        assert_eq!(payload, settled);
    }

    #[test]
    fn test_multibyte_strings_truncate_on_char_boundaries() {
        let mut payload = json!({"body": "é".repeat(1_000)});
        let selector = TopLevelFields::new(["body"]);

        let shrunk = enforce(&mut payload, 600, &selector);

        assert!(shrunk);
        let body = payload["body"].as_str().unwrap_or_default();
        assert!(body.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_closure_selectors_drive_enforcement() {
        let mut payload = json!({"wrapped": {"inner": "g".repeat(2_000)}});
        let selector =
            |_: &Value| vec![FieldPath::key("wrapped").then_key("inner")];

        let shrunk = enforce(&mut payload, 500, &selector);

        assert!(shrunk);
        assert!(payload["wrapped"]["inner"].as_str().unwrap_or_default().len() < 2_000);
    }
}

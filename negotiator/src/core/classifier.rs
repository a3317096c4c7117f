//! Turn classification carried inside model replies.
//!
//! The model appends a single HTML-style comment after its dialogue:
//!
//! ```text
//! <!--
//! {"turn_flags":{"new_strong_argument":"N","repeated_argument":"N","conduct":"professional",
//!  "asked_amount_present":"N","accepted_distraction":"N","hint":""}}
//! -->
//! ```
//!
//! Parsing fails soft: a reply without a well-formed block yields no payload,
//! and missing or unrecognized flag values take their neutral defaults.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use crate::core::types::{Conduct, TurnFlags};

pub const OPEN_MARKER: &str = "<!--";
pub const CLOSE_MARKER: &str = "-->";

static BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--\s*(.*?)\s*-->").expect("block regex is valid"));

/// A model reply split into its visible dialogue and classification payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    /// Dialogue preceding the classification block, trimmed.
    pub dialogue: String,
    /// Parsed JSON from the first comment block, if it held a JSON object.
    pub payload: Option<Value>,
    /// Normalized flags, present only when the payload has a `turn_flags` object.
    pub flags: Option<TurnFlags>,
}

/// Split `raw` into dialogue and classification.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let payload = extract_payload(raw);
    let flags = payload
        .as_ref()
        .and_then(|value| value.get("turn_flags"))
        .filter(|flags| flags.is_object())
        .map(normalize_flags);

    ParsedReply {
        dialogue: strip_classification(raw),
        payload,
        flags,
    }
}

/// Parse the first comment block as a JSON object.
///
/// Anything after the closing marker is ignored.
pub fn extract_payload(raw: &str) -> Option<Value> {
    let caps = BLOCK_RE.captures(raw)?;
    let candidate = caps.get(1)?.as_str().trim();
    if !candidate.starts_with('{') || !candidate.ends_with('}') {
        return None;
    }
    serde_json::from_str::<Value>(candidate)
        .ok()
        .filter(Value::is_object)
}

/// Dialogue text with the classification block and everything after it removed.
///
/// An unterminated opening marker also cuts the text, so a truncated block
/// never leaks into the dialogue.
pub fn strip_classification(raw: &str) -> String {
    let cut = BLOCK_RE
        .find(raw)
        .map(|m| m.start())
        .or_else(|| raw.find(OPEN_MARKER))
        .unwrap_or(raw.len());
    raw[..cut].trim().to_string()
}

/// Normalize a `turn_flags` object into [`TurnFlags`], defaulting anything
/// missing or unrecognized.
pub fn normalize_flags(value: &Value) -> TurnFlags {
    TurnFlags {
        new_strong_argument: yes_flag(value.get("new_strong_argument")),
        repeated_argument: yes_flag(value.get("repeated_argument")),
        conduct: value
            .get("conduct")
            .and_then(Value::as_str)
            .map(Conduct::from_label)
            .unwrap_or_default(),
        asked_amount_present: yes_flag(value.get("asked_amount_present")),
        accepted_distraction: yes_flag(value.get("accepted_distraction")),
        hint: value
            .get("hint")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Re-serialize flags in the wire shape, with every documented key present.
pub fn to_wire(flags: &TurnFlags) -> Value {
    json!({
        "turn_flags": {
            "new_strong_argument": yes_no(flags.new_strong_argument),
            "repeated_argument": yes_no(flags.repeated_argument),
            "conduct": flags.conduct.as_str(),
            "asked_amount_present": yes_no(flags.asked_amount_present),
            "accepted_distraction": yes_no(flags.accepted_distraction),
            "hint": flags.hint,
        }
    })
}

fn yes_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("y") || s.eq_ignore_ascii_case("yes")
        }
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Y" } else { "N" }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIRE_KEYS: [&str; 6] = [
        "new_strong_argument",
        "repeated_argument",
        "conduct",
        "asked_amount_present",
        "accepted_distraction",
        "hint",
    ];

    fn reply(block: &str) -> String {
        format!("We value your contributions, but the band is fixed.\n\n<!--\n{block}\n-->")
    }

    #[test]
    fn parses_well_formed_block() {
        let raw = reply(
            r#"{"turn_flags":{"new_strong_argument":"Y","repeated_argument":"N","conduct":"professional","asked_amount_present":"Y","accepted_distraction":"N","hint":""}}"#,
        );
        let parsed = parse_reply(&raw);
        assert_eq!(
            parsed.dialogue,
            "We value your contributions, but the band is fixed."
        );
        let flags = parsed.flags.expect("flags");
        assert!(flags.new_strong_argument);
        assert!(flags.asked_amount_present);
        assert!(!flags.repeated_argument);
        assert_eq!(flags.conduct, Conduct::Professional);
        assert!(parsed.payload.is_some());
    }

    #[test]
    fn missing_keys_take_neutral_defaults() {
        let parsed = parse_reply(&reply(r#"{"turn_flags":{"conduct":"rude"}}"#));
        let flags = parsed.flags.expect("flags");
        assert_eq!(flags.conduct, Conduct::Rude);
        assert!(!flags.new_strong_argument);
        assert!(!flags.accepted_distraction);
        assert!(flags.hint.is_empty());
    }

    #[test]
    fn unrecognized_values_default() {
        let parsed = parse_reply(&reply(
            r#"{"turn_flags":{"conduct":"furious","new_strong_argument":"maybe","hint":42}}"#,
        ));
        let flags = parsed.flags.expect("flags");
        assert_eq!(flags, TurnFlags::neutral());
    }

    #[test]
    fn accepts_lowercase_and_boolean_yes() {
        let parsed = parse_reply(&reply(
            r#"{"turn_flags":{"new_strong_argument":"y","repeated_argument":true,"conduct":" Emotional "}}"#,
        ));
        let flags = parsed.flags.expect("flags");
        assert!(flags.new_strong_argument);
        assert!(flags.repeated_argument);
        assert_eq!(flags.conduct, Conduct::Emotional);
    }

    #[test]
    fn reply_without_block_has_no_classification() {
        let parsed = parse_reply("  Let's revisit this next quarter.  ");
        assert_eq!(parsed.dialogue, "Let's revisit this next quarter.");
        assert!(parsed.payload.is_none());
        assert!(parsed.flags.is_none());
    }

    #[test]
    fn malformed_json_is_not_a_classification() {
        let parsed = parse_reply(&reply(r#"{"turn_flags": {"conduct": "rude""#));
        assert!(parsed.payload.is_none());
        assert!(parsed.flags.is_none());
        assert_eq!(
            parsed.dialogue,
            "We value your contributions, but the band is fixed."
        );
    }

    #[test]
    fn payload_without_turn_flags_yields_no_flags() {
        let parsed = parse_reply(&reply(r#"{"flags":{"conduct":"rude"}}"#));
        assert!(parsed.payload.is_some());
        assert!(parsed.flags.is_none());
    }

    #[test]
    fn non_json_comment_is_ignored() {
        let parsed = parse_reply(&reply("internal note"));
        assert!(parsed.payload.is_none());
    }

    #[test]
    fn text_after_closing_marker_is_ignored() {
        let raw = format!(
            "{}\nP.S. trailing chatter <!-- {{\"turn_flags\":{{\"conduct\":\"rude\"}}}} -->",
            reply(r#"{"turn_flags":{"conduct":"emotional"}}"#)
        );
        let parsed = parse_reply(&raw);
        assert_eq!(parsed.flags.expect("flags").conduct, Conduct::Emotional);
        assert!(!parsed.dialogue.contains("P.S."));
    }

    #[test]
    fn unterminated_block_is_cut_from_dialogue() {
        let parsed = parse_reply("Fine. <!-- {\"turn_flags\":");
        assert_eq!(parsed.dialogue, "Fine.");
        assert!(parsed.flags.is_none());
    }

    #[test]
    fn wire_form_always_has_six_defined_keys() {
        let samples = [
            r#"{"turn_flags":{}}"#,
            r#"{"turn_flags":{"conduct":"inappropriate","hint":"x","extra":"dropped"}}"#,
            r#"{"turn_flags":{"new_strong_argument":"Y","repeated_argument":"Y","asked_amount_present":"Y","accepted_distraction":"Y"}}"#,
        ];
        for sample in samples {
            let flags = parse_reply(&reply(sample)).flags.expect("flags");
            let wire = to_wire(&flags);
            let object = wire["turn_flags"].as_object().expect("object");
            assert_eq!(object.len(), WIRE_KEYS.len());
            for key in WIRE_KEYS {
                assert!(object.get(key).is_some_and(Value::is_string), "{key} missing");
            }
            assert_eq!(normalize_flags(&wire["turn_flags"]), flags);
        }
    }
}

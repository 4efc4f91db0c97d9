//! Lenient extraction of structured data from raw agent text
//!
//! Models frequently wrap their JSON in prose or emit single-quoted
//! pseudo-JSON; extraction falls back progressively and never errors, the
//! caller keeps the raw text either way.

use oracle_core::Verdict;
use serde_json::Value;
use std::sync::OnceLock;

fn brace_block() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"(?s)\{.*\}").unwrap_or_else(|_| unreachable!("static pattern"))
    })
}

/// Pull a JSON object out of raw agent output
///
/// Tries the whole text as JSON first, then the outermost brace-delimited
/// block (normalizing single quotes), and gives up with `None`.
pub fn extract_json_like(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if value.is_object() {
            return Some(value);
        }
    }
    let block = brace_block().find(text)?.as_str();
    if let Ok(value) = serde_json::from_str::<Value>(block) {
        return Some(value);
    }
    serde_json::from_str(&block.replace('\'', "\"")).ok()
}

const RATINGS: [&str; 5] = ["STRONG BUY", "BUY", "HOLD", "SELL", "STRONG SELL"];
const CONFIDENCES: [&str; 3] = ["High", "Medium", "Low"];

/// Parse the judge's raw output into a structured verdict
///
/// Fields that cannot be recovered stay `None`; the raw text is always
/// preserved so nothing is lost when the model goes off-script.
pub fn parse_verdict(raw: &str) -> Verdict {
    let parsed = extract_json_like(raw);
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let rating = field("rating")
        .map(|r| r.trim().to_uppercase())
        .filter(|r| RATINGS.contains(&r.as_str()));
    let confidence = field("confidence").and_then(|c| {
        CONFIDENCES
            .iter()
            .find(|known| known.eq_ignore_ascii_case(c.trim()))
            .map(|known| (*known).to_string())
    });
    let justification = field("justification").filter(|j| !j.trim().is_empty());

    Verdict {
        rating,
        confidence,
        justification,
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_json() {
        let value = extract_json_like(r#"{"rating": "BUY"}"#).unwrap();
        assert_eq!(value, json!({"rating": "BUY"}));
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let text = "Here is my final answer:\n{\"rating\": \"HOLD\", \"confidence\": \"High\"}\nThank you.";
        let value = extract_json_like(text).unwrap();
        assert_eq!(value["rating"], "HOLD");
    }

    #[test]
    fn test_single_quoted_pseudo_json() {
        let value = extract_json_like("{'rating': 'SELL', 'confidence': 'Low'}").unwrap();
        assert_eq!(value["rating"], "SELL");
    }

    #[test]
    fn test_no_object_present() {
        assert!(extract_json_like("no structure here at all").is_none());
        assert!(extract_json_like("").is_none());
        // A bare JSON scalar is not an object
        assert!(extract_json_like("42").is_none());
    }

    #[test]
    fn test_verdict_full_parse() {
        let raw = r#"{"rating": "strong buy", "confidence": "high", "justification": "Solid fundamentals."}"#;
        let verdict = parse_verdict(raw);
        assert_eq!(verdict.rating.as_deref(), Some("STRONG BUY"));
        assert_eq!(verdict.confidence.as_deref(), Some("High"));
        assert_eq!(verdict.justification.as_deref(), Some("Solid fundamentals."));
        assert_eq!(verdict.raw, raw);
    }

    #[test]
    fn test_verdict_rejects_off_scale_rating() {
        let verdict = parse_verdict(r#"{"rating": "MEGA BUY", "confidence": "High"}"#);
        assert_eq!(verdict.rating, None);
        assert_eq!(verdict.confidence.as_deref(), Some("High"));
    }

    #[test]
    fn test_verdict_unparseable_keeps_raw() {
        let verdict = parse_verdict("I think this stock will do well.");
        assert_eq!(verdict.rating, None);
        assert_eq!(verdict.confidence, None);
        assert_eq!(verdict.justification, None);
        assert_eq!(verdict.raw, "I think this stock will do well.");
    }
}

//! Best-effort JSON extraction from free-text generator output.
//!
//! The generator is prompted to answer with a bare JSON object but may wrap
//! it in prose or markdown fences. Extraction takes the first brace-delimited
//! span and parses it; anything else is an [`ExtractError`].
//!
//! Two span rules are in use and must not be unified:
//!
//! - [`first_object_lazy`] stops at the first `}` after the first `{`. It only
//!   works for flat objects, which is what the disease-advice prompt asks for.
//! - [`first_object_greedy`] runs from the first `{` to the last `}`. Nested
//!   objects survive, but two separate top-level objects in one answer are
//!   merged into an unparsable span.
//!
//! Both are stopgaps for a generator without constrained output; a schema-
//! enforcing response mode would make this module unnecessary.

use std::sync::LazyLock;

use medrec_core::{DiseaseAdvice, InteractionReport};
use regex::Regex;
use thiserror::Error;

static LAZY_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*?\}").expect("valid regex"));
static GREEDY_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));
static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```json|```$").expect("valid regex"));

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("generator returned an empty response")]
    Empty,
    #[error("no JSON object found in response")]
    NoObject,
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// First `{...}` span, ending at the first closing brace.
pub fn first_object_lazy(text: &str) -> Option<&str> {
    LAZY_OBJECT.find(text).map(|m| m.as_str())
}

/// First `{...}` span, ending at the last closing brace.
pub fn first_object_greedy(text: &str) -> Option<&str> {
    GREEDY_OBJECT.find(text).map(|m| m.as_str())
}

/// Remove ```` ```json ```` at line starts and ```` ``` ```` at line ends, then trim.
pub fn strip_json_fences(text: &str) -> String {
    JSON_FENCE.replace_all(text.trim(), "").trim().to_string()
}

/// Parse disease advice from a generator answer (lazy span).
pub fn parse_disease_advice(text: &str) -> Result<DiseaseAdvice, ExtractError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }
    let span = first_object_lazy(text).ok_or(ExtractError::NoObject)?;
    Ok(serde_json::from_str(span)?)
}

/// Parse an interaction report from a generator answer (fences stripped,
/// greedy span). The `Interactions` key is required.
pub fn parse_interaction_report(text: &str) -> Result<InteractionReport, ExtractError> {
    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }
    let cleaned = strip_json_fences(text);
    let span = first_object_greedy(&cleaned).ok_or(ExtractError::NoObject)?;
    Ok(serde_json::from_str(span)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazy_stops_at_first_close() {
        let text = r#"noise {"a": 1} more {"b": 2}"#;
        assert_eq!(first_object_lazy(text), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn lazy_truncates_nested_objects() {
        let text = r#"{"outer": {"inner": 1}}"#;
        assert_eq!(first_object_lazy(text), Some(r#"{"outer": {"inner": 1}"#));
    }

    #[test]
    fn greedy_spans_to_last_close() {
        let text = "x {\"outer\": {\"inner\": 1}}\ny";
        assert_eq!(first_object_greedy(text), Some("{\"outer\": {\"inner\": 1}}"));
    }

    #[test]
    fn greedy_merges_separate_objects() {
        let text = r#"{"a": 1} and {"b": 2}"#;
        let span = first_object_greedy(text).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(span).is_err());
    }

    #[test]
    fn spans_cross_newlines() {
        let text = "{\n  \"Dosage\": \"x\"\n}";
        assert_eq!(first_object_lazy(text), Some(text));
        assert_eq!(first_object_greedy(text), Some(text));
    }

    #[test]
    fn no_braces_no_span() {
        assert_eq!(first_object_lazy("just prose"), None);
        assert_eq!(first_object_greedy("just prose"), None);
    }

    #[test]
    fn fences_are_stripped() {
        let text = "```json\n{\"Interactions\": []}\n```";
        assert_eq!(strip_json_fences(text), "{\"Interactions\": []}");
    }

    #[test]
    fn unfenced_text_untouched() {
        assert_eq!(strip_json_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn advice_passes_through_verbatim() {
        let text = r#"Here you go:
{
  "Dosage": "500 mg – twice daily (max 2 g/day)",
  "Side_Effects": "Nausea, headache; rarely rash",
  "Warnings": "Avoid alcohol! Consult a physician.",
  "Interactions": "Warfarin — increased bleeding risk"
}
Stay healthy."#;
        let advice = parse_disease_advice(text).unwrap();
        assert_eq!(
            advice.dosage.as_deref(),
            Some("500 mg – twice daily (max 2 g/day)")
        );
        assert_eq!(
            advice.side_effects.as_deref(),
            Some("Nausea, headache; rarely rash")
        );
        assert_eq!(
            advice.warnings.as_deref(),
            Some("Avoid alcohol! Consult a physician.")
        );
        assert_eq!(
            advice.interactions.as_deref(),
            Some("Warfarin — increased bleeding risk")
        );
    }

    #[test]
    fn advice_missing_key_is_none() {
        let advice = parse_disease_advice(r#"{"Dosage": "1 tablet"}"#).unwrap();
        assert_eq!(advice.dosage.as_deref(), Some("1 tablet"));
        assert!(advice.interactions.is_none());
    }

    #[test]
    fn advice_failures() {
        assert!(matches!(parse_disease_advice(""), Err(ExtractError::Empty)));
        assert!(matches!(parse_disease_advice("  \n "), Err(ExtractError::Empty)));
        assert!(matches!(
            parse_disease_advice("I cannot provide medical advice."),
            Err(ExtractError::NoObject)
        ));
        assert!(matches!(
            parse_disease_advice(r#"{"Dosage": "x",}"#),
            Err(ExtractError::Json(_))
        ));
        // Non-string field values do not fit the record.
        assert!(matches!(
            parse_disease_advice(r#"{"Dosage": ["a", "b"]}"#),
            Err(ExtractError::Json(_))
        ));
    }

    #[test]
    fn interaction_report_nested_objects() {
        let text = r#"```json
{
  "Interactions": [
    {"Drugs": "Warfarin + Aspirin", "Level": "Severe", "Description": "Bleeding risk."},
    {"Drugs": "Aspirin + Ibuprofen", "Level": "Moderate", "Description": "Reduced effect."}
  ]
}
```"#;
        let report = parse_interaction_report(text).unwrap();
        assert_eq!(report.interactions.len(), 2);
        assert_eq!(report.interactions[0].drugs, "Warfarin + Aspirin");
        assert_eq!(report.interactions[1].level, "Moderate");
    }

    #[test]
    fn interaction_report_failures() {
        assert!(matches!(parse_interaction_report(""), Err(ExtractError::Empty)));
        assert!(matches!(
            parse_interaction_report("No interactions known."),
            Err(ExtractError::NoObject)
        ));
        assert!(matches!(
            parse_interaction_report("```json\n{\"Interactions\": [\n```"),
            Err(ExtractError::NoObject)
        ));
        assert!(matches!(
            parse_interaction_report("```json\n{\"Interactions\": [}\n```"),
            Err(ExtractError::Json(_))
        ));
        assert!(matches!(
            parse_interaction_report(r#"{"Result": []}"#),
            Err(ExtractError::Json(_))
        ));
    }
}

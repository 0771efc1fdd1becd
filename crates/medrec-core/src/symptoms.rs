//! Symptom token normalization.

/// Turn symptom tokens into classifier input: underscores become spaces and
/// tokens are joined with single spaces. Order is preserved, nothing is
/// deduplicated.
pub fn symptoms_to_text<S: AsRef<str>>(symptoms: &[S]) -> String {
    symptoms
        .iter()
        .map(|s| s.as_ref().replace('_', " "))
        .collect::<Vec<_>>()
        .join(" ")
}

//! Generated advisory records returned by the enrichment client.
//!
//! Both record shapes have a fixed fallback that replaces the generated
//! value whenever the external service fails or answers with something that
//! does not parse. The two fallbacks differ in structure; clients depend on
//! both exact shapes.

use serde::{Deserialize, Serialize};

/// Placeholder used by both fallback records.
pub const NA: &str = "N/A";

/// Description carried by the single fallback interaction item.
pub const INTERACTION_UNAVAILABLE: &str = "Interaction information unavailable.";

/// Treatment advice for a disease: dosage, side effects, warnings, interactions.
///
/// Fields are passed through verbatim from the generator. A key the generator
/// omitted stays `None` and serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseAdvice {
    #[serde(rename = "Dosage", default)]
    pub dosage: Option<String>,
    #[serde(rename = "Side_Effects", default)]
    pub side_effects: Option<String>,
    #[serde(rename = "Warnings", default)]
    pub warnings: Option<String>,
    #[serde(rename = "Interactions", default)]
    pub interactions: Option<String>,
}

impl DiseaseAdvice {
    /// The fixed record substituted on any enrichment failure.
    pub fn fallback() -> Self {
        Self {
            dosage: Some(NA.to_string()),
            side_effects: Some(NA.to_string()),
            warnings: Some(NA.to_string()),
            interactions: Some(NA.to_string()),
        }
    }
}

/// Interaction level as prompted: one of four literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    None,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Classify a free-text level. Case-insensitive; `None` for anything
    /// outside the four literals (including the fallback `N/A`).
    pub fn parse(level: &str) -> Option<Self> {
        match level.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "mild" => Some(Self::Mild),
            "moderate" => Some(Self::Moderate),
            "severe" => Some(Self::Severe),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
        }
    }
}

/// One pairwise drug interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugInteractionItem {
    /// Pair label, e.g. `"Warfarin + Aspirin"`.
    #[serde(rename = "Drugs")]
    pub drugs: String,
    /// Level text as produced by the generator; see [`Severity::parse`].
    #[serde(rename = "Level")]
    pub level: String,
    #[serde(rename = "Description")]
    pub description: String,
}

impl DrugInteractionItem {
    pub fn severity(&self) -> Option<Severity> {
        Severity::parse(&self.level)
    }
}

/// Interaction check result for a set of drugs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionReport {
    #[serde(rename = "Interactions")]
    pub interactions: Vec<DrugInteractionItem>,
}

impl InteractionReport {
    /// The fixed single-item report substituted on any enrichment failure.
    pub fn fallback() -> Self {
        Self {
            interactions: vec![DrugInteractionItem {
                drugs: NA.to_string(),
                level: NA.to_string(),
                description: INTERACTION_UNAVAILABLE.to_string(),
            }],
        }
    }

    /// Highest recognised severity across all items.
    pub fn max_severity(&self) -> Option<Severity> {
        self.interactions.iter().filter_map(|i| i.severity()).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advice_fallback_serializes_to_four_na_strings() {
        let json = serde_json::to_value(DiseaseAdvice::fallback()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Dosage": "N/A",
                "Side_Effects": "N/A",
                "Warnings": "N/A",
                "Interactions": "N/A"
            })
        );
    }

    #[test]
    fn advice_missing_keys_become_null() {
        let advice: DiseaseAdvice = serde_json::from_str(r#"{"Dosage": "10 mg"}"#).unwrap();
        assert_eq!(advice.dosage.as_deref(), Some("10 mg"));
        assert!(advice.warnings.is_none());

        let json = serde_json::to_value(&advice).unwrap();
        assert!(json["Warnings"].is_null());
    }

    #[test]
    fn interaction_fallback_shape() {
        let json = serde_json::to_value(InteractionReport::fallback()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Interactions": [{
                    "Drugs": "N/A",
                    "Level": "N/A",
                    "Description": "Interaction information unavailable."
                }]
            })
        );
    }

    #[test]
    fn severity_parse_levels() {
        assert_eq!(Severity::parse("Severe"), Some(Severity::Severe));
        assert_eq!(Severity::parse(" mild "), Some(Severity::Mild));
        assert_eq!(Severity::parse("None"), Some(Severity::None));
        assert_eq!(Severity::parse("N/A"), None);
        assert_eq!(Severity::parse("Moderate to Severe"), None);
    }

    #[test]
    fn max_severity_ignores_unknown_levels() {
        let report: InteractionReport = serde_json::from_str(
            r#"{"Interactions": [
                {"Drugs": "A + B", "Level": "Mild", "Description": "x"},
                {"Drugs": "A + C", "Level": "Severe", "Description": "y"},
                {"Drugs": "B + C", "Level": "unknown", "Description": "z"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(report.max_severity(), Some(Severity::Severe));
        assert_eq!(InteractionReport::fallback().max_severity(), None);
    }
}

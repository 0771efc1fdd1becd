//! Prediction endpoint shapes and the static reference record.

use serde::{Deserialize, Serialize};

use crate::NOT_AVAILABLE;
use crate::advice::DiseaseAdvice;

/// Body of `POST /api/predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomsRequest {
    pub symptoms: Vec<String>,
}

/// Body of `POST /api/interactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRequest {
    pub drugs: Vec<String>,
}

/// Static, disease-keyed reference data. Misses are already resolved to
/// placeholders by the time a record is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub overview: String,
    pub diet: String,
    pub medication: String,
    pub precautions: Vec<String>,
    pub workout: String,
}

impl Default for ReferenceRecord {
    fn default() -> Self {
        Self {
            overview: NOT_AVAILABLE.to_string(),
            diet: NOT_AVAILABLE.to_string(),
            medication: NOT_AVAILABLE.to_string(),
            precautions: Vec::new(),
            workout: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Response of `POST /api/predict`: predicted disease plus static and
/// generated enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    #[serde(rename = "Disease")]
    pub disease: String,
    #[serde(rename = "Overview")]
    pub overview: String,
    #[serde(rename = "Diet")]
    pub diet: String,
    #[serde(rename = "Medication")]
    pub medication: String,
    #[serde(rename = "Precautions")]
    pub precautions: Vec<String>,
    #[serde(rename = "Workout")]
    pub workout: String,
    #[serde(rename = "Dosage")]
    pub dosage: Option<String>,
    #[serde(rename = "Side_Effects")]
    pub side_effects: Option<String>,
    #[serde(rename = "Warnings")]
    pub warnings: Option<String>,
    #[serde(rename = "Interactions")]
    pub interactions: Option<String>,
}

impl DiseaseInfo {
    pub fn assemble(disease: String, reference: ReferenceRecord, advice: DiseaseAdvice) -> Self {
        Self {
            disease,
            overview: reference.overview,
            diet: reference.diet,
            medication: reference.medication,
            precautions: reference.precautions,
            workout: reference.workout,
            dosage: advice.dosage,
            side_effects: advice.side_effects,
            warnings: advice.warnings,
            interactions: advice.interactions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reference_uses_placeholders() {
        let r = ReferenceRecord::default();
        assert_eq!(r.overview, "Not available");
        assert_eq!(r.workout, "Not available");
        assert!(r.precautions.is_empty());
    }

    #[test]
    fn assembled_response_field_names() {
        let info = DiseaseInfo::assemble(
            "Acne".into(),
            ReferenceRecord::default(),
            DiseaseAdvice::fallback(),
        );
        let json = serde_json::to_value(&info).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        for key in [
            "Disease",
            "Overview",
            "Diet",
            "Medication",
            "Precautions",
            "Workout",
            "Dosage",
            "Side_Effects",
            "Warnings",
            "Interactions",
        ] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert_eq!(json["Disease"], "Acne");
        assert_eq!(json["Dosage"], "N/A");
        assert_eq!(json["Precautions"], serde_json::json!([]));
    }
}

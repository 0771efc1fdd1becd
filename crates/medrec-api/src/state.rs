//! Application context shared by all handlers.

use std::sync::{Arc, Mutex};

use medrec_ai::{DiseasePredictor, Enricher};
use medrec_core::{DiseaseInfo, InteractionReport};
use medrec_store::ReferenceTables;
use tracing::{info, warn};

use crate::ApiError;

/// Everything a request needs, built once at startup.
///
/// Reference tables are read-only. The predictor sits behind a mutex because
/// a forward pass needs exclusive access to the inference session; it is only
/// ever locked from the blocking pool.
pub struct AppContext {
    references: ReferenceTables,
    predictor: Mutex<Box<dyn DiseasePredictor>>,
    enricher: Enricher,
}

impl AppContext {
    pub fn new(
        references: ReferenceTables,
        predictor: Box<dyn DiseasePredictor>,
        enricher: Enricher,
    ) -> Self {
        Self {
            references,
            predictor: Mutex::new(predictor),
            enricher,
        }
    }

    pub fn references(&self) -> &ReferenceTables {
        &self.references
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    /// Run the classifier on the blocking pool.
    pub async fn classify(self: &Arc<Self>, symptoms: Vec<String>) -> Result<String, ApiError> {
        let ctx = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            // A panic during an earlier forward pass fails only that request.
            let mut predictor = ctx.predictor.lock().unwrap_or_else(|poisoned| {
                warn!("classifier panicked on an earlier request, reusing session");
                ctx.predictor.clear_poison();
                poisoned.into_inner()
            });
            predictor.predict(&symptoms)
        })
        .await
        .map_err(|e| ApiError::Inference(e.into()))?
        .map_err(ApiError::Inference)
    }

    /// Classify, look up reference data, fetch generated advice, assemble.
    ///
    /// The generator is called on every request, including repeated labels.
    pub async fn predict_disease(
        self: &Arc<Self>,
        symptoms: Vec<String>,
    ) -> Result<DiseaseInfo, ApiError> {
        if symptoms.is_empty() {
            return Err(ApiError::Unprocessable(
                "symptoms must not be empty".to_string(),
            ));
        }

        let count = symptoms.len();
        let disease = self.classify(symptoms).await?;
        let reference = self.references.lookup(&disease);
        let advice = self.enricher.fetch_disease_info(&disease).await;

        info!(disease = %disease, symptoms = count, "prediction served");
        Ok(DiseaseInfo::assemble(disease, reference, advice))
    }

    /// Pairwise interaction report; never fails.
    pub async fn check_interactions(&self, drugs: &[String]) -> InteractionReport {
        let report = self.enricher.fetch_drug_interactions(drugs).await;
        info!(
            drugs = drugs.len(),
            interactions = report.interactions.len(),
            max_severity = report.max_severity().map(|s| s.as_str()).unwrap_or("unknown"),
            "interaction check served"
        );
        report
    }
}

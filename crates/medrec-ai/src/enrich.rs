//! LLM-backed enrichment: treatment advice per disease and drug-drug
//! interaction checks.
//!
//! Both operations always return a well-formed record. Every failure, from
//! transport errors and timeouts to empty or unparsable answers, is logged
//! and replaced by the record's fixed fallback.

use std::sync::Arc;
use std::time::Duration;

use medrec_core::{DiseaseAdvice, InteractionReport};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::extract::{parse_disease_advice, parse_interaction_report};
use crate::llm::{LlmError, TextGenerator};

/// Extra attempts after a failed call. Parse failures are not retried.
const RETRIES: usize = 1;

pub const DEFAULT_ADVICE_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_INTERACTION_MODEL: &str = "gemini-1.5-flash";

/// Outbound call policy and model selection.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub advice_model: String,
    pub interaction_model: String,
    /// Upper bound for one attempt, including queueing inside the client.
    pub timeout: Duration,
    /// Concurrent outbound calls allowed across all requests.
    pub max_concurrent: usize,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            advice_model: DEFAULT_ADVICE_MODEL.to_string(),
            interaction_model: DEFAULT_INTERACTION_MODEL.to_string(),
            timeout: Duration::from_secs(30),
            max_concurrent: 8,
        }
    }
}

/// Prompt for per-disease treatment advice. The disease name is inserted as-is.
pub fn disease_prompt(disease: &str) -> String {
    format!(
        "You are a medical assistant. Provide the following treatment details for the disease \"{disease}\":\n\
         1. Typical medication dosage\n\
         2. Common side effects\n\
         3. Important warnings patients should be aware of\n\
         4. Common medication interactions patients should know\n\
         \n\
         Return the result strictly in this JSON format with no text before or after:\n\
         {{\n  \"Dosage\": \"...\",\n  \"Side_Effects\": \"...\",\n  \"Warnings\": \"...\",\n  \"Interactions\": \"...\"\n}}"
    )
}

/// Prompt for pairwise interactions between `drugs`.
pub fn interaction_prompt(drugs: &[String]) -> String {
    let drug_list = drugs.join(", ");
    format!(
        "You are a medical assistant. Check if there are any interactions between the following drugs: {drug_list}.\n\
         Provide a detailed response in ONLY JSON format like this:\n\
         \n\
         {{\n  \"Interactions\": [\n    {{\n      \"Drugs\": \"DrugA + DrugB\",\n      \"Level\": \"None | Mild | Moderate | Severe\",\n      \"Description\": \"Short summary of the interaction or say 'No known interaction.'\"\n    }}\n  ]\n}}\n\
         \n\
         ONLY return this JSON object. Do NOT include any other text or markdown formatting."
    )
}

/// Enrichment client: prompt, bounded call with one retry, extraction, fallback.
pub struct Enricher {
    generator: Arc<dyn TextGenerator>,
    config: EnrichConfig,
    permits: Semaphore,
}

impl Enricher {
    pub fn new(generator: Arc<dyn TextGenerator>, config: EnrichConfig) -> Self {
        let permits = Semaphore::new(config.max_concurrent.max(1));
        Self {
            generator,
            config,
            permits,
        }
    }

    pub fn config(&self) -> &EnrichConfig {
        &self.config
    }

    /// Dosage, side effects, warnings, and interactions for `disease`.
    pub async fn fetch_disease_info(&self, disease: &str) -> DiseaseAdvice {
        let prompt = disease_prompt(disease);
        let text = match self.call(&self.config.advice_model, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(disease, error = %e, "disease advice call failed, using fallback");
                return DiseaseAdvice::fallback();
            }
        };

        match parse_disease_advice(&text) {
            Ok(advice) => advice,
            Err(e) => {
                warn!(
                    disease,
                    error = %e,
                    raw = %preview(&text),
                    "disease advice unparsable, using fallback"
                );
                DiseaseAdvice::fallback()
            }
        }
    }

    /// Pairwise interactions between `drugs`. An empty list is still sent.
    pub async fn fetch_drug_interactions(&self, drugs: &[String]) -> InteractionReport {
        let prompt = interaction_prompt(drugs);
        let text = match self.call(&self.config.interaction_model, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(drugs = drugs.len(), error = %e, "interaction call failed, using fallback");
                return InteractionReport::fallback();
            }
        };

        match parse_interaction_report(&text) {
            Ok(report) => report,
            Err(e) => {
                warn!(
                    drugs = drugs.len(),
                    error = %e,
                    raw = %preview(&text),
                    "interaction report unparsable, using fallback"
                );
                InteractionReport::fallback()
            }
        }
    }

    async fn call(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        // The semaphore is never closed, so acquire only fails after shutdown.
        let _permit = self.permits.acquire().await.ok();

        let mut attempt = 0;
        loop {
            let result =
                match tokio::time::timeout(self.config.timeout, self.generator.generate(model, prompt))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(LlmError::Timeout(self.config.timeout)),
                };

            match result {
                Ok(text) => return Ok(text),
                Err(e) if attempt < RETRIES => {
                    attempt += 1;
                    debug!(model, attempt, error = %e, "generative call failed, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

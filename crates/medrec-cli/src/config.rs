//! Command-line and environment configuration.
//!
//! Every flag falls back to an environment variable; `.env` in the working
//! directory is loaded before parsing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use medrec_ai::enrich::{DEFAULT_ADVICE_MODEL, DEFAULT_INTERACTION_MODEL};
use medrec_ai::llm::DEFAULT_BASE_URL;
use medrec_ai::{Classifier, EnrichConfig, Enricher, GeminiClient, LabelIndex};

/// Location of the exported classifier and its label index.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Directory holding `model.onnx` and `tokenizer.json`.
    #[arg(long, env = "MEDREC_MODEL_DIR", default_value = "model/clinicalbert_model")]
    pub model_dir: PathBuf,

    /// Class index → disease label JSON.
    #[arg(long, env = "MEDREC_LABELS", default_value = "model/id2label.json")]
    pub labels: PathBuf,
}

impl ModelArgs {
    pub fn load_classifier(&self) -> anyhow::Result<Classifier> {
        let labels = LabelIndex::load(&self.labels)
            .with_context(|| format!("loading label index {}", self.labels.display()))?;
        Classifier::load(&self.model_dir, labels)
            .with_context(|| format!("loading classifier from {}", self.model_dir.display()))
    }
}

/// Generative service settings.
#[derive(Args, Debug, Clone)]
pub struct LlmArgs {
    /// API key for the generative service.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub gemini_url: String,

    /// Model used for per-disease advice.
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_ADVICE_MODEL)]
    pub advice_model: String,

    /// Model used for drug interaction checks.
    #[arg(long, env = "GEMINI_INTERACTION_MODEL", default_value = DEFAULT_INTERACTION_MODEL)]
    pub interaction_model: String,

    /// Per-attempt time limit for one generative call.
    #[arg(long, env = "MEDREC_LLM_TIMEOUT_SECS", default_value_t = 30)]
    pub llm_timeout_secs: u64,

    /// Outbound calls allowed in flight at once.
    #[arg(long, env = "MEDREC_LLM_CONCURRENCY", default_value_t = 8)]
    pub llm_concurrency: usize,
}

impl LlmArgs {
    fn enrich_config(&self) -> EnrichConfig {
        EnrichConfig {
            advice_model: self.advice_model.clone(),
            interaction_model: self.interaction_model.clone(),
            timeout: Duration::from_secs(self.llm_timeout_secs.max(1)),
            max_concurrent: self.llm_concurrency,
        }
    }

    /// Build the enrichment client. Fails when no API key is configured.
    pub fn enricher(&self) -> anyhow::Result<Enricher> {
        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .context("GEMINI_API_KEY is not set (pass --api-key or add it to .env)")?;
        let config = self.enrich_config();
        let client = GeminiClient::new(&self.gemini_url, api_key, config.timeout)
            .context("building HTTP client")?;
        Ok(Enricher::new(Arc::new(client), config))
    }
}

/// `medrec serve` settings.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "MEDREC_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Directory holding the five reference CSV tables.
    #[arg(long, env = "MEDREC_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Origin allowed by CORS (credentials enabled).
    #[arg(long, env = "MEDREC_CORS_ORIGIN", default_value = "http://localhost:3000")]
    pub cors_origin: String,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub llm: LlmArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches, Parser};

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        serve: ServeArgs,
    }

    /// Parse with every env fallback detached, so the developer's shell and
    /// `.env` cannot change the outcome.
    fn parse(args: &[&str]) -> ServeArgs {
        let matches = Wrapper::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .try_get_matches_from(args.iter().copied())
            .unwrap();
        Wrapper::from_arg_matches(&matches).unwrap().serve
    }

    #[test]
    fn serve_defaults() {
        let s = parse(&["medrec", "--api-key", "k"]);
        assert_eq!(s.bind.port(), 8000);
        assert_eq!(s.cors_origin, "http://localhost:3000");
        assert_eq!(s.model.labels, PathBuf::from("model/id2label.json"));
        assert_eq!(s.llm.advice_model, "gemini-2.0-flash");
        assert_eq!(s.llm.interaction_model, "gemini-1.5-flash");

        let config = s.llm.enrich_config();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_concurrent, 8);
    }

    #[test]
    fn api_key_is_optional_at_parse_time() {
        let s = parse(&["medrec"]);
        assert!(s.llm.api_key.is_none());
        assert!(s.llm.enricher().is_err());
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let s = parse(&["medrec", "--api-key", "  "]);
        let err = s.llm.enricher().err().unwrap();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn api_key_builds_enricher() {
        let s = parse(&[
            "medrec",
            "--api-key",
            "k",
            "--llm-timeout-secs",
            "5",
            "--llm-concurrency",
            "2",
        ]);
        let enricher = s.llm.enricher().unwrap();
        assert_eq!(enricher.config().timeout, Duration::from_secs(5));
        assert_eq!(enricher.config().max_concurrent, 2);
    }
}

//! MedRec CLI: serve the prediction API, classify symptoms locally, and run
//! the offline data tooling.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use clap::{Parser, Subcommand};
use medrec_ai::DiseasePredictor;
use medrec_api::{AppContext, create_router};
use medrec_core::{DiseaseAdvice, DiseaseInfo};
use medrec_store::{DrugReview, ReferenceTables, recommend_drugs};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod display;
mod prepare;

use config::{LlmArgs, ModelArgs, ServeArgs};

#[derive(Parser, Debug)]
#[command(name = "medrec", author, version, about = "Symptom-based disease prediction and drug advice", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),

    /// Classify a symptom list and show reference data for the result.
    Predict {
        /// Symptom identifiers, e.g. `itching nodal_skin_eruptions`.
        #[arg(required = true)]
        symptoms: Vec<String>,

        /// Also fetch generated treatment advice.
        #[arg(long)]
        enrich: bool,

        /// Print the response body as JSON instead of a card.
        #[arg(long)]
        json: bool,

        #[arg(long, env = "MEDREC_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,

        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        llm: LlmArgs,
    },

    /// Check pairwise interactions between drugs.
    Interactions {
        #[arg(required = true)]
        drugs: Vec<String>,

        #[command(flatten)]
        llm: LlmArgs,
    },

    /// Flatten the one-hot symptom table into classifier training data.
    PrepareDataset {
        /// One-hot symptom CSV with a `prognosis` column.
        #[arg(long, default_value = "data/Training.csv")]
        training: PathBuf,

        #[arg(long, default_value = "model")]
        out_dir: PathBuf,
    },

    /// Encode the drug review corpus for the drug-condition classifier.
    PrepareReviews {
        #[arg(long, default_value = "data/drugsComTrain_raw.csv")]
        train: PathBuf,

        /// Held-out corpus; rows whose condition is not in `train` are dropped.
        #[arg(long)]
        test: Option<PathBuf>,

        #[arg(long, default_value = "model/drug_condition")]
        out_dir: PathBuf,
    },

    /// Rank drugs for a condition by mean review rating.
    RecommendDrugs {
        #[arg(long, default_value = "data/drugsComTrain_raw.csv")]
        reviews: PathBuf,

        #[arg(long)]
        condition: String,

        #[arg(long, default_value_t = 5)]
        top: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Populate the environment before clap reads env fallbacks.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Predict {
            symptoms,
            enrich,
            json,
            data_dir,
            model,
            llm,
        } => predict(symptoms, enrich, json, &data_dir, &model, &llm).await,
        Commands::Interactions { drugs, llm } => {
            let enricher = llm.enricher()?;
            let report = enricher.fetch_drug_interactions(&drugs).await;
            display::print_interactions(&report);
            Ok(())
        }
        Commands::PrepareDataset { training, out_dir } => {
            let stats = prepare::run_prepare_pipeline(&training, &out_dir)?;
            eprintln!(
                "Prepared {} examples across {} diseases in {:.1}s",
                stats.rows, stats.labels, stats.elapsed_secs
            );
            Ok(())
        }
        Commands::PrepareReviews {
            train,
            test,
            out_dir,
        } => {
            let stats = prepare::run_prepare_reviews_pipeline(&train, test.as_deref(), &out_dir)?;
            eprintln!(
                "Prepared {} training and {} test reviews across {} conditions \
                 ({} unseen test rows dropped) in {:.1}s",
                stats.train_rows, stats.test_rows, stats.labels, stats.unseen, stats.elapsed_secs
            );
            Ok(())
        }
        Commands::RecommendDrugs {
            reviews,
            condition,
            top,
        } => {
            let rows = DrugReview::read_all(&reviews)
                .with_context(|| format!("reading {}", reviews.display()))?;
            let scores = recommend_drugs(&rows, &condition, top);
            display::print_drug_table(&condition, &scores);
            Ok(())
        }
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    info!("medrec v{}", env!("CARGO_PKG_VERSION"));

    let cors_origin = HeaderValue::from_str(&args.cors_origin)
        .with_context(|| format!("invalid CORS origin {:?}", args.cors_origin))?;
    let enricher = args.llm.enricher()?;
    let references = ReferenceTables::load(&args.data_dir)
        .with_context(|| format!("loading reference tables from {}", args.data_dir.display()))?;
    let classifier = args.model.load_classifier()?;

    let ctx = Arc::new(AppContext::new(references, Box::new(classifier), enricher));
    let router = create_router(ctx, cors_origin);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    info!(addr = %args.bind, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
}

async fn predict(
    symptoms: Vec<String>,
    enrich: bool,
    json: bool,
    data_dir: &std::path::Path,
    model: &ModelArgs,
    llm: &LlmArgs,
) -> anyhow::Result<()> {
    let references = ReferenceTables::load(data_dir)
        .with_context(|| format!("loading reference tables from {}", data_dir.display()))?;
    let mut classifier = model.load_classifier()?;

    let disease = classifier.predict(&symptoms)?;
    let advice = if enrich {
        Some(llm.enricher()?.fetch_disease_info(&disease).await)
    } else {
        None
    };
    let info = local_disease_info(disease, &references, advice);

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        display::print_disease_card(&info);
    }
    Ok(())
}

/// Same shape as the `/api/predict` body; without enrichment the generated
/// fields carry the fallback strings.
fn local_disease_info(
    disease: String,
    references: &ReferenceTables,
    advice: Option<DiseaseAdvice>,
) -> DiseaseInfo {
    let reference = references.lookup(&disease);
    DiseaseInfo::assemble(disease, reference, advice.unwrap_or_else(DiseaseAdvice::fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unenriched_prediction_has_string_advice_fields() {
        let info = local_disease_info("Malaria".into(), &ReferenceTables::default(), None);
        let json = serde_json::to_value(&info).unwrap();
        for key in ["Dosage", "Side_Effects", "Warnings", "Interactions"] {
            assert_eq!(json[key], "N/A", "{key}");
        }
        assert_eq!(json["Overview"], "Not available");
    }

    #[test]
    fn enriched_prediction_keeps_generated_advice() {
        let advice = DiseaseAdvice {
            dosage: Some("500 mg".into()),
            ..DiseaseAdvice::fallback()
        };
        let info = local_disease_info("Malaria".into(), &ReferenceTables::default(), Some(advice));
        assert_eq!(info.dosage.as_deref(), Some("500 mg"));
        assert_eq!(info.warnings.as_deref(), Some("N/A"));
    }
}

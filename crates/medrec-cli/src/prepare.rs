//! Training data pipelines: flatten a source table to `(text, label)`
//! examples and write the label index used at inference time.
//!
//! - symptoms: one-hot symptom table, labels in first-appearance order
//! - reviews: drug review corpus, conditions as labels in sorted order

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use medrec_ai::LabelIndex;
use medrec_store::{ConditionEncoder, DrugReview, TrainingSet};
use serde::Serialize;

pub const EXAMPLES_FILE: &str = "train.jsonl";
pub const TEST_EXAMPLES_FILE: &str = "test.jsonl";
pub const LABELS_FILE: &str = "id2label.json";

pub struct PrepareStats {
    pub rows: usize,
    pub labels: usize,
    pub elapsed_secs: f64,
}

#[derive(Serialize)]
struct Example<'a> {
    text: &'a str,
    label: usize,
}

/// Read `training` → flatten rows to text → write `train.jsonl` and
/// `id2label.json` into `out_dir`.
pub fn run_prepare_pipeline(training: &Path, out_dir: &Path) -> anyhow::Result<PrepareStats> {
    let start = Instant::now();

    // 1. Read and flatten the symptom table.
    let set = TrainingSet::read(training)
        .with_context(|| format!("reading {}", training.display()))?;
    eprintln!(
        "  Read {} rows, {} diseases from {}",
        set.examples.len(),
        set.labels.len(),
        training.display()
    );
    anyhow::ensure!(!set.labels.is_empty(), "no labelled rows in {}", training.display());

    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    // 2. One JSON object per example.
    write_examples(&out_dir.join(EXAMPLES_FILE), &set.examples)?;

    // 3. Label index in first-appearance order.
    let labels_path = out_dir.join(LABELS_FILE);
    let rows = set.examples.len();
    let index = LabelIndex::from_labels(set.labels);
    index
        .write(&labels_path)
        .with_context(|| format!("writing {}", labels_path.display()))?;
    eprintln!("  Wrote {}", labels_path.display());

    Ok(PrepareStats {
        rows,
        labels: index.len(),
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

pub struct ReviewStats {
    pub train_rows: usize,
    pub test_rows: usize,
    /// Test rows left out because their condition never occurs in training.
    pub unseen: usize,
    pub labels: usize,
    pub elapsed_secs: f64,
}

/// Read review corpora → encode conditions → write `train.jsonl`,
/// `test.jsonl` (when `test` is given) and `id2label.json` into `out_dir`.
pub fn run_prepare_reviews_pipeline(
    train: &Path,
    test: Option<&Path>,
    out_dir: &Path,
) -> anyhow::Result<ReviewStats> {
    let start = Instant::now();

    // 1. Read the training corpus and fit the condition classes.
    let train_rows = DrugReview::read_all(train)
        .with_context(|| format!("reading {}", train.display()))?;
    let encoder = ConditionEncoder::fit(&train_rows);
    eprintln!(
        "  Read {} reviews, {} conditions from {}",
        train_rows.len(),
        encoder.classes().len(),
        train.display()
    );
    anyhow::ensure!(
        !encoder.classes().is_empty(),
        "no labelled reviews in {}",
        train.display()
    );

    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let train_examples = encoder.encode(&train_rows);
    write_examples(&out_dir.join(EXAMPLES_FILE), &train_examples)?;

    // 2. Held-out corpus, restricted to conditions seen in training.
    let (test_rows, unseen) = match test {
        Some(path) => {
            let rows = DrugReview::read_all(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let examples = encoder.encode(&rows);
            let unseen = rows.len() - examples.len();
            eprintln!(
                "  Read {} test reviews, dropped {unseen} with unseen conditions",
                rows.len()
            );
            write_examples(&out_dir.join(TEST_EXAMPLES_FILE), &examples)?;
            (examples.len(), unseen)
        }
        None => (0, 0),
    };

    // 3. Label index in sorted condition order.
    let labels_path = out_dir.join(LABELS_FILE);
    let index = LabelIndex::from_labels(encoder.into_classes());
    index
        .write(&labels_path)
        .with_context(|| format!("writing {}", labels_path.display()))?;
    eprintln!("  Wrote {}", labels_path.display());

    Ok(ReviewStats {
        train_rows: train_examples.len(),
        test_rows,
        unseen,
        labels: index.len(),
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

fn write_examples(path: &Path, examples: &[(String, usize)]) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for (text, label) in examples {
        serde_json::to_writer(&mut out, &Example { text, label: *label })?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    eprintln!("  Wrote {}", path.display());
    Ok(())
}

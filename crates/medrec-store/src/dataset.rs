//! Offline dataset readers: the one-hot symptom training table and the
//! drug-review corpus.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use arrow::record_batch::RecordBatch;
use medrec_core::symptoms_to_text;
use tracing::info;

use crate::StoreError;
use crate::csv::{cell, read_csv, string_column};

/// Label column of the symptom training table.
pub const PROGNOSIS_COLUMN: &str = "prognosis";

/// Symptom training table flattened to classifier text.
#[derive(Debug, Default)]
pub struct TrainingSet {
    /// `(text, label_id)` per row.
    pub examples: Vec<(String, usize)>,
    /// Label names indexed by id, in first-appearance order.
    pub labels: Vec<String>,
}

impl TrainingSet {
    /// Read a one-hot symptom table: every column except `prognosis` is a
    /// symptom; a cell equal to `1` marks the symptom present.
    ///
    /// Rows without a prognosis are skipped. Unnamed columns (trailing
    /// commas in the source file) are ignored.
    pub fn read(path: &Path) -> Result<Self, StoreError> {
        let batches = read_csv(path)?;
        let file = file_name(path);
        let set = Self::from_batches(&batches, &file)?;
        info!(
            rows = set.examples.len(),
            labels = set.labels.len(),
            "read symptom training table"
        );
        Ok(set)
    }

    fn from_batches(batches: &[RecordBatch], file: &str) -> Result<Self, StoreError> {
        let mut set = Self::default();
        let mut label_ids: HashMap<String, usize> = HashMap::new();

        for batch in batches {
            let labels = string_column(batch, PROGNOSIS_COLUMN, file)?;
            let schema = batch.schema();
            let symptom_cols: Vec<(&str, _)> = schema
                .fields()
                .iter()
                .map(|f| f.name().as_str())
                .filter(|name| *name != PROGNOSIS_COLUMN && !name.trim().is_empty())
                .filter(|name| !name.starts_with("Unnamed"))
                .filter_map(|name| string_column(batch, name, file).ok().map(|c| (name, c)))
                .collect();

            for row in 0..batch.num_rows() {
                let Some(label) = cell(labels, row) else {
                    continue;
                };
                let label = label.trim();

                let present: Vec<&str> = symptom_cols
                    .iter()
                    .filter(|(_, col)| cell(col, row).is_some_and(is_flag_set))
                    .map(|(name, _)| *name)
                    .collect();

                let next_id = set.labels.len();
                let id = *label_ids.entry(label.to_string()).or_insert_with(|| {
                    set.labels.push(label.to_string());
                    next_id
                });

                set.examples.push((symptoms_to_text(&present), id));
            }
        }

        Ok(set)
    }
}

fn is_flag_set(v: &str) -> bool {
    matches!(v.trim(), "1" | "1.0")
}

/// A single drug review row.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugReview {
    /// Empty when the source row has no drug name.
    pub drug: String,
    pub condition: String,
    pub review: String,
    pub rating: Option<f64>,
}

/// Mean rating of one drug for one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugScore {
    pub drug: String,
    pub mean_rating: f64,
    pub reviews: usize,
}

impl DrugReview {
    /// Read `drugName`, `condition`, `review`, `rating` columns.
    ///
    /// Rows with a missing condition or review are dropped. A missing drug
    /// name or an unparsable rating is kept as empty/`None`.
    pub fn read_all(path: &Path) -> Result<Vec<Self>, StoreError> {
        let batches = read_csv(path)?;
        let file = file_name(path);
        let mut reviews = Vec::new();
        let mut skipped = 0usize;

        for batch in &batches {
            let drugs = string_column(batch, "drugName", &file)?;
            let conditions = string_column(batch, "condition", &file)?;
            let texts = string_column(batch, "review", &file)?;
            let ratings = string_column(batch, "rating", &file)?;

            for row in 0..batch.num_rows() {
                let (Some(condition), Some(review)) = (cell(conditions, row), cell(texts, row))
                else {
                    skipped += 1;
                    continue;
                };
                reviews.push(Self {
                    drug: cell(drugs, row).unwrap_or_default().trim().to_string(),
                    condition: condition.trim().to_string(),
                    review: review.to_string(),
                    rating: cell(ratings, row).and_then(|r| r.trim().parse().ok()),
                });
            }
        }

        info!(count = reviews.len(), skipped, "read drug reviews");
        Ok(reviews)
    }
}

/// Condition → class id mapping for the review classifier.
///
/// Classes are the distinct conditions of the fitted rows in sorted order,
/// so the same corpus always yields the same ids regardless of row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionEncoder {
    classes: Vec<String>,
}

impl ConditionEncoder {
    pub fn fit(reviews: &[DrugReview]) -> Self {
        let classes: BTreeSet<&str> = reviews.iter().map(|r| r.condition.as_str()).collect();
        Self {
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn into_classes(self) -> Vec<String> {
        self.classes
    }

    /// Class id of `condition`, `None` when it was not seen during fitting.
    pub fn transform(&self, condition: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(condition))
            .ok()
    }

    /// `(review, label)` pairs; rows with an unseen condition are left out.
    pub fn encode(&self, reviews: &[DrugReview]) -> Vec<(String, usize)> {
        reviews
            .iter()
            .filter_map(|r| Some((r.review.clone(), self.transform(&r.condition)?)))
            .collect()
    }
}

/// Top `top_n` drugs for `condition` by mean rating, highest first.
/// Ties are broken by drug name. Rows without a drug name or rating do not count.
pub fn recommend_drugs(reviews: &[DrugReview], condition: &str, top_n: usize) -> Vec<DrugScore> {
    let mut accum: HashMap<&str, (f64, usize)> = HashMap::new();
    for r in reviews
        .iter()
        .filter(|r| r.condition == condition && !r.drug.is_empty())
    {
        let Some(rating) = r.rating else {
            continue;
        };
        let entry = accum.entry(r.drug.as_str()).or_insert((0.0, 0));
        entry.0 += rating;
        entry.1 += 1;
    }

    let mut scores: Vec<DrugScore> = accum
        .into_iter()
        .map(|(drug, (sum, count))| DrugScore {
            drug: drug.to_string(),
            mean_rating: sum / count as f64,
            reviews: count,
        })
        .collect();

    scores.sort_by(|a, b| {
        b.mean_rating
            .partial_cmp(&a.mean_rating)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.drug.cmp(&b.drug))
    });
    scores.truncate(top_n);
    scores
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn training_rows_become_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Training.csv");
        fs::write(
            &path,
            "itching,skin_rash,nodal_skin_eruptions,continuous_sneezing,prognosis,\n\
             1,1,1,0,Fungal infection,\n\
             0,0,0,1,Allergy,\n\
             1,0,1,0,Fungal infection,\n",
        )
        .unwrap();

        let set = TrainingSet::read(&path).unwrap();
        assert_eq!(set.labels, vec!["Fungal infection", "Allergy"]);
        assert_eq!(set.examples.len(), 3);
        assert_eq!(
            set.examples[0],
            ("itching skin rash nodal skin eruptions".to_string(), 0)
        );
        assert_eq!(set.examples[1], ("continuous sneezing".to_string(), 1));
        assert_eq!(
            set.examples[2],
            ("itching nodal skin eruptions".to_string(), 0)
        );
    }

    #[test]
    fn training_without_prognosis_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Training.csv");
        fs::write(&path, "itching,skin_rash\n1,0\n").unwrap();
        let err = TrainingSet::read(&path).unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn { .. }));
    }

    fn reviews_fixture() -> Vec<DrugReview> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("drugsComTrain_raw.csv");
        fs::write(
            &path,
            "uniqueID,drugName,condition,review,rating,date,usefulCount\n\
             1,Sertraline,Depression,\"\"\"Helped a lot, slowly.\"\"\",9,\"May 20, 2012\",27\n\
             2,Sertraline,Depression,\"Meh\",7,\"May 21, 2012\",3\n\
             3,Bupropion,Depression,\"Great\",10,\"June 1, 2013\",5\n\
             4,Citalopram,Depression,\"Fine\",8,\"June 2, 2013\",1\n\
             5,Fluoxetine,,\"No condition\",10,\"June 3, 2013\",1\n\
             6,Ibuprofen,Pain,,6,\"June 4, 2013\",1\n\
             7,Naproxen,Pain,\"ok\",5,\"June 5, 2013\",1\n",
        )
        .unwrap();
        DrugReview::read_all(&path).unwrap()
    }

    #[test]
    fn reviews_without_condition_or_text_are_dropped() {
        let reviews = reviews_fixture();
        assert_eq!(reviews.len(), 5);
        assert!(reviews.iter().all(|r| r.drug != "Fluoxetine"));
        assert!(reviews.iter().all(|r| r.drug != "Ibuprofen"));
    }

    #[test]
    fn recommend_ranks_by_mean_rating() {
        let reviews = reviews_fixture();
        let top = recommend_drugs(&reviews, "Depression", 5);
        let names: Vec<&str> = top.iter().map(|s| s.drug.as_str()).collect();
        assert_eq!(names, vec!["Bupropion", "Citalopram", "Sertraline"]);
        assert_eq!(top[2].reviews, 2);
        assert!((top[2].mean_rating - 8.0).abs() < 1e-9);
    }

    fn review(drug: &str, condition: &str, text: &str, rating: Option<f64>) -> DrugReview {
        DrugReview {
            drug: drug.into(),
            condition: condition.into(),
            review: text.into(),
            rating,
        }
    }

    #[test]
    fn recommend_truncates_and_breaks_ties_by_name() {
        let reviews = vec![
            review("B", "X", "b", Some(5.0)),
            review("A", "X", "a", Some(5.0)),
            review("C", "X", "c", Some(1.0)),
        ];
        let top = recommend_drugs(&reviews, "X", 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].drug, "A");
        assert_eq!(top[1].drug, "B");
    }

    #[test]
    fn recommend_skips_rows_without_rating() {
        let reviews = vec![
            review("A", "X", "a", Some(4.0)),
            review("A", "X", "a", None),
            review("", "X", "nameless", Some(10.0)),
        ];
        let top = recommend_drugs(&reviews, "X", 5);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].reviews, 1);
        assert!((top[0].mean_rating - 4.0).abs() < 1e-9);
    }

    #[test]
    fn recommend_unknown_condition_is_empty() {
        let reviews = reviews_fixture();
        assert!(recommend_drugs(&reviews, "Migraine", 5).is_empty());
    }

    #[test]
    fn review_text_is_kept() {
        let reviews = reviews_fixture();
        assert_eq!(reviews[0].review, "\"Helped a lot, slowly.\"");
        assert_eq!(reviews[0].rating, Some(9.0));
    }

    #[test]
    fn condition_classes_are_sorted() {
        let reviews = vec![
            review("A", "Pain", "p", None),
            review("B", "Depression", "d", None),
            review("C", "Acne", "a", None),
            review("D", "Pain", "p2", None),
        ];
        let encoder = ConditionEncoder::fit(&reviews);
        assert_eq!(encoder.classes(), ["Acne", "Depression", "Pain"]);
        assert_eq!(
            encoder.encode(&reviews),
            vec![
                ("p".to_string(), 2),
                ("d".to_string(), 1),
                ("a".to_string(), 0),
                ("p2".to_string(), 2),
            ]
        );
    }

    #[test]
    fn unseen_conditions_are_filtered() {
        let train = vec![
            review("A", "Depression", "d", None),
            review("B", "Pain", "p", None),
        ];
        let test = vec![
            review("C", "Pain", "kept", None),
            review("D", "Migraine", "dropped", None),
        ];
        let encoder = ConditionEncoder::fit(&train);
        assert_eq!(encoder.transform("Migraine"), None);
        assert_eq!(encoder.encode(&test), vec![("kept".to_string(), 1)]);
    }
}

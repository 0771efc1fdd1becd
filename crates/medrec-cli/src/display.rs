//! Vertical card display for prediction results and interaction reports.

use medrec_core::{DiseaseInfo, InteractionReport};
use medrec_store::DrugScore;

const MAX_LIST_ITEMS: usize = 10;

// ── Public API ──

/// Print a prediction as a card grouped into reference and generated sections.
pub fn print_disease_card(info: &DiseaseInfo) {
    println!("=== {} ===", info.disease);
    println!();

    println!("Reference");
    print_field("Overview", &info.overview);
    print_field("Diet", &info.diet);
    print_field("Medication", &info.medication);
    print_field("Workout", &info.workout);
    print_list("Precautions", &info.precautions);

    let generated = [
        ("Dosage", &info.dosage),
        ("Side effects", &info.side_effects),
        ("Warnings", &info.warnings),
        ("Interactions", &info.interactions),
    ];
    if generated.iter().any(|(_, v)| v.is_some()) {
        println!("Treatment");
        for (name, value) in generated {
            print_field(name, value.as_deref().unwrap_or("-"));
        }
    }
}

/// Print one line per drug pair, most severe first.
pub fn print_interactions(report: &InteractionReport) {
    let mut items: Vec<_> = report.interactions.iter().collect();
    items.sort_by_key(|i| std::cmp::Reverse(i.severity()));

    println!("=== Interactions ({}) ===", items.len());
    for item in items {
        println!("  {:<26} [{}] {}", item.drugs, item.level, item.description);
    }
}

pub fn print_drug_table(condition: &str, scores: &[DrugScore]) {
    println!("=== Top drugs for {condition} ===");
    if scores.is_empty() {
        println!("  (no reviews)");
        return;
    }
    println!("  {:<4} {:<30} {:>6} {:>8}", "#", "drug", "rating", "reviews");
    for (rank, s) in scores.iter().enumerate() {
        println!(
            "  {:<4} {:<30} {:>6.2} {:>8}",
            rank + 1,
            s.drug,
            s.mean_rating,
            s.reviews
        );
    }
}

// ── Helpers ──

fn print_field(name: &str, value: &str) {
    println!("  {:<14} {}", name, value);
}

fn print_list(name: &str, items: &[String]) {
    if items.is_empty() {
        print_field(name, "-");
        return;
    }
    println!("  {name}");
    for item in items.iter().take(MAX_LIST_ITEMS) {
        println!("    - {item}");
    }
    if items.len() > MAX_LIST_ITEMS {
        println!("    ... and {} more", items.len() - MAX_LIST_ITEMS);
    }
}

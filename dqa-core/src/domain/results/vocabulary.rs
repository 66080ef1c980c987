// dqa-core/src/domain/results/vocabulary.rs
//
// Controlled values of a results file.

/// Template generation in the older layouts writes one row per goal.
pub const GOALS: [&str; 4] = ["Fidelity", "Consistency", "Accuracy", "Feasibility"];

/// Expansion of `in (*)` in rule files, in this order.
pub const PREVALENCES: [&str; 5] = ["full", "high", "medium", "low", "unknown"];

pub const PREVALENCE_UNKNOWN: &str = "unknown";

pub const CAUSES: [&str; 6] = [
    "ETL",
    "unknown",
    "provenance",
    "non-issue",
    "i2b2 transform",
    "administrative",
];

pub const STATUSES: [&str; 5] = [
    "new",
    "under review",
    "solution proposed",
    "withdrawn",
    "persistent",
];

/// Vocabulary tables never get a results file.
pub const EXCLUDED_TABLES: [&str; 9] = [
    "concept",
    "concept_ancestor",
    "concept_class",
    "concept_relationship",
    "concept_synonym",
    "domain",
    "source_to_concept_map",
    "relationship",
    "vocabulary",
];

/// Membership test that ignores surrounding whitespace (values are otherwise exact).
pub fn contains(list: &[&str], value: &str) -> bool {
    let value = value.trim();
    list.iter().any(|x| *x == value)
}

pub fn is_excluded_table(table: &str) -> bool {
    EXCLUDED_TABLES.contains(&table)
}

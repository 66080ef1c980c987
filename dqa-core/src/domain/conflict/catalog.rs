// dqa-core/src/domain/conflict/catalog.rs

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::ident::normalize;

/// Count bounds attached to a conflict for the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Threshold {
    pub lower: i64,
    pub upper: i64,
}

impl Threshold {
    /// Bounds from raw catalog cells; anything non-numeric counts as 0.
    pub fn from_cells(lower: &str, upper: &str) -> Self {
        Self {
            lower: lower.trim().parse().unwrap_or(0),
            upper: upper.trim().parse().unwrap_or(0),
        }
    }
}

// Catalog files are named `<CODE>_<anything>`.
fn check_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-C][A-C]-\d{3})_")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

/// Check code a catalog file belongs to, if its name follows the convention.
pub fn check_code_from_file_name(name: &str) -> Option<&str> {
    check_code_regex()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Issue code → (table, field) → threshold. Keys are normalized.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    codes: HashMap<String, HashMap<(String, String), Threshold>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Knows the given codes, all with zero bounds.
    pub fn with_codes<'a>(codes: impl IntoIterator<Item = &'a str>) -> Self {
        let mut catalog = Self::new();
        for code in codes {
            catalog.add_code(code);
        }
        catalog
    }

    /// Registers an issue code with no thresholds yet.
    pub fn add_code(&mut self, issue_code: &str) {
        self.codes.entry(normalize(issue_code)).or_default();
    }

    pub fn insert(&mut self, issue_code: &str, table: &str, field: &str, threshold: Threshold) {
        self.codes
            .entry(normalize(issue_code))
            .or_default()
            .insert((normalize(table), normalize(field)), threshold);
    }

    pub fn contains_code(&self, issue_code: &str) -> bool {
        self.codes.contains_key(&normalize(issue_code))
    }

    /// `None` when the code is unknown. A known code without an entry for the
    /// (table, field) pair yields zero bounds.
    pub fn threshold(&self, issue_code: &str, table: &str, field: &str) -> Option<Threshold> {
        let checks = self.codes.get(&normalize(issue_code))?;
        Some(
            checks
                .get(&(normalize(table), normalize(field)))
                .copied()
                .unwrap_or_default(),
        )
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

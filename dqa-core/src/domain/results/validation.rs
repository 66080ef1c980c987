// dqa-core/src/domain/results/validation.rs

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::domain::results::report::ReportFile;
use crate::domain::results::schema::{Column, SchemaVersion};
use crate::domain::results::vocabulary::{self, CAUSES, GOALS, PREVALENCES, STATUSES};

fn re_semver() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?$").unwrap_or_else(
            |_| {
                // Hardcoded pattern, kept free of panicking calls.
                Regex::new("$^").unwrap_or_else(|_| unreachable!())
            },
        )
    })
}

/// Checks every record against the controlled vocabularies.
///
/// Returns the offending record index mapped to one message per bad value,
/// e.g. `status = 'closed'`. An empty map means the file is clean.
pub fn validate_report(file: &ReportFile) -> BTreeMap<usize, Vec<String>> {
    let mut errors: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    let checks_goal = file.version.has(Column::Goal);

    for (idx, r) in file.records.iter().enumerate() {
        let mut push = |msg: String| errors.entry(idx).or_default().push(msg);

        if !re_semver().is_match(r.model_version.trim()) {
            push(format!("model version = '{}'", r.model_version));
        }

        if checks_goal && !vocabulary::contains(&GOALS, &r.goal) {
            push(format!("goal = '{}'", r.goal));
        }

        if !r.prevalence.is_empty() && !vocabulary::contains(&PREVALENCES, &r.prevalence) {
            push(format!("prevalence = '{}'", r.prevalence));
        }

        if let Some(raw) = r.invalid_rank() {
            push(format!("rank = '{}'", raw));
        }

        if !r.cause.is_empty() && !vocabulary::contains(&CAUSES, &r.cause) {
            push(format!("cause = '{}'", r.cause));
        }

        if !r.status.is_empty() && !vocabulary::contains(&STATUSES, &r.status) {
            push(format!("status = '{}'", r.status));
        }
    }

    errors
}

/// Whether the layout of a file is older than the newest one.
pub fn needs_migration(file: &ReportFile) -> bool {
    file.version < SchemaVersion::LATEST
}

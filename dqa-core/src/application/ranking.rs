// dqa-core/src/application/ranking.rs

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, instrument, warn, Instrument};

use crate::domain::error::DomainError;
use crate::domain::ports::SchemaProvider;
use crate::domain::project::RuleSetConfig;
use crate::domain::results::{Rank, ReportFile};
use crate::domain::rules::{ParsedRuleSet, RankEngine};
use crate::error::DqaError;
use crate::infrastructure::codec::write_report;
use crate::infrastructure::rules::parse_rule_text;
use crate::ports::RuleSource;

/// Fetches every configured rule set in its own task and parses them in
/// configuration order. The first failed fetch fails the whole load and
/// aborts the fetches still running.
#[instrument(skip_all, fields(rule_sets = configs.len()))]
pub async fn load_rule_sets(
    source: Arc<dyn RuleSource>,
    configs: &[RuleSetConfig],
    schema: &dyn SchemaProvider,
) -> Result<Vec<ParsedRuleSet>, DqaError> {
    let mut fetches = JoinSet::new();
    for (index, config) in configs.iter().enumerate() {
        let source = Arc::clone(&source);
        let name = config.name.clone();
        let location = config.location.clone();
        fetches.spawn(
            async move {
                info!(rule_set = %name, from = %source.describe(&location), "Fetching rules");
                (index, source.fetch(&location).await)
            }
            .in_current_span(),
        );
    }

    let mut texts: Vec<Option<String>> = vec![None; configs.len()];
    while let Some(joined) = fetches.join_next().await {
        let (index, text) = joined
            .map_err(|e| DqaError::InternalError(format!("rule fetch task failed: {}", e)))?;
        texts[index] = Some(text?);
    }

    configs
        .iter()
        .zip(texts)
        .map(|(config, text)| {
            let text = text.ok_or_else(|| {
                DqaError::InternalError(format!("rules for '{}' were never fetched", config.name))
            })?;
            parse_rule_text(&config.name, &text, schema)
        })
        .collect()
}

/// Builds the engine from parsed rule sets. Refuses any set with parse or
/// validation errors; callers report [`ParsedRuleSet::messages`] first.
pub fn build_engine(
    parsed: Vec<ParsedRuleSet>,
    configs: &[RuleSetConfig],
) -> Result<RankEngine, DomainError> {
    let mut rule_sets = Vec::with_capacity(parsed.len());

    for parsed in parsed {
        let scope = configs
            .iter()
            .find(|c| c.name == parsed.name)
            .and_then(|c| c.tables.clone());

        let set = parsed.into_rule_set()?;
        rule_sets.push(match scope {
            Some(tables) => set.scoped(tables),
            None => set,
        });
    }

    let engine = RankEngine::new(rule_sets);
    info!(
        rule_sets = engine.rule_sets().len(),
        rules = engine.rule_count(),
        "Rank engine ready"
    );
    Ok(engine)
}

/// One classified finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankMatch {
    pub file: String,
    pub rule_set: String,
    pub table: String,
    pub field: String,
    pub goal: String,
    pub issue_code: String,
    pub prevalence: String,
    pub previous: Rank,
    pub rank: Rank,
    pub changed: bool,
    pub persistent: bool,
}

#[derive(Debug, Default)]
pub struct RankSummary {
    /// Sorted by rule set, table, field.
    pub matches: Vec<RankMatch>,
    /// Files with at least one changed rank.
    pub changed_files: Vec<String>,
    pub records: usize,
}

impl RankSummary {
    pub fn changed(&self) -> usize {
        self.matches.iter().filter(|m| m.changed).count()
    }
}

/// Classifies every record and updates stale ranks in place.
pub fn assign_ranks(engine: &RankEngine, reports: &mut BTreeMap<String, ReportFile>) -> RankSummary {
    let mut summary = RankSummary::default();

    for (name, report) in reports.iter_mut() {
        let mut file_changed = false;

        for record in report.records.iter_mut() {
            summary.records += 1;
            let persistent = record.is_persistent();

            let Some(assignment) = engine.assign(record) else {
                continue;
            };
            file_changed |= assignment.changed;

            summary.matches.push(RankMatch {
                file: name.clone(),
                rule_set: assignment.rule_set,
                table: record.table.clone(),
                field: record.field.clone(),
                goal: record.goal.clone(),
                issue_code: record.issue_code.clone(),
                prevalence: record.prevalence.clone(),
                previous: assignment.previous,
                rank: assignment.rank,
                changed: assignment.changed,
                persistent,
            });
        }

        if file_changed {
            summary.changed_files.push(name.clone());
        }
    }

    summary.matches.sort_by(|a, b| {
        (&a.rule_set, &a.table, &a.field).cmp(&(&b.rule_set, &b.table, &b.field))
    });
    summary
}

/// Rewrites the files listed as changed. Failures are logged per file and
/// returned so the caller can report them after the summary.
pub fn write_changed(
    dir: &Path,
    reports: &BTreeMap<String, ReportFile>,
    changed_files: &[String],
) -> Vec<(String, DqaError)> {
    let mut failures = Vec::new();

    for name in changed_files {
        let Some(report) = reports.get(name) else {
            continue;
        };
        match write_report(dir, report) {
            Ok(()) => info!(file = %name, "Saved ranks"),
            Err(e) => {
                warn!(file = %name, error = %e, "Failed to save ranks");
                failures.push((name.clone(), e));
            }
        }
    }

    failures
}

// dqa-core/src/application/merge.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::domain::conflict::{apply_resolution, check_batch, scan, Catalog, Conflict, MatchKey, ScanOutcome};
use crate::domain::error::DomainError;
use crate::domain::results::{ReportFile, ResultRecord};
use crate::error::DqaError;
use crate::infrastructure::codec::write_report;
use crate::infrastructure::issue_log::read_issue_log_file;
use crate::ports::{CatalogSource, ConflictResolver};

/// New findings from one issue log file.
#[derive(Debug, Clone)]
pub struct IssueLog {
    pub name: String,
    pub findings: Vec<ResultRecord>,
}

/// Reads issue logs in the order given. One unreadable log does not stop
/// the others; its error is returned alongside.
pub fn load_issue_logs(paths: &[PathBuf]) -> (Vec<IssueLog>, Vec<(String, DqaError)>) {
    let mut logs = Vec::new();
    let mut errors = Vec::new();

    for path in paths {
        let name = path.display().to_string();
        match read_issue_log_file(path) {
            Ok(findings) => {
                debug!(log = %name, findings = findings.len(), "Read issue log");
                logs.push(IssueLog { name, findings });
            }
            Err(e) => {
                warn!(log = %name, error = %e, "Failed to read issue log");
                errors.push((name, e));
            }
        }
    }

    (logs, errors)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileMerge {
    pub appended: usize,
    pub resolved: usize,
}

impl FileMerge {
    pub fn merged(&self) -> usize {
        self.appended + self.resolved
    }
}

#[derive(Debug, Default)]
pub struct MergeSummary {
    /// Every report file that received at least one change.
    pub files: BTreeMap<String, FileMerge>,
    pub conflicts: usize,
    /// Conflicts whose issue code the catalog does not know; never sent.
    pub unresolved: Vec<Conflict>,
    pub log_errors: Vec<(String, DqaError)>,
    /// Catalog or resolver failure. No resolution was applied.
    pub resolution_error: Option<DqaError>,
    pub write_errors: Vec<(String, DqaError)>,
    pub saved: Vec<String>,
}

impl MergeSummary {
    pub fn merged(&self) -> usize {
        self.files.values().map(FileMerge::merged).sum()
    }

    pub fn is_success(&self) -> bool {
        self.log_errors.is_empty() && self.resolution_error.is_none() && self.write_errors.is_empty()
    }
}

pub struct MergeRequest<'a> {
    pub dir: &'a Path,
    pub match_key: MatchKey,
    pub dry_run: bool,
    pub catalog: Option<&'a dyn CatalogSource>,
    pub resolver: &'a dyn ConflictResolver,
}

/// Appends unmatched findings of one log and returns its conflicts.
///
/// Every table the log mentions must have a report file; otherwise nothing
/// from this log is merged.
pub fn collect_findings(
    reports: &mut BTreeMap<String, ReportFile>,
    findings: Vec<ResultRecord>,
    key: MatchKey,
    merged: &mut BTreeMap<String, FileMerge>,
) -> Result<Vec<Conflict>, DomainError> {
    if let Some(missing) = findings
        .iter()
        .map(|f| ReportFile::file_name_for(&f.table))
        .find(|name| !reports.contains_key(name))
    {
        return Err(DomainError::MissingReport(missing));
    }

    let mut conflicts = Vec::new();

    for finding in findings {
        let name = ReportFile::file_name_for(&finding.table);
        let Some(report) = reports.get_mut(&name) else {
            return Err(DomainError::MissingReport(name));
        };

        match scan(report, &finding, key) {
            ScanOutcome::New => {
                report.records.push(finding);
                merged.entry(name).or_default().appended += 1;
            }
            ScanOutcome::Conflict(index) => {
                let secondary = report.records[index].clone();
                conflicts.push(Conflict::new(name, index, finding, secondary));
            }
            ScanOutcome::Represented(index) => {
                debug!(file = %name, index, "Finding already represented");
            }
        }
    }

    Ok(conflicts)
}

/// Attaches catalog thresholds. Returns the batch for the resolver and the
/// conflicts whose issue code the catalog does not know.
pub fn annotate(conflicts: Vec<Conflict>, catalog: &Catalog) -> (Vec<Conflict>, Vec<Conflict>) {
    let mut batch = Vec::with_capacity(conflicts.len());
    let mut unresolved = Vec::new();

    for mut conflict in conflicts {
        match catalog.threshold(conflict.issue_code(), conflict.table(), conflict.field()) {
            Some(threshold) => {
                conflict.set_threshold(threshold);
                batch.push(conflict);
            }
            None => {
                warn!(
                    table = %conflict.table(),
                    field = %conflict.field(),
                    issue_code = %conflict.issue_code(),
                    "Unresolved conflict: issue code not in catalog"
                );
                unresolved.push(conflict);
            }
        }
    }

    (batch, unresolved)
}

/// Sends the batch and applies the answer by position. Nothing is applied
/// unless the whole answer is well formed.
pub async fn resolve_conflicts(
    resolver: &dyn ConflictResolver,
    batch: &[Conflict],
    reports: &mut BTreeMap<String, ReportFile>,
    merged: &mut BTreeMap<String, FileMerge>,
) -> Result<usize, DqaError> {
    if batch.is_empty() {
        return Ok(0);
    }

    let answer = resolver.resolve(batch).await?;
    check_batch(batch.len(), answer.len())?;

    for conflict in batch {
        let in_range = reports
            .get(&conflict.file)
            .is_some_and(|report| conflict.index < report.records.len());
        if !in_range {
            return Err(DomainError::ResolverProtocol(format!(
                "conflict for '{}' does not point at an existing record",
                conflict.file
            ))
            .into());
        }
    }

    let mut applied = 0;
    for (conflict, resolved) in batch.iter().zip(answer) {
        let Some(report) = reports.get_mut(&conflict.file) else {
            continue;
        };
        let written = apply_resolution(report, conflict, resolved)?;
        if written > 0 {
            info!(
                table = %conflict.table(),
                field = %conflict.field(),
                issue_code = %conflict.issue_code(),
                records = written,
                "Resolved conflict"
            );
            merged.entry(conflict.file.clone()).or_default().resolved += written;
            applied += written;
        }
    }

    Ok(applied)
}

/// Full merge run over a loaded report directory.
#[instrument(skip_all, fields(dir = %request.dir.display(), logs = logs.len()))]
pub async fn merge_issues(
    request: &MergeRequest<'_>,
    reports: &mut BTreeMap<String, ReportFile>,
    logs: Vec<IssueLog>,
) -> MergeSummary {
    let mut summary = MergeSummary::default();
    let mut conflicts = Vec::new();

    for log in logs {
        match collect_findings(reports, log.findings, request.match_key, &mut summary.files) {
            Ok(found) => conflicts.extend(found),
            Err(e) => {
                warn!(log = %log.name, error = %e, "Issue log not merged");
                summary.log_errors.push((log.name, e.into()));
            }
        }
    }
    summary.conflicts = conflicts.len();

    if !conflicts.is_empty() {
        let catalog = match request.catalog {
            Some(source) => source.load().await,
            None => Ok(Catalog::with_codes(conflicts.iter().map(Conflict::issue_code))),
        };

        match catalog {
            Ok(catalog) => {
                let (batch, unresolved) = annotate(conflicts, &catalog);
                summary.unresolved = unresolved;
                info!(batch = batch.len(), "Sending conflicts to resolver");

                if let Err(e) =
                    resolve_conflicts(request.resolver, &batch, reports, &mut summary.files).await
                {
                    warn!(error = %e, "Conflict resolution failed");
                    summary.resolution_error = Some(e);
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load catalog");
                summary.resolution_error = Some(e);
            }
        }
    }

    for name in summary.files.keys() {
        let Some(report) = reports.get_mut(name) else {
            continue;
        };
        report.sort_by_field();

        if request.dry_run {
            continue;
        }
        match write_report(request.dir, report) {
            Ok(()) => summary.saved.push(name.clone()),
            Err(e) => {
                warn!(file = %name, error = %e, "Failed to save merged issues");
                summary.write_errors.push((name.clone(), e));
            }
        }
    }

    info!(merged = summary.merged(), files = summary.files.len(), "Merge finished");
    summary
}

// dqa-core/src/application/migrate.rs

use std::path::Path;

use tracing::{info, instrument, warn};

use crate::domain::results::SchemaVersion;
use crate::error::DqaError;
use crate::infrastructure::codec::{encode_report, read_report, report_paths, write_report};

#[derive(Debug)]
pub enum MigrationOutcome {
    AlreadyMigrated,
    Migrated { from: SchemaVersion },
    Failed(DqaError),
}

#[derive(Debug, Default)]
pub struct MigrationSummary {
    /// File name and what happened to it, in file name order.
    pub files: Vec<(String, MigrationOutcome)>,
}

impl MigrationSummary {
    pub fn migrated(&self) -> usize {
        self.files
            .iter()
            .filter(|(_, o)| matches!(o, MigrationOutcome::Migrated { .. }))
            .count()
    }

    pub fn failures(&self) -> usize {
        self.files
            .iter()
            .filter(|(_, o)| matches!(o, MigrationOutcome::Failed(_)))
            .count()
    }
}

/// Rewrites every report file of `dir` in the `target` layout. A file that
/// fails to read or write is reported and the others continue.
#[instrument(skip(dir), fields(dir = %dir.display()))]
pub fn migrate_directory(
    dir: &Path,
    target: SchemaVersion,
    dry_run: bool,
) -> Result<MigrationSummary, DqaError> {
    let mut summary = MigrationSummary::default();

    for path in report_paths(dir)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let outcome = match migrate_file(dir, &path, target, dry_run) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(file = %name, error = %e, "Migration failed");
                MigrationOutcome::Failed(e)
            }
        };
        summary.files.push((name, outcome));
    }

    info!(migrated = summary.migrated(), files = summary.files.len(), "Migration finished");
    Ok(summary)
}

fn migrate_file(
    dir: &Path,
    path: &Path,
    target: SchemaVersion,
    dry_run: bool,
) -> Result<MigrationOutcome, DqaError> {
    let mut report = read_report(path)?;
    if report.version == target {
        return Ok(MigrationOutcome::AlreadyMigrated);
    }

    let from = report.version;
    report.version = target;
    for record in report.records.iter_mut() {
        record.version = target;
    }

    if dry_run {
        // Encode anyway so a dry run surfaces the same errors.
        encode_report(&report)?;
    } else {
        write_report(dir, &report)?;
    }
    Ok(MigrationOutcome::Migrated { from })
}

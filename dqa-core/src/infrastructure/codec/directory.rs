// dqa-core/src/infrastructure/codec/directory.rs

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, error, instrument, warn};
use walkdir::WalkDir;

use crate::domain::results::report::REPORT_EXTENSION;
use crate::domain::results::ReportFile;
use crate::error::DqaError;
use crate::infrastructure::codec::results::{read_records, write_records};
use crate::infrastructure::fs::atomic_write;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Log and skip files that fail to parse instead of failing the whole read.
    pub skip_unreadable: bool,
}

/// Reads one report file. Records are sorted by field.
pub fn read_report(path: &Path) -> Result<ReportFile, DqaError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = File::open(path)?;
    let (version, records) = read_records(file)?;

    let mut report = ReportFile::with_records(name, version, records);
    report.sort_by_field();
    Ok(report)
}

/// Paths of the `.csv` files directly under `dir` (no recursion), sorted.
pub fn report_paths(dir: &Path) -> Result<Vec<PathBuf>, DqaError> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| DqaError::InternalError(e.to_string()))?;
        let path = entry.path();

        if entry.file_type().is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(REPORT_EXTENSION)
        {
            paths.push(path.to_path_buf());
        }
    }

    Ok(paths)
}

/// Reads every report file of `dir`, keyed by file name.
#[instrument(skip(options))]
pub fn read_directory(
    dir: &Path,
    options: ReadOptions,
) -> Result<BTreeMap<String, ReportFile>, DqaError> {
    let mut reports = BTreeMap::new();

    for path in report_paths(dir)? {
        match read_report(&path) {
            Ok(report) => {
                debug!(
                    file = %report.name,
                    records = report.len(),
                    version = %report.version,
                    "Read report file"
                );
                reports.insert(report.name.clone(), report);
            }
            Err(e) if options.skip_unreadable => {
                warn!(path = ?path, error = %e, "Skipping unreadable report file");
            }
            Err(e) => {
                error!(path = ?path, error = %e, "Failed to read report file");
                return Err(e);
            }
        }
    }

    Ok(reports)
}

/// Encodes a report in its own layout, records in their current order.
pub fn encode_report(report: &ReportFile) -> Result<Vec<u8>, DqaError> {
    write_records(Vec::new(), report.version, &report.records)
}

/// Replaces `dir/<report name>` in one step; a failed write leaves the old file.
pub fn write_report(dir: &Path, report: &ReportFile) -> Result<(), DqaError> {
    let bytes = encode_report(report)?;
    atomic_write(dir.join(&report.name), bytes)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::results::{ResultRecord, SchemaVersion};
    use std::fs;
    use tempfile::tempdir;

    const V3_HEADER: &str = "Model,Model Version,Data Version,DQA Version,Table,Field,Issue Code,Issue Description,Finding,Prevalence,Rank,Cause,Status,Github ID,Method\n";

    #[test]
    fn test_reads_csv_files_only() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("person.csv"),
            format!("{V3_HEADER}m,1.0.0,v,0,person,year_of_birth,,,,,,,,,\nm,1.0.0,v,0,person,person_id,,,,,,,,,\n"),
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not a report").unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();
        fs::write(dir.path().join("archive").join("death.csv"), V3_HEADER).unwrap();

        let reports = read_directory(dir.path(), ReadOptions::default()).unwrap();
        assert_eq!(reports.keys().collect::<Vec<_>>(), ["person.csv"]);

        let person = &reports["person.csv"];
        assert_eq!(person.table(), "person");
        assert_eq!(person.records[0].field, "person_id");
    }

    #[test]
    fn test_unreadable_file_aborts_unless_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("person.csv"), V3_HEADER).unwrap();
        fs::write(dir.path().join("broken.csv"), "Nope,Header\n").unwrap();

        assert!(read_directory(dir.path(), ReadOptions::default()).is_err());

        let reports = read_directory(
            dir.path(),
            ReadOptions {
                skip_unreadable: true,
            },
        )
        .unwrap();
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_write_report_keeps_layout() {
        let dir = tempdir().unwrap();
        let report = ReportFile::with_records(
            "death.csv",
            SchemaVersion::V2,
            vec![ResultRecord {
                table: "death".into(),
                field: "death_date".into(),
                github_id: "17".into(),
                ..Default::default()
            }],
        );

        write_report(dir.path(), &report).unwrap();
        let back = read_report(&dir.path().join("death.csv")).unwrap();
        assert_eq!(back.version, SchemaVersion::V2);
        assert_eq!(back.records[0].github_id, "17");
    }
}

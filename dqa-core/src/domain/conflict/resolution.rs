// dqa-core/src/domain/conflict/resolution.rs

use crate::domain::conflict::conflict::Conflict;
use crate::domain::error::DomainError;
use crate::domain::results::{ReportFile, ResultRecord};

/// Resolver output must hold exactly one entry per conflict sent.
pub fn check_batch(sent: usize, received: usize) -> Result<(), DomainError> {
    if sent != received {
        return Err(DomainError::ResolverProtocol(format!(
            "sent {} conflict(s), received {} result set(s)",
            sent, received
        )));
    }
    Ok(())
}

/// Applies one resolved result set to the conflict's report file.
///
/// An empty set leaves the file alone. Otherwise the first record replaces
/// the existing one in place and the rest are appended. Every resolved record
/// takes the layout of the new finding. Returns the number of records written.
pub fn apply_resolution(
    report: &mut ReportFile,
    conflict: &Conflict,
    resolved: Vec<ResultRecord>,
) -> Result<usize, DomainError> {
    if resolved.is_empty() {
        return Ok(0);
    }

    if conflict.index >= report.records.len() {
        return Err(DomainError::ResolverProtocol(format!(
            "conflict index {} is out of range for '{}'",
            conflict.index, report.name
        )));
    }

    let count = resolved.len();
    let mut resolved = resolved.into_iter().map(|mut record| {
        record.version = conflict.log.version;
        if record.raw_rank.is_empty() {
            record.raw_rank = record.rank.as_str().to_string();
        }
        record
    });

    if let Some(first) = resolved.next() {
        report.records[conflict.index] = first;
    }
    report.records.extend(resolved);

    Ok(count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::results::{Rank, SchemaVersion};

    fn record(field: &str, finding: &str) -> ResultRecord {
        ResultRecord {
            table: "person".into(),
            field: field.into(),
            issue_code: "g2-013".into(),
            finding: finding.into(),
            status: "under review".into(),
            version: SchemaVersion::V2,
            ..Default::default()
        }
    }

    fn report() -> ReportFile {
        ReportFile::with_records(
            "person.csv",
            SchemaVersion::V2,
            vec![record("gender_concept_id", "old-a"), record("person_id", "old-b"), record("race_concept_id", "old-c")],
        )
    }

    fn conflict(index: usize) -> Conflict {
        let mut log = record("x", "log");
        log.version = SchemaVersion::V3;
        Conflict::new("person.csv", index, log, record("x", "existing"))
    }

    #[test]
    fn test_positional_application() {
        let mut report = report();
        let conflicts = [conflict(0), conflict(1), conflict(2)];
        let mut r1 = record("person_id", "R1");
        r1.rank = Rank::Medium;
        let batch = vec![
            vec![],
            vec![r1],
            vec![record("race_concept_id", "R2a"), record("race_concept_id", "R2b")],
        ];

        check_batch(conflicts.len(), batch.len()).unwrap();
        let written: usize = conflicts
            .iter()
            .zip(batch)
            .map(|(c, resolved)| apply_resolution(&mut report, c, resolved).unwrap())
            .sum();

        let findings: Vec<&str> = report.records.iter().map(|r| r.finding.as_str()).collect();
        assert_eq!(findings, ["old-a", "R1", "R2a", "R2b"]);
        assert_eq!(written, 3);
        assert_eq!(report.records[1].version, SchemaVersion::V3);
        assert_eq!(report.records[1].raw_rank, "Medium");
        assert_eq!(report.records[0].version, SchemaVersion::V2);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let err = check_batch(3, 2).unwrap_err();
        assert!(matches!(err, DomainError::ResolverProtocol(_)));
    }
}

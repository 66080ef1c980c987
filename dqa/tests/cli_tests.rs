use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// A scratch copy of the fixture project, so commands can rewrite files.
struct DqaTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl DqaTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/chop");

        let dest = tmp.path().join("chop");
        Self::copy_dir(&fixture, &dest)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(dest.join("resolve.sh"), fs::Permissions::from_mode(0o755))?;
        }

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &PathBuf, dst: &PathBuf) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.skip_exist = true;
        options.content_only = true;

        fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn dqa(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dqa"));
        cmd.current_dir(&self.root);
        cmd.env_remove("DQA_RESOLVER_PROGRAM");
        cmd.env_remove("DQA_TIMEOUT_SECS");
        cmd
    }

    fn read(&self, path: &str) -> Result<String> {
        fs::read_to_string(self.root.join(path)).with_context(|| format!("reading {}", path))
    }
}

#[test]
fn test_assign_rank_updates_stale_ranks() -> Result<()> {
    let env = DqaTestEnv::new()?;

    env.dqa()
        .args(["assign-rank", "report", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ranking against model 'pedsnet/2.3.0'"))
        .stdout(predicate::str::contains("Dry run: 2 rank(s) in 2 file(s) would change."));
    assert!(env.read("report/person.csv")?.contains(",full,,ETL,"));

    env.dqa()
        .args(["assign-rank", "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 2 rank(s) in 2 file(s)."));

    let person = env.read("report/person.csv")?;
    assert!(person.contains("person_id,G4-001,Missing primary key,12 rows,full,High,"));
    let visits = env.read("report/visit_occurrence.csv")?;
    assert!(visits.contains("visit_start_date,G2-002,Future dates,1%,high,High,"));

    env.dqa()
        .args(["assign-rank", "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All ranks already match."));

    Ok(())
}

#[test]
fn test_assign_rank_refuses_invalid_rules() -> Result<()> {
    let env = DqaTestEnv::new()?;
    fs::write(
        env.root.join("rules/fact.csv"),
        "Table,Field,Issue Code,Prevalence,Rank\nspecimen,is other,G2-002,low,Urgent\n",
    )?;

    env.dqa()
        .args(["assign-rank", "report"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation errors in 'Fact' rules file"))
        .stderr(predicate::str::contains("line 2: table 'specimen' is not defined"));

    assert!(env.read("report/person.csv")?.contains(",full,,ETL,"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_merge_issues_appends_and_resolves_conflicts() -> Result<()> {
    let env = DqaTestEnv::new()?;

    env.dqa()
        .args(["merge-issues", "report", "logs/checks.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 1 issue(s) into person.csv (1 new"))
        .stdout(predicate::str::contains(
            "Merged 1 issue(s) into visit_occurrence.csv (0 new, 1 from resolved conflicts)",
        ));

    let person = env.read("report/person.csv")?;
    assert!(person.contains("year_of_birth,G2-005,Missing values,10%,low,,,new,,auto"));

    let visits = env.read("report/visit_occurrence.csv")?;
    assert!(visits.contains("visit_occurrence_id,G2-013,Unexpected values,4%,medium,Low"));
    assert!(!visits.contains(",2%,"));

    Ok(())
}

#[test]
fn test_merge_issues_rejects_log_for_missing_report() -> Result<()> {
    let env = DqaTestEnv::new()?;

    env.dqa()
        .args(["merge-issues", "report", "logs/unknown_table.csv"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("No new issues found."))
        .stderr(predicate::str::contains("No report file 'death.csv'"));

    Ok(())
}

#[test]
fn test_merge_issues_reports_resolver_failure() -> Result<()> {
    let env = DqaTestEnv::new()?;

    env.dqa()
        .args(["merge-issues", "report", "logs/checks.csv"])
        .env("DQA_RESOLVER_PROGRAM", "./no-such-resolver")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not start resolve command"));

    // The unambiguous append is still saved.
    assert!(env.read("report/person.csv")?.contains("G2-005"));
    assert!(env.read("report/visit_occurrence.csv")?.contains(",2%,"));
    Ok(())
}

#[test]
fn test_generate_templates_copies_open_issues() -> Result<()> {
    let env = DqaTestEnv::new()?;

    env.dqa()
        .args([
            "generate-templates",
            "CHOP",
            "ETLv6",
            "--root",
            "out",
            "--copy-persistent",
            "report",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 files to 'out' for model 'pedsnet/2.3.0'"));

    assert!(!env.root.join("out/concept.csv").exists());

    let visits = env.read("out/visit_occurrence.csv")?;
    assert!(visits.starts_with("Model,Model Version,Data Version,DQA Version,Table,Field,Issue Code,"));
    assert!(visits.contains("pedsnet-2.3.0-CHOP-ETLv6,0,visit_occurrence,visit_occurrence_id,G2-013,"));
    assert!(!visits.contains("Future dates"));

    Ok(())
}

#[test]
fn test_validate_and_migrate_legacy_report() -> Result<()> {
    let env = DqaTestEnv::new()?;

    env.dqa()
        .args(["validate", "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Everything looks good!"));

    env.dqa()
        .args(["validate", "legacy"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Errors found in 'person.csv'"))
        .stdout(predicate::str::contains("status = 'closed'"))
        .stdout(predicate::str::contains("run 'dqa migrate'"));

    env.dqa()
        .args(["migrate", "legacy", "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Migrated 'person.csv' from layout v1"))
        .stdout(predicate::str::contains("'visit_occurrence.csv' already migrated."));

    let person = env.read("legacy/person.csv")?;
    assert!(person.starts_with(
        "Model,Model Version,Data Version,DQA Version,Table,Field,Issue Code,Issue Description,Finding,Prevalence,Rank,Cause,Status,Github ID,Method"
    ));
    assert!(!person.contains("Fidelity"));

    Ok(())
}

#[test]
fn test_report_renders_markdown() -> Result<()> {
    let env = DqaTestEnv::new()?;

    env.dqa()
        .args(["report", "report"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Demographic Tables"))
        .stdout(predicate::str::contains("- [ ] 1. **year_of_birth**: Outliers (3 rows)"))
        .stdout(predicate::str::contains("# Fact Tables"))
        .stdout(predicate::str::contains("Missing primary key").not());

    env.dqa()
        .args(["report", "report", "--output", "issues.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 issue(s) to 'issues.md'"));
    assert!(env.read("issues.md")?.contains("## visit_occurrence"));

    Ok(())
}

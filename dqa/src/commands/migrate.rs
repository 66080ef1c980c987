// dqa/src/commands/migrate.rs
//
// USE CASE: Rewrite reports in another results layout.

use std::path::PathBuf;

use dqa_core::application::{migrate_directory, MigrationOutcome};
use dqa_core::domain::results::SchemaVersion;

pub fn execute(dirs: Vec<PathBuf>, to: Option<u8>, dry_run: bool) -> anyhow::Result<()> {
    let target = match to {
        Some(number) => SchemaVersion::from_number(number)
            .ok_or_else(|| anyhow::anyhow!("❌ Unknown layout {}; expected 1, 2 or 3", number))?,
        None => SchemaVersion::LATEST,
    };

    let mut failures = 0;

    for dir in &dirs {
        if !dir.is_dir() {
            eprintln!("⚠️  Ignoring '{}': not a directory", dir.display());
            continue;
        }

        println!("🚚 Migrating files in '{}' to layout {}", dir.display(), target);
        let summary = match migrate_directory(dir, target, dry_run) {
            Ok(summary) => summary,
            Err(e) => {
                eprintln!("❌ Error reading '{}': {}", dir.display(), e);
                failures += 1;
                continue;
            }
        };

        if summary.files.is_empty() {
            println!("* No files in directory.");
        }

        for (name, outcome) in &summary.files {
            match outcome {
                MigrationOutcome::AlreadyMigrated => println!("* '{}' already migrated.", name),
                MigrationOutcome::Migrated { from } if dry_run => {
                    println!("* Would migrate '{}' from layout {}", name, from)
                }
                MigrationOutcome::Migrated { from } => {
                    println!("* Migrated '{}' from layout {}", name, from)
                }
                MigrationOutcome::Failed(e) => println!("* Error migrating '{}': {}", name, e),
            }
        }
        failures += summary.failures();
        println!();
    }

    if failures > 0 {
        anyhow::bail!("{} file(s) could not be migrated", failures);
    }
    Ok(())
}

// dqa/src/commands/validate.rs
//
// USE CASE: Validate report values against the controlled vocabularies.

use std::path::PathBuf;

use dqa_core::application::validate_directory;

pub fn execute(dirs: Vec<PathBuf>) -> anyhow::Result<()> {
    let mut problems = 0;

    for dir in &dirs {
        if !dir.is_dir() {
            eprintln!("⚠️  Skipping '{}': not a directory", dir.display());
            problems += 1;
            continue;
        }

        println!("{}", dir.display());
        let summary = match validate_directory(dir) {
            Ok(summary) => summary,
            Err(e) => {
                eprintln!("❌ Error reading files from '{}': {}", dir.display(), e);
                problems += 1;
                continue;
            }
        };

        for (name, e) in &summary.unreadable {
            println!("* Could not read '{}': {}", name, e);
        }

        for file in summary.files.iter().filter(|f| !f.is_clean()) {
            println!("* Errors found in '{}':", file.name);
            for (index, messages) in &file.errors {
                // Records are numbered in field order, as read.
                println!("    record {}: {}", index + 1, messages.join(", "));
            }
            println!();
        }

        let outdated = summary.files.iter().filter(|f| f.needs_migration).count();
        if outdated > 0 {
            println!("* {} file(s) use an older layout; run 'dqa migrate'.", outdated);
        }

        if summary.is_clean() {
            println!("* Everything looks good!\n");
        } else {
            problems += summary.error_count();
        }
    }

    if problems > 0 {
        anyhow::bail!("Validation found {} problem(s)", problems);
    }
    Ok(())
}

// dqa/src/commands/report.rs
//
// USE CASE: Render a report's open issues as a Markdown checklist.

use std::path::PathBuf;

use anyhow::Context;
use dqa_core::application::IssueReport;
use dqa_core::infrastructure::codec::{read_directory, ReadOptions};
use dqa_core::infrastructure::fs::atomic_write;

pub fn execute(dir: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let reports = read_directory(&dir, ReadOptions::default())
        .with_context(|| format!("Failed to read report in {:?}", dir))?;

    let report = IssueReport::build(reports.values());
    let markdown = report.to_markdown();

    match output {
        Some(path) => {
            atomic_write(&path, &markdown)
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!("📄 Wrote {} issue(s) to '{}'", report.len(), path.display());
        }
        None => print!("{}", markdown),
    }

    Ok(())
}

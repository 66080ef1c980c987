// dqa/src/commands/merge.rs
//
// USE CASE: Merge issue logs into a secondary report.

use std::path::{Path, PathBuf};

use anyhow::Context;
use dqa_core::application::{load_issue_logs, merge_issues, MergeRequest, MergeSummary};
use dqa_core::infrastructure::catalog::FsCatalogSource;
use dqa_core::infrastructure::codec::{read_directory, ReadOptions};
use dqa_core::infrastructure::resolver::ProcessResolver;
use dqa_core::ports::CatalogSource;

pub struct Options {
    pub dir: PathBuf,
    pub logs: Vec<PathBuf>,
    pub resolvers: Option<String>,
    pub catalog: Option<PathBuf>,
    pub dry_run: bool,
}

pub async fn execute(project_dir: &Path, options: Options) -> anyhow::Result<()> {
    let config = super::project_config(project_dir)?;

    let mut reports = read_directory(&options.dir, ReadOptions::default())
        .with_context(|| format!("Failed to read report in {:?}", options.dir))?;

    let (logs, read_errors) = load_issue_logs(&options.logs);

    let resolver = ProcessResolver::new(
        config.resolver.program.clone(),
        options.resolvers.or_else(|| config.resolver.resolvers.clone()),
        config.resolver.timeout_secs,
    );
    let catalog = options
        .catalog
        .or_else(|| config.catalog.as_ref().map(PathBuf::from))
        .map(FsCatalogSource::new);

    let request = MergeRequest {
        dir: &options.dir,
        match_key: config.merge.match_key,
        dry_run: options.dry_run,
        catalog: catalog.as_ref().map(|c| c as &dyn CatalogSource),
        resolver: &resolver,
    };

    println!("🔀 Merging {} issue log(s) into '{}'", logs.len(), options.dir.display());
    let summary = merge_issues(&request, &mut reports, logs).await;
    print_summary(&summary, options.dry_run);

    let mut failed = read_errors.len();
    for (log, e) in read_errors.iter().chain(&summary.log_errors) {
        eprintln!("❌ Issue log '{}': {}", log, e);
    }
    failed += summary.log_errors.len();

    if let Some(e) = &summary.resolution_error {
        eprintln!("❌ {}", e);
        failed += 1;
    }
    for (file, e) in &summary.write_errors {
        eprintln!("❌ Could not save '{}': {}", file, e);
        failed += 1;
    }

    if failed > 0 {
        anyhow::bail!("Merge finished with {} error(s)", failed);
    }
    Ok(())
}

fn print_summary(summary: &MergeSummary, dry_run: bool) {
    for conflict in &summary.unresolved {
        println!(
            "* Unresolved conflict: {}/{} for issue code {}",
            conflict.table(),
            conflict.field(),
            conflict.issue_code()
        );
    }

    if summary.merged() == 0 {
        println!("No new issues found.");
        return;
    }

    for (name, file) in &summary.files {
        if file.merged() == 0 {
            continue;
        }
        let verb = if dry_run { "Would merge" } else { "Merged" };
        println!(
            "{} {} issue(s) into {} ({} new, {} from resolved conflicts)",
            verb,
            file.merged(),
            name,
            file.appended,
            file.resolved
        );
    }
}

// dqa/src/commands/assign_rank.rs
//
// USE CASE: Assign ranks to the issues of a report.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use comfy_table::{presets::ASCII_MARKDOWN, Table};
use dqa_core::application::{assign_ranks, build_engine, load_rule_sets, write_changed, RankSummary};
use dqa_core::domain::project::RuleSourceConfig;
use dqa_core::infrastructure::codec::{read_directory, ReadOptions};
use dqa_core::infrastructure::rules::{FsRuleSource, HttpRuleSource};
use dqa_core::ports::RuleSource;

pub async fn execute(
    project_dir: &Path,
    dir: PathBuf,
    model: Option<PathBuf>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let config = super::project_config(project_dir)?;
    let model = super::data_model(&config, model)?;

    let source: Arc<dyn RuleSource> = match &config.rule_source {
        RuleSourceConfig::Filesystem { root } => Arc::new(FsRuleSource::new(root)),
        RuleSourceConfig::Github { base_url } => Arc::new(
            HttpRuleSource::new(base_url, config.github_token.clone(), config.timeout_secs)
                .context("Failed to set up the rule source")?,
        ),
    };

    let parsed = load_rule_sets(source, &config.rule_sets, &model)
        .await
        .context("Failed to load rule sets")?;

    let mut invalid = false;
    for rule_set in parsed.iter().filter(|p| !p.is_valid()) {
        invalid = true;
        eprintln!("Validation errors in '{}' rules file", rule_set.name);
        for message in rule_set.messages() {
            eprintln!("  {}", message);
        }
    }
    if invalid {
        anyhow::bail!("❌ Rule sets have errors; no ranks were assigned.");
    }

    let engine = build_engine(parsed, &config.rule_sets)?;

    let mut reports = read_directory(&dir, ReadOptions::default())
        .with_context(|| format!("Failed to read report in {:?}", dir))?;

    println!("🏷️  Ranking against model '{}/{}'", model.name, model.version);
    let summary = assign_ranks(&engine, &mut reports);

    if summary.matches.is_empty() {
        println!("No issues matched any rule.");
    } else {
        println!("{}", render_table(&summary));
    }

    if summary.changed() == 0 {
        println!("All ranks already match.");
        return Ok(());
    }

    if dry_run {
        println!(
            "Dry run: {} rank(s) in {} file(s) would change.",
            summary.changed(),
            summary.changed_files.len()
        );
        return Ok(());
    }

    let failures = write_changed(&dir, &reports, &summary.changed_files);
    println!(
        "✨ Updated {} rank(s) in {} file(s).",
        summary.changed(),
        summary.changed_files.len() - failures.len()
    );

    if !failures.is_empty() {
        for (file, e) in &failures {
            eprintln!("❌ Could not save '{}': {}", file, e);
        }
        anyhow::bail!("{} file(s) could not be saved", failures.len());
    }

    Ok(())
}

fn render_table(summary: &RankSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN).set_header(vec![
        "Type",
        "Table",
        "Field",
        "Goal",
        "Issue Code",
        "Prevalence",
        "New Rank",
        "Old Rank",
        "Changed",
        "Persistent",
    ]);

    let yes_no = |b: bool| if b { "Yes" } else { "No" };
    for m in &summary.matches {
        table.add_row(vec![
            m.rule_set.as_str(),
            m.table.as_str(),
            m.field.as_str(),
            m.goal.as_str(),
            m.issue_code.as_str(),
            m.prevalence.as_str(),
            m.rank.as_str(),
            m.previous.as_str(),
            yes_no(m.changed),
            yes_no(m.persistent),
        ]);
    }

    table
}

// dqa/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dqa")]
#[command(about = "Secondary report tooling for data quality assessments", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding dqa.yaml (relative paths in it resolve from here)
    #[arg(long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 📝 Generates a secondary report template for a site and data extract
    GenerateTemplates {
        /// Site name (e.g. CHOP)
        site: String,

        /// Data extract / ETL cycle (e.g. ETLv5)
        extract: String,

        /// Directory to write the files to
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Data model file (overrides 'data_model' in dqa.yaml)
        #[arg(long)]
        model: Option<PathBuf>,

        /// DQA version written in every record
        #[arg(long, default_value = "0")]
        dqa_version: String,

        /// Copies persistent and under-review issues from an existing report
        #[arg(long)]
        copy_persistent: Option<PathBuf>,
    },

    /// 🏷️  Assigns ranks to the issues of a report using the rule sets
    AssignRank {
        /// Report directory
        dir: PathBuf,

        /// Data model file (overrides 'data_model' in dqa.yaml)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// 🔀 Merges issue logs into a report, resolving conflicts externally
    MergeIssues {
        /// Report directory
        dir: PathBuf,

        /// Issue log CSV files
        #[arg(required = true)]
        logs: Vec<PathBuf>,

        /// Resolver definitions passed to the resolve program
        #[arg(long)]
        resolvers: Option<String>,

        /// Catalog directory (overrides 'catalog' in dqa.yaml)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Merge without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// ✅ Validates the values of one or more reports
    Validate {
        /// Report directories
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
    },

    /// 🚚 Rewrites reports in the newest (or a given) results layout
    Migrate {
        /// Report directories
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Target layout number (1, 2 or 3)
        #[arg(long)]
        to: Option<u8>,

        /// Report what would be migrated without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// 📄 Renders the issues of a report as a Markdown checklist
    Report {
        /// Report directory
        dir: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_generate_templates() -> Result<()> {
        let args = Cli::parse_from([
            "dqa",
            "generate-templates",
            "CHOP",
            "ETLv5",
            "--root",
            "SecondaryReports/CHOP/ETLv5",
        ]);
        match args.command {
            Commands::GenerateTemplates {
                site,
                extract,
                root,
                dqa_version,
                copy_persistent,
                ..
            } => {
                assert_eq!(site, "CHOP");
                assert_eq!(extract, "ETLv5");
                assert_eq!(root.to_string_lossy(), "SecondaryReports/CHOP/ETLv5");
                assert_eq!(dqa_version, "0");
                assert_eq!(copy_persistent, None);
                Ok(())
            }
            _ => bail!("Expected GenerateTemplates command"),
        }
    }

    #[test]
    fn test_cli_parse_assign_rank_dry_run() -> Result<()> {
        let args = Cli::parse_from(["dqa", "assign-rank", "reports", "--dry-run", "--project-dir", "/tmp"]);
        assert_eq!(args.project_dir.to_string_lossy(), "/tmp");
        match args.command {
            Commands::AssignRank { dir, dry_run, model } => {
                assert_eq!(dir.to_string_lossy(), "reports");
                assert!(dry_run);
                assert_eq!(model, None);
                Ok(())
            }
            _ => bail!("Expected AssignRank command"),
        }
    }

    #[test]
    fn test_cli_parse_merge_issues() -> Result<()> {
        let args = Cli::parse_from([
            "dqa",
            "merge-issues",
            "reports",
            "a.csv",
            "b.csv",
            "--resolvers",
            "resolvers.yml",
        ]);
        match args.command {
            Commands::MergeIssues { logs, resolvers, .. } => {
                assert_eq!(logs.len(), 2);
                assert_eq!(resolvers.as_deref(), Some("resolvers.yml"));
                Ok(())
            }
            _ => bail!("Expected MergeIssues command"),
        }
    }

    #[test]
    fn test_cli_merge_issues_requires_a_log() {
        assert!(Cli::try_parse_from(["dqa", "merge-issues", "reports"]).is_err());
    }

    #[test]
    fn test_cli_parse_migrate() -> Result<()> {
        let args = Cli::parse_from(["dqa", "migrate", "a", "b", "--to", "2"]);
        match args.command {
            Commands::Migrate { dirs, to, dry_run } => {
                assert_eq!(dirs.len(), 2);
                assert_eq!(to, Some(2));
                assert!(!dry_run);
                Ok(())
            }
            _ => bail!("Expected Migrate command"),
        }
    }
}

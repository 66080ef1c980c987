// dqa/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug dqa assign-rank ... to see the details.
    // Logs go to stderr; stdout carries the command output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_dir = cli.project_dir;

    match cli.command {
        Commands::GenerateTemplates {
            site,
            extract,
            root,
            model,
            dqa_version,
            copy_persistent,
        } => commands::generate::execute(
            &project_dir,
            commands::generate::Options {
                site,
                extract,
                root,
                model,
                dqa_version,
                copy_persistent,
            },
        ),

        Commands::AssignRank {
            dir,
            model,
            dry_run,
        } => commands::assign_rank::execute(&project_dir, dir, model, dry_run).await,

        Commands::MergeIssues {
            dir,
            logs,
            resolvers,
            catalog,
            dry_run,
        } => {
            commands::merge::execute(
                &project_dir,
                commands::merge::Options {
                    dir,
                    logs,
                    resolvers,
                    catalog,
                    dry_run,
                },
            )
            .await
        }

        Commands::Validate { dirs } => commands::validate::execute(dirs),

        Commands::Migrate { dirs, to, dry_run } => commands::migrate::execute(dirs, to, dry_run),

        Commands::Report { dir, output } => commands::report::execute(dir, output),
    }
}

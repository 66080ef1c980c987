// dqa/src/commands/generate.rs
//
// USE CASE: Generate secondary report templates.

use std::path::{Path, PathBuf};

use anyhow::Context;
use dqa_core::application::{build_templates, write_templates, TemplateRequest};
use dqa_core::infrastructure::codec::{read_directory, ReadOptions};

pub struct Options {
    pub site: String,
    pub extract: String,
    pub root: PathBuf,
    pub model: Option<PathBuf>,
    pub dqa_version: String,
    pub copy_persistent: Option<PathBuf>,
}

pub fn execute(project_dir: &Path, options: Options) -> anyhow::Result<()> {
    let config = super::project_config(project_dir)?;
    let model = super::data_model(&config, options.model)?;

    let previous = match &options.copy_persistent {
        Some(dir) => Some(
            read_directory(dir, ReadOptions::default())
                .with_context(|| format!("Failed to read previous report in {:?}", dir))?,
        ),
        None => None,
    };

    let request = TemplateRequest {
        site: options.site,
        extract: options.extract,
        dqa_version: options.dqa_version,
    };
    let templates = build_templates(&model, &request, previous.as_ref());

    write_templates(&options.root, &templates)
        .with_context(|| format!("Failed to write templates to {:?}", options.root))?;

    println!(
        "📝 Wrote {} files to '{}' for model '{}/{}'",
        templates.len(),
        options.root.display(),
        model.name,
        model.version
    );
    if let Some(dir) = &options.copy_persistent {
        println!("   Copied persistent issues from '{}'", dir.display());
    }

    Ok(())
}

// dqa/src/commands/mod.rs

pub mod assign_rank;
pub mod generate;
pub mod merge;
pub mod migrate;
pub mod report;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Context;
use dqa_core::domain::model::DataModel;
use dqa_core::domain::project::DqaConfig;
use dqa_core::infrastructure::config::{load_data_model, load_or_default};

/// Project config, or the defaults when the project has none.
pub fn project_config(project_dir: &Path) -> anyhow::Result<DqaConfig> {
    load_or_default(project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })
}

/// Data model from the command line, else from the config.
pub fn data_model(config: &DqaConfig, flag: Option<PathBuf>) -> anyhow::Result<DataModel> {
    let Some(path) = flag.or_else(|| config.data_model.as_ref().map(PathBuf::from)) else {
        anyhow::bail!(
            "❌ Data model required.\n👉 Set 'data_model' in dqa.yaml or pass --model."
        );
    };

    load_data_model(&path).with_context(|| format!("Failed to load data model from {:?}", path))
}

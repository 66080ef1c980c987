// dqa-core/src/infrastructure/config/project.rs

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::project::DqaConfig;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["dqa_project_conf.yaml", "dqa.yaml"];

pub const ENV_RESOLVER_PROGRAM: &str = "DQA_RESOLVER_PROGRAM";
pub const ENV_GITHUB_TOKEN: &str = "DQA_GITHUB_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "DQA_TIMEOUT_SECS";

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<DqaConfig, InfrastructureError> {
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read project config at {:?}", config_path))?;
    let mut config: DqaConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse project config YAML at {:?}", config_path))?;

    // Relative paths in the file are relative to the file.
    resolve_paths(&mut config, project_dir);

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    config
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(format!("{:?}: {}", config_path, e)))?;

    Ok(config)
}

/// Same as [`load_project_config`], except that a missing file yields the
/// defaults (still layered with the environment). A file that exists but does
/// not parse is an error.
pub fn load_or_default(project_dir: &Path) -> Result<DqaConfig, InfrastructureError> {
    match load_project_config(project_dir) {
        Err(InfrastructureError::ConfigNotFound(msg)) => {
            info!("{}; using defaults", msg);
            let mut config = DqaConfig::default();
            resolve_paths(&mut config, project_dir);
            apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
            Ok(config)
        }
        other => other,
    }
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CONFIG_CANDIDATES
    )))
}

fn resolve_paths(config: &mut DqaConfig, root: &Path) {
    let join = |p: &mut String| {
        if Path::new(p.as_str()).is_relative() {
            *p = root.join(p.as_str()).to_string_lossy().into_owned();
        }
    };

    if let Some(p) = config.data_model.as_mut() {
        join(p);
    }
    if let Some(p) = config.catalog.as_mut() {
        join(p);
    }
    if let Some(p) = config.resolver.resolvers.as_mut() {
        join(p);
    }
    if let crate::domain::project::RuleSourceConfig::Filesystem { root: source_root } =
        &mut config.rule_source
    {
        join(source_root);
    }
}

fn apply_env_overrides<F>(config: &mut DqaConfig, var: F) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = var(ENV_RESOLVER_PROGRAM) {
        info!(old = ?config.resolver.program, new = ?val, "Overriding resolver program via ENV");
        config.resolver.program = val;
    }
    if let Some(val) = var(ENV_GITHUB_TOKEN) {
        config.github_token = Some(val);
    }
    if let Some(val) = var(ENV_TIMEOUT_SECS) {
        let secs: u64 = val.trim().parse().map_err(|_| {
            InfrastructureError::ConfigError(format!(
                "{} must be a number of seconds, got '{}'",
                ENV_TIMEOUT_SECS, val
            ))
        })?;
        info!(secs, "Overriding timeouts via ENV");
        config.timeout_secs = secs;
        config.resolver.timeout_secs = secs;
    }
    Ok(())
}

// dqa-core/src/infrastructure/rules/fs_source.rs

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::DqaError;
use crate::ports::RuleSource;

/// Rule files from a local checkout.
pub struct FsRuleSource {
    root: PathBuf,
}

impl FsRuleSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl RuleSource for FsRuleSource {
    async fn fetch(&self, location: &str) -> Result<String, DqaError> {
        let path = self.root.join(location);
        debug!(path = ?path, "Reading rule file");
        Ok(tokio::fs::read_to_string(&path).await?)
    }

    fn describe(&self, location: &str) -> String {
        self.root.join(location).display().to_string()
    }
}

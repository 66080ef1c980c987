// dqa-core/src/ports/rule_source.rs

use async_trait::async_trait;

use crate::error::DqaError;

/// Where rules files come from (local checkout, remote repository...).
#[async_trait]
pub trait RuleSource: Send + Sync {
    /// Raw text of the rules file at `location`.
    async fn fetch(&self, location: &str) -> Result<String, DqaError>;

    /// Human readable origin, used in logs.
    fn describe(&self, location: &str) -> String {
        location.to_string()
    }
}

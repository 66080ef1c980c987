// dqa-core/src/ports/resolver.rs

use async_trait::async_trait;

use crate::domain::conflict::Conflict;
use crate::domain::results::ResultRecord;
use crate::error::DqaError;

/// Decides what ambiguous merge conflicts turn into.
///
/// The returned vector is aligned by position with `batch`: entry `i` holds
/// zero or more records replacing conflict `i`.
#[async_trait]
pub trait ConflictResolver: Send + Sync {
    async fn resolve(&self, batch: &[Conflict]) -> Result<Vec<Vec<ResultRecord>>, DqaError>;
}

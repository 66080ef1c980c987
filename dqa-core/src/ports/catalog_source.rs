// dqa-core/src/ports/catalog_source.rs

use async_trait::async_trait;

use crate::domain::conflict::Catalog;
use crate::error::DqaError;

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Catalog, DqaError>;
}

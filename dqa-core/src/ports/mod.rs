// dqa-core/src/ports/mod.rs

pub mod catalog_source;
pub mod resolver;
pub mod rule_source;

pub use catalog_source::CatalogSource;
pub use resolver::ConflictResolver;
pub use rule_source::RuleSource;

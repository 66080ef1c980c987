// dqa-core/src/domain/results/mod.rs

pub mod rank;
pub mod record;
pub mod report;
pub mod schema;
pub mod validation;
pub mod vocabulary;

// Re-exports
pub use rank::Rank;
pub use record::ResultRecord;
pub use report::ReportFile;
pub use schema::{Column, ColumnMap, SchemaVersion};
pub use validation::validate_report;

// dqa-core/src/domain/conflict/mod.rs

pub mod catalog;
#[allow(clippy::module_inception)]
pub mod conflict;
pub mod resolution;

pub use catalog::{check_code_from_file_name, Catalog, Threshold};
pub use conflict::{scan, Conflict, MatchKey, ScanOutcome};
pub use resolution::{apply_resolution, check_batch};

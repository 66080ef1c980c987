// dqa-core/src/infrastructure/codec/mod.rs
//
// CSV encoding of result records.

pub mod directory;
pub mod results;
pub mod universal;

pub use directory::{encode_report, read_directory, read_report, report_paths, write_report, ReadOptions};
pub use results::{read_records, write_records, ResultReader, ResultWriter};
pub use universal::UniversalReader;

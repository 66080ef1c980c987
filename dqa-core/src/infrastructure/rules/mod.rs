// dqa-core/src/infrastructure/rules/mod.rs

pub mod fs_source;
pub mod http_source;
pub mod loader;

pub use fs_source::FsRuleSource;
pub use http_source::HttpRuleSource;
pub use loader::parse_rule_text;

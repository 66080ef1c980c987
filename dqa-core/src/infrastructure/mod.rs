// dqa-core/src/infrastructure/mod.rs

pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod fs;
pub mod issue_log;
pub mod resolver;
pub mod rules;

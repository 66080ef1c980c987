// dqa-core/src/domain/project/mod.rs

pub mod configuration;

pub use configuration::{
    DqaConfig, MergeConfig, ResolverConfig, RuleSetConfig, RuleSourceConfig,
};

// dqa-core/src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::conflict::MatchKey;

/// Project settings, read from `dqa.yaml` and layered with environment overrides.
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct DqaConfig {
    /// YAML description of the data model's tables and fields.
    #[serde(default)]
    pub data_model: Option<String>,

    /// Rule sets in evaluation order.
    #[validate(nested)]
    #[serde(default = "default_rule_sets")]
    pub rule_sets: Vec<RuleSetConfig>,

    #[serde(default)]
    pub rule_source: RuleSourceConfig,

    /// Bound on each remote fetch.
    #[validate(range(min = 1))]
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Directory with `conflict_associations.csv` and the catalog files.
    #[serde(default)]
    pub catalog: Option<String>,

    #[validate(nested)]
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub merge: MergeConfig,

    /// Only ever set from the environment.
    #[serde(skip)]
    pub github_token: Option<String>,
}

impl Default for DqaConfig {
    fn default() -> Self {
        Self {
            data_model: None,
            rule_sets: default_rule_sets(),
            rule_source: RuleSourceConfig::default(),
            timeout_secs: default_fetch_timeout(),
            catalog: None,
            resolver: ResolverConfig::default(),
            merge: MergeConfig::default(),
            github_token: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate, PartialEq)]
pub struct RuleSetConfig {
    #[validate(length(min = 1, message = "Rule set name cannot be empty"))]
    pub name: String,

    /// Path relative to the rule source.
    #[validate(length(min = 1, message = "Rule set location cannot be empty"))]
    pub location: String,

    /// Restricts the rule set to these tables.
    #[serde(default)]
    pub tables: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RuleSourceConfig {
    Filesystem {
        #[serde(default = "default_root")]
        root: String,
    },
    Github {
        /// Contents endpoint; the rule location is appended.
        base_url: String,
    },
}

impl Default for RuleSourceConfig {
    fn default() -> Self {
        Self::Filesystem {
            root: default_root(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ResolverConfig {
    #[validate(length(min = 1, message = "Resolver program cannot be empty"))]
    #[serde(default = "default_program")]
    pub program: String,

    /// Passed to the program as `--resolvers=<path>`.
    #[serde(default)]
    pub resolvers: Option<String>,

    #[validate(range(min = 1))]
    #[serde(default = "default_resolver_timeout")]
    pub timeout_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            resolvers: None,
            timeout_secs: default_resolver_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct MergeConfig {
    #[serde(default)]
    pub match_key: MatchKey,
}

fn default_rule_sets() -> Vec<RuleSetConfig> {
    [
        ("Admin", "SecondaryReports/Ranking/RuleSet1_Admin.csv"),
        ("Demographic", "SecondaryReports/Ranking/RuleSet2_Demographic.csv"),
        ("Fact", "SecondaryReports/Ranking/RuleSet3_Fact.csv"),
    ]
    .into_iter()
    .map(|(name, location)| RuleSetConfig {
        name: name.to_string(),
        location: location.to_string(),
        tables: None,
    })
    .collect()
}
fn default_root() -> String {
    ".".to_string()
}
fn default_fetch_timeout() -> u64 {
    30
}
fn default_program() -> String {
    "resolve.py".to_string()
}
fn default_resolver_timeout() -> u64 {
    300
}

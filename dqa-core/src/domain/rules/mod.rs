// dqa-core/src/domain/rules/mod.rs

pub mod condition;
pub mod engine;
pub mod parser;
pub mod rule;

pub use condition::FieldCondition;
pub use engine::{Classification, RankAssignment, RankEngine};
pub use parser::{
    parse_rule_rows, ParsedRuleSet, RuleParser, RuleValidationError, ValidationKind, RULES_HEADER,
};
pub use rule::{Rule, RuleSet};

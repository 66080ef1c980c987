// dqa-core/src/domain/rules/engine.rs

use tracing::trace;

use crate::domain::results::{Rank, ResultRecord};
use crate::domain::rules::rule::RuleSet;

/// Rank found for a finding and the rule set that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    pub rule_set: &'a str,
    pub rank: Rank,
}

/// What [`RankEngine::assign`] did to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankAssignment {
    pub rule_set: String,
    pub previous: Rank,
    pub rank: Rank,
    pub changed: bool,
}

/// Ordered rule sets, loaded once and evaluated read-only.
#[derive(Debug, Clone, Default)]
pub struct RankEngine {
    rule_sets: Vec<RuleSet>,
}

impl RankEngine {
    pub fn new(rule_sets: Vec<RuleSet>) -> Self {
        Self { rule_sets }
    }

    pub fn rule_sets(&self) -> &[RuleSet] {
        &self.rule_sets
    }

    pub fn rule_count(&self) -> usize {
        self.rule_sets.iter().map(RuleSet::len).sum()
    }

    /// First match across rule sets in order. Persistent findings never match.
    pub fn classify(&self, record: &ResultRecord) -> Option<Classification<'_>> {
        let found = self.rule_sets.iter().find_map(|set| {
            set.matches(record).map(|rank| Classification {
                rule_set: set.name.as_str(),
                rank,
            })
        });

        trace!(
            table = %record.table,
            field = %record.field,
            matched = found.is_some(),
            "Classified finding"
        );
        found
    }

    /// Classifies and writes the rank back. Without a match the record is left
    /// untouched and `None` is returned.
    pub fn assign(&self, record: &mut ResultRecord) -> Option<RankAssignment> {
        let Classification { rule_set, rank } = self.classify(record)?;
        let previous = record.rank;
        let changed = previous != rank || record.invalid_rank().is_some();

        if changed {
            record.set_rank(rank);
        }

        Some(RankAssignment {
            rule_set: rule_set.to_string(),
            previous,
            rank,
            changed,
        })
    }
}

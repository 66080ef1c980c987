// dqa-core/src/domain/rules/rule.rs

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::domain::ident::normalize;
use crate::domain::results::{Rank, ResultRecord};
use crate::domain::rules::condition::FieldCondition;

/// Maps (table, field condition, issue code, prevalence) to a rank.
///
/// Text members are stored normalized. Rules expanded from one rules file
/// row share their condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub table: String,
    pub condition: Arc<FieldCondition>,
    pub issue_code: String,
    pub prevalence: String,
    pub rank: Rank,
}

impl Rule {
    pub fn new(
        table: &str,
        condition: Arc<FieldCondition>,
        issue_code: &str,
        prevalence: &str,
        rank: Rank,
    ) -> Self {
        Self {
            table: normalize(table),
            condition,
            issue_code: normalize(issue_code),
            prevalence: normalize(prevalence),
            rank,
        }
    }

    /// The rule's rank when every member matches the finding.
    pub fn matches(&self, record: &ResultRecord) -> Option<Rank> {
        if normalize(&record.table) != self.table {
            return None;
        }

        if !self.condition.matches(record) {
            return None;
        }

        if normalize(&record.issue_code) != self.issue_code {
            return None;
        }

        if normalize(&record.prevalence) != self.prevalence {
            return None;
        }

        Some(self.rank)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {} -> {}",
            self.table, self.condition, self.issue_code, self.prevalence, self.rank
        )
    }
}

/// A named, ordered group of rules. Optionally scoped to a set of tables.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub name: String,
    pub scope: Option<HashSet<String>>,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            scope: None,
            rules,
        }
    }

    /// Restricts the set to findings of the given tables.
    pub fn scoped<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.scope = Some(tables.into_iter().map(|t| normalize(t.as_ref())).collect());
        self
    }

    pub fn in_scope(&self, record: &ResultRecord) -> bool {
        self.scope
            .as_ref()
            .is_none_or(|tables| tables.contains(&normalize(&record.table)))
    }

    /// First matching rule wins. Persistent findings never match.
    pub fn matches(&self, record: &ResultRecord) -> Option<Rank> {
        // Standing exemption, not a rule.
        if record.is_persistent() {
            return None;
        }

        if !self.in_scope(record) {
            return None;
        }

        self.rules.iter().find_map(|rule| rule.matches(record))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

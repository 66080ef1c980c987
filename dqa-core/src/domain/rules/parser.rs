// dqa-core/src/domain/rules/parser.rs

use std::sync::{Arc, OnceLock};

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::ident::{column_key, is_identifier, normalize};
use crate::domain::ports::SchemaProvider;
use crate::domain::results::vocabulary::{PREVALENCES, PREVALENCE_UNKNOWN};
use crate::domain::results::Rank;
use crate::domain::rules::condition::FieldCondition;
use crate::domain::rules::rule::{Rule, RuleSet};

pub const RULES_HEADER: [&str; 5] = ["Table", "Field", "Issue Code", "Prevalence", "Rank"];

// Contents of `in (a, b, ...)`.
fn in_set_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^in\s*\(([^\)]+)\)$")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationKind {
    UndefinedTable(String),
    UndefinedField { table: String, field: String },
    InvalidRank(String),
}

/// A reference to something the schema (or the rank vocabulary) does not know.
/// Accumulated while parsing; never aborts a row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {}", describe(.kind))]
pub struct RuleValidationError {
    pub line: usize,
    pub kind: ValidationKind,
}

fn describe(kind: &ValidationKind) -> String {
    match kind {
        ValidationKind::UndefinedTable(table) => format!("table '{}' is not defined", table),
        ValidationKind::UndefinedField { table, field } => {
            format!("field '{}' is not defined for table '{}'", field, table)
        }
        ValidationKind::InvalidRank(value) => format!("'{}' is not a valid rank", value),
    }
}

/// Line-oriented parser for rules file rows.
///
/// The header is checked once in [`RuleParser::new`]. Every row passed to
/// [`RuleParser::parse_row`] advances the line counter, so line numbers in
/// errors refer to the source file (header is line 1).
pub struct RuleParser<'a> {
    schema: &'a dyn SchemaProvider,
    line: usize,
    validation_errors: Vec<RuleValidationError>,
}

impl<'a> RuleParser<'a> {
    pub fn new<S: AsRef<str>>(
        header: &[S],
        schema: &'a dyn SchemaProvider,
    ) -> Result<Self, DomainError> {
        let expected: Vec<String> = RULES_HEADER.iter().map(|c| column_key(c)).collect();
        let found: Vec<String> = header.iter().map(|c| column_key(c.as_ref())).collect();

        if found != expected {
            return Err(DomainError::RuleParse {
                line: 1,
                message: format!(
                    "invalid header: expected '{}', found '{}'",
                    RULES_HEADER.join(", "),
                    header
                        .iter()
                        .map(|c| c.as_ref().trim())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            });
        }

        Ok(Self {
            schema,
            line: 1,
            validation_errors: Vec::new(),
        })
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn validation_errors(&self) -> &[RuleValidationError] {
        &self.validation_errors
    }

    /// Parses one row into its `tables × prevalences` expansion.
    pub fn parse_row<S: AsRef<str>>(&mut self, row: &[S]) -> Result<Vec<Rule>, DomainError> {
        self.line += 1;

        if row.len() != RULES_HEADER.len() {
            return Err(self.parse_error(format!(
                "expected {} columns, found {}",
                RULES_HEADER.len(),
                row.len()
            )));
        }

        let tables = self.parse_tables(row[0].as_ref())?;
        let condition = Arc::new(self.parse_field(row[1].as_ref(), &tables)?);
        let issue_code = normalize(row[2].as_ref());
        let prevalences = self.parse_prevalences(row[3].as_ref())?;
        let rank = self.parse_rank(row[4].as_ref());

        let mut rules = Vec::with_capacity(tables.len() * prevalences.len());
        for table in &tables {
            for prevalence in &prevalences {
                rules.push(Rule::new(
                    table,
                    Arc::clone(&condition),
                    &issue_code,
                    prevalence,
                    rank,
                ));
            }
        }

        debug!(line = self.line, rules = rules.len(), "Parsed rule row");
        Ok(rules)
    }

    fn parse_error(&self, message: String) -> DomainError {
        DomainError::RuleParse {
            line: self.line,
            message,
        }
    }

    fn parse_in_set(&self, value: &str) -> Result<Vec<String>, DomainError> {
        let value = value.trim();
        let tokens: Vec<&str> = match in_set_regex().captures(value) {
            Some(caps) => caps
                .get(1)
                .map(|m| m.as_str().split(',').collect())
                .unwrap_or_default(),
            None => vec![value],
        };

        tokens
            .into_iter()
            .map(|token| {
                let token = token.trim();
                if is_identifier(token) {
                    Ok(token.to_string())
                } else {
                    Err(self.parse_error(format!("'{}' is not a valid identifier", token)))
                }
            })
            .collect()
    }

    fn parse_tables(&mut self, value: &str) -> Result<Vec<String>, DomainError> {
        let tables = self.parse_in_set(value)?;

        for table in &tables {
            if !self.schema.has_table(table) {
                self.validation_errors.push(RuleValidationError {
                    line: self.line,
                    kind: ValidationKind::UndefinedTable(table.clone()),
                });
            }
        }

        Ok(tables)
    }

    fn parse_field(
        &mut self,
        value: &str,
        tables: &[String],
    ) -> Result<FieldCondition, DomainError> {
        if let Some(condition) = FieldCondition::from_predicate_name(value) {
            return Ok(condition);
        }

        let fields = self.parse_in_set(value)?;

        // Undefined tables were already reported.
        for field in &fields {
            for table in tables {
                let Some(def) = self.schema.table(table) else {
                    continue;
                };
                if !def.has_field(field) {
                    self.validation_errors.push(RuleValidationError {
                        line: self.line,
                        kind: ValidationKind::UndefinedField {
                            table: table.clone(),
                            field: field.clone(),
                        },
                    });
                }
            }
        }

        Ok(FieldCondition::one_of(fields))
    }

    fn parse_prevalences(&self, value: &str) -> Result<Vec<String>, DomainError> {
        let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();

        if compact == "-" {
            return Ok(vec![PREVALENCE_UNKNOWN.to_string()]);
        }

        if compact.eq_ignore_ascii_case("in(*)") {
            return Ok(PREVALENCES.iter().map(|p| p.to_string()).collect());
        }

        Ok(self
            .parse_in_set(value)?
            .into_iter()
            .map(|p| normalize(&p))
            .collect())
    }

    fn parse_rank(&mut self, value: &str) -> Rank {
        match Rank::from_label(value) {
            Some(rank) => rank,
            None => {
                self.validation_errors.push(RuleValidationError {
                    line: self.line,
                    kind: ValidationKind::InvalidRank(value.trim().to_string()),
                });
                Rank::Unset
            }
        }
    }

    pub fn finish(
        self,
        name: impl Into<String>,
        rules: Vec<Rule>,
        parse_errors: Vec<DomainError>,
    ) -> ParsedRuleSet {
        ParsedRuleSet {
            name: name.into(),
            rules,
            parse_errors,
            validation_errors: self.validation_errors,
        }
    }
}

/// Parses a header row and the remaining rows of one rules file.
/// Row-level parse errors are collected, not returned.
pub fn parse_rule_rows<S: AsRef<str>>(
    name: &str,
    header: &[S],
    rows: impl IntoIterator<Item = Vec<S>>,
    schema: &dyn SchemaProvider,
) -> Result<ParsedRuleSet, DomainError> {
    let mut parser = RuleParser::new(header, schema)?;
    let mut rules = Vec::new();
    let mut parse_errors = Vec::new();

    for row in rows {
        match parser.parse_row(&row) {
            Ok(expanded) => rules.extend(expanded),
            Err(e) => parse_errors.push(e),
        }
    }

    Ok(parser.finish(name, rules, parse_errors))
}

/// Outcome of parsing a rules file. Must be checked with
/// [`ParsedRuleSet::into_rule_set`] before the rules are used.
#[derive(Debug)]
pub struct ParsedRuleSet {
    pub name: String,
    pub rules: Vec<Rule>,
    pub parse_errors: Vec<DomainError>,
    pub validation_errors: Vec<RuleValidationError>,
}

impl ParsedRuleSet {
    pub fn is_valid(&self) -> bool {
        self.parse_errors.is_empty() && self.validation_errors.is_empty()
    }

    /// Every problem found, as line-tagged messages.
    pub fn messages(&self) -> Vec<String> {
        self.parse_errors
            .iter()
            .map(|e| e.to_string())
            .chain(self.validation_errors.iter().map(|e| e.to_string()))
            .collect()
    }

    pub fn into_rule_set(self) -> Result<RuleSet, DomainError> {
        if !self.is_valid() {
            return Err(DomainError::RuleValidation {
                rule_set: self.name,
                count: self.parse_errors.len() + self.validation_errors.len(),
            });
        }
        Ok(RuleSet::new(self.name, self.rules))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::model::{DataModel, TableDef};
    use crate::domain::results::ResultRecord;
    use proptest::prelude::*;

    fn model() -> DataModel {
        let table = |name: &str, fields: &[&str]| TableDef {
            name: name.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        };
        DataModel {
            name: "pedsnet".into(),
            version: "2.3.0".into(),
            tables: vec![
                table("person", &["person_id", "year_of_birth", "gender_concept_id"]),
                table("death", &["death_id", "person_id", "death_date"]),
                table("condition_occurrence", &["condition_occurrence_id", "person_id"]),
                table(
                    "visit_payer",
                    &["visit_payer_id", "provider_id", "care_site_id", "plan_class"],
                ),
            ],
        }
    }

    fn rows(text: &str) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.trim().as_bytes());
        reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    fn parse(text: &str) -> ParsedRuleSet {
        let mut all = rows(text);
        let header = all.remove(0);
        parse_rule_rows("Test", &header, all, &model()).unwrap()
    }

    fn finding(table: &str, field: &str, code: &str, prevalence: &str) -> ResultRecord {
        ResultRecord {
            table: table.into(),
            field: field.into(),
            issue_code: code.into(),
            prevalence: prevalence.into(),
            ..Default::default()
        }
    }

    const RULES: &str = r#"
table,field,issue code,prevalence,rank
"in (condition_occurrence, visit_payer)",is primary key,G4-001,full,High
visit_payer,is source value,G2-013,"in (medium, high, low)",High
"visit_payer",is date/year,G2-002,unknown,High
"visit_payer","in (provider_id, care_site_id)",G2-013,"in (high, low)",Medium
"visit_payer","is concept id",G3-002,-,Medium
"visit_payer","is other",G3-002,-,Medium
"#;

    #[test]
    fn test_rows_expand_in_declaration_order() {
        let parsed = parse(RULES);
        assert!(parsed.is_valid(), "{:?}", parsed.messages());

        let expected = [
            ("condition_occurrence", "condition_occurrence_id", "g4-001", "full", Rank::High),
            ("visit_payer", "visit_payer_id", "g4-001", "full", Rank::High),
            ("visit_payer", "visit_payer_source_value", "g2-013", "medium", Rank::High),
            ("visit_payer", "visit_payer_source_value", "g2-013", "high", Rank::High),
            ("visit_payer", "visit_payer_source_value", "g2-013", "low", Rank::High),
            ("visit_payer", "visit_payer_date", "g2-002", "unknown", Rank::High),
            ("visit_payer", "provider_id", "g2-013", "high", Rank::Medium),
            ("visit_payer", "care_site_id", "g2-013", "low", Rank::Medium),
            ("visit_payer", "visit_payer_concept_id", "g3-002", "unknown", Rank::Medium),
            ("visit_payer", "some_field", "g3-002", "unknown", Rank::Medium),
        ];

        assert_eq!(parsed.rules.len(), expected.len());
        for (rule, (table, field, code, prevalence, rank)) in parsed.rules.iter().zip(expected) {
            assert_eq!(rule.table, table);
            assert_eq!(rule.issue_code, code);
            assert_eq!(rule.prevalence, prevalence);
            assert_eq!(rule.rank, rank);
            assert_eq!(
                rule.matches(&finding(table, field, code, prevalence)),
                Some(rank),
                "{} should match {}",
                rule,
                field
            );
        }
    }

    #[test]
    fn test_table_set_expansion() {
        let parsed = parse(
            "Table,Field,Issue Code,Prevalence,Rank\n\"in(person,death)\",is primary key,G4-001,full,High",
        );
        let set = parsed.into_rule_set().unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.matches(&finding("person", "person_id", "g4-001", "full")),
            Some(Rank::High)
        );
        assert_eq!(
            set.matches(&finding("death", "death_id", "g4-001", "full")),
            Some(Rank::High)
        );
    }

    #[test]
    fn test_any_prevalence() {
        let parsed = parse("Table,Field,Issue Code,Prevalence,Rank\nperson,is other,G1-001,in (*),Low");
        let prevalences: Vec<&str> = parsed.rules.iter().map(|r| r.prevalence.as_str()).collect();
        assert_eq!(prevalences, PREVALENCES);
    }

    #[test]
    fn test_header_must_match() {
        let schema = model();
        let err = RuleParser::new(&["table", "field", "code", "prevalence", "rank"], &schema);
        assert!(matches!(err, Err(DomainError::RuleParse { line: 1, .. })));

        let ok = RuleParser::new(&[" TABLE", "Field", "issue_code", "Prevalence", "rank "], &schema);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_validation_errors_are_collected() {
        let parsed = parse(
            "Table,Field,Issue Code,Prevalence,Rank\n\
             \"in (person, specimen)\",is primary key,G4-001,full,High\n\
             \"in (person, death)\",\"in (person_id, gender_concept_id)\",G2-013,low,Medium\n\
             person,is other,G1-001,low,Severe",
        );

        assert_eq!(
            parsed.validation_errors,
            vec![
                RuleValidationError {
                    line: 2,
                    kind: ValidationKind::UndefinedTable("specimen".into()),
                },
                RuleValidationError {
                    line: 3,
                    kind: ValidationKind::UndefinedField {
                        table: "death".into(),
                        field: "gender_concept_id".into(),
                    },
                },
                RuleValidationError {
                    line: 4,
                    kind: ValidationKind::InvalidRank("Severe".into()),
                },
            ]
        );
        assert_eq!(
            parsed.validation_errors[1].to_string(),
            "line 3: field 'gender_concept_id' is not defined for table 'death'"
        );

        // Parsing went on with the unresolved names.
        assert_eq!(parsed.rules.len(), 5);
        assert_eq!(parsed.rules[4].rank, Rank::Unset);

        let err = parsed.into_rule_set().unwrap_err();
        assert!(matches!(err, DomainError::RuleValidation { count: 3, .. }));
    }

    #[test]
    fn test_parse_error_aborts_only_its_row() {
        let parsed = parse(
            "Table,Field,Issue Code,Prevalence,Rank\n\
             in (person death),is primary key,G4-001,full,High\n\
             person,is primary key,G4-001,full,High\n\
             person,is other,G4-001,full",
        );

        assert_eq!(parsed.rules.len(), 1);
        assert_eq!(parsed.parse_errors.len(), 2);
        assert_eq!(
            parsed.parse_errors[0].to_string(),
            "line 2: 'person death' is not a valid identifier"
        );
        assert!(matches!(parsed.parse_errors[1], DomainError::RuleParse { line: 4, .. }));
        assert!(!parsed.is_valid());
    }

    const TABLE_POOL: [&str; 4] = ["person", "death", "condition_occurrence", "visit_payer"];

    fn predicate_field(condition: &FieldCondition, table: &str, stem: &str) -> String {
        match condition {
            FieldCondition::PrimaryKey => format!("{}_id", table),
            FieldCondition::SourceValue => format!("{}_source_value", stem),
            FieldCondition::DateYear => format!("{}_date", stem),
            FieldCondition::ForeignKey => format!("{}_id", stem),
            FieldCondition::ConceptId => format!("{}_concept_id", stem),
            FieldCondition::Other | FieldCondition::OneOf(_) => format!("{}_flag", stem),
        }
    }

    proptest! {
        #[test]
        fn prop_expansion_is_tables_times_prevalences(
            tables in proptest::sample::subsequence(TABLE_POOL.to_vec(), 1..=4),
            prevalences in proptest::sample::subsequence(PREVALENCES.to_vec(), 1..=5),
            predicate in proptest::sample::select(FieldCondition::PREDICATE_NAMES.to_vec()),
            // No 'd' or 'y': stems never contain "date"/"year".
            stem in "[abcefg]{1,8}",
        ) {
            let row = vec![
                format!("in ({})", tables.join(", ")),
                predicate.to_string(),
                "G9-999".to_string(),
                format!("in ({})", prevalences.join(",")),
                "Medium".to_string(),
            ];
            let schema = model();
            let mut parser = RuleParser::new(&RULES_HEADER, &schema).unwrap();
            let rules = parser.parse_row(&row).unwrap();

            prop_assert_eq!(rules.len(), tables.len() * prevalences.len());
            prop_assert!(parser.validation_errors().is_empty());

            for rule in &rules {
                let field = predicate_field(&rule.condition, &rule.table, &stem);
                let record = finding(&rule.table, &field, "g9-999", &rule.prevalence);
                prop_assert_eq!(rule.matches(&record), Some(Rank::Medium));
            }
        }
    }
}

// dqa-core/src/domain/rules/condition.rs

use std::fmt;

use crate::domain::ident::normalize;
use crate::domain::results::ResultRecord;

/// Test applied to the field of a finding.
///
/// The named predicates classify a field by naming convention of the data
/// model (`<table>_id`, `*_concept_id`, ...); `OneOf` is a literal field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldCondition {
    PrimaryKey,
    SourceValue,
    DateYear,
    ForeignKey,
    ConceptId,
    Other,
    /// Normalized field names.
    OneOf(Vec<String>),
}

impl FieldCondition {
    pub const PREDICATE_NAMES: [&'static str; 6] = [
        "is primary key",
        "is source value",
        "is date/year",
        "is foreign key",
        "is concept id",
        "is other",
    ];

    /// Binds a predicate name (case-insensitive). Anything else is a field list.
    pub fn from_predicate_name(value: &str) -> Option<Self> {
        let condition = match normalize(value).as_str() {
            "is primary key" => Self::PrimaryKey,
            "is source value" => Self::SourceValue,
            "is date/year" => Self::DateYear,
            "is foreign key" => Self::ForeignKey,
            "is concept id" => Self::ConceptId,
            "is other" => Self::Other,
            _ => return None,
        };
        Some(condition)
    }

    pub fn one_of<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::OneOf(fields.into_iter().map(|f| normalize(f.as_ref())).collect())
    }

    pub fn matches(&self, record: &ResultRecord) -> bool {
        self.matches_field(&record.table, &record.field)
    }

    pub fn matches_field(&self, table: &str, field: &str) -> bool {
        let table = normalize(table);
        let field = normalize(field);

        match self {
            Self::PrimaryKey => is_primary_key(&table, &field),
            Self::SourceValue => is_source_value(&field),
            Self::DateYear => is_date_year(&field),
            Self::ForeignKey => is_foreign_key(&table, &field),
            Self::ConceptId => is_concept_id(&field),
            Self::Other => {
                !is_primary_key(&table, &field)
                    && !is_foreign_key(&table, &field)
                    && !is_source_value(&field)
                    && !is_concept_id(&field)
                    && !is_date_year(&field)
            }
            Self::OneOf(fields) => fields.iter().any(|f| *f == field),
        }
    }
}

impl fmt::Display for FieldCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryKey => write!(f, "is primary key"),
            Self::SourceValue => write!(f, "is source value"),
            Self::DateYear => write!(f, "is date/year"),
            Self::ForeignKey => write!(f, "is foreign key"),
            Self::ConceptId => write!(f, "is concept id"),
            Self::Other => write!(f, "is other"),
            Self::OneOf(fields) => write!(f, "in ({})", fields.join(", ")),
        }
    }
}

fn is_primary_key(table: &str, field: &str) -> bool {
    field.strip_suffix("_id") == Some(table)
}

fn is_source_value(field: &str) -> bool {
    field.ends_with("_source_value")
}

fn is_concept_id(field: &str) -> bool {
    field.ends_with("_concept_id")
}

fn is_foreign_key(table: &str, field: &str) -> bool {
    !is_primary_key(table, field) && field.ends_with("_id") && !is_concept_id(field)
}

fn is_date_year(field: &str) -> bool {
    field.contains("date") || field.contains("year")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_names_bind() {
        for name in FieldCondition::PREDICATE_NAMES {
            let condition = FieldCondition::from_predicate_name(&name.to_uppercase());
            assert!(condition.is_some(), "{} should bind", name);
            assert_eq!(condition.map(|c| c.to_string()).as_deref(), Some(name));
        }
        assert_eq!(FieldCondition::from_predicate_name("person_id"), None);
    }

    #[test]
    fn test_naming_conventions() {
        let t = "visit_payer";
        assert!(FieldCondition::PrimaryKey.matches_field(t, "visit_payer_id"));
        assert!(!FieldCondition::PrimaryKey.matches_field(t, "provider_id"));
        assert!(FieldCondition::ForeignKey.matches_field(t, "provider_id"));
        assert!(!FieldCondition::ForeignKey.matches_field(t, "visit_payer_id"));
        assert!(!FieldCondition::ForeignKey.matches_field(t, "plan_concept_id"));
        assert!(FieldCondition::ConceptId.matches_field(t, "plan_concept_id"));
        assert!(FieldCondition::SourceValue.matches_field(t, "plan_source_value"));
        assert!(FieldCondition::DateYear.matches_field(t, "visit_start_date"));
        assert!(FieldCondition::DateYear.matches_field(t, "year_of_birth"));
        assert!(FieldCondition::Other.matches_field(t, "plan_class"));
        assert!(!FieldCondition::Other.matches_field(t, "provider_id"));
    }

    #[test]
    fn test_field_list_is_case_insensitive() {
        let condition = FieldCondition::one_of(["Provider_ID", "care_site_id"]);
        assert!(condition.matches_field("visit_payer", "provider_id"));
        assert!(condition.matches_field("visit_payer", " CARE_SITE_ID"));
        assert!(!condition.matches_field("visit_payer", "person_id"));
        assert_eq!(condition.to_string(), "in (provider_id, care_site_id)");
    }
}

// dqa-core/src/infrastructure/rules/loader.rs

use crate::domain::ports::SchemaProvider;
use crate::domain::rules::{parse_rule_rows, ParsedRuleSet};
use crate::error::DqaError;
use crate::infrastructure::codec::UniversalReader;

/// Parses the CSV text of one rules file.
///
/// Row problems are collected in the result; only an unreadable header or a
/// CSV syntax error fails the call.
pub fn parse_rule_text(
    name: &str,
    text: &str,
    schema: &dyn SchemaProvider,
) -> Result<ParsedRuleSet, DqaError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(UniversalReader::new(text.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|c| c.trim_start().to_string()).collect());
    }

    let mut rows = rows.into_iter();
    let header = rows.next().unwrap_or_default();

    Ok(parse_rule_rows(name, &header, rows, schema)?)
}

// dqa-core/src/application/report.rs
//
// Markdown checklist of the issues of one secondary report.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::domain::ident::normalize;
use crate::domain::results::{Rank, ReportFile, ResultRecord};

const SECTIONS: [(&str, &[&str]); 3] = [
    ("Demographic Tables", &["person", "death", "observation_period"]),
    (
        "Fact Tables",
        &[
            "visit_occurrence",
            "condition_occurrence",
            "procedure_occurrence",
            "drug_exposure",
            "observation",
            "measurement",
            "fact_relationship",
            "visit_payer",
        ],
    ),
    ("Admin Tables", &["care_site", "location", "provider"]),
];

const OTHER_SECTION: &str = "Other Tables";

// Site-side transform issues are tracked outside the report.
const EXCLUDED_CAUSE: &str = "i2b2 transform";

fn section_of(table: &str) -> usize {
    let table = normalize(table);
    SECTIONS
        .iter()
        .position(|(_, tables)| tables.contains(&table.as_str()))
        .unwrap_or(SECTIONS.len())
}

fn section_name(index: usize) -> &'static str {
    SECTIONS.get(index).map(|(name, _)| *name).unwrap_or(OTHER_SECTION)
}

#[derive(Debug, Default)]
pub struct IssueReport<'a> {
    /// section → table → rank → issues (sorted by field).
    sections: BTreeMap<usize, BTreeMap<String, BTreeMap<Rank, Vec<&'a ResultRecord>>>>,
}

impl<'a> IssueReport<'a> {
    pub fn build(reports: impl IntoIterator<Item = &'a ReportFile>) -> Self {
        let mut report = Self::default();

        for file in reports {
            for record in file.issues() {
                if !record.rank.is_set() || normalize(&record.cause) == EXCLUDED_CAUSE {
                    continue;
                }
                report
                    .sections
                    .entry(section_of(&record.table))
                    .or_default()
                    .entry(normalize(&record.table))
                    .or_default()
                    .entry(record.rank)
                    .or_default()
                    .push(record);
            }
        }

        for tables in report.sections.values_mut() {
            for ranks in tables.values_mut() {
                for issues in ranks.values_mut() {
                    issues.sort_by(|a, b| a.field.cmp(&b.field));
                }
            }
        }

        report
    }

    pub fn len(&self) -> usize {
        self.sections
            .values()
            .flat_map(|tables| tables.values())
            .flat_map(|ranks| ranks.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Issues are numbered in output order, starting at 1.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let mut number = 0;

        for (section, tables) in &self.sections {
            let _ = writeln!(out, "# {}\n", section_name(*section));

            for (table, ranks) in tables {
                let _ = writeln!(out, "## {}\n", table);

                for (rank, issues) in ranks {
                    let _ = writeln!(out, "### {}\n", rank);

                    for issue in issues {
                        number += 1;
                        let _ = write!(
                            out,
                            "- [ ] {}. **{}**: {}",
                            number,
                            issue.field,
                            issue.issue_description.trim()
                        );
                        if !issue.finding.trim().is_empty() {
                            let _ = write!(out, " ({})", issue.finding.trim());
                        }
                        out.push('\n');
                    }
                    out.push('\n');
                }
            }
        }

        out
    }
}

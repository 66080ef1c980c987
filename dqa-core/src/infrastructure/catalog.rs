// dqa-core/src/infrastructure/catalog.rs

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::domain::conflict::{check_code_from_file_name, Catalog, Threshold};
use crate::error::DqaError;
use crate::infrastructure::codec::UniversalReader;
use crate::ports::CatalogSource;

pub const ASSOCIATIONS_FILE: &str = "conflict_associations.csv";

/// Threshold catalog kept as CSV files in a local directory.
///
/// `conflict_associations.csv` maps check codes (second column) to issue
/// codes (first column). Every `<CHECK>_*.csv` file then lists
/// `_, table, field, lower, upper` rows for the issue code its check maps to.
pub struct FsCatalogSource {
    dir: PathBuf,
}

impl FsCatalogSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn csv_rows(path: &Path) -> Result<Vec<csv::StringRecord>, DqaError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(UniversalReader::new(File::open(path)?));
    Ok(reader.records().collect::<Result<Vec<_>, _>>()?)
}

/// Check code → issue code.
fn read_associations(path: &Path) -> Result<HashMap<String, String>, DqaError> {
    if !path.exists() {
        warn!(path = ?path, "No conflict associations; catalog files map to their own check code");
        return Ok(HashMap::new());
    }

    Ok(csv_rows(path)?
        .iter()
        .filter_map(|row| Some((row.get(1)?.to_string(), row.get(0)?.to_string())))
        .collect())
}

#[instrument(skip_all, fields(dir = ?dir))]
pub fn load_catalog(dir: &Path) -> Result<Catalog, DqaError> {
    let associations = read_associations(&dir.join(ASSOCIATIONS_FILE))?;
    let mut catalog = Catalog::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| DqaError::InternalError(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        let Some(check_code) = check_code_from_file_name(&name) else {
            continue;
        };

        let issue_code = associations
            .get(check_code)
            .map(String::as_str)
            .unwrap_or(check_code);
        catalog.add_code(issue_code);

        let rows = csv_rows(entry.path())?;
        for row in &rows {
            let (Some(table), Some(field), Some(lower), Some(upper)) =
                (row.get(1), row.get(2), row.get(3), row.get(4))
            else {
                debug!(file = %name, "Skipping short catalog row");
                continue;
            };
            catalog.insert(issue_code, table, field, Threshold::from_cells(lower, upper));
        }
        debug!(file = %name, issue_code, rows = rows.len(), "Loaded catalog file");
    }

    info!(codes = catalog.len(), "Loaded threshold catalog");
    Ok(catalog)
}

#[async_trait]
impl CatalogSource for FsCatalogSource {
    async fn load(&self) -> Result<Catalog, DqaError> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || load_catalog(&dir))
            .await
            .map_err(|e| DqaError::InternalError(format!("catalog task failed: {}", e)))?
    }
}

// dqa-core/src/infrastructure/config/model.rs

use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::model::DataModel;
use crate::infrastructure::error::InfrastructureError;

/// Reads a data model description:
///
/// ```yaml
/// name: pedsnet
/// version: 2.3.0
/// tables:
///   - name: person
///     fields: [person_id, year_of_birth]
/// ```
pub fn load_data_model(path: &Path) -> Result<DataModel, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    let model: DataModel = serde_yaml::from_str(&content)?;
    info!(
        model = %model.name,
        version = %model.version,
        tables = model.tables.len(),
        "Loaded data model"
    );
    Ok(model)
}

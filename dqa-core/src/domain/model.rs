// dqa-core/src/domain/model.rs
//
// Tables and fields of the data model a report is assessed against.

use serde::{Deserialize, Serialize};

use crate::domain::ident::same;
use crate::domain::ports::SchemaProvider;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl TableDef {
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| same(f, field))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DataModel {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub tables: Vec<TableDef>,
}

impl SchemaProvider for DataModel {
    fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| same(&t.name, name))
    }

    fn tables(&self) -> &[TableDef] {
        &self.tables
    }
}

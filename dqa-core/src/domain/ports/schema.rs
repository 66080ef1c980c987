use crate::domain::model::TableDef;

/// Source of truth for table and field names (the data model service).
pub trait SchemaProvider: Send + Sync {
    fn table(&self, name: &str) -> Option<&TableDef>;

    fn tables(&self) -> &[TableDef];

    fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    fn has_field(&self, table: &str, field: &str) -> bool {
        self.table(table).is_some_and(|t| t.has_field(field))
    }
}

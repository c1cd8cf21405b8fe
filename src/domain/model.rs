use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Name of the column appended to every output row.
pub const OUTPUT_COLUMN: &str = "open_ai_output";

/// One input record, keyed by column name.
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub fields: HashMap<String, String>,
}

impl Row {
    pub fn from_headers(headers: &csv::StringRecord, record: &csv::StringRecord) -> Self {
        let mut fields = HashMap::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            fields.insert(header.to_string(), value.to_string());
        }
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct TableDefinition {
    pub name: String,
    pub full_path: PathBuf,
    pub columns: Vec<String>,
}

/// Schema manifest persisted next to a table for downstream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableManifest {
    pub columns: Vec<String>,
}

//! Snapshot and row types produced by the row source.
//!
//! A `Snapshot` is one full read of the station CSV: the normalized header
//! plus every data row. Header names arrive with a leading `#` and stray
//! whitespace (WeeWX comment-style headers); normalization happens at
//! construction so the evaluator only ever sees clean keys.

use std::collections::HashMap;

/// One data row: normalized field name to raw string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: HashMap<String, String>,
}

impl Row {
    /// Build a row by zipping normalized column names with raw values.
    /// Extra values beyond the header are dropped, short rows simply have
    /// fewer fields.
    pub fn from_values(columns: &[String], values: &[String]) -> Self {
        let fields = columns
            .iter()
            .zip(values.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self { fields }
    }

    /// Look up a field by its normalized name.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// One full read of the station CSV file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Snapshot {
    /// Build a snapshot from raw header names and raw row values.
    /// Header names are normalized here: leading `#` stripped, whitespace
    /// trimmed.
    pub fn new(raw_columns: Vec<String>, raw_rows: Vec<Vec<String>>) -> Self {
        let columns: Vec<String> = raw_columns
            .iter()
            .map(|name| normalize_field_name(name))
            .collect();
        let rows = raw_rows
            .iter()
            .map(|values| Row::from_values(&columns, values))
            .collect();
        Self { columns, rows }
    }

    /// Whether the normalized header contains the given column.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// The data rows, in file order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Normalized column names, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Strip a leading `#` and surrounding whitespace from a header name.
fn normalize_field_name(raw: &str) -> String {
    raw.trim().trim_start_matches('#').trim().to_string()
}

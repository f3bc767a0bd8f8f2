//! Tabular view of list results
//!
//! Rows are keyed by the record `_id`; columns are the union of record
//! fields in first-seen order. An empty result still carries the canonical
//! columns for its datatype so callers can rely on the schema.

use queue_client::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::datatype::Datatype;

/// One record without its `_id`.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<(String, Row)>,
}

impl Table {
    /// Empty table with the canonical columns of `datatype`.
    pub fn empty(datatype: Datatype) -> Self {
        Self {
            columns: datatype.columns().iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Build from raw records, preserving their order.
    ///
    /// Every record must be an object with an `_id`.
    pub fn from_records(datatype: Datatype, records: Vec<Value>) -> Result<Self> {
        if records.is_empty() {
            return Ok(Self::empty(datatype));
        }

        let mut table = Table::default();
        for (position, record) in records.into_iter().enumerate() {
            let Value::Object(mut row) = record else {
                return Err(Error::Decode(format!(
                    "{} record {position} is not an object",
                    datatype.path()
                )));
            };
            let id = match row.remove("_id") {
                Some(Value::String(id)) => id,
                Some(other) => other.to_string(),
                None => {
                    return Err(Error::Decode(format!(
                        "{} record {position} has no _id",
                        datatype.path()
                    )));
                }
            };
            for key in row.keys() {
                if !table.columns.iter().any(|c| c == key) {
                    table.columns.push(key.clone());
                }
            }
            table.rows.push((id, row));
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Row)> {
        self.rows.iter().map(|(id, row)| (id.as_str(), row))
    }

    pub fn get(&self, id: &str) -> Option<&Row> {
        self.rows
            .iter()
            .find(|(row_id, _)| row_id == id)
            .map(|(_, row)| row)
    }

    /// Cell value; `None` when the row or the field is missing.
    pub fn cell(&self, id: &str, column: &str) -> Option<&Value> {
        self.get(id).and_then(|row| row.get(column))
    }

    /// Replace every present value in `column` with `f(value)`.
    pub fn map_column<F>(&mut self, column: &str, mut f: F)
    where
        F: FnMut(&Value) -> Value,
    {
        for (_, row) in &mut self.rows {
            if let Some(value) = row.get_mut(column) {
                *value = f(value);
            }
        }
    }

    /// Set `column` on the row `id`, adding the column if new.
    pub fn set(&mut self, id: &str, column: &str, value: Value) {
        if let Some((_, row)) = self.rows.iter_mut().find(|(row_id, _)| row_id == id) {
            row.insert(column.to_string(), value);
            if !self.columns.iter().any(|c| c == column) {
                self.columns.push(column.to_string());
            }
        }
    }

    /// Back to records, `_id` restored.
    pub fn into_records(self) -> Vec<Value> {
        self.rows
            .into_iter()
            .map(|(id, mut row)| {
                row.insert("_id".into(), Value::String(id));
                Value::Object(row)
            })
            .collect()
    }
}

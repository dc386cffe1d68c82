use chrono::{DateTime, Utc};
use serde::Serialize;

/// Storage type of a column, decided once when the file is loaded and
/// never re-inferred downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnDtype {
    Numeric,
    Text,
    Boolean,
}

impl std::fmt::Display for ColumnDtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnDtype::Numeric => write!(f, "numeric"),
            ColumnDtype::Text => write!(f, "text"),
            ColumnDtype::Boolean => write!(f, "boolean"),
        }
    }
}

/// Column values tagged by storage type. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Boolean(Vec<Option<bool>>),
}

impl ColumnValues {
    pub fn dtype(&self) -> ColumnDtype {
        match self {
            ColumnValues::Numeric(_) => ColumnDtype::Numeric,
            ColumnValues::Text(_) => ColumnDtype::Text,
            ColumnValues::Boolean(_) => ColumnDtype::Boolean,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
            ColumnValues::Boolean(v) => v.len(),
        }
    }

    pub fn null_count(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnValues::Text(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnValues::Boolean(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// An in-memory tabular dataset: ordered columns of equal length, with
/// column names unique within the dataset. The loader enforces both
/// invariants; the analysis code relies on them.
#[derive(Debug, Clone, Default)]
pub struct TableData {
    pub columns: Vec<Column>,
}

impl TableData {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// One JSON object per row, in row order. Missing cells serialize
    /// as JSON null. Numeric values that cannot be represented in JSON
    /// also become null rather than NaN literals.
    pub fn rows_as_json(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        let rows = self.row_count();
        (0..rows)
            .map(|idx| {
                self.columns
                    .iter()
                    .map(|col| {
                        let value = match &col.values {
                            ColumnValues::Numeric(v) => v[idx]
                                .and_then(serde_json::Number::from_f64)
                                .map(serde_json::Value::Number)
                                .unwrap_or(serde_json::Value::Null),
                            ColumnValues::Text(v) => v[idx]
                                .clone()
                                .map(serde_json::Value::String)
                                .unwrap_or(serde_json::Value::Null),
                            ColumnValues::Boolean(v) => v[idx]
                                .map(serde_json::Value::Bool)
                                .unwrap_or(serde_json::Value::Null),
                        };
                        (col.name.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }
}

/// Stored metadata for an uploaded dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetRecord {
    pub id: i64,
    pub filename: String,
    pub file_path: String,
    pub upload_date: DateTime<Utc>,
}

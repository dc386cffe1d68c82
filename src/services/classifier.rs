use std::collections::HashSet;

use serde::Serialize;

use crate::models::{Column, ColumnDtype, ColumnValues, TableData};
use crate::services::stats;

/// Numeric columns with fewer distinct values than this are treated as
/// categorical labels rather than measurements.
const CATEGORICAL_UNIQUE_THRESHOLD: usize = 20;
/// Datetime sniffing samples the first N non-null text values, in
/// original order.
const DATETIME_SAMPLE_SIZE: usize = 10;
/// Minimum sampled values containing a date separator for a text
/// column to count as datetime-like.
const DATETIME_MIN_MATCHES: usize = 5;
const DATE_SEPARATORS: [char; 3] = ['/', '-', ':'];

/// Per-column classification result. All fields derive from the
/// column's own values; there is no cross-column dependency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: ColumnDtype,
    pub unique_count: usize,
    pub null_count: usize,
    pub total_count: usize,
    pub is_numeric: bool,
    pub is_categorical: bool,
    pub is_datetime: bool,
    pub is_continuous: bool,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Profiles in dataset column order, exactly one per column. Column
/// names are unique, so by-name lookup is unambiguous.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ColumnProfiles(Vec<ColumnProfile>);

impl ColumnProfiles {
    pub fn get(&self, name: &str) -> Option<&ColumnProfile> {
        self.0.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnProfile> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ColumnProfiles {
    type Item = &'a ColumnProfile;
    type IntoIter = std::slice::Iter<'a, ColumnProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Classify every column of the dataset. Total over well-formed input:
/// entirely-null numeric columns simply get absent statistics.
pub fn classify(data: &TableData) -> ColumnProfiles {
    ColumnProfiles(data.columns.iter().map(profile_column).collect())
}

fn profile_column(column: &Column) -> ColumnProfile {
    let dtype = column.values.dtype();
    let total_count = column.values.len();
    let null_count = column.values.null_count();
    let unique_count = unique_count(&column.values);

    let is_numeric = dtype == ColumnDtype::Numeric;
    let is_categorical =
        dtype == ColumnDtype::Text || (is_numeric && unique_count < CATEGORICAL_UNIQUE_THRESHOLD);
    let is_datetime = match &column.values {
        ColumnValues::Text(values) => looks_like_datetime(values),
        _ => false,
    };
    let is_continuous = is_numeric && !is_categorical;

    let summary = match &column.values {
        ColumnValues::Numeric(values) => stats::summarize(values),
        _ => stats::NumericSummary::default(),
    };

    ColumnProfile {
        name: column.name.clone(),
        dtype,
        unique_count,
        null_count,
        total_count,
        is_numeric,
        is_categorical,
        is_datetime,
        is_continuous,
        mean: summary.mean,
        std: summary.std,
        min: summary.min,
        max: summary.max,
    }
}

/// Distinct non-null values. Floats are compared by bit pattern; the
/// loader never produces NaN, so this matches value equality.
fn unique_count(values: &ColumnValues) -> usize {
    match values {
        ColumnValues::Numeric(v) => v
            .iter()
            .flatten()
            .map(|x| x.to_bits())
            .collect::<HashSet<_>>()
            .len(),
        ColumnValues::Text(v) => v
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<HashSet<_>>()
            .len(),
        ColumnValues::Boolean(v) => v.iter().flatten().collect::<HashSet<_>>().len(),
    }
}

/// A text column is datetime-like when at least 5 of its first 10
/// non-null values contain a date separator. Columns with fewer than
/// 5 non-null values can never qualify.
fn looks_like_datetime(values: &[Option<String>]) -> bool {
    let matches = values
        .iter()
        .flatten()
        .take(DATETIME_SAMPLE_SIZE)
        .filter(|v| v.chars().any(|c| DATE_SEPARATORS.contains(&c)))
        .count();
    matches >= DATETIME_MIN_MATCHES
}

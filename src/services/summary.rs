use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ColumnDtype, DatasetRecord, TableData};
use crate::services::classifier::ColumnProfiles;

/// Categorical columns above this cardinality are called out as hard
/// to visualize directly.
const HIGH_CARDINALITY_THRESHOLD: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub dataset_id: i64,
    pub filename: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub chart_count: usize,
    pub insights: Vec<String>,
    pub upload_date: DateTime<Utc>,
}

pub fn dataset_summary(
    record: &DatasetRecord,
    table: &TableData,
    profiles: &ColumnProfiles,
) -> DatasetSummary {
    DatasetSummary {
        dataset_id: record.id,
        filename: record.filename.clone(),
        rows: table.row_count(),
        columns: table.column_count(),
        column_names: table.column_names(),
        // Rough estimate of how many charts the generator will offer.
        chart_count: table.column_count().min(5),
        insights: basic_insights(table, profiles),
        upload_date: record.upload_date,
    }
}

/// Headline observations about the dataset as a whole.
pub fn basic_insights(table: &TableData, profiles: &ColumnProfiles) -> Vec<String> {
    let mut insights = Vec::new();

    insights.push(format!(
        "Dataset contains {} rows and {} columns",
        table.row_count(),
        table.column_count()
    ));

    insights.push(match missing_percentage(table) {
        pct if pct > 0.0 => format!("Dataset has {:.1}% missing values", pct),
        _ => "Dataset has no missing values".to_string(),
    });

    let numeric: Vec<&str> = profiles
        .iter()
        .filter(|p| p.dtype == ColumnDtype::Numeric)
        .map(|p| p.name.as_str())
        .collect();
    if !numeric.is_empty() {
        insights.push(format!(
            "Found {} numeric columns: {}{}",
            numeric.len(),
            numeric[..numeric.len().min(3)].join(", "),
            if numeric.len() > 3 { "..." } else { "" }
        ));
    }

    let categorical: Vec<&str> = profiles
        .iter()
        .filter(|p| p.dtype == ColumnDtype::Text)
        .map(|p| p.name.as_str())
        .collect();
    if !categorical.is_empty() {
        insights.push(format!(
            "Found {} categorical columns: {}{}",
            categorical.len(),
            categorical[..categorical.len().min(3)].join(", "),
            if categorical.len() > 3 { "..." } else { "" }
        ));
    }

    let dates: Vec<&str> = profiles
        .iter()
        .filter(|p| p.is_datetime)
        .map(|p| p.name.as_str())
        .collect();
    if !dates.is_empty() {
        insights.push(format!(
            "Potential date columns detected: {}",
            dates[..dates.len().min(2)].join(", ")
        ));
    }

    insights
}

/// Observations about column roles, used by the insights endpoint.
pub fn column_insights(profiles: &ColumnProfiles) -> Vec<String> {
    let mut insights = Vec::new();

    let numeric_count = profiles.iter().filter(|p| p.is_numeric).count();
    let categorical_count = profiles.iter().filter(|p| p.is_categorical).count();
    let datetime_count = profiles.iter().filter(|p| p.is_datetime).count();

    if numeric_count > 0 {
        insights.push(format!(
            "Dataset has {} numeric column{} suitable for quantitative analysis",
            numeric_count,
            plural(numeric_count)
        ));
    }

    if categorical_count > 0 {
        insights.push(format!(
            "Dataset has {} categorical column{} good for grouping and comparison",
            categorical_count,
            plural(categorical_count)
        ));
    }

    if datetime_count > 0 {
        insights.push("Dataset contains time-based data, enabling trend analysis over time".to_string());
    }

    let high_cardinality: Vec<&str> = profiles
        .iter()
        .filter(|p| p.is_categorical && p.unique_count > HIGH_CARDINALITY_THRESHOLD)
        .map(|p| p.name.as_str())
        .collect();
    if !high_cardinality.is_empty() {
        insights.push(format!(
            "Columns {} have high cardinality - consider filtering or grouping",
            high_cardinality[..high_cardinality.len().min(2)].join(", ")
        ));
    }

    let missing_count = profiles.iter().filter(|p| p.null_count > 0).count();
    if missing_count > 0 {
        insights.push(format!(
            "Missing data detected in {} column{} - consider data cleaning",
            missing_count,
            plural(missing_count)
        ));
    }

    insights
}

/// Rows identical to an earlier row. Rows compare by their serialized
/// JSON form, which is stable because column order is fixed.
pub fn duplicate_row_count(table: &TableData) -> usize {
    let mut seen = HashSet::new();
    table
        .rows_as_json()
        .iter()
        .filter(|row| !seen.insert(serde_json::to_string(row).unwrap_or_default()))
        .count()
}

pub fn missing_percentage(table: &TableData) -> f64 {
    let total_cells = table.row_count() * table.column_count();
    if total_cells == 0 {
        return 0.0;
    }
    let nulls: usize = table.columns.iter().map(|c| c.values.null_count()).sum();
    nulls as f64 / total_cells as f64 * 100.0
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

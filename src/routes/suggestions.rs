use std::path::Path as FilePath;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    services::{
        charts, classifier, loader,
        suggestions::{self, ChartSuggestion},
        summary,
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/suggestions", get(get_suggestions))
        // The doubled "suggestions" segment is part of the published
        // path: the router mounts at /api/suggestions.
        .route("/suggestions/:dataset_id/insights", get(get_insights))
        .route("/chart-types", get(get_chart_types))
}

#[derive(Debug, Deserialize)]
struct DatasetQuery {
    dataset_id: i64,
}

#[derive(Debug, Serialize)]
struct SuggestionsResponse {
    dataset_id: i64,
    suggestions: Vec<ChartSuggestion>,
}

async fn get_suggestions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DatasetQuery>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let start = std::time::Instant::now();

    let record = state.store.get_dataset(query.dataset_id)?;
    let table = loader::load_table(FilePath::new(&record.file_path))?;
    let profiles = classifier::classify(&table);
    let suggestions = suggestions::suggest(&profiles);

    tracing::info!(
        "Generated {} chart suggestions from {} column profiles for dataset {} in {:?}",
        suggestions.len(),
        profiles.len(),
        query.dataset_id,
        start.elapsed()
    );

    Ok(Json(SuggestionsResponse {
        dataset_id: query.dataset_id,
        suggestions,
    }))
}

async fn get_insights(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let record = state.store.get_dataset(dataset_id)?;
    let table = loader::load_table(FilePath::new(&record.file_path))?;
    let profiles = classifier::classify(&table);

    let missing_pct = (summary::missing_percentage(&table) * 100.0).round() / 100.0;
    let columns_with_missing: Vec<&str> = profiles
        .iter()
        .filter(|p| p.null_count > 0)
        .map(|p| p.name.as_str())
        .collect();

    let best_for_trends: Vec<&str> = profiles
        .iter()
        .filter(|p| p.is_datetime)
        .map(|p| p.name.as_str())
        .collect();
    let best_for_categories: Vec<&str> = profiles
        .iter()
        .filter(|p| p.is_categorical && p.unique_count <= 10)
        .map(|p| p.name.as_str())
        .collect();
    let best_for_distributions: Vec<&str> = profiles
        .iter()
        .filter(|p| p.is_continuous)
        .map(|p| p.name.as_str())
        .collect();
    let best_for_correlations: Vec<&str> = profiles
        .iter()
        .filter(|p| p.is_numeric)
        .take(5)
        .map(|p| p.name.as_str())
        .collect();

    Ok(Json(json!({
        "dataset_id": dataset_id,
        "filename": record.filename,
        "upload_date": record.upload_date,
        "shape": { "rows": table.row_count(), "columns": table.column_count() },
        "column_analysis": profiles,
        "strategic_insights": summary::column_insights(&profiles),
        "data_quality": {
            "missing_data_percentage": missing_pct,
            "duplicate_rows": summary::duplicate_row_count(&table),
            "columns_with_missing_data": columns_with_missing,
        },
        "recommendations": {
            "best_for_trends": best_for_trends,
            "best_for_categories": best_for_categories,
            "best_for_distributions": best_for_distributions,
            "best_for_correlations": best_for_correlations,
        }
    })))
}

async fn get_chart_types() -> Json<Value> {
    Json(json!({
        "supported_charts": charts::SUPPORTED_CHART_TYPES,
        "selection_guidelines": {
            "for_exploration": ["histogram", "scatter", "box"],
            "for_comparison": ["bar", "box", "heatmap"],
            "for_trends": ["line", "scatter"],
            "for_composition": ["pie", "bar"],
            "for_correlation": ["scatter", "heatmap"]
        },
        "data_size_recommendations": {
            "small_datasets": "< 100 rows - All chart types suitable",
            "medium_datasets": "100-1000 rows - Consider sampling for scatter plots",
            "large_datasets": "> 1000 rows - Use aggregation or sampling"
        }
    }))
}

use std::path::Path as FilePath;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    services::{classifier, loader, summary, summary::DatasetSummary},
    AppState,
};

const ALLOWED_EXTENSIONS: [&str; 4] = ["csv", "xlsx", "xls", "json"];
const DEFAULT_DATA_LIMIT: usize = 100;
const MAX_DATA_LIMIT: usize = 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(upload_file))
        .route("/summary", get(get_summary))
        .route("/data", get(get_data))
        .route("/datasets", get(list_datasets))
        .route("/datasets/:dataset_id", delete(delete_dataset))
}

#[derive(Debug, Deserialize)]
struct DatasetQuery {
    dataset_id: i64,
}

#[derive(Debug, Deserialize)]
struct DataQuery {
    dataset_id: i64,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    success: bool,
    message: String,
    dataset_id: Option<i64>,
    filename: Option<String>,
}

#[derive(Debug, Serialize)]
struct DatasetResponse {
    id: i64,
    filename: String,
    upload_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct DataResponse {
    dataset_id: i64,
    data: Vec<serde_json::Map<String, Value>>,
    metadata: Value,
}

async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let start = std::time::Instant::now();

    let (filename, data) = read_upload_field(&mut multipart).await?;
    tracing::info!("Received upload: {} ({} bytes)", filename, data.len());

    let extension = FilePath::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::InvalidInput(format!(
            "Unsupported file type. Allowed: {}",
            ALLOWED_EXTENSIONS.map(|e| format!(".{}", e)).join(", ")
        )));
    }
    if data.len() > state.config.max_file_size {
        return Err(AppError::InvalidInput(
            "File exceeds maximum upload size".to_string(),
        ));
    }

    let path = state.storage.save(&filename, &data)?;

    // Clean up the saved file when parsing or persistence fails.
    let table = match loader::load_table(&path) {
        Ok(table) => table,
        Err(e) => {
            state.storage.remove(&path);
            return Err(e);
        }
    };

    let stored = (|| {
        let dataset_id = state
            .store
            .insert_dataset(&filename, &path.to_string_lossy())?;
        state.store.insert_records(dataset_id, &table.rows_as_json())?;
        Ok::<_, AppError>(dataset_id)
    })();
    let dataset_id = match stored {
        Ok(id) => id,
        Err(e) => {
            state.storage.remove(&path);
            return Err(e);
        }
    };

    tracing::info!(
        "Upload of dataset {} processed in {:?}",
        dataset_id,
        start.elapsed()
    );

    Ok(Json(UploadResponse {
        success: true,
        message: format!(
            "File uploaded and processed successfully. {} rows and {} columns detected.",
            table.row_count(),
            table.column_count()
        ),
        dataset_id: Some(dataset_id),
        filename: Some(filename),
    }))
}

async fn read_upload_field(multipart: &mut Multipart) -> Result<(String, bytes::Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart request: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .map(ToString::to_string)
                .ok_or_else(|| AppError::InvalidInput("No filename provided".to_string()))?;
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))?;
            return Ok((filename, data));
        }
    }
    Err(AppError::InvalidInput("No file provided".to_string()))
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DatasetQuery>,
) -> Result<Json<DatasetSummary>, AppError> {
    let record = state.store.get_dataset(query.dataset_id)?;
    let table = loader::load_table(FilePath::new(&record.file_path))?;
    let profiles = classifier::classify(&table);
    Ok(Json(summary::dataset_summary(&record, &table, &profiles)))
}

async fn get_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DataQuery>,
) -> Result<Json<DataResponse>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_DATA_LIMIT)
        .clamp(1, MAX_DATA_LIMIT);

    let record = state.store.get_dataset(query.dataset_id)?;
    let data = state.store.get_records(query.dataset_id, limit)?;

    let metadata = json!({
        "filename": record.filename,
        "upload_date": record.upload_date,
        "total_records_returned": data.len(),
        "limit_applied": limit,
    });

    Ok(Json(DataResponse {
        dataset_id: query.dataset_id,
        data,
        metadata,
    }))
}

async fn list_datasets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DatasetResponse>>, AppError> {
    let datasets = state
        .store
        .list_datasets()?
        .into_iter()
        .map(|record| DatasetResponse {
            id: record.id,
            filename: record.filename,
            upload_date: record.upload_date,
        })
        .collect();
    Ok(Json(datasets))
}

async fn delete_dataset(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let record = state.store.delete_dataset(dataset_id)?;
    state.storage.remove(FilePath::new(&record.file_path));
    Ok(Json(json!({
        "success": true,
        "message": "Dataset deleted successfully"
    })))
}

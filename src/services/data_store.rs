use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::DatasetRecord;

/// At most this many rows of an upload are persisted as JSON blobs.
pub const MAX_STORED_ROWS: usize = 1000;

/// SQLite-backed store for dataset metadata and row blobs. A single
/// connection behind a mutex, shared across handlers.
pub struct DataStore {
    conn: Mutex<Connection>,
}

impl DataStore {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        info!("Opening dataset store at {}", path.display());
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), AppError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS datasets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                file_path TEXT NOT NULL,
                upload_date TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS data_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                dataset_id INTEGER NOT NULL REFERENCES datasets(id),
                json_data TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|e| AppError::Internal(format!("Database lock poisoned: {}", e)))
    }

    pub fn insert_dataset(&self, filename: &str, file_path: &str) -> Result<i64, AppError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO datasets (filename, file_path, upload_date) VALUES (?1, ?2, ?3)",
            (filename, file_path, Utc::now().to_rfc3339()),
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Persist up to [`MAX_STORED_ROWS`] rows as one JSON object each.
    pub fn insert_records(
        &self,
        dataset_id: i64,
        rows: &[serde_json::Map<String, serde_json::Value>],
    ) -> Result<usize, AppError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("INSERT INTO data_records (dataset_id, json_data) VALUES (?1, ?2)")?;

        let mut stored = 0;
        for row in rows.iter().take(MAX_STORED_ROWS) {
            let json = serde_json::to_string(row)?;
            stmt.execute((dataset_id, json))?;
            stored += 1;
        }
        debug!("Stored {} rows for dataset {}", stored, dataset_id);
        Ok(stored)
    }

    pub fn get_dataset(&self, dataset_id: i64) -> Result<DatasetRecord, AppError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT id, filename, file_path, upload_date FROM datasets WHERE id = ?1",
                [dataset_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    AppError::NotFound(format!("Dataset {}", dataset_id))
                }
                other => AppError::Database(other),
            })?;
        dataset_from_row(row)
    }

    pub fn list_datasets(&self) -> Result<Vec<DatasetRecord>, AppError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, filename, file_path, upload_date FROM datasets ORDER BY upload_date DESC, id DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(dataset_from_row).collect()
    }

    pub fn get_records(
        &self,
        dataset_id: i64,
        limit: usize,
    ) -> Result<Vec<serde_json::Map<String, serde_json::Value>>, AppError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT json_data FROM data_records WHERE dataset_id = ?1 ORDER BY id LIMIT ?2",
        )?;
        let blobs = stmt
            .query_map((dataset_id, limit as i64), |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        // Rows that fail to decode are skipped rather than failing the
        // whole fetch.
        Ok(blobs
            .iter()
            .filter_map(|blob| serde_json::from_str(blob).ok())
            .collect())
    }

    /// Delete a dataset and its stored rows, returning its metadata so
    /// the caller can clean up the file on disk.
    pub fn delete_dataset(&self, dataset_id: i64) -> Result<DatasetRecord, AppError> {
        let record = self.get_dataset(dataset_id)?;
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM data_records WHERE dataset_id = ?1",
            [dataset_id],
        )?;
        conn.execute("DELETE FROM datasets WHERE id = ?1", [dataset_id])?;
        info!("Deleted dataset {}", dataset_id);
        Ok(record)
    }
}

fn dataset_from_row(
    (id, filename, file_path, upload_date): (i64, String, String, String),
) -> Result<DatasetRecord, AppError> {
    let upload_date = DateTime::parse_from_rfc3339(&upload_date)
        .map_err(|e| AppError::Internal(format!("Invalid stored timestamp: {}", e)))?
        .with_timezone(&Utc);
    Ok(DatasetRecord {
        id,
        filename,
        file_path,
        upload_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_rows(n: usize) -> Vec<serde_json::Map<String, serde_json::Value>> {
        (0..n)
            .map(|i| {
                let mut row = serde_json::Map::new();
                row.insert("idx".to_string(), json!(i));
                row.insert("label".to_string(), json!(format!("row-{}", i)));
                row
            })
            .collect()
    }

    #[test]
    fn dataset_round_trip() {
        let store = DataStore::open_in_memory().unwrap();
        let id = store.insert_dataset("sales.csv", "/tmp/abc.csv").unwrap();
        let record = store.get_dataset(id).unwrap();
        assert_eq!(record.filename, "sales.csv");
        assert_eq!(record.file_path, "/tmp/abc.csv");
    }

    #[test]
    fn missing_dataset_is_not_found() {
        let store = DataStore::open_in_memory().unwrap();
        assert!(matches!(
            store.get_dataset(42).unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn records_are_capped_and_fetched_with_limit() {
        let store = DataStore::open_in_memory().unwrap();
        let id = store.insert_dataset("big.csv", "/tmp/big.csv").unwrap();
        let stored = store
            .insert_records(id, &sample_rows(MAX_STORED_ROWS + 50))
            .unwrap();
        assert_eq!(stored, MAX_STORED_ROWS);

        let fetched = store.get_records(id, 10).unwrap();
        assert_eq!(fetched.len(), 10);
        assert_eq!(fetched[0]["idx"], json!(0));
    }

    #[test]
    fn delete_removes_dataset_and_rows() {
        let store = DataStore::open_in_memory().unwrap();
        let id = store.insert_dataset("gone.csv", "/tmp/gone.csv").unwrap();
        store.insert_records(id, &sample_rows(5)).unwrap();

        let record = store.delete_dataset(id).unwrap();
        assert_eq!(record.file_path, "/tmp/gone.csv");
        assert!(matches!(
            store.get_dataset(id).unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(store.get_records(id, 10).unwrap().is_empty());
    }

    #[test]
    fn list_is_newest_first() {
        let store = DataStore::open_in_memory().unwrap();
        let first = store.insert_dataset("a.csv", "/tmp/a.csv").unwrap();
        let second = store.insert_dataset("b.csv", "/tmp/b.csv").unwrap();
        let listed = store.list_datasets().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[1].id, first);
    }
}

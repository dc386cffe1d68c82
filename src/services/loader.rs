use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value;

use crate::error::AppError;
use crate::models::{Column, ColumnValues, TableData};

/// Load an uploaded file into an in-memory table, dispatching on the
/// file extension. Storage types are inferred here, once, and carried
/// as tagged column variants from then on.
pub fn load_table(path: &Path) -> Result<TableData, AppError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let table = match extension.as_str() {
        "csv" => load_csv(path)?,
        "xlsx" | "xls" => load_excel(path)?,
        "json" => load_json(path)?,
        other => {
            return Err(AppError::InvalidInput(format!(
                "Unsupported file type: .{}",
                other
            )))
        }
    };

    if table.column_count() == 0 || table.row_count() == 0 {
        return Err(AppError::FileProcessing("File is empty".to_string()));
    }

    Ok(table)
}

fn load_csv(path: &Path) -> Result<TableData, AppError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| AppError::FileProcessing(format!("Failed to open CSV file: {}", e)))?;

    let mut existing_names = HashSet::new();
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::FileProcessing(format!("Failed to read CSV headers: {}", e)))?
        .iter()
        .enumerate()
        .map(|(idx, name)| unique_column_name(name, idx, &mut existing_names))
        .collect();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result
            .map_err(|e| AppError::FileProcessing(format!("Failed to read CSV row: {}", e)))?;
        for (idx, column) in cells.iter_mut().enumerate() {
            let cell = record.get(idx).map(str::trim).unwrap_or_default();
            column.push(if cell.is_empty() {
                None
            } else {
                Some(cell.to_string())
            });
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, infer_from_strings(values)))
        .collect();

    Ok(TableData::new(columns))
}

fn load_excel(path: &Path) -> Result<TableData, AppError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::FileProcessing(format!("Failed to open Excel file: {}", e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names
        .first()
        .ok_or_else(|| AppError::FileProcessing("No sheets found in workbook".to_string()))?;

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| AppError::FileProcessing(format!("Failed to read worksheet: {}", e)))?;

    let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();
    let Some(header_row) = rows.first() else {
        return Err(AppError::FileProcessing("File is empty".to_string()));
    };

    let mut existing_names = HashSet::new();
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| unique_column_name(&cell.to_string(), idx, &mut existing_names))
        .collect();

    let columns = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            // Short rows are padded with empty cells to the header width.
            let values: Vec<Data> = rows
                .iter()
                .skip(1)
                .map(|row| row.get(idx).cloned().unwrap_or(Data::Empty))
                .collect();
            Column::new(name.clone(), infer_from_cells(&values))
        })
        .collect();

    Ok(TableData::new(columns))
}

fn load_json(path: &Path) -> Result<TableData, AppError> {
    let file = File::open(path)?;
    let records: Vec<serde_json::Map<String, Value>> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::FileProcessing(format!("Failed to parse JSON records: {}", e)))?;

    // Column order follows first appearance of each key; records that
    // omit a key contribute a null cell.
    let mut order: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for record in &records {
        for key in record.keys() {
            if seen.insert(key.clone()) {
                order.push(key.clone());
            }
        }
    }

    let columns = order
        .into_iter()
        .map(|name| {
            let values: Vec<Option<Value>> = records
                .iter()
                .map(|record| match record.get(&name) {
                    None | Some(Value::Null) => None,
                    Some(value) => Some(value.clone()),
                })
                .collect();
            Column::new(name, infer_from_json(values))
        })
        .collect();

    Ok(TableData::new(columns))
}

/// Column names must be unique and non-empty within a dataset; blanks
/// get a positional name and repeats a numeric suffix.
fn unique_column_name(raw: &str, idx: usize, existing: &mut HashSet<String>) -> String {
    let trimmed = raw.trim();
    let base = if trimmed.is_empty() {
        format!("column_{}", idx)
    } else {
        trimmed.to_string()
    };

    let mut candidate = base.clone();
    let mut counter = 1;
    while !existing.insert(candidate.clone()) {
        candidate = format!("{}_{}", base, counter);
        counter += 1;
    }
    candidate
}

/// CSV cells are all strings; a column is numeric when every non-empty
/// value parses as a number, boolean when every value is true/false,
/// otherwise text. An entirely empty column is numeric with all nulls.
fn infer_from_strings(cells: Vec<Option<String>>) -> ColumnValues {
    let non_null: Vec<&str> = cells.iter().flatten().map(String::as_str).collect();

    if non_null.is_empty() {
        return ColumnValues::Numeric(vec![None; cells.len()]);
    }

    if non_null
        .iter()
        .all(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "false"))
    {
        return ColumnValues::Boolean(
            cells
                .iter()
                .map(|c| c.as_deref().map(|v| v.eq_ignore_ascii_case("true")))
                .collect(),
        );
    }

    // Finite numbers only; NaN/inf spellings stay text so downstream
    // statistics never see non-finite values.
    if non_null
        .iter()
        .all(|v| v.parse::<f64>().map_or(false, f64::is_finite))
    {
        return ColumnValues::Numeric(
            cells
                .iter()
                .map(|c| c.as_deref().and_then(|v| v.parse().ok()))
                .collect(),
        );
    }

    ColumnValues::Text(cells)
}

/// Excel cells carry their own types; the column type is numeric or
/// boolean only when every non-empty cell agrees, text otherwise.
fn infer_from_cells(values: &[Data]) -> ColumnValues {
    let non_empty: Vec<&Data> = values
        .iter()
        .filter(|v| !matches!(v, Data::Empty))
        .collect();

    if non_empty.is_empty() {
        return ColumnValues::Numeric(vec![None; values.len()]);
    }

    if non_empty
        .iter()
        .all(|v| matches!(v, Data::Float(_) | Data::Int(_)))
    {
        return ColumnValues::Numeric(
            values
                .iter()
                .map(|v| match v {
                    Data::Float(f) => Some(*f),
                    Data::Int(i) => Some(*i as f64),
                    _ => None,
                })
                .collect(),
        );
    }

    if non_empty.iter().all(|v| matches!(v, Data::Bool(_))) {
        return ColumnValues::Boolean(
            values
                .iter()
                .map(|v| match v {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect(),
        );
    }

    ColumnValues::Text(
        values
            .iter()
            .map(|v| match v {
                Data::Empty => None,
                _ => Some(v.to_string()),
            })
            .collect(),
    )
}

/// JSON cells keep their JSON types: numbers stay numeric, booleans
/// boolean, anything else (including mixed columns) becomes text.
fn infer_from_json(cells: Vec<Option<Value>>) -> ColumnValues {
    let non_null: Vec<&Value> = cells.iter().flatten().collect();

    if non_null.is_empty() {
        return ColumnValues::Numeric(vec![None; cells.len()]);
    }

    if non_null.iter().all(|v| v.is_number()) {
        return ColumnValues::Numeric(
            cells
                .iter()
                .map(|c| c.as_ref().and_then(Value::as_f64))
                .collect(),
        );
    }

    if non_null.iter().all(|v| v.is_boolean()) {
        return ColumnValues::Boolean(
            cells
                .iter()
                .map(|c| c.as_ref().and_then(Value::as_bool))
                .collect(),
        );
    }

    ColumnValues::Text(
        cells
            .iter()
            .map(|c| {
                c.as_ref().map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnDtype;
    use std::io::Write;

    fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_types_are_inferred_per_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "data.csv",
            "name,age,active\nalice,30,true\nbob,25,false\ncarol,,true\n",
        );
        let table = load_table(&path).unwrap();

        assert_eq!(table.column_names(), vec!["name", "age", "active"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.columns[0].values.dtype(), ColumnDtype::Text);
        assert_eq!(table.columns[1].values.dtype(), ColumnDtype::Numeric);
        assert_eq!(table.columns[1].values.null_count(), 1);
        assert_eq!(table.columns[2].values.dtype(), ColumnDtype::Boolean);
    }

    #[test]
    fn csv_duplicate_and_blank_headers_are_renamed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "dup.csv", "a,a,\n1,2,3\n");
        let table = load_table(&path).unwrap();
        assert_eq!(table.column_names(), vec!["a", "a_1", "column_2"]);
    }

    #[test]
    fn json_records_with_missing_keys_become_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "data.json",
            r#"[{"city": "Oslo", "pop": 700000}, {"city": "Lima"}, {"city": "Pune", "pop": 3100000}]"#,
        );
        let table = load_table(&path).unwrap();

        assert_eq!(table.column_names(), vec!["city", "pop"]);
        assert_eq!(table.columns[1].values.dtype(), ColumnDtype::Numeric);
        assert_eq!(table.columns[1].values.null_count(), 1);
    }

    #[test]
    fn json_numeric_looking_strings_stay_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "codes.json",
            r#"[{"code": "001"}, {"code": "002"}]"#,
        );
        let table = load_table(&path).unwrap();
        assert_eq!(table.columns[0].values.dtype(), ColumnDtype::Text);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "data.parquet", "whatever");
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn empty_csv_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "empty.csv", "a,b\n");
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, AppError::FileProcessing(_)));
    }

    #[test]
    fn workbook_cells_keep_their_types() {
        let numeric = infer_from_cells(&[
            Data::Float(1.5),
            Data::Int(2),
            Data::Empty,
            Data::Float(3.0),
        ]);
        assert_eq!(
            numeric,
            ColumnValues::Numeric(vec![Some(1.5), Some(2.0), None, Some(3.0)])
        );

        let flags = infer_from_cells(&[Data::Bool(true), Data::Empty, Data::Bool(false)]);
        assert_eq!(
            flags,
            ColumnValues::Boolean(vec![Some(true), None, Some(false)])
        );
    }

    #[test]
    fn workbook_mixed_cells_fall_back_to_text() {
        let mixed = infer_from_cells(&[
            Data::String("alice".to_string()),
            Data::Int(7),
            Data::Empty,
        ]);
        assert_eq!(
            mixed,
            ColumnValues::Text(vec![Some("alice".to_string()), Some("7".to_string()), None])
        );
    }

    #[test]
    fn workbook_all_empty_column_is_numeric_with_nulls() {
        let empty = infer_from_cells(&[Data::Empty, Data::Empty]);
        assert_eq!(empty, ColumnValues::Numeric(vec![None, None]));
    }

    #[test]
    fn all_empty_column_is_numeric_with_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "gaps.csv", "a,b\n1,\n2,\n");
        let table = load_table(&path).unwrap();
        assert_eq!(table.columns[1].values.dtype(), ColumnDtype::Numeric);
        assert_eq!(table.columns[1].values.null_count(), 2);
    }
}

use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{RawListing, columns};
use crate::geography::boroughs::BoroughMap;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the listings table. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the published `Airbnb_Open_Data.csv` (header row, quoted cells)
/// * `.json`    – `[{ "neighbourhood group": "...", "price": "$966", ... }, ...]`
/// * `.parquet` – any column types; every cell is read back as text
///
/// Rows are returned uncleaned; see [`super::normalize`].
pub fn load_listings(path: &Path) -> Result<Vec<RawListing>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading listings from {}", path.display()))?;

    log::info!("Read {} listing rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load borough boundaries from a GeoJSON feature collection.
pub fn load_boroughs(path: &Path, name_property: &str) -> Result<BoroughMap> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let map = BoroughMap::from_geojson(&text, name_property)
        .with_context(|| format!("loading boroughs from {}", path.display()))?;
    log::info!("Read {} borough boundaries from {}", map.len(), path.display());
    Ok(map)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Unknown columns are ignored and missing ones read as empty. A row the
/// reader cannot decode at all is skipped rather than failing the file.
fn load_csv(path: &Path) -> Result<Vec<RawListing>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let headers = reader.headers().context("reading CSV headers")?.clone();
    for required in [columns::BOROUGH, columns::NEIGHBORHOOD] {
        if !headers.iter().any(|h| h == required) {
            bail!("CSV missing '{required}' column");
        }
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (row_no, result) in reader.deserialize::<RawListing>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                log::debug!("CSV row {row_no}: {e}");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        log::warn!("Skipped {skipped} unreadable CSV row(s)");
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "id": 1001254, "neighbourhood group": "Brooklyn", "price": "$966", "lat": 40.64749, ... },
///   ...
/// ]
/// ```
///
/// Cells may be strings, numbers or null.
fn load_json(path: &Path) -> Result<Vec<RawListing>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            Ok(RawListing::from_lookup(|name| {
                obj.get(name).map(json_to_text).unwrap_or_default()
            }))
        })
        .collect()
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`), whatever type each column was given.
fn load_parquet(path: &Path) -> Result<Vec<RawListing>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        if schema.index_of(columns::BOROUGH).is_err() {
            bail!("Parquet file missing '{}' column", columns::BOROUGH);
        }

        for row in 0..batch.num_rows() {
            rows.push(RawListing::from_lookup(|name| {
                schema
                    .index_of(name)
                    .map(|i| cell_text(batch.column(i), row))
                    .unwrap_or_default()
            }));
        }
    }

    Ok(rows)
}

/// Render one Arrow cell as text. Nulls become empty strings.
fn cell_text(col: &ArrayRef, row: usize) -> String {
    if col.is_null(row) {
        return String::new();
    }
    match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row).to_string(),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row).to_string(),
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row).to_string(),
        DataType::Boolean => col.as_boolean().value(row).to_string(),
        other => {
            log::debug!("Column type {other:?} is not read as text");
            String::new()
        }
    }
}

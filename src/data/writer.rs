use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Date32Type, Field as ArrowField, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::{Map, Value as JsonValue};

use super::model::{FieldKind, FieldValue, RecordSet};

/// Write a record set to a file.  Dispatch by extension (`.csv`, `.json`,
/// `.parquet` / `.pq`).
pub fn write_file(records: &RecordSet, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => write_parquet(records, path)?,
        "json" => write_json(records, path)?,
        "csv" => write_csv(records, path)?,
        other => bail!("Unsupported file extension: .{other}"),
    }
    log::info!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Text form of a cell for CSV output; missing values become empty cells.
/// Floats always carry a fraction part so they reload as floats.
fn cell_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Float(v) => format!("{v:?}"),
        other => other.to_string(),
    }
}

pub fn write_csv(records: &RecordSet, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer
        .write_record(records.schema().names())
        .context("writing CSV header")?;
    for (row_no, record) in records.records().iter().enumerate() {
        writer
            .write_record(record.values().iter().map(cell_text))
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn json_value(value: &FieldValue) -> JsonValue {
    match value {
        FieldValue::Integer(i) => JsonValue::from(*i),
        FieldValue::Float(v) => serde_json::Number::from_f64(*v)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        FieldValue::Text(s) => JsonValue::String(s.clone()),
        FieldValue::Date(_) => JsonValue::String(value.to_string()),
        FieldValue::Null => JsonValue::Null,
    }
}

/// Records-oriented JSON array, one object per record.
pub fn write_json(records: &RecordSet, path: &Path) -> Result<()> {
    let names: Vec<&str> = records.schema().names().collect();
    let rows: Vec<JsonValue> = records
        .records()
        .iter()
        .map(|record| {
            let obj: Map<String, JsonValue> = names
                .iter()
                .zip(record.values())
                .map(|(name, value)| (name.to_string(), json_value(value)))
                .collect();
            JsonValue::Object(obj)
        })
        .collect();
    let file = File::create(path).context("creating JSON file")?;
    serde_json::to_writer_pretty(BufWriter::new(file), &rows).context("writing JSON")?;
    Ok(())
}

/// Build an Arrow batch with one nullable column per field.
pub fn to_record_batch(records: &RecordSet) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(records.schema().len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(records.schema().len());

    for (idx, field) in records.schema().fields().iter().enumerate() {
        let cells = records.records().iter().map(|r| &r.values()[idx]);
        let (data_type, array): (DataType, ArrayRef) = match field.kind {
            FieldKind::Integer => (
                DataType::Int64,
                Arc::new(Int64Array::from(
                    cells
                        .map(|v| match v {
                            FieldValue::Integer(i) => Some(*i),
                            _ => None,
                        })
                        .collect::<Vec<_>>(),
                )),
            ),
            FieldKind::Float => (
                DataType::Float64,
                Arc::new(Float64Array::from(
                    cells.map(FieldValue::as_f64).collect::<Vec<_>>(),
                )),
            ),
            FieldKind::Date => (
                DataType::Date32,
                Arc::new(Date32Array::from(
                    cells
                        .map(|v| v.as_date().map(Date32Type::from_naive_date))
                        .collect::<Vec<_>>(),
                )),
            ),
            FieldKind::Categorical | FieldKind::Text => (
                DataType::Utf8,
                Arc::new(StringArray::from(
                    cells.map(FieldValue::as_str).collect::<Vec<_>>(),
                )),
            ),
        };
        fields.push(ArrowField::new(field.name.as_str(), data_type, true));
        arrays.push(array);
    }

    RecordBatch::try_new(Arc::new(ArrowSchema::new(fields)), arrays)
        .context("assembling Arrow record batch")
}

pub fn write_parquet(records: &RecordSet, path: &Path) -> Result<()> {
    let batch = to_record_batch(records)?;
    let file = File::create(path).context("creating parquet file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

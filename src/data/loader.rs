use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, UInt16Type, UInt32Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Field, FieldKind, FieldValue, RecordSet, Schema};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Knobs for column type inference.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// String columns with at most this many distinct values load as
    /// categorical, the rest as free text.
    pub categorical_max_distinct: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            categorical_max_distinct: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a record set from a file with default options.
pub fn load_file(path: &Path) -> Result<RecordSet> {
    load_file_with(path, &LoadOptions::default())
}

/// Load a record set from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – any flat Parquet table
/// * `.json`    – `[{ "column": value, ... }, ...]`
/// * `.csv`     – header row followed by one record per line
pub fn load_file_with(path: &Path, options: &LoadOptions) -> Result<RecordSet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let columns = match ext.as_str() {
        "parquet" | "pq" => read_parquet(path)?,
        "json" => read_json(path)?,
        "csv" => read_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    let records = assemble(columns, options)
        .with_context(|| format!("building records from {}", path.display()))?;
    log::info!(
        "loaded {} records with fields {:?} from {}",
        records.len(),
        records.schema().names().collect::<Vec<_>>(),
        path.display()
    );
    Ok(records)
}

/// Column name with its raw cells, before kind inference.
type RawColumn = (String, Vec<FieldValue>);

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "id": 1, "name": "Ana García", "sales": 1520.5, "category": "A" },
///   ...
/// ]
/// ```
///
/// Keys absent from an object load as missing values.
fn read_json(path: &Path) -> Result<Vec<RawColumn>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<RawColumn> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for (key, val) in obj {
            let slot = match positions.get(key) {
                Some(&slot) => slot,
                None => {
                    // Backfill earlier rows that lacked this key.
                    positions.insert(key.clone(), columns.len());
                    columns.push((key.clone(), vec![FieldValue::Null; i]));
                    columns.len() - 1
                }
            };
            columns[slot].1.push(json_to_value(val));
        }
        for (_, cells) in columns.iter_mut() {
            if cells.len() == i {
                cells.push(FieldValue::Null);
            }
        }
    }

    Ok(columns)
}

fn json_to_value(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                float_cell(f)
            } else {
                FieldValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Text(b.to_string()),
        JsonValue::Null => FieldValue::Null,
        other => FieldValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
/// Empty cells are missing values.
fn read_csv(path: &Path) -> Result<Vec<RawColumn>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let mut columns: Vec<RawColumn> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| (h.to_string(), Vec::new()))
        .collect();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != columns.len() {
            bail!(
                "CSV row {row_no}: expected {} fields but found {}",
                columns.len(),
                record.len()
            );
        }
        for ((_, cells), value) in columns.iter_mut().zip(record.iter()) {
            cells.push(guess_value_type(value));
        }
    }

    Ok(columns)
}

/// `NaN` and the infinities count as missing.
fn float_cell(f: f64) -> FieldValue {
    if f.is_finite() {
        FieldValue::Float(f)
    } else {
        FieldValue::Null
    }
}

fn guess_value_type(s: &str) -> FieldValue {
    let s = s.trim();
    if s.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return float_cell(f);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return FieldValue::Date(d);
    }
    FieldValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`), and with the files `generate_sample`
/// writes.
fn read_parquet(path: &Path) -> Result<Vec<RawColumn>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let mut columns: Vec<RawColumn> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| (f.name().clone(), Vec::new()))
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, (_, cells)) in columns.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                cells.push(extract_value(array, row));
            }
        }
    }

    Ok(columns)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &ArrayRef, row: usize) -> FieldValue {
    if col.is_null(row) {
        return FieldValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => FieldValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => FieldValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => FieldValue::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => FieldValue::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => FieldValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => FieldValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => FieldValue::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => {
            FieldValue::Integer(col.as_primitive::<UInt16Type>().value(row).into())
        }
        DataType::UInt32 => {
            FieldValue::Integer(col.as_primitive::<UInt32Type>().value(row).into())
        }
        DataType::Float32 => float_cell(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => float_cell(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => FieldValue::Text(col.as_boolean().value(row).to_string()),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map(FieldValue::Date)
            .unwrap_or(FieldValue::Null),
        DataType::Date64 => col
            .as_primitive::<Date64Type>()
            .value_as_date(row)
            .map(FieldValue::Date)
            .unwrap_or(FieldValue::Null),
        _ => match array_value_to_string(col, row) {
            Ok(s) => FieldValue::Text(s),
            Err(e) => {
                log::warn!("unreadable {:?} cell at row {row}: {e}", col.data_type());
                FieldValue::Null
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Kind inference
// ---------------------------------------------------------------------------

fn assemble(columns: Vec<RawColumn>, options: &LoadOptions) -> Result<RecordSet> {
    let n_rows = columns.first().map_or(0, |(_, cells)| cells.len());
    let mut fields = Vec::with_capacity(columns.len());
    let mut typed = Vec::with_capacity(columns.len());
    for (name, cells) in columns {
        let (kind, cells) = infer_kind(cells, options);
        fields.push(Field::new(name, kind));
        typed.push(cells.into_iter());
    }

    let rows: Vec<Vec<FieldValue>> = (0..n_rows)
        .map(|_| {
            typed
                .iter_mut()
                .map(|cells| cells.next().unwrap_or(FieldValue::Null))
                .collect()
        })
        .collect();

    Ok(RecordSet::new(Schema::new(fields)?, rows)?)
}

/// Pick one kind for a column and coerce its cells to it.
///
/// Integers mixed with floats widen to float, ISO date strings become dates,
/// and any other mix falls back to text.
fn infer_kind(cells: Vec<FieldValue>, options: &LoadOptions) -> (FieldKind, Vec<FieldValue>) {
    let present = || cells.iter().filter(|v| !v.is_null());

    if present().all(|v| matches!(v, FieldValue::Integer(_))) && present().next().is_some() {
        return (FieldKind::Integer, cells);
    }
    if present().all(|v| v.as_f64().is_some()) && present().next().is_some() {
        let cells = cells
            .into_iter()
            .map(|v| v.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null))
            .collect();
        return (FieldKind::Float, cells);
    }
    let as_date = |v: &FieldValue| match v {
        FieldValue::Date(d) => Some(*d),
        FieldValue::Text(s) => NaiveDate::parse_from_str(s, DATE_FORMAT).ok(),
        _ => None,
    };
    if present().all(|v| as_date(v).is_some()) && present().next().is_some() {
        let cells = cells
            .iter()
            .map(|v| as_date(v).map(FieldValue::Date).unwrap_or(FieldValue::Null))
            .collect();
        return (FieldKind::Date, cells);
    }

    let cells: Vec<FieldValue> = cells
        .into_iter()
        .map(|v| match v {
            FieldValue::Null | FieldValue::Text(_) => v,
            other => FieldValue::Text(other.to_string()),
        })
        .collect();
    let distinct: BTreeSet<&FieldValue> = cells.iter().filter(|v| !v.is_null()).collect();
    let kind = if distinct.len() <= options.categorical_max_distinct {
        FieldKind::Categorical
    } else {
        FieldKind::Text
    };
    (kind, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(ext: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn csv_columns_get_inferred_kinds() {
        let file = write_temp(
            "csv",
            "id,score,joined,category\n1,2.5,2024-01-02,A\n2,3,2024-02-03,B\n3,,2024-03-04,A\n",
        );
        let rs = load_file(file.path()).unwrap();
        let kinds: Vec<_> = rs.dtypes().into_iter().map(|(_, k)| k).collect();
        assert_eq!(
            kinds,
            vec![
                FieldKind::Integer,
                FieldKind::Float,
                FieldKind::Date,
                FieldKind::Categorical
            ]
        );
        let scores: Vec<_> = rs.column("score").unwrap().cloned().collect();
        assert_eq!(
            scores,
            vec![FieldValue::Float(2.5), FieldValue::Float(3.0), FieldValue::Null]
        );
    }

    #[test]
    fn non_finite_cells_load_as_missing() {
        use crate::data::filter::{filter, FilterSpec};
        use crate::data::stats::{describe, null_counts};

        let file = write_temp("csv", "score\n1.5\nNaN\n3\ninf\n");
        let rs = load_file(file.path()).unwrap();
        let scores: Vec<_> = rs.column("score").unwrap().cloned().collect();
        assert_eq!(
            scores,
            vec![
                FieldValue::Float(1.5),
                FieldValue::Null,
                FieldValue::Float(3.0),
                FieldValue::Null
            ]
        );
        assert_eq!(null_counts(&rs), vec![("score".to_string(), 2)]);
        assert_eq!(filter(&rs, &FilterSpec::full(&rs)).unwrap(), rs);

        let stats = describe(&rs);
        let score = stats.numeric("score").unwrap();
        assert_eq!(score.count, 2);
        assert_eq!(score.mean, 2.25);
        assert_eq!(score.max, 3.0);
    }

    #[test]
    fn json_missing_keys_become_nulls() {
        let file = write_temp(
            "json",
            r#"[{"name": "Ana", "age": 30}, {"age": 41, "city": "Lima"}, {"name": "Bo"}]"#,
        );
        let rs = load_file(file.path()).unwrap();
        let names: Vec<_> = rs.schema().names().collect();
        assert_eq!(names, ["name", "age", "city"]);
        let ages: Vec<_> = rs.column("age").unwrap().cloned().collect();
        assert_eq!(
            ages,
            vec![FieldValue::Integer(30), FieldValue::Integer(41), FieldValue::Null]
        );
        let cities: Vec<_> = rs.column("city").unwrap().cloned().collect();
        assert_eq!(
            cities,
            vec![FieldValue::Null, FieldValue::Text("Lima".into()), FieldValue::Null]
        );
    }

    #[test]
    fn many_distinct_strings_load_as_text() {
        let mut csv = String::from("label\n");
        for i in 0..5 {
            csv.push_str(&format!("v{i}\n"));
        }
        let file = write_temp("csv", &csv);
        let options = LoadOptions {
            categorical_max_distinct: 3,
        };
        let rs = load_file_with(file.path(), &options).unwrap();
        assert_eq!(rs.schema().fields()[0].kind, FieldKind::Text);
    }

    #[test]
    fn mixed_columns_fall_back_to_text() {
        let file = write_temp("csv", "code\n12\nX7\n");
        let rs = load_file(file.path()).unwrap();
        let codes: Vec<_> = rs.column("code").unwrap().cloned().collect();
        assert_eq!(
            codes,
            vec![FieldValue::Text("12".into()), FieldValue::Text("X7".into())]
        );
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let file = write_temp("xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn ragged_csv_is_an_error() {
        let file = write_temp("csv", "a,b\n1,2\n3\n");
        assert!(load_file(file.path()).is_err());
    }
}

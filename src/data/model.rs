use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EdaError, Result};

// ---------------------------------------------------------------------------
// FieldValue – a single cell in a record
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Filters keep allow-sets in `BTreeSet`s, so `FieldValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    /// Categorical and free-text cells.
    Text(String),
    Date(NaiveDate),
    /// Missing value (only produced by loaders, never by the generator).
    Null,
}

// -- Manual Eq/Ord so we can put FieldValue in BTreeSet --

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn discriminant(v: &FieldValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
                Date(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v:.2}"),
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Null => write!(f, "<null>"),
        }
    }
}

impl FieldValue {
    /// Numeric view of the value, used by statistics and plots.
    /// A `NaN` float has no numeric view.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) if !v.is_nan() => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// `Null`, or a `NaN` float.
    pub fn is_null(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Schema – field names and kinds shared by every record of a set
// ---------------------------------------------------------------------------

/// Logical type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Integer,
    Float,
    Date,
    /// String field with a small closed domain.
    Categorical,
    /// Free-text string field.
    Text,
}

impl FieldKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::Float)
    }

    /// Categorical and text fields both hold [`FieldValue::Text`] cells.
    pub fn is_string(self) -> bool {
        matches!(self, FieldKind::Categorical | FieldKind::Text)
    }

    /// Whether a cell may be stored in a field of this kind.
    pub fn accepts(self, value: &FieldValue) -> bool {
        match value {
            FieldValue::Null => true,
            FieldValue::Integer(_) => self == FieldKind::Integer,
            FieldValue::Float(_) => self == FieldKind::Float,
            FieldValue::Text(_) => self.is_string(),
            FieldValue::Date(_) => self == FieldKind::Date,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Integer => "int64",
            FieldKind::Float => "float64",
            FieldKind::Date => "date",
            FieldKind::Categorical => "category",
            FieldKind::Text => "text",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Field {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered field list with a name index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema; field names must be unique.
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if index.insert(field.name.clone(), i).is_some() {
                return Err(EdaError::invalid(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }
        Ok(Schema { fields, index })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Look a field up by name, failing with `InvalidArgument` when absent.
    pub fn field(&self, name: &str) -> Result<(usize, &Field)> {
        let idx = self
            .index_of(name)
            .ok_or_else(|| EdaError::unknown_field(name))?;
        Ok((idx, &self.fields[idx]))
    }

    /// Fields whose kind is numeric, in schema order.
    pub fn numeric_fields(&self) -> impl Iterator<Item = (usize, &Field)> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.kind.is_numeric())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record – one row
// ---------------------------------------------------------------------------

/// A single row; values are aligned with the owning set's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<FieldValue>,
}

impl Record {
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> Option<&FieldValue> {
        self.values.get(idx)
    }
}

// ---------------------------------------------------------------------------
// RecordSet – the complete, immutable table
// ---------------------------------------------------------------------------

/// An ordered, immutable collection of records sharing one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    schema: Arc<Schema>,
    records: Vec<Record>,
}

impl RecordSet {
    /// Build a record set from raw rows, checking row width and cell kinds.
    pub fn new(schema: Schema, rows: Vec<Vec<FieldValue>>) -> Result<Self> {
        let schema = Arc::new(schema);
        let mut records = Vec::with_capacity(rows.len());
        for (row_no, values) in rows.into_iter().enumerate() {
            if values.len() != schema.len() {
                return Err(EdaError::invalid(format!(
                    "row {row_no} has {} values but the schema has {} fields",
                    values.len(),
                    schema.len()
                )));
            }
            for (field, value) in schema.fields().iter().zip(&values) {
                if !field.kind.accepts(value) {
                    return Err(EdaError::invalid(format!(
                        "row {row_no}: value {value} does not fit field '{}' ({})",
                        field.name, field.kind
                    )));
                }
            }
            records.push(Record { values });
        }
        Ok(RecordSet { schema, records })
    }

    /// An empty set with the given schema.
    pub fn empty(schema: Schema) -> Self {
        RecordSet {
            schema: Arc::new(schema),
            records: Vec::new(),
        }
    }

    /// Derive a set from already-validated records of the same schema.
    pub(crate) fn derived(&self, records: Vec<Record>) -> Self {
        RecordSet {
            schema: Arc::clone(&self.schema),
            records,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(rows, fields)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.records.len(), self.schema.len())
    }

    /// Field names paired with their kinds, in schema order.
    pub fn dtypes(&self) -> Vec<(String, FieldKind)> {
        self.schema
            .fields()
            .iter()
            .map(|f| (f.name.clone(), f.kind))
            .collect()
    }

    /// All cells of one field, in record order.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &FieldValue> + '_> {
        let (idx, _) = self.schema.field(name)?;
        Ok(self.column_at(idx))
    }

    pub(crate) fn column_at(&self, idx: usize) -> impl Iterator<Item = &FieldValue> + '_ {
        self.records.iter().map(move |r| &r.values[idx])
    }

    /// Sorted set of distinct values (including `Null`) of one field.
    pub fn unique_values(&self, name: &str) -> Result<BTreeSet<FieldValue>> {
        Ok(self.column(name)?.cloned().collect())
    }
}

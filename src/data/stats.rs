use std::collections::HashMap;

use super::model::{FieldKind, FieldValue, RecordSet};
use crate::error::{EdaError, Result};

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// count / mean / std / min / quartiles / max of one numeric field.
///
/// Every statistic except `count` is `NaN` when there are no values; `std`
/// is the sample deviation and is `NaN` below two values.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub field: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// count / distinct / mode / mode frequency of one non-numeric field.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub field: String,
    pub kind: FieldKind,
    pub count: usize,
    pub unique: usize,
    /// Most frequent value; ties go to the value seen first.
    pub top: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

impl FieldSummary {
    pub fn field(&self) -> &str {
        match self {
            FieldSummary::Numeric(s) => &s.field,
            FieldSummary::Categorical(s) => &s.field,
        }
    }
}

/// Result of [`describe`], one entry per field in schema order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stats {
    pub fields: Vec<FieldSummary>,
}

impl Stats {
    pub fn get(&self, field: &str) -> Option<&FieldSummary> {
        self.fields.iter().find(|s| s.field() == field)
    }

    pub fn numeric(&self, field: &str) -> Option<&NumericSummary> {
        match self.get(field)? {
            FieldSummary::Numeric(s) => Some(s),
            FieldSummary::Categorical(_) => None,
        }
    }

    pub fn categorical(&self, field: &str) -> Option<&CategoricalSummary> {
        match self.get(field)? {
            FieldSummary::Categorical(s) => Some(s),
            FieldSummary::Numeric(_) => None,
        }
    }

    pub fn numeric_fields(&self) -> impl Iterator<Item = &NumericSummary> + '_ {
        self.fields.iter().filter_map(|s| match s {
            FieldSummary::Numeric(n) => Some(n),
            FieldSummary::Categorical(_) => None,
        })
    }

    pub fn categorical_fields(&self) -> impl Iterator<Item = &CategoricalSummary> + '_ {
        self.fields.iter().filter_map(|s| match s {
            FieldSummary::Categorical(c) => Some(c),
            FieldSummary::Numeric(_) => None,
        })
    }
}

/// Summarize every field of `records`. Never fails: degenerate input yields
/// `NaN` / `None` statistics.
pub fn describe(records: &RecordSet) -> Stats {
    let fields = records
        .schema()
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let cells = records.column_at(idx);
            if field.kind.is_numeric() {
                let values: Vec<f64> = cells.filter_map(FieldValue::as_f64).collect();
                FieldSummary::Numeric(summarize_numeric(&field.name, values))
            } else {
                let counts = value_counts(cells);
                let count = counts.iter().map(|(_, n)| n).sum();
                let (top, freq) = match counts.first() {
                    Some((value, n)) => (Some(value.clone()), *n),
                    None => (None, 0),
                };
                FieldSummary::Categorical(CategoricalSummary {
                    field: field.name.clone(),
                    kind: field.kind,
                    count,
                    unique: counts.len(),
                    top,
                    freq,
                })
            }
        })
        .collect();
    Stats { fields }
}

fn summarize_numeric(field: &str, mut values: Vec<f64>) -> NumericSummary {
    values.sort_by(f64::total_cmp);
    let count = values.len();
    let (mean, std) = mean_and_std(&values);
    NumericSummary {
        field: field.to_string(),
        count,
        mean,
        std,
        min: values.first().copied().unwrap_or(f64::NAN),
        p25: percentile(&values, 0.25),
        p50: percentile(&values, 0.50),
        p75: percentile(&values, 0.75),
        max: values.last().copied().unwrap_or(f64::NAN),
    }
}

/// Mean and sample (n-1) standard deviation.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, f64::NAN);
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (mean, (ss / (n - 1) as f64).sqrt())
}

/// Percentile of sorted data, interpolating linearly between closest ranks.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Non-null values rendered as text, counted, most frequent first; ties keep
/// first-seen order.
fn value_counts<'a>(cells: impl Iterator<Item = &'a FieldValue>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    for cell in cells {
        if cell.is_null() {
            continue;
        }
        let key = match cell {
            FieldValue::Text(s) => s.clone(),
            other => other.to_string(),
        };
        match slots.get(&key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// ---------------------------------------------------------------------------
// Null counts
// ---------------------------------------------------------------------------

/// Number of missing cells per field, in schema order.
pub fn null_counts(records: &RecordSet) -> Vec<(String, usize)> {
    records
        .schema()
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let nulls = records.column_at(idx).filter(|v| v.is_null()).count();
            (field.name.clone(), nulls)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Square Pearson correlation matrix over the numeric fields of a set.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    fields: Vec<String>,
    /// Row-major, `fields.len()²` entries.
    values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Coefficient at `(row, col)`; panics when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.fields.len() + col]
    }

    pub fn by_name(&self, a: &str, b: &str) -> Option<f64> {
        let row = self.fields.iter().position(|f| f == a)?;
        let col = self.fields.iter().position(|f| f == b)?;
        Some(self.get(row, col))
    }
}

/// Pearson correlation between every pair of numeric fields, using the
/// records where both cells are present.
///
/// The diagonal is `1.0` for fields with variance and `NaN` otherwise;
/// off-diagonal entries are `NaN` when either side is constant or fewer
/// than two pairs exist.
pub fn correlation_matrix(records: &RecordSet) -> CorrelationMatrix {
    let columns: Vec<(String, Vec<Option<f64>>)> = records
        .schema()
        .numeric_fields()
        .map(|(idx, field)| {
            let values = records.column_at(idx).map(FieldValue::as_f64).collect();
            (field.name.clone(), values)
        })
        .collect();

    let n = columns.len();
    let mut values = vec![f64::NAN; n * n];
    for i in 0..n {
        for j in i..n {
            let pairs: Vec<(f64, f64)> = columns[i]
                .1
                .iter()
                .zip(&columns[j].1)
                .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
                .collect();
            let r = if i == j {
                if pairs.len() >= 2 && !is_constant(pairs.iter().map(|p| p.0)) {
                    1.0
                } else {
                    f64::NAN
                }
            } else {
                pearson(&pairs)
            };
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    CorrelationMatrix {
        fields: columns.into_iter().map(|(name, _)| name).collect(),
        values,
    }
}

fn is_constant(mut values: impl Iterator<Item = f64>) -> bool {
    match values.next() {
        Some(first) => values.all(|v| v == first),
        None => true,
    }
}

fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2
        || is_constant(pairs.iter().map(|p| p.0))
        || is_constant(pairs.iter().map(|p| p.1))
    {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// Category counts
// ---------------------------------------------------------------------------

/// Count each distinct value of a categorical field, most frequent first;
/// ties keep the order in which values first appear.
pub fn category_counts(records: &RecordSet, field: &str) -> Result<Vec<(String, usize)>> {
    let (idx, meta) = records.schema().field(field)?;
    if meta.kind != FieldKind::Categorical {
        return Err(EdaError::invalid(format!(
            "field '{field}' is {}, not categorical",
            meta.kind
        )));
    }
    Ok(value_counts(records.column_at(idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Field, Schema};

    fn numeric_set(columns: &[(&str, Vec<Option<f64>>)]) -> RecordSet {
        let schema = Schema::new(
            columns
                .iter()
                .map(|(name, _)| Field::new(*name, FieldKind::Float))
                .collect(),
        )
        .unwrap();
        let rows = (0..columns[0].1.len())
            .map(|row| {
                columns
                    .iter()
                    .map(|(_, values)| values[row].map(FieldValue::Float).unwrap_or(FieldValue::Null))
                    .collect()
            })
            .collect();
        RecordSet::new(schema, rows).unwrap()
    }

    fn categories(values: &[&str]) -> RecordSet {
        let schema = Schema::new(vec![
            Field::new("category", FieldKind::Categorical),
            Field::new("n", FieldKind::Integer),
        ])
        .unwrap();
        let rows = values
            .iter()
            .enumerate()
            .map(|(i, v)| vec![FieldValue::Text(v.to_string()), FieldValue::Integer(i as i64)])
            .collect();
        RecordSet::new(schema, rows).unwrap()
    }

    #[test]
    fn describe_matches_standard_semantics() {
        let rs = numeric_set(&[("x", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), None])]);
        let stats = describe(&rs);
        let x = stats.numeric("x").unwrap();
        assert_eq!(x.count, 4);
        assert_eq!(x.mean, 2.5);
        assert!((x.std - 1.290_994_448_735_805_6).abs() < 1e-12);
        assert_eq!((x.min, x.max), (1.0, 4.0));
        assert_eq!((x.p25, x.p50, x.p75), (1.75, 2.5, 3.25));
    }

    #[test]
    fn constant_column_has_zero_std() {
        let rs = numeric_set(&[("age", vec![Some(30.0); 5])]);
        let age = describe(&rs).numeric("age").cloned().unwrap();
        assert_eq!(age.mean, 30.0);
        assert_eq!(age.std, 0.0);
        assert_eq!((age.min, age.p50, age.max), (30.0, 30.0, 30.0));
    }

    #[test]
    fn single_row_reports_nan_std() {
        let rs = numeric_set(&[("x", vec![Some(7.5)])]);
        let x = describe(&rs).numeric("x").cloned().unwrap();
        assert_eq!((x.min, x.max, x.mean), (7.5, 7.5, 7.5));
        assert!(x.std.is_nan());
    }

    #[test]
    fn empty_set_reports_nan_everywhere() {
        let rs = RecordSet::empty(
            Schema::new(vec![
                Field::new("x", FieldKind::Float),
                Field::new("y", FieldKind::Integer),
                Field::new("c", FieldKind::Categorical),
            ])
            .unwrap(),
        );
        let stats = describe(&rs);
        let x = stats.numeric("x").unwrap();
        assert_eq!(x.count, 0);
        assert!(x.mean.is_nan() && x.std.is_nan() && x.min.is_nan() && x.p50.is_nan());
        let c = stats.categorical("c").unwrap();
        assert_eq!((c.count, c.unique, c.top.as_deref(), c.freq), (0, 0, None, 0));

        let corr = correlation_matrix(&rs);
        assert_eq!(corr.len(), 2);
        assert!(corr.get(0, 0).is_nan() && corr.get(0, 1).is_nan());
    }

    #[test]
    fn describe_reports_mode_for_categorical_fields() {
        let rs = categories(&["B", "A", "A", "B", "C"]);
        let c = describe(&rs).categorical("category").cloned().unwrap();
        assert_eq!(c.count, 5);
        assert_eq!(c.unique, 3);
        assert_eq!(c.top.as_deref(), Some("B"));
        assert_eq!(c.freq, 2);
    }

    #[test]
    fn null_counts_per_field() {
        let rs = numeric_set(&[
            ("a", vec![Some(1.0), None, None]),
            ("b", vec![Some(1.0), Some(2.0), Some(3.0)]),
        ]);
        assert_eq!(
            null_counts(&rs),
            vec![("a".to_string(), 2), ("b".to_string(), 0)]
        );
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let rs = numeric_set(&[
            ("x", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            ("y", vec![Some(2.0), Some(4.0), Some(6.0), Some(8.0)]),
            ("z", vec![Some(4.0), Some(1.0), Some(3.0), Some(2.0)]),
            ("k", vec![Some(5.0), Some(5.0), Some(5.0), Some(5.0)]),
        ]);
        let corr = correlation_matrix(&rs);
        assert_eq!(corr.fields(), ["x", "y", "z", "k"]);
        for i in 0..3 {
            assert_eq!(corr.get(i, i), 1.0);
            for j in 0..corr.len() {
                let (a, b) = (corr.get(i, j), corr.get(j, i));
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
        }
        assert!((corr.by_name("x", "y").unwrap() - 1.0).abs() < 1e-12);
        assert!((corr.by_name("x", "z").unwrap() + 0.4).abs() < 1e-12);
        assert!(corr.by_name("k", "k").unwrap().is_nan());
        assert!(corr.by_name("x", "k").unwrap().is_nan());
    }

    #[test]
    fn correlation_uses_pairwise_complete_rows() {
        let rs = numeric_set(&[
            ("x", vec![Some(1.0), Some(2.0), None, Some(3.0)]),
            ("y", vec![Some(1.0), Some(2.0), Some(100.0), Some(3.0)]),
        ]);
        let r = correlation_matrix(&rs).by_name("x", "y").unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn category_counts_sort_by_count_then_first_seen() {
        let rs = categories(&["C", "A", "B", "A", "C", "B", "A"]);
        let counts = category_counts(&rs, "category").unwrap();
        assert_eq!(
            counts,
            vec![("A".to_string(), 3), ("C".to_string(), 2), ("B".to_string(), 2)]
        );
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), rs.len());
    }

    #[test]
    fn category_counts_reject_other_fields() {
        let rs = categories(&["A"]);
        assert!(matches!(
            category_counts(&rs, "n"),
            Err(EdaError::InvalidArgument(_))
        ));
        assert!(matches!(
            category_counts(&rs, "missing"),
            Err(EdaError::InvalidArgument(_))
        ));
    }
}

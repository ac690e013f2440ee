use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{FieldKind, FieldValue, RecordSet, Schema};
use crate::error::{EdaError, Result};

// ---------------------------------------------------------------------------
// Filter predicate: allow-sets and inclusive ranges per field
// ---------------------------------------------------------------------------

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Inclusive date bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Declarative record predicate.
///
/// A field absent from every map is unconstrained. An allow-set that is
/// present but empty matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    /// Categorical / text field → allowed values.
    pub categories: BTreeMap<String, BTreeSet<String>>,
    /// Numeric field → inclusive bounds.
    pub ranges: BTreeMap<String, NumericRange>,
    /// Date field → inclusive bounds.
    pub dates: BTreeMap<String, DateRange>,
    /// Whether a missing cell passes the constraint on its field.
    pub keep_missing: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            categories: BTreeMap::new(),
            ranges: BTreeMap::new(),
            dates: BTreeMap::new(),
            keep_missing: true,
        }
    }
}

impl FilterSpec {
    /// A spec whose allow-sets and ranges cover everything observed in `records`.
    pub fn full(records: &RecordSet) -> Self {
        let mut spec = FilterSpec::default();
        for (idx, field) in records.schema().fields().iter().enumerate() {
            let cells = records.column_at(idx).filter(|v| !v.is_null());
            match field.kind {
                FieldKind::Categorical | FieldKind::Text => {
                    let values = cells.filter_map(|v| v.as_str().map(str::to_string)).collect();
                    spec.categories.insert(field.name.clone(), values);
                }
                FieldKind::Integer | FieldKind::Float => {
                    let bounds = cells.filter_map(FieldValue::as_f64).fold(None, |acc, v| {
                        match acc {
                            None => Some((v, v)),
                            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
                        }
                    });
                    if let Some((min, max)) = bounds {
                        spec.ranges.insert(field.name.clone(), NumericRange::new(min, max));
                    }
                }
                FieldKind::Date => {
                    let mut dates = cells.filter_map(FieldValue::as_date);
                    if let Some(first) = dates.next() {
                        let (start, end) = dates.fold((first, first), |(lo, hi), d| {
                            (lo.min(d), hi.max(d))
                        });
                        spec.dates.insert(field.name.clone(), DateRange::new(start, end));
                    }
                }
            }
        }
        spec
    }

    /// Restrict a categorical / text field to the given values.
    pub fn allow<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories
            .insert(field.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict a numeric field to `[min, max]`.
    pub fn range(mut self, field: &str, min: f64, max: f64) -> Self {
        self.ranges.insert(field.to_string(), NumericRange::new(min, max));
        self
    }

    /// Restrict a date field to `[start, end]`.
    pub fn date_range(mut self, field: &str, start: NaiveDate, end: NaiveDate) -> Self {
        self.dates.insert(field.to_string(), DateRange::new(start, end));
        self
    }

    /// Resolve field names against `schema` and check every constraint fits
    /// the kind of the field it names.
    fn compile(&self, schema: &Schema) -> Result<Vec<(usize, Constraint<'_>)>> {
        let mut constraints = Vec::new();

        for (name, allowed) in &self.categories {
            let (idx, field) = schema.field(name)?;
            if !field.kind.is_string() {
                return Err(EdaError::invalid(format!(
                    "allow-set given for field '{name}' of kind {}",
                    field.kind
                )));
            }
            constraints.push((idx, Constraint::Allow(allowed)));
        }

        for (name, range) in &self.ranges {
            let (idx, field) = schema.field(name)?;
            if !field.kind.is_numeric() {
                return Err(EdaError::invalid(format!(
                    "numeric range given for field '{name}' of kind {}",
                    field.kind
                )));
            }
            // Written so NaN bounds are rejected too.
            if !(range.min <= range.max) {
                return Err(EdaError::invalid(format!(
                    "range for '{name}' has min {} above max {}",
                    range.min, range.max
                )));
            }
            constraints.push((idx, Constraint::Range(*range)));
        }

        for (name, range) in &self.dates {
            let (idx, field) = schema.field(name)?;
            if field.kind != FieldKind::Date {
                return Err(EdaError::invalid(format!(
                    "date range given for field '{name}' of kind {}",
                    field.kind
                )));
            }
            if range.start > range.end {
                return Err(EdaError::invalid(format!(
                    "date range for '{name}' starts {} after it ends {}",
                    range.start, range.end
                )));
            }
            constraints.push((idx, Constraint::Dates(*range)));
        }

        Ok(constraints)
    }
}

enum Constraint<'a> {
    Allow(&'a BTreeSet<String>),
    Range(NumericRange),
    Dates(DateRange),
}

impl Constraint<'_> {
    fn admits(&self, value: &FieldValue, keep_missing: bool) -> bool {
        if value.is_null() {
            return keep_missing;
        }
        match self {
            Constraint::Allow(allowed) => value.as_str().is_some_and(|s| allowed.contains(s)),
            Constraint::Range(range) => value.as_f64().is_some_and(|v| range.contains(v)),
            Constraint::Dates(range) => value.as_date().is_some_and(|d| range.contains(d)),
        }
    }
}

/// Return indices of records that pass every constraint of `spec`.
pub fn filtered_indices(records: &RecordSet, spec: &FilterSpec) -> Result<Vec<usize>> {
    let constraints = spec.compile(records.schema())?;
    Ok(records
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            constraints.iter().all(|(idx, constraint)| {
                record
                    .get(*idx)
                    .is_some_and(|v| constraint.admits(v, spec.keep_missing))
            })
        })
        .map(|(i, _)| i)
        .collect())
}

/// Apply `spec` to `records`, preserving order. The source set is untouched;
/// an empty result is a valid outcome.
pub fn filter(records: &RecordSet, spec: &FilterSpec) -> Result<RecordSet> {
    let kept: Vec<_> = filtered_indices(records, spec)?
        .into_iter()
        .map(|i| records.records()[i].clone())
        .collect();
    log::debug!("filter kept {} of {} records", kept.len(), records.len());
    Ok(records.derived(kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Field, Schema};

    fn sample() -> RecordSet {
        let schema = Schema::new(vec![
            Field::new("id", FieldKind::Integer),
            Field::new("score", FieldKind::Float),
            Field::new("category", FieldKind::Categorical),
            Field::new("joined", FieldKind::Date),
        ])
        .unwrap();
        let date = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let rows = vec![
            (1, Some(1.5), "A", date(1)),
            (2, Some(9.0), "B", date(5)),
            (3, None, "A", date(10)),
            (4, Some(4.25), "C", date(20)),
            (5, Some(7.0), "A", date(31)),
        ]
        .into_iter()
        .map(|(id, score, cat, joined)| {
            vec![
                FieldValue::Integer(id),
                score.map(FieldValue::Float).unwrap_or(FieldValue::Null),
                FieldValue::Text(cat.to_string()),
                FieldValue::Date(joined),
            ]
        })
        .collect();
        RecordSet::new(schema, rows).unwrap()
    }

    fn ids(rs: &RecordSet) -> Vec<i64> {
        rs.column("id")
            .unwrap()
            .filter_map(|v| v.as_f64().map(|f| f as i64))
            .collect()
    }

    #[test]
    fn default_spec_keeps_everything() {
        let rs = sample();
        assert_eq!(filter(&rs, &FilterSpec::default()).unwrap(), rs);
    }

    #[test]
    fn full_spec_keeps_everything() {
        let rs = sample();
        let spec = FilterSpec::full(&rs);
        assert_eq!(spec.ranges["score"], NumericRange::new(1.5, 9.0));
        assert_eq!(filter(&rs, &spec).unwrap(), rs);
    }

    #[test]
    fn allow_set_preserves_relative_order() {
        let rs = sample();
        let out = filter(&rs, &FilterSpec::default().allow("category", ["A"])).unwrap();
        assert_eq!(ids(&out), vec![1, 3, 5]);
    }

    #[test]
    fn empty_allow_set_matches_nothing() {
        let rs = sample();
        let spec = FilterSpec::default().allow("category", Vec::<String>::new());
        let out = filter(&rs, &spec).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.schema(), rs.schema());
    }

    #[test]
    fn ranges_are_inclusive_and_missing_cells_follow_keep_missing() {
        let rs = sample();
        let spec = FilterSpec::default().range("score", 4.25, 9.0);
        assert_eq!(ids(&filter(&rs, &spec).unwrap()), vec![2, 3, 4, 5]);

        let strict = FilterSpec {
            keep_missing: false,
            ..spec
        };
        assert_eq!(ids(&filter(&rs, &strict).unwrap()), vec![2, 4, 5]);
    }

    #[test]
    fn date_ranges_filter_dates() {
        let rs = sample();
        let spec = FilterSpec::default().date_range(
            "joined",
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
        );
        assert_eq!(ids(&filter(&rs, &spec).unwrap()), vec![2, 3, 4]);
    }

    #[test]
    fn malformed_specs_are_rejected() {
        let rs = sample();
        let cases = [
            FilterSpec::default().allow("nope", ["A"]),
            FilterSpec::default().allow("id", ["1"]),
            FilterSpec::default().range("category", 0.0, 1.0),
            FilterSpec::default().range("score", 5.0, 1.0),
            FilterSpec::default().range("score", f64::NAN, 1.0),
            FilterSpec::default().date_range(
                "id",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ),
            FilterSpec::default().date_range(
                "joined",
                NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            ),
        ];
        for spec in &cases {
            assert!(
                matches!(filter(&rs, spec), Err(EdaError::InvalidArgument(_))),
                "{spec:?}"
            );
        }
    }
}

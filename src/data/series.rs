use super::model::{FieldValue, RecordSet};
use crate::error::{EdaError, Result};

/// Equal-width histogram of one numeric field.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` ascending bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// `(left edge, width, count)` for each bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &count)| (w[0], w[1] - w[0], count))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin the non-null values of `field` into `bins` equal-width bins.
///
/// Every bin is half-open except the last, which also includes the maximum.
/// A constant column is centred in `[v - 0.5, v + 0.5]`; an empty one spans
/// `[0, 1]`.
pub fn histogram(records: &RecordSet, field: &str, bins: usize) -> Result<Histogram> {
    if bins == 0 {
        return Err(EdaError::invalid("histogram needs at least one bin"));
    }
    let values: Vec<f64> = numeric_column(records, field)?.into_iter().flatten().collect();

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if values.is_empty() {
        (lo, hi) = (0.0, 1.0);
    } else if lo == hi {
        (lo, hi) = (lo - 0.5, hi + 0.5);
    }

    let width = (hi - lo) / bins as f64;
    let mut edges: Vec<f64> = (0..bins).map(|i| lo + width * i as f64).collect();
    edges.push(hi);

    let mut counts = vec![0usize; bins];
    for v in values {
        let slot = (((v - lo) / width) as usize).min(bins - 1);
        counts[slot] += 1;
    }
    Ok(Histogram { edges, counts })
}

/// `[x, y]` points for every record where both numeric fields are present.
pub fn scatter(records: &RecordSet, x: &str, y: &str) -> Result<Vec<[f64; 2]>> {
    let xs = numeric_column(records, x)?;
    let ys = numeric_column(records, y)?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .filter_map(|(x, y)| Some([x?, y?]))
        .collect())
}

fn numeric_column(records: &RecordSet, field: &str) -> Result<Vec<Option<f64>>> {
    let (idx, meta) = records.schema().field(field)?;
    if !meta.kind.is_numeric() {
        return Err(EdaError::invalid(format!(
            "field '{field}' is {}, not numeric",
            meta.kind
        )));
    }
    Ok(records.column_at(idx).map(FieldValue::as_f64).collect())
}

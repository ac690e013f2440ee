use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use rusty_eda::config::DashboardConfig;
use rusty_eda::data::cache::GenerationCache;
use rusty_eda::data::filter::{filter, DateRange, FilterSpec, NumericRange};
use rusty_eda::data::generator::{Profile, RecordGenerator};
use rusty_eda::data::model::{FieldKind, RecordSet};
use rusty_eda::data::stats::{
    category_counts, correlation_matrix, describe, null_counts, CorrelationMatrix, Stats,
};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Central-panel tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Data,
    Statistics,
    Plots,
}

/// Where the current record set came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Generated { profile: Profile, seed: Option<u64> },
    File(String),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    // ---- generation parameters (sidebar) ----
    pub profile: Profile,
    pub n_rows: usize,
    pub use_seed: bool,
    pub seed: u64,
    pub show_plot: bool,
    pub histogram_bins: usize,

    /// Memo of seeded generation requests.
    cache: GenerationCache,

    /// Current source record set (None until generated or loaded).
    pub dataset: Option<Arc<RecordSet>>,
    pub source: Option<Source>,

    /// Current filter selections.
    pub filters: FilterSpec,
    /// Filter covering the whole dataset; bounds for the filter widgets.
    pub full_filters: FilterSpec,

    // ---- derived from `dataset` + `filters` on every change ----
    pub visible: Option<RecordSet>,
    pub stats: Stats,
    pub nulls: Vec<(String, usize)>,
    pub correlation: Option<CorrelationMatrix>,

    // ---- plot selections ----
    pub tab: Tab,
    pub hist_field: Option<String>,
    pub category_field: Option<String>,
    pub scatter_x: Option<String>,
    pub scatter_y: Option<String>,
    /// Categorical field used to colour bars and scatter points.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = Self {
            profile: config.profile,
            n_rows: config.rows_default,
            use_seed: config.seed.is_some(),
            seed: config.seed.unwrap_or(42),
            show_plot: config.show_plot,
            histogram_bins: config.histogram_bins,
            config,
            cache: GenerationCache::new(),
            dataset: None,
            source: None,
            filters: FilterSpec::default(),
            full_filters: FilterSpec::default(),
            visible: None,
            stats: Stats::default(),
            nulls: Vec::new(),
            correlation: None,
            tab: Tab::Data,
            hist_field: None,
            category_field: None,
            scatter_x: None,
            scatter_y: None,
            color_map: None,
            status_message: None,
        };
        state.regenerate();
        state
    }

    fn seed(&self) -> Option<u64> {
        self.use_seed.then_some(self.seed)
    }

    /// Generate a record set from the current sidebar parameters.
    pub fn regenerate(&mut self) {
        let generator = RecordGenerator::new(self.profile);
        let seed = self.seed();
        match self.cache.get_or_generate(&generator, self.n_rows, seed) {
            Ok(records) => {
                let source = Source::Generated {
                    profile: self.profile,
                    seed,
                };
                self.set_dataset(records, source);
            }
            Err(e) => {
                log::error!("generation failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Drop every memoized generation result and draw again.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.regenerate();
    }

    /// Ingest a new record set, reset filters and plot selections.
    pub fn set_dataset(&mut self, dataset: Arc<RecordSet>, source: Source) {
        let full = FilterSpec::full(&dataset);
        // Free-text fields start unconstrained and are narrowed one value at a time.
        let mut filters = full.clone();
        for field in dataset.schema().fields() {
            if field.kind == FieldKind::Text {
                filters.categories.remove(&field.name);
            }
        }
        self.full_filters = full;
        self.filters = filters;

        let schema = dataset.schema();
        let numeric: Vec<String> = schema
            .numeric_fields()
            .map(|(_, f)| f.name.clone())
            .collect();
        let categorical: Vec<String> = schema
            .fields()
            .iter()
            .filter(|f| f.kind == FieldKind::Categorical)
            .map(|f| f.name.clone())
            .collect();
        self.hist_field = keep_or_first(self.hist_field.take(), &numeric);
        self.category_field = keep_or_first(self.category_field.take(), &categorical);
        self.scatter_x = keep_or_first(self.scatter_x.take(), &numeric);
        self.scatter_y = match self.scatter_y.take() {
            Some(current) if numeric.contains(&current) => Some(current),
            _ => numeric.get(1).or(numeric.first()).cloned(),
        };

        self.dataset = Some(dataset);
        self.source = Some(source);
        self.status_message = None;
        self.rebuild_color_map();
        self.refilter();
    }

    /// Recompute the filtered view and every summary derived from it.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        match filter(ds, &self.filters) {
            Ok(visible) => {
                self.stats = describe(&visible);
                self.nulls = null_counts(&visible);
                self.correlation = Some(correlation_matrix(&visible));
                self.visible = Some(visible);
            }
            Err(e) => {
                log::warn!("filter rejected: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Rebuild the colour map from the current category field.
    pub fn rebuild_color_map(&mut self) {
        self.color_map = match (&self.dataset, &self.category_field) {
            (Some(ds), Some(field)) => category_counts(ds, field).ok().map(|counts| {
                let mut values: Vec<&str> = counts.iter().map(|(v, _)| v.as_str()).collect();
                values.sort_unstable();
                ColorMap::new(field, values)
            }),
            _ => None,
        };
    }

    pub fn set_category_field(&mut self, field: String) {
        self.category_field = Some(field);
        self.rebuild_color_map();
    }

    /// Toggle a single value in a categorical field's allow-set.
    pub fn toggle_category(&mut self, field: &str, value: &str) {
        let selected = self.filters.categories.entry(field.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select all values of a field.
    pub fn select_all(&mut self, field: &str) {
        if let Some(all) = self.full_filters.categories.get(field) {
            self.filters.categories.insert(field.to_string(), all.clone());
            self.refilter();
        }
    }

    /// Deselect all values of a field.
    pub fn select_none(&mut self, field: &str) {
        self.filters
            .categories
            .insert(field.to_string(), BTreeSet::new());
        self.refilter();
    }

    /// Narrow a free-text field to one value, or lift the constraint.
    pub fn choose_text(&mut self, field: &str, value: Option<String>) {
        match value {
            Some(v) => {
                self.filters
                    .categories
                    .insert(field.to_string(), BTreeSet::from([v]));
            }
            None => {
                self.filters.categories.remove(field);
            }
        }
        self.refilter();
    }

    pub fn set_range(&mut self, field: &str, min: f64, max: f64) {
        self.filters.ranges.insert(
            field.to_string(),
            NumericRange::new(min, max.max(min)),
        );
        self.refilter();
    }

    pub fn set_date_range(&mut self, field: &str, start: NaiveDate, end: NaiveDate) {
        self.filters.dates.insert(
            field.to_string(),
            DateRange::new(start, end.max(start)),
        );
        self.refilter();
    }

    /// Restore every filter to the full dataset.
    pub fn reset_filters(&mut self) {
        if let (Some(ds), Some(source)) = (self.dataset.clone(), self.source.clone()) {
            self.set_dataset(ds, source);
        }
    }

    pub fn visible_len(&self) -> usize {
        self.visible.as_ref().map_or(0, RecordSet::len)
    }
}

fn keep_or_first(current: Option<String>, candidates: &[String]) -> Option<String> {
    match current {
        Some(c) if candidates.contains(&c) => Some(c),
        _ => candidates.first().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(DashboardConfig {
            seed: Some(3),
            rows_default: 60,
            ..DashboardConfig::default()
        })
    }

    #[test]
    fn starts_with_a_generated_unfiltered_dataset() {
        let state = state();
        assert_eq!(state.dataset.as_ref().unwrap().len(), 60);
        assert_eq!(state.visible_len(), 60);
        assert_eq!(state.hist_field.as_deref(), Some("id"));
        assert_eq!(state.scatter_y.as_deref(), Some("age"));
        assert_eq!(state.category_field.as_deref(), Some("category"));
        assert!(state.color_map.is_some());
    }

    #[test]
    fn category_toggles_refilter() {
        let mut state = state();
        state.select_none("category");
        assert_eq!(state.visible_len(), 0);
        state.toggle_category("category", "A");
        let visible = state.visible.as_ref().unwrap();
        assert!(visible
            .column("category")
            .unwrap()
            .all(|v| v.as_str() == Some("A")));
        state.select_all("category");
        assert_eq!(state.visible_len(), 60);
    }

    #[test]
    fn seeded_regeneration_reuses_the_cached_set() {
        let mut state = state();
        let before = state.dataset.clone().unwrap();
        state.regenerate();
        assert!(Arc::ptr_eq(&before, state.dataset.as_ref().unwrap()));
    }

    #[test]
    fn text_choice_narrows_to_one_value() {
        let mut state = state();
        let first_city = state
            .dataset
            .as_ref()
            .unwrap()
            .column("city")
            .unwrap()
            .next()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap();
        state.choose_text("city", Some(first_city.clone()));
        let visible = state.visible.as_ref().unwrap();
        assert!(visible.len() >= 1);
        assert!(visible
            .column("city")
            .unwrap()
            .all(|v| v.as_str() == Some(first_city.as_str())));
        state.choose_text("city", None);
        assert_eq!(state.visible_len(), 60);
    }
}

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::data::generator::Profile;
use crate::data::loader::LoadOptions;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "RUSTY_EDA_CONFIG";

/// Dashboard defaults. Every key is optional in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Initial value of the row-count slider.
    pub rows_default: usize,
    pub rows_min: usize,
    pub rows_max: usize,
    pub histogram_bins: usize,
    /// Seed used at start-up; `None` draws fresh data each time.
    pub seed: Option<u64>,
    pub profile: Profile,
    /// Rows shown in the data preview table.
    pub preview_rows: usize,
    pub categorical_max_distinct: usize,
    pub show_plot: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            rows_default: 100,
            rows_min: 10,
            rows_max: 500,
            histogram_bins: 10,
            seed: None,
            profile: Profile::default(),
            preview_rows: 50,
            categorical_max_distinct: LoadOptions::default().categorical_max_distinct,
            show_plot: true,
        }
    }
}

impl DashboardConfig {
    /// Read and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Config from the file named by [`CONFIG_ENV`], or defaults when the
    /// variable is unset or the file is unusable.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::from_file(Path::new(&path)) {
            Ok(config) => {
                log::info!("using dashboard config {}", Path::new(&path).display());
                config
            }
            Err(e) => {
                log::warn!("ignoring dashboard config: {e:#}");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.rows_min > 0, "rows_min must be positive");
        ensure!(
            self.rows_min <= self.rows_default && self.rows_default <= self.rows_max,
            "rows_default {} must lie within [{}, {}]",
            self.rows_default,
            self.rows_min,
            self.rows_max
        );
        ensure!(self.histogram_bins > 0, "histogram_bins must be positive");
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            categorical_max_distinct: self.categorical_max_distinct,
        }
    }
}

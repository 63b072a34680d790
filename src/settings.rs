// ⚙️ Settings - defaults, optional portfolio.toml, PORTFOLIO_* environment

use crate::chart::Layout;
use crate::error::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tokenized tables to read (.json or .csv)
    pub input: Option<PathBuf>,
    /// Where `report` writes the chart document; stdout when unset
    pub output: Option<PathBuf>,
    pub chart_width: u32,
    pub chart_height: u32,
    /// Listen address of the chart server
    pub bind_addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            input: None,
            output: None,
            chart_width: 700,
            chart_height: 700,
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Settings {
    /// Load `portfolio.toml` (if present) and `PORTFOLIO_*` overrides
    pub fn load() -> Result<Self> {
        Self::load_from("portfolio")
    }

    /// Same as [`Settings::load`] with an explicit file stem
    pub fn load_from(file_stem: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(file_stem).required(false))
            .add_source(Environment::with_prefix("PORTFOLIO"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn layout(&self) -> Layout {
        Layout::sized(self.chart_width, self.chart_height)
    }
}

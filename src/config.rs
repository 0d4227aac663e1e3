use std::env;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::{DEFAULT_PALETTE, Rgb};
use crate::constants::{
    ACCESS_TOKEN_ENV, DEFAULT_OPACITY, DEFAULT_ZOOM, H3_MAX_RESOLUTION, MAX_RESOLUTION, MIN_RESOLUTION,
};
use crate::error::{HeatmapError, Result};
use crate::loader::DataSource;
use crate::resolution::ResolutionSelector;

/// Everything the heatmap pipeline consumes but does not compute.
///
/// Loaded from JSON; any field left out takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Ordered light-to-dark colors; its length is the number of quantile buckets
    pub palette: Vec<Rgb>,
    pub opacity: f64,
    pub min_resolution: u8,
    pub max_resolution: u8,
    pub default_zoom: f64,
    /// Map tile token, handed to the renderer as-is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub data: DataSource,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.to_vec(),
            opacity: DEFAULT_OPACITY,
            min_resolution: MIN_RESOLUTION,
            max_resolution: MAX_RESOLUTION,
            default_zoom: DEFAULT_ZOOM,
            access_token: None,
            data: DataSource::default(),
        }
    }
}

impl HeatmapConfig {
    /// Reads and validates a JSON config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: HeatmapConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.palette.is_empty() {
            return Err(HeatmapError::InvalidPaletteSize(0));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(HeatmapError::InvalidConfig(format!(
                "opacity {} outside [0, 1]",
                self.opacity
            )));
        }
        if self.max_resolution > H3_MAX_RESOLUTION {
            return Err(HeatmapError::InvalidConfig(format!(
                "max resolution {} above {}",
                self.max_resolution, H3_MAX_RESOLUTION
            )));
        }
        if !self.default_zoom.is_finite() {
            return Err(HeatmapError::InvalidConfig("default zoom must be finite".to_string()));
        }
        self.resolution_selector().map(|_| ())
    }

    pub fn palette_size(&self) -> usize {
        self.palette.len()
    }

    pub fn resolution_selector(&self) -> Result<ResolutionSelector> {
        ResolutionSelector::new(self.min_resolution, self.max_resolution)
    }

    /// Configured token, else the `MAPBOX_TOKEN` environment variable
    pub fn resolve_access_token(&mut self) {
        if self.access_token.is_none() {
            self.access_token = env::var(ACCESS_TOKEN_ENV).ok().filter(|token| !token.is_empty());
        }
    }

    /// Fill color for `bucket`, including opacity
    pub fn fill_for_bucket(&self, bucket: usize) -> String {
        let color = self
            .palette
            .get(bucket)
            .or_else(|| self.palette.last())
            .copied()
            .unwrap_or(Rgb::new(0, 0, 0));
        color.to_rgba(self.opacity)
    }
}

/// Render model assembly
///
/// A viewport event (zoom) goes through resolution selection, binning and
/// quantile classification, and comes out as colored cell outlines plus a
/// legend for an external map renderer. `HeatmapSession` keeps one computed
/// layer per resolution so zoom changes inside a resolution band reuse it.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use h3o::Resolution;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::aggregate::{HexCell, aggregate};
use crate::config::HeatmapConfig;
use crate::error::{HeatmapError, Result};
use crate::grid::{GridCell, GridIndex, Vertex};
use crate::observation::{Observation, centroid};
use crate::quantile::{Classification, LegendEntry, classify};
use crate::resolution::ResolutionSelector;

/// Map surface notification; a missing zoom means the configured default
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportEvent {
    pub zoom: Option<f64>,
}

impl ViewportEvent {
    pub fn at_zoom(zoom: f64) -> Self {
        Self { zoom: Some(zoom) }
    }
}

/// Camera settings handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Vertex,
    pub zoom: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = "C: GridCell"))]
pub struct ColoredCell<C> {
    #[serde(serialize_with = "C::serialize_id")]
    pub cell_id: C,
    pub boundary: Vec<Vertex>,
    pub count: u64,
    pub bucket: usize,
    pub fill: String,
}

/// Legend range with its label and swatch color
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendSwatch {
    #[serde(flatten)]
    pub entry: LegendEntry,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel<C> {
    pub resolution: u8,
    pub view: MapView,
    pub cells: Vec<ColoredCell<C>>,
    pub legend: Vec<LegendSwatch>,
}

/// Binned and classified cells for one resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionLayer<C> {
    pub cells: Vec<HexCell<C>>,
    pub classification: Classification,
}

impl<C> ResolutionLayer<C> {
    pub fn compute<G>(grid: &G, observations: &[Observation], resolution: Resolution, palette_size: usize) -> Result<Self>
    where
        G: GridIndex<Cell = C>,
    {
        let cells = aggregate(grid, observations, resolution)?;
        let classification = classify(&cells, palette_size)?;
        Ok(Self {
            cells,
            classification,
        })
    }
}

fn render_layer<C: Copy>(
    layer: &ResolutionLayer<C>,
    resolution: Resolution,
    zoom: f64,
    center: Vertex,
    config: &HeatmapConfig,
) -> RenderModel<C> {
    let cells: Vec<ColoredCell<C>> = layer
        .cells
        .iter()
        .zip(layer.classification.buckets.iter())
        .map(|(cell, &bucket)| ColoredCell {
            cell_id: cell.cell_id,
            boundary: cell.boundary.clone(),
            count: cell.count,
            bucket,
            fill: config.fill_for_bucket(bucket),
        })
        .collect();

    let legend: Vec<LegendSwatch> = layer
        .classification
        .legend
        .iter()
        .map(|entry| LegendSwatch {
            entry: *entry,
            label: entry.label(),
            color: config.fill_for_bucket(entry.bucket_index),
        })
        .collect();

    info!(
        "Rendered {} cells at resolution {} (zoom {:.2}, {} of {} buckets used)",
        cells.len(),
        u8::from(resolution),
        zoom,
        layer.classification.used_buckets(),
        legend.len()
    );

    RenderModel {
        resolution: u8::from(resolution),
        view: MapView {
            center,
            zoom,
            access_token: config.access_token.clone(),
        },
        cells,
        legend,
    }
}

/// One full render cycle with nothing cached.
pub fn build_render_model<G: GridIndex>(
    grid: &G,
    observations: &[Observation],
    event: ViewportEvent,
    config: &HeatmapConfig,
) -> Result<RenderModel<G::Cell>> {
    let zoom = event.zoom.unwrap_or(config.default_zoom);
    let resolution = config.resolution_selector()?.select(zoom);
    let layer = ResolutionLayer::compute(grid, observations, resolution, config.palette_size())?;
    let center = centroid(observations).ok_or(HeatmapError::EmptyDistribution)?;
    Ok(render_layer(&layer, resolution, zoom, center, config))
}

fn cached_layer<'a, G: GridIndex>(
    layers: &'a mut BTreeMap<u8, ResolutionLayer<G::Cell>>,
    grid: &G,
    observations: &[Observation],
    resolution: Resolution,
    palette_size: usize,
) -> Result<&'a ResolutionLayer<G::Cell>> {
    let key = u8::from(resolution);
    match layers.entry(key) {
        Entry::Occupied(slot) => {
            debug!("Layer cache hit at resolution {}", key);
            Ok(slot.into_mut())
        }
        Entry::Vacant(slot) => {
            debug!("Layer cache miss at resolution {}", key);
            let layer = ResolutionLayer::compute(grid, observations, resolution, palette_size)?;
            Ok(slot.insert(layer))
        }
    }
}

/// Long-lived heatmap state for one observation set.
///
/// Layers are memoized per resolution and only dropped when the observation
/// set is replaced.
pub struct HeatmapSession<G: GridIndex> {
    grid: G,
    config: HeatmapConfig,
    selector: ResolutionSelector,
    observations: Vec<Observation>,
    center: Option<Vertex>,
    layers: BTreeMap<u8, ResolutionLayer<G::Cell>>,
}

impl<G: GridIndex> HeatmapSession<G> {
    pub fn new(grid: G, config: HeatmapConfig, observations: Vec<Observation>) -> Result<Self> {
        config.validate()?;
        let selector = config.resolution_selector()?;
        let center = centroid(&observations);
        Ok(Self {
            grid,
            config,
            selector,
            observations,
            center,
            layers: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Resolutions that currently have a computed layer
    pub fn cached_resolutions(&self) -> Vec<u8> {
        self.layers.keys().copied().collect()
    }

    /// Swaps in a new observation set and drops every cached layer
    pub fn replace_observations(&mut self, observations: Vec<Observation>) {
        debug!(
            "Replacing {} observations with {}, dropping {} cached layers",
            self.observations.len(),
            observations.len(),
            self.layers.len()
        );
        self.center = centroid(&observations);
        self.observations = observations;
        self.layers.clear();
    }

    /// Layer for `resolution`, computing it on first use
    pub fn layer(&mut self, resolution: Resolution) -> Result<&ResolutionLayer<G::Cell>> {
        cached_layer(
            &mut self.layers,
            &self.grid,
            &self.observations,
            resolution,
            self.config.palette_size(),
        )
    }

    /// Handles one viewport event
    pub fn build(&mut self, event: ViewportEvent) -> Result<RenderModel<G::Cell>> {
        let zoom = event.zoom.unwrap_or(self.config.default_zoom);
        let resolution = self.selector.select(zoom);
        let center = self.center.ok_or(HeatmapError::EmptyDistribution)?;

        let layer = cached_layer(
            &mut self.layers,
            &self.grid,
            &self.observations,
            resolution,
            self.config.palette_size(),
        )?;
        Ok(render_layer(layer, resolution, zoom, center, &self.config))
    }
}

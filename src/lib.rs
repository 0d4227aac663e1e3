pub mod aggregate;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod grid;
pub mod legend;
pub mod loader;
pub mod observation;
pub mod quantile;
pub mod render;
pub mod resolution;

pub use aggregate::{HexCell, aggregate};
pub use config::HeatmapConfig;
pub use error::{HeatmapError, Result};
pub use grid::{GridCell, GridIndex, H3Grid, RectGrid, Vertex};
pub use observation::Observation;
pub use quantile::{Classification, LegendEntry, classify};
pub use render::{HeatmapSession, RenderModel, ViewportEvent, build_render_model};
pub use resolution::{ResolutionSelector, zoom_to_resolution};

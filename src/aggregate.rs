/// Spatial binning of observations into grid cells
///
/// Each observation is indexed once; cells are emitted in first-seen order so
/// that identical input always yields identical output. Outlines are computed
/// once per distinct cell, never per observation.

use std::collections::HashMap;

use h3o::Resolution;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::{GridCell, GridIndex, Vertex};
use crate::observation::Observation;

/// An occupied grid cell with its observation count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "C: GridCell", deserialize = "C: GridCell"))]
pub struct HexCell<C> {
    #[serde(serialize_with = "C::serialize_id", deserialize_with = "C::deserialize_id")]
    pub cell_id: C,
    pub resolution: u8,
    pub boundary: Vec<Vertex>,
    pub count: u64,
}

/// Groups `observations` by the cell containing them at `resolution`.
///
/// Fails on the first observation the grid cannot index (coordinates off the
/// globe); nothing is dropped silently.
pub fn aggregate<G: GridIndex>(
    grid: &G,
    observations: &[Observation],
    resolution: Resolution,
) -> Result<Vec<HexCell<G::Cell>>> {
    let mut slots: HashMap<G::Cell, usize> = HashMap::new();
    let mut tallies: Vec<(G::Cell, u64)> = Vec::new();

    for obs in observations {
        let cell = grid.cell_at(obs.latitude, obs.longitude, resolution)?;
        match slots.get(&cell) {
            Some(&slot) => tallies[slot].1 += 1,
            None => {
                slots.insert(cell, tallies.len());
                tallies.push((cell, 1));
            }
        }
    }

    let res = u8::from(resolution);
    let cells: Vec<HexCell<G::Cell>> = tallies
        .into_iter()
        .map(|(cell_id, count)| HexCell {
            cell_id,
            resolution: res,
            boundary: grid.boundary(cell_id),
            count,
        })
        .collect();

    debug!(
        "Binned {} observations into {} cells at resolution {}",
        observations.len(),
        cells.len(),
        res
    );
    Ok(cells)
}

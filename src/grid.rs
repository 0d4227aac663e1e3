/// Grid-indexing capability used by the spatial binner
///
/// The binner only needs two things from a hierarchical grid: the cell that
/// contains a point at a resolution, and that cell's outline. `H3Grid` answers
/// both with `h3o`; `RectGrid` is a plain latitude/longitude lattice that is
/// handy wherever a deterministic, library-free grid is wanted.

use std::fmt;
use std::hash::Hash;

use h3o::{CellIndex, LatLng, Resolution};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{MAX_LATITUDE, MAX_LONGITUDE};
use crate::error::{HeatmapError, Result};

/// A point in geographic degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub latitude: f64,
    pub longitude: f64,
}

impl Vertex {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// GeoJSON position order
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl From<LatLng> for Vertex {
    fn from(latlng: LatLng) -> Self {
        Vertex {
            latitude: latlng.lat_radians().to_degrees(),
            longitude: latlng.lng_radians().to_degrees(),
        }
    }
}

/// Rejects coordinates outside the globe. Grid libraries give no guarantees
/// for such input, so callers must filter them before indexing.
pub fn check_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite()
        || !longitude.is_finite()
        || latitude.abs() > MAX_LATITUDE
        || longitude.abs() > MAX_LONGITUDE
    {
        return Err(HeatmapError::CoordinateOutOfRange {
            latitude,
            longitude,
        });
    }
    Ok(())
}

pub fn serialize_cell_index<S>(cell: &CellIndex, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let value: u64 = (*cell).into();
    serializer.serialize_u64(value)
}

pub fn deserialize_cell_index<'de, D>(deserializer: D) -> std::result::Result<CellIndex, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = u64::deserialize(deserializer)?;
    CellIndex::try_from(raw).map_err(serde::de::Error::custom)
}

/// Identifier of a grid cell, with its wire form
pub trait GridCell: Copy + Eq + Hash + fmt::Debug + fmt::Display {
    fn serialize_id<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>;
    fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error>;
}

/// H3 cells travel as their raw `u64` index
impl GridCell for CellIndex {
    fn serialize_id<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_cell_index(self, serializer)
    }

    fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserialize_cell_index(deserializer)
    }
}

/// Point-to-cell and cell-to-outline operations of a hierarchical grid
pub trait GridIndex {
    /// Opaque cell identifier
    type Cell: GridCell;

    /// The cell containing `(latitude, longitude)` at `resolution`
    fn cell_at(&self, latitude: f64, longitude: f64, resolution: Resolution) -> Result<Self::Cell>;

    /// Outline of `cell` as a closed ring (first vertex repeated last)
    fn boundary(&self, cell: Self::Cell) -> Vec<Vertex>;
}

fn close_ring(mut ring: Vec<Vertex>) -> Vec<Vertex> {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

/// Uber H3 hexagonal grid backed by `h3o`
#[derive(Debug, Clone, Copy, Default)]
pub struct H3Grid;

impl GridIndex for H3Grid {
    type Cell = CellIndex;

    fn cell_at(&self, latitude: f64, longitude: f64, resolution: Resolution) -> Result<CellIndex> {
        check_coordinates(latitude, longitude)?;
        let latlng = LatLng::new(latitude, longitude)?;
        Ok(latlng.to_cell(resolution))
    }

    fn boundary(&self, cell: CellIndex) -> Vec<Vertex> {
        let corners: Vec<Vertex> = cell.boundary().iter().map(|latlng| Vertex::from(*latlng)).collect();
        close_ring(corners)
    }
}

/// Cell of a [`RectGrid`]: resolution plus row/column in the lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RectCell {
    pub resolution: u8,
    pub row: i64,
    pub col: i64,
}

impl GridCell for RectCell {
    fn serialize_id<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.serialize(serializer)
    }

    fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        RectCell::deserialize(deserializer)
    }
}

impl fmt::Display for RectCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}:{}:{}", self.resolution, self.row, self.col)
    }
}

/// Equirectangular lattice whose cells are `360 / 2^resolution` degrees wide
/// and tall. Rows count up from the south pole, columns from the antimeridian.
#[derive(Debug, Clone, Copy, Default)]
pub struct RectGrid;

impl RectGrid {
    pub fn cell_size_degrees(resolution: u8) -> f64 {
        360.0 / f64::from(1u32 << resolution.min(30))
    }

    /// Number of rows and columns at `resolution`
    pub fn dimensions(resolution: u8) -> (i64, i64) {
        let size = Self::cell_size_degrees(resolution);
        let rows = ((2.0 * MAX_LATITUDE) / size).ceil() as i64;
        let cols = ((2.0 * MAX_LONGITUDE) / size).ceil() as i64;
        (rows.max(1), cols.max(1))
    }
}

impl GridIndex for RectGrid {
    type Cell = RectCell;

    fn cell_at(&self, latitude: f64, longitude: f64, resolution: Resolution) -> Result<RectCell> {
        check_coordinates(latitude, longitude)?;
        let res = u8::from(resolution);
        let size = Self::cell_size_degrees(res);
        let (rows, cols) = Self::dimensions(res);
        // the north pole and the antimeridian belong to the last row/column
        Ok(RectCell {
            resolution: res,
            row: (((latitude + MAX_LATITUDE) / size).floor() as i64).min(rows - 1),
            col: (((longitude + MAX_LONGITUDE) / size).floor() as i64).min(cols - 1),
        })
    }

    fn boundary(&self, cell: RectCell) -> Vec<Vertex> {
        let size = Self::cell_size_degrees(cell.resolution);
        let south = cell.row as f64 * size - MAX_LATITUDE;
        let west = cell.col as f64 * size - MAX_LONGITUDE;
        let north = (south + size).min(MAX_LATITUDE);
        let east = (west + size).min(MAX_LONGITUDE);
        close_ring(vec![
            Vertex::new(south, west),
            Vertex::new(south, east),
            Vertex::new(north, east),
            Vertex::new(north, west),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use more_asserts::assert_ge;

    #[test]
    fn h3_cell_resolution_matches_request() {
        let cell = H3Grid.cell_at(37.7749, -122.4194, Resolution::Five).unwrap();
        assert_eq!(cell.resolution(), Resolution::Five);
    }

    #[test]
    fn h3_boundary_is_closed_hexagon() {
        let cell = H3Grid.cell_at(48.8566, 2.3522, Resolution::Six).unwrap();
        let ring = H3Grid.boundary(cell);

        // six corners (more if the cell crosses an icosahedron edge) plus the closing vertex
        assert_ge!(ring.len(), 7);
        assert_eq!(ring.first(), ring.last());
        for vertex in &ring {
            assert_abs_diff_eq!(vertex.latitude, 48.8566, epsilon = 0.5);
            assert_abs_diff_eq!(vertex.longitude, 2.3522, epsilon = 0.5);
        }
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(matches!(
            H3Grid.cell_at(91.0, 0.0, Resolution::Three),
            Err(HeatmapError::CoordinateOutOfRange { .. })
        ));
        assert!(matches!(
            RectGrid.cell_at(0.0, -180.5, Resolution::Three),
            Err(HeatmapError::CoordinateOutOfRange { .. })
        ));
        assert!(H3Grid.cell_at(f64::NAN, 0.0, Resolution::Three).is_err());
    }

    #[test]
    fn rect_grid_cells_and_boundaries() {
        // 45 degree cells at resolution 3
        let cell = RectGrid.cell_at(10.0, 10.0, Resolution::Three).unwrap();
        assert_eq!(cell, RectCell { resolution: 3, row: 2, col: 4 });

        let ring = RectGrid.boundary(cell);
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], Vertex::new(0.0, 0.0));
        assert_eq!(ring[2], Vertex::new(45.0, 45.0));
        assert_eq!(ring[4], ring[0]);
    }

    #[test]
    fn pole_and_antimeridian_stay_in_the_last_rect_cell() {
        let corner = RectGrid.cell_at(90.0, 180.0, Resolution::Three).unwrap();
        assert_eq!(corner, RectCell { resolution: 3, row: 3, col: 7 });
        assert_eq!(corner, RectGrid.cell_at(60.0, 170.0, Resolution::Three).unwrap());
        assert_eq!(
            RectGrid.cell_at(-90.0, -180.0, Resolution::Three).unwrap(),
            RectCell { resolution: 3, row: 0, col: 0 }
        );

        for res in [Resolution::Zero, Resolution::One, Resolution::Three, Resolution::Ten] {
            let cell = RectGrid.cell_at(90.0, 180.0, res).unwrap();
            for vertex in RectGrid.boundary(cell) {
                assert!(vertex.latitude.abs() <= 90.0, "{res:?} {vertex:?}");
                assert!(vertex.longitude.abs() <= 180.0, "{res:?} {vertex:?}");
            }
        }
    }

    #[test]
    fn h3_cell_index_travels_as_u64() {
        #[derive(Serialize, Deserialize)]
        struct Wrapped {
            #[serde(serialize_with = "serialize_cell_index", deserialize_with = "deserialize_cell_index")]
            cell: CellIndex,
        }

        let cell = H3Grid.cell_at(52.52, 13.405, Resolution::Seven).unwrap();
        let json = serde_json::to_value(Wrapped { cell }).unwrap();
        assert_eq!(json["cell"].as_u64(), Some(u64::from(cell)));

        let back: Wrapped = serde_json::from_value(json).unwrap();
        assert_eq!(back.cell, cell);

        let bogus = serde_json::json!({ "cell": 0 });
        assert!(serde_json::from_value::<Wrapped>(bogus).is_err());
    }
}

/// Delimited-text loader for observation files
///
/// The first line is a header. Latitude and longitude columns are located by
/// name; every other column is kept as a passthrough field. Any row that cannot
/// be turned into an on-globe observation aborts the load.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DELIMITER, DEFAULT_LATITUDE_COLUMN, DEFAULT_LONGITUDE_COLUMN};
use crate::error::{HeatmapError, Result};
use crate::grid::check_coordinates;
use crate::observation::Observation;

/// Where observations come from and how their file is laid out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSource {
    pub path: Option<PathBuf>,
    pub delimiter: char,
    pub latitude_column: String,
    pub longitude_column: String,
}

impl Default for DataSource {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: DEFAULT_DELIMITER,
            latitude_column: DEFAULT_LATITUDE_COLUMN.to_string(),
            longitude_column: DEFAULT_LONGITUDE_COLUMN.to_string(),
        }
    }
}

/// Reads every observation in `path`.
pub fn load_observations<P: AsRef<Path>>(path: P, source: &DataSource) -> Result<Vec<Observation>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let observations = parse_observations(&text, path, source)?;
    info!("Loaded {} observations from {}", observations.len(), path.display());
    Ok(observations)
}

/// Parses delimited `text`; `origin` only labels error messages.
///
/// Fields may be double-quoted, so a quoted value can contain the delimiter.
pub fn parse_observations(text: &str, origin: &Path, source: &DataSource) -> Result<Vec<Observation>> {
    let delimiter = u8::try_from(source.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            HeatmapError::InvalidConfig(format!("delimiter {:?} is not a single ASCII character", source.delimiter))
        })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if header.iter().all(String::is_empty) {
        return Ok(Vec::new());
    }

    let column = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| HeatmapError::MissingColumn {
                column: name.to_string(),
                path: origin.to_path_buf(),
            })
    };
    let lat_idx = column(&source.latitude_column)?;
    let lon_idx = column(&source.longitude_column)?;

    let malformed = |line: usize, reason: String| HeatmapError::MalformedRow {
        path: origin.to_path_buf(),
        line,
        reason,
    };

    let mut observations = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line_no = record.position().map_or(0, |pos| pos.line() as usize);
        if record.len() != header.len() {
            return Err(malformed(
                line_no,
                format!("expected {} fields, found {}", header.len(), record.len()),
            ));
        }

        let coordinate = |i: usize, name: &str| -> Result<f64> {
            let raw = &record[i];
            match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(malformed(line_no, format!("{} is not a number: {:?}", name, raw))),
            }
        };
        let latitude = coordinate(lat_idx, &source.latitude_column)?;
        let longitude = coordinate(lon_idx, &source.longitude_column)?;
        check_coordinates(latitude, longitude).map_err(|e| malformed(line_no, e.to_string()))?;

        let extra: BTreeMap<String, String> = header
            .iter()
            .zip(record.iter())
            .enumerate()
            .filter(|(i, _)| *i != lat_idx && *i != lon_idx)
            .map(|(_, (key, value))| (key.clone(), value.to_string()))
            .collect();

        observations.push(Observation {
            latitude,
            longitude,
            extra,
        });
    }

    debug!("Parsed {} rows with {} columns", observations.len(), header.len());
    Ok(observations)
}

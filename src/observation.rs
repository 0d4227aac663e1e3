use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::grid::Vertex;

/// A single geo-tagged record. Extra columns from the source row ride along
/// untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Observation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.extra.insert(key.to_string(), value.to_string());
        self
    }
}

/// Mean latitude and mean longitude of the set, used as the initial view center.
pub fn centroid(observations: &[Observation]) -> Option<Vertex> {
    if observations.is_empty() {
        return None;
    }

    let count = observations.len() as f64;
    let (lat_sum, lon_sum) = observations
        .iter()
        .fold((0.0, 0.0), |(lat, lon), obs| (lat + obs.latitude, lon + obs.longitude));

    Some(Vertex::new(lat_sum / count, lon_sum / count))
}

/// Generates `count` observations scattered around `clusters` random centers.
///
/// Cluster sizes are skewed (earlier clusters draw more points) so the
/// resulting counts spread across the palette. Output is fully determined by `seed`.
pub fn synthetic_observations(count: usize, seed: u64, clusters: usize) -> Vec<Observation> {
    let mut rng = StdRng::seed_from_u64(seed);
    let clusters = clusters.max(1);

    let centers: Vec<(f64, f64, f64)> = (0..clusters)
        .map(|_| {
            let lat = rng.random_range(-60.0..60.0);
            let lon = rng.random_range(-170.0..170.0);
            let spread = rng.random_range(0.2..3.0);
            (lat, lon, spread)
        })
        .collect();

    (0..count)
        .map(|_| {
            // squaring the uniform draw biases toward the first centers
            let pick: f64 = rng.random_range(0.0..1.0);
            let idx = ((pick * pick) * clusters as f64) as usize;
            let (lat, lon, spread) = centers[idx.min(clusters - 1)];

            let latitude = (lat + rng.random_range(-spread..spread)).clamp(-89.9, 89.9);
            let longitude = (lon + rng.random_range(-spread..spread)).clamp(-179.9, 179.9);
            Observation::new(latitude, longitude)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use more_asserts::assert_le;

    #[test]
    fn centroid_is_mean_of_coordinates() {
        let observations = vec![
            Observation::new(10.0, 20.0),
            Observation::new(20.0, 40.0),
            Observation::new(30.0, -30.0),
        ];
        let center = centroid(&observations).unwrap();
        assert_abs_diff_eq!(center.latitude, 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(center.longitude, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn centroid_of_nothing_is_none() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn synthetic_points_are_seeded_and_on_the_globe() {
        let first = synthetic_observations(500, 7, 4);
        let second = synthetic_observations(500, 7, 4);
        assert_eq!(first, second);
        assert_eq!(first.len(), 500);

        for obs in &first {
            assert_le!(obs.latitude.abs(), 90.0);
            assert_le!(obs.longitude.abs(), 180.0);
        }

        assert_ne!(first, synthetic_observations(500, 8, 4));
    }

    #[test]
    fn extra_fields_are_carried() {
        let obs = Observation::new(1.0, 2.0).with_field("species", "Larus argentatus");
        assert_eq!(obs.extra.get("species").map(String::as_str), Some("Larus argentatus"));
    }
}

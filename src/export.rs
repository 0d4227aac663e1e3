use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde_json::{Value, json};

use crate::error::Result;
use crate::render::RenderModel;

/// GeoJSON `FeatureCollection` of the colored cells, one polygon feature each
pub fn to_geojson<C: Display>(model: &RenderModel<C>) -> Value {
    let features: Vec<Value> = model
        .cells
        .iter()
        .map(|cell| {
            let ring: Vec<[f64; 2]> = cell.boundary.iter().map(|v| v.lon_lat()).collect();
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [ring],
                },
                "properties": {
                    "cell": cell.cell_id.to_string(),
                    "count": cell.count,
                    "bucket": cell.bucket,
                    "fill": cell.fill,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
        "properties": {
            "resolution": model.resolution,
            "view": model.view,
        },
    })
}

/// Legend list for the UI, lowest range first
pub fn legend_json<C>(model: &RenderModel<C>) -> Value {
    json!({
        "resolution": model.resolution,
        "entries": model.legend,
    })
}

/// Writes `hexbin_r{res}.geojson` and `legend_r{res}.json` into `dir`,
/// returning both paths.
pub fn write_render_model<C: Display, P: AsRef<Path>>(dir: P, model: &RenderModel<C>) -> Result<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let geojson_path = dir.join(format!("hexbin_r{}.geojson", model.resolution));
    fs::write(&geojson_path, serde_json::to_string_pretty(&to_geojson(model))?)?;

    let legend_path = dir.join(format!("legend_r{}.json", model.resolution));
    fs::write(&legend_path, serde_json::to_string_pretty(&legend_json(model))?)?;

    info!(
        "Wrote {} cells to {} and legend to {}",
        model.cells.len(),
        geojson_path.display(),
        legend_path.display()
    );
    Ok((geojson_path, legend_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeatmapConfig;
    use crate::grid::RectGrid;
    use crate::observation::Observation;
    use crate::render::{ViewportEvent, build_render_model};

    fn model() -> RenderModel<crate::grid::RectCell> {
        let observations = vec![
            Observation::new(10.0, 10.0),
            Observation::new(10.0, 10.0),
            Observation::new(-30.0, 120.0),
        ];
        let config = HeatmapConfig {
            access_token: Some("pk.abc".to_string()),
            ..HeatmapConfig::default()
        };
        build_render_model(&RectGrid, &observations, ViewportEvent::at_zoom(2.0), &config).unwrap()
    }

    #[test]
    fn geojson_features_use_lon_lat_rings() {
        let geojson = to_geojson(&model());

        assert_eq!(geojson["type"], "FeatureCollection");
        let features = geojson["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);

        let first = &features[0];
        assert_eq!(first["properties"]["count"], 2);
        assert_eq!(first["properties"]["cell"], "r3:2:4");
        assert_eq!(first["properties"]["bucket"], 8);

        let ring = first["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], json!([0.0, 0.0]));
        assert_eq!(ring[2], json!([45.0, 45.0]));

        assert_eq!(geojson["properties"]["view"]["access_token"], "pk.abc");
        assert_eq!(geojson["properties"]["resolution"], 3);
    }

    #[test]
    fn legend_json_lists_every_range() {
        let legend = legend_json(&model());
        let entries = legend["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 9);
        assert_eq!(entries[0]["bucket_index"], 0);
        assert_eq!(entries[0]["lower_bound"], 1);
        assert_eq!(entries[8]["upper_bound"], 2);
        assert_eq!(entries[8]["label"], "2 - 2");
        assert_eq!(entries[0]["color"], "rgba(255,245,240,0.5)");
    }

    #[test]
    fn writes_both_files() {
        let dir = std::env::temp_dir().join(format!("hexbin-export-{}", std::process::id()));
        let (geojson_path, legend_path) = write_render_model(&dir, &model()).unwrap();

        assert!(geojson_path.ends_with("hexbin_r3.geojson"));
        assert!(legend_path.ends_with("legend_r3.json"));

        let text = fs::read_to_string(&geojson_path).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["features"].as_array().unwrap().len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }
}

// Resolution band used for density binning. Zoom 0..=15 maps into this range.
pub const MIN_RESOLUTION: u8 = 3;
pub const MAX_RESOLUTION: u8 = 10;

/// Highest resolution the H3 tessellation defines
pub const H3_MAX_RESOLUTION: u8 = 15;

/// Zoom used when a viewport event does not carry one
pub const DEFAULT_ZOOM: f64 = 5.0;

/// Fill opacity applied to palette colors on the map and in the legend
pub const DEFAULT_OPACITY: f64 = 0.5;

// Observation data file defaults (tab separated, Darwin Core column names)
pub const DEFAULT_DELIMITER: char = '\t';
pub const DEFAULT_LATITUDE_COLUMN: &str = "decimalLatitude";
pub const DEFAULT_LONGITUDE_COLUMN: &str = "decimalLongitude";

/// Environment variable consulted when no access token is configured
pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_TOKEN";

pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

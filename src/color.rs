use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{HeatmapError, Result};

// Sequential red scale, lightest first
const DEFAULT_PALETTE_LITERALS: [&str; 9] = [
    "rgb(255,245,240)",
    "rgb(254,224,210)",
    "rgb(252,187,161)",
    "rgb(252,146,114)",
    "rgb(251,106,74)",
    "rgb(239,59,44)",
    "rgb(203,24,29)",
    "rgb(165,15,21)",
    "rgb(103,0,13)",
];

pub static DEFAULT_PALETTE: Lazy<Vec<Rgb>> = Lazy::new(|| {
    DEFAULT_PALETTE_LITERALS
        .iter()
        .filter_map(|literal| Rgb::parse(literal).ok())
        .collect()
});

/// An opaque 8-bit color, written as `rgb(r,g,b)` in configs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `rgb(r, g, b)`; whitespace around the channels is ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || HeatmapError::InvalidColor(text.to_string());

        let inner = text
            .trim()
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;

        let channels: Vec<u8> = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>().map_err(|_| invalid()))
            .collect::<Result<_>>()?;

        match channels.as_slice() {
            [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
            _ => Err(invalid()),
        }
    }

    /// CSS `rgba(...)` with the given opacity
    pub fn to_rgba(&self, opacity: f64) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, opacity)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Rgb::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_spaces() {
        assert_eq!(Rgb::parse("rgb(255,245,240)").unwrap(), Rgb::new(255, 245, 240));
        assert_eq!(Rgb::parse(" rgb( 1 , 2 ,3 ) ").unwrap(), Rgb::new(1, 2, 3));
    }

    #[test]
    fn rejects_malformed_literals() {
        for text in ["rgb(1,2)", "rgb(1,2,3,4)", "rgb(256,0,0)", "rgba(1,2,3)", "#ff0000", "rgb(a,b,c)"] {
            assert!(matches!(Rgb::parse(text), Err(HeatmapError::InvalidColor(_))), "{text}");
        }
    }

    #[test]
    fn rgba_with_opacity() {
        assert_eq!(Rgb::new(239, 59, 44).to_rgba(0.5), "rgba(239,59,44,0.5)");
        assert_eq!(Rgb::new(0, 0, 0).to_rgba(1.0), "rgba(0,0,0,1)");
    }

    #[test]
    fn default_palette_is_nine_reds_light_to_dark() {
        assert_eq!(DEFAULT_PALETTE.len(), 9);
        assert_eq!(DEFAULT_PALETTE[0], Rgb::new(255, 245, 240));
        assert_eq!(DEFAULT_PALETTE[8], Rgb::new(103, 0, 13));
    }

    #[test]
    fn serde_round_trips_as_css_text() {
        let json = serde_json::to_string(&Rgb::new(203, 24, 29)).unwrap();
        assert_eq!(json, "\"rgb(203,24,29)\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(203, 24, 29));
    }
}

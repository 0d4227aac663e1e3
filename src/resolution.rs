use h3o::Resolution;
use log::warn;

use crate::constants::{H3_MAX_RESOLUTION, MAX_RESOLUTION, MIN_RESOLUTION};
use crate::error::{HeatmapError, Result};

/// Maps a continuous map zoom onto a grid resolution inside `[min, max]`.
///
/// `resolution = clamp(floor(zoom / 2) + 2, min, max)`. Every zoom value is
/// accepted: out-of-range values clamp, `+inf` gives `max`, `-inf` and NaN give `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionSelector {
    min: Resolution,
    max: Resolution,
}

impl Default for ResolutionSelector {
    fn default() -> Self {
        Self {
            min: Resolution::Three,
            max: Resolution::Ten,
        }
    }
}

impl ResolutionSelector {
    pub fn new(min: u8, max: u8) -> Result<Self> {
        if min > max {
            return Err(HeatmapError::InvalidConfig(format!(
                "min resolution {} exceeds max resolution {}",
                min, max
            )));
        }
        let to_resolution = |value: u8| {
            Resolution::try_from(value).map_err(|_| {
                HeatmapError::InvalidConfig(format!(
                    "resolution {} outside 0..={}",
                    value, H3_MAX_RESOLUTION
                ))
            })
        };
        Ok(Self {
            min: to_resolution(min)?,
            max: to_resolution(max)?,
        })
    }

    pub fn min(&self) -> Resolution {
        self.min
    }

    pub fn max(&self) -> Resolution {
        self.max
    }

    pub fn select(&self, zoom: f64) -> Resolution {
        if zoom.is_nan() {
            warn!("Non-finite zoom {}, using resolution {}", zoom, u8::from(self.min));
            return self.min;
        }

        let min = u8::from(self.min);
        let max = u8::from(self.max);
        let raw = (zoom / 2.0).floor() + 2.0;

        if raw <= f64::from(min) {
            self.min
        } else if raw >= f64::from(max) {
            self.max
        } else {
            // strictly between two valid resolutions, so the cast is exact
            Resolution::try_from(raw as u8).unwrap_or(self.max)
        }
    }
}

/// Resolution for `zoom` with the default `[3, 10]` band.
pub fn zoom_to_resolution(zoom: f64) -> Resolution {
    ResolutionSelector {
        min: Resolution::try_from(MIN_RESOLUTION).unwrap_or(Resolution::Three),
        max: Resolution::try_from(MAX_RESOLUTION).unwrap_or(Resolution::Ten),
    }
    .select(zoom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use more_asserts::{assert_ge, assert_le};

    #[test]
    fn zoom_five_selects_resolution_four() {
        assert_eq!(zoom_to_resolution(5.0), Resolution::Four);
    }

    #[test]
    fn band_edges() {
        assert_eq!(zoom_to_resolution(0.0), Resolution::Three);
        assert_eq!(zoom_to_resolution(2.0), Resolution::Three);
        assert_eq!(zoom_to_resolution(3.99), Resolution::Three);
        assert_eq!(zoom_to_resolution(4.0), Resolution::Four);
        assert_eq!(zoom_to_resolution(14.0), Resolution::Nine);
        assert_eq!(zoom_to_resolution(16.0), Resolution::Ten);
        assert_eq!(zoom_to_resolution(22.0), Resolution::Ten);
    }

    #[test]
    fn extreme_and_non_finite_zoom_clamps() {
        assert_eq!(zoom_to_resolution(-100.0), Resolution::Three);
        assert_eq!(zoom_to_resolution(1000.0), Resolution::Ten);
        assert_eq!(zoom_to_resolution(f64::INFINITY), Resolution::Ten);
        assert_eq!(zoom_to_resolution(f64::NEG_INFINITY), Resolution::Three);
        assert_eq!(zoom_to_resolution(f64::NAN), Resolution::Three);
    }

    #[test]
    fn negative_zoom_floors_toward_negative_infinity() {
        // floor(-1 / 2) + 2 = 1, which then clamps
        let wide = ResolutionSelector::new(0, 15).unwrap();
        assert_eq!(wide.select(-1.0), Resolution::One);
        assert_eq!(wide.select(-0.5), Resolution::One);
        assert_eq!(wide.select(-4.0), Resolution::Zero);
        assert_eq!(wide.select(1.0), Resolution::Two);
    }

    #[test]
    fn selection_is_bounded_and_monotone() {
        let selector = ResolutionSelector::default();
        let mut previous = selector.select(-50.0);
        let mut zoom = -50.0;
        while zoom <= 50.0 {
            let res = selector.select(zoom);
            assert_ge!(u8::from(res), MIN_RESOLUTION);
            assert_le!(u8::from(res), MAX_RESOLUTION);
            assert_ge!(u8::from(res), u8::from(previous));
            previous = res;
            zoom += 0.25;
        }
    }

    #[test]
    fn rejects_inverted_or_unknown_bands() {
        assert!(ResolutionSelector::new(8, 4).is_err());
        assert!(ResolutionSelector::new(3, 16).is_err());
        assert!(ResolutionSelector::new(5, 5).is_ok());
    }
}

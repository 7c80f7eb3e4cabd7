use std::path::Path;

use scene::{Color, LabelStyle};
use serde::{Deserialize, Serialize};

use crate::error::MeasureError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub point: Color,
    pub pending_point: Color,
    pub line: Color,
    pub pending_line: Color,
    pub polygon_fill: Color,
    pub highlight: Color,
    pub guide: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            point: [1.0, 0.27, 0.0, 1.0],
            pending_point: [1.0, 1.0, 0.0, 1.0],
            line: [0.6, 0.8, 0.2, 1.0],
            pending_line: [1.0, 1.0, 0.0, 0.8],
            polygon_fill: [0.27, 0.51, 0.71, 0.45],
            highlight: [0.0, 1.0, 1.0, 1.0],
            guide: [0.86, 0.86, 0.86, 0.8],
        }
    }
}

/// Toolbox configuration. Every field has a default, so a config file only
/// needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    /// Screen radius within which a primitive counts as under the cursor.
    pub pick_tolerance_px: f64,
    pub point_size_px: f32,
    pub line_width_px: f32,
    pub units: UnitSystem,
    /// Fraction digits in label values.
    pub decimals: usize,
    pub palette: Palette,
    pub label: LabelStyle,
    /// Curve apex height above the chord midpoint, as a fraction of the chord.
    pub curve_lift_ratio: f64,
    pub curve_samples_per_span: usize,
    /// Terrain samples per clamped segment.
    pub clamped_samples_per_segment: usize,
    /// Terrain samples across a whole profile.
    pub profile_samples: usize,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            pick_tolerance_px: 8.0,
            point_size_px: 10.0,
            line_width_px: 3.0,
            units: UnitSystem::Metric,
            decimals: 2,
            palette: Palette::default(),
            label: LabelStyle::default(),
            curve_lift_ratio: 0.25,
            curve_samples_per_span: 16,
            clamped_samples_per_segment: 24,
            profile_samples: 100,
        }
    }
}

impl MeasureConfig {
    pub fn from_json_str(json: &str) -> Result<Self, MeasureError> {
        let config: MeasureConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MeasureError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), MeasureError> {
        if !(self.pick_tolerance_px.is_finite() && self.pick_tolerance_px >= 0.0) {
            return Err(MeasureError::Config(
                "pick_tolerance_px must be a non-negative number".into(),
            ));
        }
        if !(self.curve_lift_ratio.is_finite() && self.curve_lift_ratio >= 0.0) {
            return Err(MeasureError::Config(
                "curve_lift_ratio must be a non-negative number".into(),
            ));
        }
        if self.curve_samples_per_span == 0 {
            return Err(MeasureError::Config("curve_samples_per_span must be > 0".into()));
        }
        if self.clamped_samples_per_segment == 0 {
            return Err(MeasureError::Config(
                "clamped_samples_per_segment must be > 0".into(),
            ));
        }
        if self.profile_samples < 2 {
            return Err(MeasureError::Config("profile_samples must be >= 2".into()));
        }
        Ok(())
    }
}

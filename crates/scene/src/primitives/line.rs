use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

use super::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePrimitive {
    pub positions: Vec<Vec3>,
    pub width_px: f32,
    pub color: Color,
    /// Vertices have already been sampled onto terrain; the engine should
    /// drape rather than draw a straight chord.
    pub clamp_to_ground: bool,
    pub dashed: bool,
}

impl LinePrimitive {
    pub fn new(positions: Vec<Vec3>, width_px: f32, color: Color) -> Self {
        Self {
            positions,
            width_px,
            color,
            clamp_to_ground: false,
            dashed: false,
        }
    }

    pub fn clamped(mut self, clamp: bool) -> Self {
        self.clamp_to_ground = clamp;
        self
    }

    pub fn dashed(mut self, dashed: bool) -> Self {
        self.dashed = dashed;
        self
    }
}

use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

use super::Color;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPrimitive {
    pub position: Vec3,
    pub pixel_size: f32,
    pub color: Color,
    pub outline_color: Color,
    pub outline_width_px: f32,
}

impl PointPrimitive {
    pub fn new(position: Vec3, pixel_size: f32, color: Color) -> Self {
        Self {
            position,
            pixel_size,
            color,
            outline_color: [1.0, 1.0, 1.0, 1.0],
            outline_width_px: 1.0,
        }
    }
}

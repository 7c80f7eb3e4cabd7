use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

use super::Color;

/// Filled outer ring. The ring is stored open (no closing duplicate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonPrimitive {
    pub positions: Vec<Vec3>,
    pub color: Color,
}

impl PolygonPrimitive {
    pub fn new(positions: Vec<Vec3>, color: Color) -> Self {
        Self { positions, color }
    }
}

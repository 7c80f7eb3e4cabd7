use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

use super::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub font_size_px: f32,
    pub color: Color,
    pub background: Option<Color>,
    /// Screen-space offset from the anchor, +y down.
    pub pixel_offset: [f32; 2],
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size_px: 14.0,
            color: [1.0, 1.0, 1.0, 1.0],
            background: Some([0.0, 0.0, 0.0, 0.6]),
            pixel_offset: [0.0, -16.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPrimitive {
    pub position: Vec3,
    pub text: String,
    pub style: LabelStyle,
}

impl LabelPrimitive {
    pub fn new(position: Vec3, text: impl Into<String>, style: LabelStyle) -> Self {
        Self {
            position,
            text: text.into(),
            style,
        }
    }

    /// Rough on-screen size `[w, h]` in pixels, multi-line aware.
    pub fn estimate_size_px(&self) -> [f32; 2] {
        let lines = self.text.lines().count().max(1) as f32;
        let widest = self
            .text
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .max(1) as f32;
        [
            self.style.font_size_px * 0.6 * widest,
            self.style.font_size_px * 1.2 * lines,
        ]
    }
}

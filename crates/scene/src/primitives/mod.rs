pub mod label;
pub mod line;
pub mod point;
pub mod polygon;
pub mod tag;
pub mod visibility;

pub use label::*;
pub use line::*;
pub use point::*;
pub use polygon::*;
pub use tag::*;
pub use visibility::*;

use serde::{Deserialize, Serialize};

/// RGBA, linear 0..1.
pub type Color = [f32; 4];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Point,
    Label,
    Line,
    Polygon,
}

impl PrimitiveKind {
    /// Draw order rank used by picking: lower ranks sit on top.
    pub fn pick_rank(self) -> u8 {
        match self {
            PrimitiveKind::Point => 0,
            PrimitiveKind::Label => 1,
            PrimitiveKind::Line => 2,
            PrimitiveKind::Polygon => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Point(PointPrimitive),
    Line(LinePrimitive),
    Polygon(PolygonPrimitive),
    Label(LabelPrimitive),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Point(_) => PrimitiveKind::Point,
            Primitive::Line(_) => PrimitiveKind::Line,
            Primitive::Polygon(_) => PrimitiveKind::Polygon,
            Primitive::Label(_) => PrimitiveKind::Label,
        }
    }

    pub fn as_label(&self) -> Option<&LabelPrimitive> {
        match self {
            Primitive::Label(label) => Some(label),
            _ => None,
        }
    }
}

impl From<PointPrimitive> for Primitive {
    fn from(p: PointPrimitive) -> Self {
        Primitive::Point(p)
    }
}

impl From<LinePrimitive> for Primitive {
    fn from(p: LinePrimitive) -> Self {
        Primitive::Line(p)
    }
}

impl From<PolygonPrimitive> for Primitive {
    fn from(p: PolygonPrimitive) -> Self {
        Primitive::Polygon(p)
    }
}

impl From<LabelPrimitive> for Primitive {
    fn from(p: LabelPrimitive) -> Self {
        Primitive::Label(p)
    }
}

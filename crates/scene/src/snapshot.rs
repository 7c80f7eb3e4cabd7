use serde::Serialize;

use crate::World;
use crate::entity::EntityId;
use crate::primitives::{LabelPrimitive, LinePrimitive, PointPrimitive, PolygonPrimitive, Primitive};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotItem<T> {
    pub entity: EntityId,
    #[serde(flatten)]
    pub primitive: T,
}

/// Visible primitives grouped by collection, ready to hand to the renderer.
///
/// Ordering contract: every list is in ascending entity index order.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    pub points: Vec<SnapshotItem<PointPrimitive>>,
    pub lines: Vec<SnapshotItem<LinePrimitive>>,
    pub polygons: Vec<SnapshotItem<PolygonPrimitive>>,
    pub labels: Vec<SnapshotItem<LabelPrimitive>>,
}

impl SceneSnapshot {
    pub fn from_world(world: &World) -> Self {
        let mut out = Self::default();
        for (entity, primitive) in world.visible_primitives() {
            match primitive {
                Primitive::Point(p) => out.points.push(SnapshotItem {
                    entity,
                    primitive: *p,
                }),
                Primitive::Line(l) => out.lines.push(SnapshotItem {
                    entity,
                    primitive: l.clone(),
                }),
                Primitive::Polygon(p) => out.polygons.push(SnapshotItem {
                    entity,
                    primitive: p.clone(),
                }),
                Primitive::Label(l) => out.labels.push(SnapshotItem {
                    entity,
                    primitive: l.clone(),
                }),
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.points.len() + self.lines.len() + self.polygons.len() + self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

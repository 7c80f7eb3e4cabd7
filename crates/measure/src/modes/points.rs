use foundation::math::Vec2;
use scene::{AnnotationKind, PrimitiveRole};

use super::{MeasureMode, ModeContext, ModeCore, Tool};

/// Point bookmarks: one coordinate plus a lat/lon/height label.
#[derive(Debug, Default)]
pub struct PointsMode {
    core: ModeCore,
}

impl MeasureMode for PointsMode {
    fn tool(&self) -> Tool {
        Tool::Point
    }

    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn on_left_click(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) {
        if let Some((_, tag)) = ctx.pick(screen) {
            if tag.kind == AnnotationKind::Point {
                // Clicking the point itself removes the bookmark; clicks on
                // its label are left for double-click editing.
                if tag.role == PrimitiveRole::Vertex {
                    ctx.remove(tag.group);
                }
                return;
            }
        }
        let Some(position) = ctx.pick_position(screen) else {
            return;
        };
        let group = ctx.start(AnnotationKind::Point);
        if let Some(annotation) = ctx.annotation_mut(group) {
            annotation.coordinates.push(position);
        }
        ctx.commit(group);
    }
}

use foundation::math::Vec2;
use scene::AnnotationKind;

use super::{MeasureMode, ModeContext, ModeCore, Tool};

/// Height of the picked surface above the bare terrain. The preview follows
/// the cursor before any click.
#[derive(Debug, Default)]
pub struct HeightMode {
    core: ModeCore,
}

impl MeasureMode for HeightMode {
    fn tool(&self) -> Tool {
        Tool::Height
    }

    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn on_left_click(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) {
        if self.over_own_label(ctx, screen) {
            return;
        }
        let Some(position) = ctx.pick_position(screen) else {
            return;
        };
        let group = match self.core.active.take() {
            Some(group) => group,
            None => ctx.start(AnnotationKind::Height),
        };
        if let Some(annotation) = ctx.annotation_mut(group) {
            annotation.coordinates = vec![position];
        }
        ctx.commit(group);
    }

    fn on_mouse_move(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) {
        if self.drag_to(ctx, screen) {
            return;
        }
        let cursor = ctx.pick_position(screen);
        let group = match (self.core.active, cursor) {
            (Some(group), _) => group,
            (None, Some(_)) => {
                let group = ctx.start(AnnotationKind::Height);
                self.core.active = Some(group);
                group
            }
            (None, None) => return,
        };
        if let Some(annotation) = ctx.annotation_mut(group) {
            annotation.cursor = cursor;
        }
        ctx.redraw(group);
    }

    fn on_left_down(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) {
        if self.begin_drag(ctx, screen) {
            // Drop the hover preview while a committed height is moved.
            self.cancel(ctx);
        }
    }
}

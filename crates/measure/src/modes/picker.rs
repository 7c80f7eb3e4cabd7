use foundation::math::Vec2;
use scene::AnnotationKind;
use tracing::debug;

use super::{MeasureMode, ModeContext, ModeCore, Tool};

/// Re-selects an existing annotation and hands it to its own tool.
#[derive(Debug, Default)]
pub struct PickerMode {
    core: ModeCore,
}

impl MeasureMode for PickerMode {
    fn tool(&self) -> Tool {
        Tool::Picker
    }

    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    /// Label edits and deletes work on every kind.
    fn owns(&self, _kind: AnnotationKind) -> bool {
        true
    }

    fn on_left_click(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) {
        let Some((_, tag)) = ctx.pick(screen) else {
            return;
        };
        let tool = Tool::for_kind(tag.kind);
        debug!(group = %tag.group, %tool, "picked annotation");
        ctx.state.request_switch(tool, tag.group);
    }

    fn on_mouse_move(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) {
        let hovered = ctx.pick(screen).map(|(entity, _)| entity);
        ctx.state.set_hovered(hovered);
    }

    fn on_left_down(&mut self, _ctx: &mut ModeContext<'_>, _screen: Vec2) {}

    fn on_left_up(&mut self, _ctx: &mut ModeContext<'_>, _screen: Vec2) {}
}

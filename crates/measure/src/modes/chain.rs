use foundation::math::Vec2;
use scene::{AnnotationKind, GroupId, PrimitiveRole};
use tracing::debug;

use super::{MeasureMode, ModeContext, ModeCore, Tool};

/// Open polylines with per-segment and total distances: plain, clamped to
/// ground, or clamped with a terrain profile.
#[derive(Debug)]
pub struct ChainMode {
    kind: AnnotationKind,
    core: ModeCore,
}

impl ChainMode {
    pub fn new(kind: AnnotationKind) -> Self {
        debug_assert_eq!(kind.fixed_vertex_count(), None);
        Self {
            kind,
            core: ModeCore::default(),
        }
    }

    /// Reopens a finished chain so that clicks extend it from `vertex`,
    /// which must be one of its endpoints.
    fn resume(&mut self, ctx: &mut ModeContext<'_>, group: GroupId, vertex: usize) -> bool {
        let Some(annotation) = ctx.annotation_mut(group) else {
            return false;
        };
        if !annotation.complete || annotation.kind != self.kind {
            return false;
        }
        let last = annotation.coordinates.len().saturating_sub(1);
        if vertex == 0 && last > 0 {
            annotation.reverse();
        } else if vertex != last {
            return false;
        }
        annotation.complete = false;
        annotation.cursor = None;
        self.core.active = Some(group);
        ctx.state.set_drawing(true);
        ctx.redraw(group);
        debug!(%group, "chain resumed");
        true
    }

    /// Commits the chain if it has a segment, otherwise drops it.
    fn finish(&mut self, ctx: &mut ModeContext<'_>) {
        let Some(group) = self.core.active.take() else {
            return;
        };
        let vertices = ctx
            .annotations
            .get(group)
            .map_or(0, |a| a.coordinates.len());
        if vertices >= 2 {
            ctx.commit(group);
        } else {
            ctx.remove(group);
        }
        ctx.state.set_drawing(false);
    }

    fn delete_vertex(&mut self, ctx: &mut ModeContext<'_>, group: GroupId, vertex: usize) {
        let Some(annotation) = ctx.annotation_mut(group) else {
            return;
        };
        annotation.remove_vertex(vertex);
        if annotation.coordinates.len() < 2 {
            ctx.remove(group);
        } else {
            ctx.publish(group);
        }
    }
}

impl MeasureMode for ChainMode {
    fn tool(&self) -> Tool {
        Tool::for_kind(self.kind)
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
        if self.core.active.is_none() {
            if let Some((_, tag)) = ctx.pick(screen) {
                if tag.kind == self.kind
                    && tag.is_committed_vertex()
                    && self.resume(ctx, tag.group, tag.index as usize)
                {
                    return;
                }
            }
        }
        let Some(position) = ctx.pick_position(screen) else {
            return;
        };
        let group = match self.core.active {
            Some(group) => group,
            None => {
                let group = ctx.start(self.kind);
                self.core.active = Some(group);
                ctx.state.set_drawing(true);
                group
            }
        };
        if let Some(annotation) = ctx.annotation_mut(group) {
            annotation.coordinates.push(position);
            annotation.cursor = None;
        }
        ctx.redraw(group);
    }

    fn on_mouse_move(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) {
        if self.drag_to(ctx, screen) {
            return;
        }
        if let Some(group) = self.core.active {
            let cursor = ctx.pick_position(screen);
            if let Some(annotation) = ctx.annotation_mut(group) {
                annotation.cursor = cursor;
            }
            ctx.redraw(group);
            return;
        }
        if self.kind.has_profile() {
            ctx.profile_hover(screen);
        }
    }

    fn on_right_click(&mut self, ctx: &mut ModeContext<'_>, _screen: Vec2) {
        self.finish(ctx);
    }

    fn on_middle_click(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) {
        if self.is_drawing(ctx) {
            return;
        }
        let Some((_, tag)) = ctx.pick(screen) else {
            return;
        };
        if tag.kind != self.kind {
            return;
        }
        if tag.role == PrimitiveRole::Vertex {
            self.delete_vertex(ctx, tag.group, tag.index as usize);
        } else {
            ctx.remove(tag.group);
        }
    }

    /// A chain with at least one segment is kept when the tool is left.
    fn cancel(&mut self, ctx: &mut ModeContext<'_>) {
        self.finish(ctx);
    }

    fn select(&mut self, ctx: &mut ModeContext<'_>, group: GroupId) {
        ctx.highlight(Some(group));
        let last = ctx
            .annotations
            .get(group)
            .map_or(0, |a| a.coordinates.len().saturating_sub(1));
        self.resume(ctx, group, last);
    }
}

use foundation::math::Vec2;
use scene::{AnnotationKind, GroupId, PrimitiveRole};

use super::{MeasureMode, ModeContext, ModeCore, Tool};

const MIN_VERTICES: usize = 3;

#[derive(Debug, Default)]
pub struct PolygonMode {
    core: ModeCore,
}

impl PolygonMode {
    fn delete_vertex(&mut self, ctx: &mut ModeContext<'_>, group: GroupId, vertex: usize) {
        let Some(annotation) = ctx.annotation_mut(group) else {
            return;
        };
        annotation.remove_vertex(vertex);
        if annotation.coordinates.len() < MIN_VERTICES {
            ctx.remove(group);
        } else {
            ctx.publish(group);
        }
    }
}

impl MeasureMode for PolygonMode {
    fn tool(&self) -> Tool {
        Tool::Polygon
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
        let group = match self.core.active {
            Some(group) => group,
            None => {
                let group = ctx.start(AnnotationKind::Polygon);
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
        let Some(group) = self.core.active else {
            return;
        };
        let cursor = ctx.pick_position(screen);
        if let Some(annotation) = ctx.annotation_mut(group) {
            annotation.cursor = cursor;
        }
        ctx.redraw(group);
    }

    /// Closes the ring, or drops it when it has fewer than three vertices.
    fn on_right_click(&mut self, ctx: &mut ModeContext<'_>, _screen: Vec2) {
        let Some(group) = self.core.active.take() else {
            return;
        };
        let vertices = ctx
            .annotations
            .get(group)
            .map_or(0, |a| a.coordinates.len());
        if vertices >= MIN_VERTICES {
            ctx.commit(group);
        } else {
            ctx.remove(group);
        }
        ctx.state.set_drawing(false);
    }

    fn on_middle_click(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) {
        if self.is_drawing(ctx) {
            return;
        }
        let Some((_, tag)) = ctx.pick(screen) else {
            return;
        };
        if tag.kind != AnnotationKind::Polygon {
            return;
        }
        if tag.role == PrimitiveRole::Vertex {
            self.delete_vertex(ctx, tag.group, tag.index as usize);
        } else {
            ctx.remove(tag.group);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PolygonMode;
    use crate::input::InputEvent;
    use crate::measurement::Measurement;
    use crate::modes::testing::Harness;
    use pretty_assertions::assert_eq;
    use scene::{Primitive, PrimitiveRole};

    fn square(h: &mut Harness, mode: &mut PolygonMode) {
        for (x, y) in [(100.0, 100.0), (300.0, 100.0), (300.0, 300.0), (100.0, 300.0)] {
            h.click(mode, x, y);
        }
        h.send(mode, InputEvent::right_click(100.0, 300.0));
    }

    #[test]
    fn fill_preview_while_drawing() {
        let mut h = Harness::new();
        let mut mode = PolygonMode::default();
        h.click(&mut mode, 100.0, 100.0);
        h.click(&mut mode, 300.0, 100.0);
        h.send(&mut mode, InputEvent::mouse_move(300.0, 300.0));

        let group = h.only_group();
        let fill = h
            .annotations
            .get(group)
            .expect("polygon")
            .entities
            .iter()
            .find(|e| h.world.tag(**e).is_some_and(|t| t.role == PrimitiveRole::Fill && t.pending))
            .and_then(|e| h.world.primitive(*e));
        assert!(matches!(fill, Some(Primitive::Polygon(p)) if p.positions.len() == 3));
    }

    #[test]
    fn square_area_and_perimeter() {
        let mut h = Harness::new();
        let mut mode = PolygonMode::default();
        square(&mut h, &mut mode);
        let group = h.only_group();

        let Some(Measurement::Polygon { area_m2, perimeter_m }) =
            h.log.get(group).map(|r| r.measurement.clone())
        else {
            panic!("expected polygon");
        };
        // 200 px is ~152 m east-west and ~222 m north-south here.
        let expected_area = 152.1 * 222.4;
        assert!((area_m2 - expected_area).abs() / expected_area < 0.01, "{area_m2}");
        let expected_perimeter = 2.0 * (152.1 + 222.4);
        let perimeter_error = (perimeter_m - expected_perimeter).abs() / expected_perimeter;
        assert!(perimeter_error < 0.01, "{perimeter_m}");
    }

    #[test]
    fn two_vertices_are_not_a_polygon() {
        let mut h = Harness::new();
        let mut mode = PolygonMode::default();
        h.click(&mut mode, 100.0, 100.0);
        h.click(&mut mode, 300.0, 100.0);
        h.send(&mut mode, InputEvent::right_click(300.0, 100.0));
        assert!(h.annotations.is_empty());
        assert!(h.world.is_empty());
    }

    #[test]
    fn deleting_down_to_two_vertices_removes_the_polygon() {
        let mut h = Harness::new();
        let mut mode = PolygonMode::default();
        square(&mut h, &mut mode);
        h.events.drain();

        h.send(&mut mode, InputEvent::middle_click(100.0, 300.0));
        assert_eq!(h.event_types(), vec!["updated"]);
        h.send(&mut mode, InputEvent::middle_click(300.0, 300.0));
        assert_eq!(h.event_types(), vec!["removed"]);
        assert!(h.annotations.is_empty());
    }
}

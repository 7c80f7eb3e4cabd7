use foundation::math::Vec2;
use scene::AnnotationKind;

use super::{MeasureMode, ModeContext, ModeCore, Tool};

/// Two-click measurements: straight distance, lifted-arc curve and terrain
/// profile.
#[derive(Debug)]
pub struct TwoPointMode {
    kind: AnnotationKind,
    core: ModeCore,
}

impl TwoPointMode {
    pub fn new(kind: AnnotationKind) -> Self {
        debug_assert_eq!(kind.fixed_vertex_count(), Some(2));
        Self {
            kind,
            core: ModeCore::default(),
        }
    }
}

impl MeasureMode for TwoPointMode {
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
        let Some(position) = ctx.pick_position(screen) else {
            return;
        };
        match self.core.active.take() {
            Some(group) => {
                if let Some(annotation) = ctx.annotation_mut(group) {
                    annotation.coordinates.push(position);
                }
                ctx.commit(group);
            }
            None => {
                let group = ctx.start(self.kind);
                if let Some(annotation) = ctx.annotation_mut(group) {
                    annotation.coordinates.push(position);
                }
                self.core.active = Some(group);
                ctx.state.set_drawing(true);
                ctx.redraw(group);
            }
        }
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
}

#[cfg(test)]
mod tests {
    use super::TwoPointMode;
    use crate::engine::{EllipsoidEngine, FlatTerrain};
    use crate::events::MeasureEvent;
    use crate::input::InputEvent;
    use crate::measurement::Measurement;
    use crate::modes::testing::Harness;
    use pretty_assertions::assert_eq;
    use scene::{AnnotationKind, PrimitiveRole};

    #[test]
    fn distance_previews_then_commits() {
        let mut h = Harness::new();
        let mut mode = TwoPointMode::new(AnnotationKind::Distance);
        h.click(&mut mode, 100.0, 100.0);
        h.send(&mut mode, InputEvent::mouse_move(200.0, 100.0));

        let group = h.only_group();
        let pending = h.annotations.get(group).expect("annotation");
        assert!(pending.is_pending());
        assert!(pending.cursor.is_some());
        assert!(pending.entities.iter().any(|e| {
            h.world.tag(*e).is_some_and(|t| t.role == PrimitiveRole::Segment && t.pending)
        }));
        assert!(h.log.is_empty());

        h.click(&mut mode, 400.0, 100.0);
        let done = h.annotations.get(group).expect("annotation");
        assert!(done.complete);
        assert_eq!(done.coordinates.len(), 2);
        assert_eq!(done.cursor, None);
        assert!(!h.state.is_drawing());

        let Some(Measurement::Distance { distance_m, vertical_m, .. }) =
            h.log.get(group).map(|r| r.measurement.clone())
        else {
            panic!("expected distance");
        };
        // 300 px of longitude at 1e-5 deg/px, 46.999 deg north.
        assert!((distance_m - 228.2).abs() < 0.5, "{distance_m}");
        assert!(vertical_m.abs() < 1e-6);
    }

    #[test]
    fn curve_is_longer_than_its_chord() {
        let mut h = Harness::new();
        let mut mode = TwoPointMode::new(AnnotationKind::Curve);
        h.click(&mut mode, 100.0, 100.0);
        h.click(&mut mode, 400.0, 100.0);
        let group = h.only_group();
        let Some(Measurement::Curve { length_m, chord_m }) =
            h.log.get(group).map(|r| r.measurement.clone())
        else {
            panic!("expected curve");
        };
        assert!(length_m > chord_m);
    }

    #[test]
    fn right_click_cancels_the_first_point() {
        let mut h = Harness::new();
        let mut mode = TwoPointMode::new(AnnotationKind::Distance);
        h.click(&mut mode, 100.0, 100.0);
        h.send(&mut mode, InputEvent::right_click(150.0, 100.0));
        assert!(h.annotations.is_empty());
        assert!(h.world.is_empty());
    }

    #[test]
    fn profile_emits_ready_and_hover() {
        let engine = EllipsoidEngine::default().with_terrain(FlatTerrain(250.0));
        let mut h = Harness::with_engine(engine);
        let mut mode = TwoPointMode::new(AnnotationKind::Profile);
        h.click(&mut mode, 100.0, 500.0);
        h.click(&mut mode, 900.0, 500.0);
        let group = h.only_group();

        let events = h.events.drain();
        let profile = events
            .iter()
            .find_map(|e| match &e.event {
                MeasureEvent::ProfileReady { profile, .. } => Some(profile.clone()),
                _ => None,
            })
            .expect("profile ready");
        assert_eq!(profile.samples.len(), h.config.profile_samples);
        assert!((profile.min_height_m - 250.0).abs() < 1e-9);
        assert!((profile.max_height_m - 250.0).abs() < 1e-9);

        // Hover over the middle of the committed line.
        h.send(&mut mode, InputEvent::mouse_move(500.0, 500.0));
        let hover = h.events.drain().into_iter().find_map(|e| match e.event {
            MeasureEvent::ProfileHover { group: g, sample_index } => Some((g, sample_index)),
            _ => None,
        });
        let (g, index) = hover.expect("hover");
        assert_eq!(g, group);
        let middle = (h.config.profile_samples - 1) as f64 / 2.0;
        assert!((index as f64 - middle).abs() <= 1.0, "{index}");
    }
}

//! Per-mode interaction state machines.
//!
//! Every mode implements [`MeasureMode`]. The trait's default handlers cover
//! the behaviour all modes share: vertex drag-edit, middle-click delete,
//! double-click label edit, right-click cancel and selection highlight.
//! A mode overrides only the handlers where it differs.

mod chain;
mod height;
mod picker;
mod points;
mod polygon;
mod two_point;

pub use chain::ChainMode;
pub use height::HeightMode;
pub use picker::PickerMode;
pub use points::PointsMode;
pub use polygon::PolygonMode;
pub use two_point::TwoPointMode;

use foundation::math::{Vec2, Vec3};
use scene::{AnnotationKind, AnnotationTag, EntityId, GroupId, World};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::annotation::{Annotation, AnnotationStore};
use crate::config::MeasureConfig;
use crate::engine::GlobeEngine;
use crate::events::{EventBus, MeasureEvent};
use crate::geometry;
use crate::input::InputEvent;
use crate::log::MeasurementLog;
use crate::measurement::measure;
use crate::render;
use crate::state::StateManager;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Point,
    Distance,
    Curve,
    Height,
    MultiDistance,
    MultiDistanceClamped,
    Polygon,
    Profile,
    ProfileDistances,
    Picker,
}

impl Tool {
    /// Toolbar order.
    pub const ALL: [Tool; 10] = [
        Tool::Picker,
        Tool::Point,
        Tool::Distance,
        Tool::Curve,
        Tool::Height,
        Tool::MultiDistance,
        Tool::MultiDistanceClamped,
        Tool::Polygon,
        Tool::Profile,
        Tool::ProfileDistances,
    ];

    pub fn for_kind(kind: AnnotationKind) -> Tool {
        match kind {
            AnnotationKind::Point => Tool::Point,
            AnnotationKind::Distance => Tool::Distance,
            AnnotationKind::Curve => Tool::Curve,
            AnnotationKind::Height => Tool::Height,
            AnnotationKind::MultiDistance => Tool::MultiDistance,
            AnnotationKind::MultiDistanceClamped => Tool::MultiDistanceClamped,
            AnnotationKind::Polygon => Tool::Polygon,
            AnnotationKind::Profile => Tool::Profile,
            AnnotationKind::ProfileDistances => Tool::ProfileDistances,
        }
    }

    /// Annotation kind the tool draws; `None` for the picker.
    pub fn kind(self) -> Option<AnnotationKind> {
        Some(match self {
            Tool::Point => AnnotationKind::Point,
            Tool::Distance => AnnotationKind::Distance,
            Tool::Curve => AnnotationKind::Curve,
            Tool::Height => AnnotationKind::Height,
            Tool::MultiDistance => AnnotationKind::MultiDistance,
            Tool::MultiDistanceClamped => AnnotationKind::MultiDistanceClamped,
            Tool::Polygon => AnnotationKind::Polygon,
            Tool::Profile => AnnotationKind::Profile,
            Tool::ProfileDistances => AnnotationKind::ProfileDistances,
            Tool::Picker => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.name(),
            None => "picker",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tool::Point => "Point",
            Tool::Distance => "Distance",
            Tool::Curve => "Curve",
            Tool::Height => "Height",
            Tool::MultiDistance => "Multi-distance",
            Tool::MultiDistanceClamped => "Ground distance",
            Tool::Polygon => "Area",
            Tool::Profile => "Profile",
            Tool::ProfileDistances => "Profile path",
            Tool::Picker => "Pick",
        }
    }

    pub fn tooltip(self) -> &'static str {
        match self {
            Tool::Point => "Click to bookmark a point, click a bookmark to remove it",
            Tool::Distance => "Click two points to measure the straight distance",
            Tool::Curve => "Click two points to measure along an arc",
            Tool::Height => "Click a point to measure its height above the terrain",
            Tool::MultiDistance => "Click to add segments, right-click to finish",
            Tool::MultiDistanceClamped => {
                "Click to add ground-following segments, right-click to finish"
            }
            Tool::Polygon => "Click to add vertices, right-click to close the area",
            Tool::Profile => "Click two points to sample the terrain profile",
            Tool::ProfileDistances => {
                "Click to add segments, right-click to finish the terrain profile"
            }
            Tool::Picker => "Click an annotation to edit it with its own tool",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Fresh controller for this tool.
    pub fn build_mode(self) -> Box<dyn MeasureMode> {
        match self.kind() {
            Some(AnnotationKind::Point) => Box::new(PointsMode::default()),
            Some(AnnotationKind::Height) => Box::new(HeightMode::default()),
            Some(
                kind @ (AnnotationKind::Distance | AnnotationKind::Curve | AnnotationKind::Profile),
            ) => Box::new(TwoPointMode::new(kind)),
            Some(
                kind @ (AnnotationKind::MultiDistance
                | AnnotationKind::MultiDistanceClamped
                | AnnotationKind::ProfileDistances),
            ) => Box::new(ChainMode::new(kind)),
            Some(AnnotationKind::Polygon) => Box::new(PolygonMode::default()),
            None => Box::new(PickerMode::default()),
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a mode may touch while handling one input event.
pub struct ModeContext<'a> {
    pub world: &'a mut World,
    pub annotations: &'a mut AnnotationStore,
    pub engine: &'a mut dyn GlobeEngine,
    pub config: &'a MeasureConfig,
    pub state: &'a mut StateManager,
    pub log: &'a mut MeasurementLog,
    pub events: &'a mut EventBus,
}

impl ModeContext<'_> {
    pub fn pick_position(&self, screen: Vec2) -> Option<Vec3> {
        self.engine.pick_position(screen)
    }

    /// Topmost primitive under the cursor together with its tag.
    ///
    /// Primitives of a drawing in progress are skipped, so the live preview
    /// never shadows the committed geometry beneath it.
    pub fn pick(&self, screen: Vec2) -> Option<(EntityId, AnnotationTag)> {
        self.engine
            .drill_pick(&*self.world, screen, self.config.pick_tolerance_px)
            .into_iter()
            .find_map(|hit| {
                let tag = self.world.tag(hit.entity)?;
                (!tag.pending).then_some((hit.entity, tag))
            })
    }

    pub fn annotation_mut(&mut self, group: GroupId) -> Option<&mut Annotation> {
        self.annotations.get_mut(group)
    }

    /// Starts a new, pending annotation.
    pub fn start(&mut self, kind: AnnotationKind) -> GroupId {
        let group = self.annotations.create(kind);
        debug!(%group, %kind, "annotation started");
        group
    }

    pub fn redraw(&mut self, group: GroupId) {
        if let Some(annotation) = self.annotations.get_mut(group) {
            render::redraw(self.world, annotation, &*self.engine, self.config);
        }
    }

    /// Marks the annotation complete and publishes its measurement.
    pub fn commit(&mut self, group: GroupId) {
        let Some(annotation) = self.annotations.get_mut(group) else {
            return;
        };
        annotation.complete = true;
        annotation.cursor = None;
        self.state.set_drawing(false);
        self.publish(group);
    }

    /// Rebuilds a committed annotation and refreshes its profile, log record
    /// and events.
    pub fn publish(&mut self, group: GroupId) {
        let engine: &dyn GlobeEngine = &*self.engine;
        let Some(annotation) = self.annotations.get_mut(group) else {
            return;
        };
        if annotation.kind.has_profile() {
            annotation.profile = if annotation.coordinates.len() >= 2 {
                Some(geometry::sample_profile(
                    engine,
                    &annotation.coordinates,
                    self.config.profile_samples,
                ))
            } else {
                None
            };
        }
        render::redraw(self.world, annotation, engine, self.config);

        let Some(measurement) = measure(annotation, engine, self.config) else {
            return;
        };
        let kind = annotation.kind;
        let profile = annotation.profile.clone();
        let summary = measurement.summary(self.config.units, self.config.decimals);
        let is_new = self
            .log
            .upsert(group, kind, measurement.clone(), summary.clone());
        if is_new {
            info!(%group, %kind, %summary, "measurement committed");
            self.events.emit(MeasureEvent::AnnotationCommitted {
                group,
                kind,
                measurement,
                summary,
            });
        } else {
            info!(%group, %kind, %summary, "measurement updated");
            self.events.emit(MeasureEvent::AnnotationUpdated {
                group,
                kind,
                measurement,
                summary,
            });
        }
        if let Some(profile) = profile {
            self.events.emit(MeasureEvent::ProfileReady { group, profile });
        }
    }

    /// Removes an annotation, its primitives and its log record.
    pub fn remove(&mut self, group: GroupId) -> Option<Annotation> {
        let removed = self.annotations.remove(self.world, group)?;
        if self.state.selected() == Some(group) {
            self.state.set_selected(None);
        }
        if self.log.remove(group).is_some() {
            info!(%group, kind = %removed.kind, "measurement removed");
            self.events.emit(MeasureEvent::AnnotationRemoved {
                group,
                kind: removed.kind,
            });
        } else {
            debug!(%group, "pending annotation discarded");
        }
        Some(removed)
    }

    /// Highlights `group` (or nothing) and records it as the selection.
    pub fn highlight(&mut self, group: Option<GroupId>) {
        for id in self.annotations.ids() {
            let want = Some(id) == group;
            let changed = match self.annotations.get_mut(id) {
                Some(a) if a.highlighted != want => {
                    a.highlighted = want;
                    true
                }
                _ => false,
            };
            if changed {
                self.redraw(id);
            }
        }
        self.state.set_selected(group);
    }

    pub fn request_label_edit(&mut self, entity: EntityId, group: GroupId) {
        let Some(text) = self
            .world
            .primitive(entity)
            .and_then(|p| p.as_label())
            .map(|l| l.text.clone())
        else {
            return;
        };
        self.events
            .emit(MeasureEvent::LabelEditRequested { entity, group, text });
    }

    /// Emits `ProfileHover` when the cursor is over a committed profile.
    pub fn profile_hover(&mut self, screen: Vec2) -> bool {
        let Some((entity, tag)) = self.pick(screen) else {
            self.state.set_hovered(None);
            return false;
        };
        self.state.set_hovered(Some(entity));
        if !tag.kind.has_profile() {
            return false;
        }
        let Some(position) = self.pick_position(screen) else {
            return false;
        };
        let Some(sample_index) = self
            .annotations
            .get(tag.group)
            .and_then(|a| a.profile.as_ref())
            .and_then(|p| p.nearest_to(position))
        else {
            return false;
        };
        self.events.emit(MeasureEvent::ProfileHover {
            group: tag.group,
            sample_index,
        });
        true
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DragTarget {
    pub group: GroupId,
    pub vertex: usize,
    pub moved: bool,
}

/// State every mode carries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModeCore {
    /// Annotation being drawn (or previewed).
    pub active: Option<GroupId>,
    pub drag: Option<DragTarget>,
    /// Swallow the click the host sends right after a drag.
    pub suppress_click: bool,
}

pub trait MeasureMode {
    fn tool(&self) -> Tool;
    fn core(&self) -> &ModeCore;
    fn core_mut(&mut self) -> &mut ModeCore;

    /// Annotation kinds this mode edits (drag, delete, relabel).
    fn owns(&self, kind: AnnotationKind) -> bool {
        self.tool().kind() == Some(kind)
    }

    fn on_left_click(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2);

    fn on_mouse_move(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) {
        self.drag_to(ctx, screen);
    }

    fn on_left_down(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) {
        self.begin_drag(ctx, screen);
    }

    fn on_left_up(&mut self, ctx: &mut ModeContext<'_>, _screen: Vec2) {
        self.end_drag(ctx);
    }

    fn on_right_click(&mut self, ctx: &mut ModeContext<'_>, _screen: Vec2) {
        self.cancel(ctx);
    }

    fn on_middle_click(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) {
        if self.is_drawing(ctx) {
            return;
        }
        let Some((_, tag)) = ctx.pick(screen) else {
            return;
        };
        if self.owns(tag.kind) {
            ctx.remove(tag.group);
        }
    }

    fn on_double_click(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) {
        let Some((entity, tag)) = ctx.pick(screen) else {
            return;
        };
        if tag.role.is_label() && self.owns(tag.kind) {
            ctx.request_label_edit(entity, tag.group);
        }
    }

    fn activate(&mut self, _ctx: &mut ModeContext<'_>) {}

    fn deactivate(&mut self, ctx: &mut ModeContext<'_>) {
        self.end_drag(ctx);
        self.cancel(ctx);
        ctx.highlight(None);
    }

    fn select(&mut self, ctx: &mut ModeContext<'_>, group: GroupId) {
        ctx.highlight(Some(group));
    }

    /// Drops the drawing in progress.
    fn cancel(&mut self, ctx: &mut ModeContext<'_>) {
        if let Some(group) = self.core_mut().active.take() {
            if ctx.annotations.get(group).is_some_and(|a| a.is_pending()) {
                ctx.remove(group);
            }
        }
        ctx.state.set_drawing(false);
    }

    /// A drawing with at least one placed vertex is in progress.
    fn is_drawing(&self, ctx: &ModeContext<'_>) -> bool {
        self.core()
            .active
            .and_then(|group| ctx.annotations.get(group))
            .is_some_and(|a| a.is_pending() && !a.coordinates.is_empty())
    }

    /// The cursor is over a committed label this mode owns. Clicks there
    /// belong to a double-click edit and never place a vertex.
    fn over_own_label(&self, ctx: &ModeContext<'_>, screen: Vec2) -> bool {
        ctx.pick(screen)
            .is_some_and(|(_, tag)| tag.role.is_label() && self.owns(tag.kind))
    }

    /// Starts dragging the committed vertex under the cursor.
    fn begin_drag(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) -> bool {
        if self.is_drawing(ctx) {
            return false;
        }
        let Some((_, tag)) = ctx.pick(screen) else {
            return false;
        };
        if !tag.is_committed_vertex() || !self.owns(tag.kind) {
            return false;
        }
        self.core_mut().drag = Some(DragTarget {
            group: tag.group,
            vertex: tag.index as usize,
            moved: false,
        });
        ctx.engine.set_camera_controls(false);
        ctx.state.set_dragging(true);
        debug!(group = %tag.group, vertex = tag.index, "drag started");
        true
    }

    /// Moves the dragged vertex to the surface under the cursor. Returns
    /// `true` while a drag is active.
    fn drag_to(&mut self, ctx: &mut ModeContext<'_>, screen: Vec2) -> bool {
        let Some(drag) = self.core().drag else {
            return false;
        };
        let Some(position) = ctx.pick_position(screen) else {
            return true;
        };
        if let Some(vertex) = ctx
            .annotations
            .get_mut(drag.group)
            .and_then(|a| a.coordinates.get_mut(drag.vertex))
        {
            *vertex = position;
        }
        if let Some(d) = self.core_mut().drag.as_mut() {
            d.moved = true;
        }
        ctx.redraw(drag.group);
        true
    }

    fn end_drag(&mut self, ctx: &mut ModeContext<'_>) -> bool {
        let Some(drag) = self.core_mut().drag.take() else {
            return false;
        };
        ctx.engine.set_camera_controls(true);
        ctx.state.set_dragging(false);
        if drag.moved {
            self.core_mut().suppress_click = true;
            ctx.publish(drag.group);
        }
        debug!(group = %drag.group, moved = drag.moved, "drag ended");
        true
    }
}

/// Routes one input event to the mode's handler.
pub fn dispatch(mode: &mut dyn MeasureMode, ctx: &mut ModeContext<'_>, event: InputEvent) {
    match event {
        InputEvent::LeftClick { position } => {
            if std::mem::take(&mut mode.core_mut().suppress_click) {
                trace!("click after drag suppressed");
                return;
            }
            mode.on_left_click(ctx, position);
        }
        InputEvent::LeftDown { position } => {
            mode.core_mut().suppress_click = false;
            mode.on_left_down(ctx, position);
        }
        InputEvent::LeftUp { position } => mode.on_left_up(ctx, position),
        InputEvent::MouseMove { position } => mode.on_mouse_move(ctx, position),
        InputEvent::RightClick { position } => mode.on_right_click(ctx, position),
        InputEvent::MiddleClick { position } => mode.on_middle_click(ctx, position),
        InputEvent::DoubleClick { position } => mode.on_double_click(ctx, position),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Harness;
    use super::{MeasureMode, Tool, TwoPointMode};
    use crate::engine::GlobeEngine;
    use crate::input::InputEvent;
    use foundation::math::Vec2;
    use pretty_assertions::assert_eq;
    use scene::AnnotationKind;

    #[test]
    fn tools_round_trip_through_kinds() {
        for kind in AnnotationKind::ALL {
            assert_eq!(Tool::for_kind(kind).kind(), Some(kind));
        }
        assert_eq!(Tool::Picker.kind(), None);
        assert_eq!(Tool::from_name("multi_distance_clamped"), Some(Tool::MultiDistanceClamped));
        assert_eq!(Tool::from_name("picker"), Some(Tool::Picker));
        assert_eq!(Tool::from_name("nope"), None);
    }

    #[test]
    fn built_modes_report_their_tool() {
        for tool in Tool::ALL {
            assert_eq!(tool.build_mode().tool(), tool);
        }
    }

    #[test]
    fn drag_locks_camera_and_suppresses_the_next_click() {
        let mut h = Harness::new();
        let mut mode = TwoPointMode::new(AnnotationKind::Distance);
        h.click(&mut mode, 100.0, 100.0);
        h.click(&mut mode, 300.0, 100.0);
        let group = h.only_group();
        h.events.drain();

        h.send(&mut mode, InputEvent::left_down(300.0, 100.0));
        assert!(!h.engine.camera_controls_enabled());
        assert!(h.state.is_dragging());

        h.send(&mut mode, InputEvent::mouse_move(300.0, 400.0));
        h.send(&mut mode, InputEvent::left_up(300.0, 400.0));
        assert!(h.engine.camera_controls_enabled());
        assert!(!h.state.is_dragging());

        // The click that follows the drag must not start a new measurement.
        h.click(&mut mode, 300.0, 400.0);
        assert_eq!(h.annotations.len(), 1);
        assert_eq!(h.event_types(), vec!["updated"]);

        let moved = h.annotations.get(group).expect("annotation").coordinates[1];
        let screen = h.engine.project(moved).expect("visible");
        assert!(screen.distance(Vec2::new(300.0, 400.0)) < 1e-3);
    }

    #[test]
    fn double_click_on_label_requests_edit() {
        let mut h = Harness::new();
        let mut mode = TwoPointMode::new(AnnotationKind::Distance);
        h.click(&mut mode, 100.0, 100.0);
        h.click(&mut mode, 300.0, 100.0);
        h.events.drain();

        // The total label sits at the chord midpoint, offset upwards.
        let label_offset = f64::from(h.config.label.pixel_offset[1]);
        h.send(&mut mode, InputEvent::double_click(200.0, 100.0 + label_offset));
        assert_eq!(h.event_types(), vec!["label_edit"]);
    }

    #[test]
    fn middle_click_removes_own_kind_only() {
        let mut h = Harness::new();
        let mut distance = TwoPointMode::new(AnnotationKind::Distance);
        let mut curve = TwoPointMode::new(AnnotationKind::Curve);
        h.click(&mut distance, 100.0, 500.0);
        h.click(&mut distance, 300.0, 500.0);
        h.events.drain();

        h.send(&mut curve, InputEvent::middle_click(100.0, 500.0));
        assert_eq!(h.annotations.len(), 1);

        h.send(&mut distance, InputEvent::middle_click(100.0, 500.0));
        assert!(h.annotations.is_empty());
        assert!(h.world.is_empty());
        assert_eq!(h.event_types(), vec!["removed"]);
    }

    #[test]
    fn deactivate_cancels_pending_drawing() {
        let mut h = Harness::new();
        let mut mode = TwoPointMode::new(AnnotationKind::Distance);
        h.click(&mut mode, 100.0, 100.0);
        assert!(h.state.is_drawing());
        {
            let mut ctx = h.ctx();
            mode.deactivate(&mut ctx);
        }
        assert!(h.annotations.is_empty());
        assert!(h.world.is_empty());
        assert!(!h.state.is_drawing());
        assert!(h.log.is_empty());
    }
}

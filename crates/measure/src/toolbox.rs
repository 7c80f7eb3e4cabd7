//! Top-level controller tying the modes, the toolbar and the engine together.

use std::collections::BTreeMap;

use scene::snapshot::SceneSnapshot;
use scene::{EntityId, GroupId, PrimitiveRole, World};
use tracing::{debug, info, warn};

use crate::annotation::AnnotationStore;
use crate::config::MeasureConfig;
use crate::engine::GlobeEngine;
use crate::error::MeasureError;
use crate::events::{EventBus, MeasureEvent, SequencedEvent};
use crate::input::InputEvent;
use crate::log::MeasurementLog;
use crate::measurement::Measurement;
use crate::modes::{MeasureMode, ModeContext, ModeCore, Tool, dispatch};
use crate::render;
use crate::state::StateManager;
use crate::toolbar::{ButtonId, Toolbar, ToolbarAction};

type Modes = BTreeMap<Tool, Box<dyn MeasureMode>>;

pub struct MeasureToolbox<E: GlobeEngine> {
    world: World,
    annotations: AnnotationStore,
    modes: Modes,
    state: StateManager,
    log: MeasurementLog,
    events: EventBus,
    toolbar: Toolbar,
    config: MeasureConfig,
    engine: E,
}

impl<E: GlobeEngine> MeasureToolbox<E> {
    pub fn new(engine: E, config: MeasureConfig) -> Self {
        let modes = Tool::ALL
            .into_iter()
            .map(|tool| (tool, tool.build_mode()))
            .collect();
        let mut toolbox = Self {
            world: World::new(),
            annotations: AnnotationStore::new(),
            modes,
            state: StateManager::new(),
            log: MeasurementLog::new(),
            events: EventBus::new(),
            toolbar: Toolbar::new(),
            config,
            engine,
        };
        toolbox.render();
        toolbox
    }

    pub fn config(&self) -> &MeasureConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn log(&self) -> &MeasurementLog {
        &self.log
    }

    pub fn active_tool(&self) -> Option<Tool> {
        self.state.active_tool()
    }

    pub fn measurement(&self, group: GroupId) -> Option<&Measurement> {
        self.log.get(group).map(|record| &record.measurement)
    }

    /// Entity of the summary label (total, area, height...) of `group`.
    pub fn summary_label(&self, group: GroupId) -> Option<EntityId> {
        let annotation = self.annotations.get(group)?;
        annotation.entities.iter().copied().find(|entity| {
            self.world
                .tag(*entity)
                .is_some_and(|tag| tag.role == PrimitiveRole::TotalLabel)
        })
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        self.world.snapshot()
    }

    /// Events recorded since the previous call.
    pub fn take_events(&mut self) -> Vec<SequencedEvent> {
        self.events.drain()
    }

    fn split(&mut self) -> (&mut Modes, ModeContext<'_>) {
        let Self {
            world,
            annotations,
            modes,
            state,
            log,
            events,
            config,
            engine,
            ..
        } = self;
        let ctx = ModeContext {
            world,
            annotations,
            engine,
            config,
            state,
            log,
            events,
        };
        (modes, ctx)
    }

    fn with_mode<R>(
        &mut self,
        tool: Tool,
        f: impl FnOnce(&mut dyn MeasureMode, &mut ModeContext<'_>) -> R,
    ) -> Option<R> {
        let (modes, mut ctx) = self.split();
        let mode = modes.get_mut(&tool)?;
        Some(f(mode.as_mut(), &mut ctx))
    }

    fn render(&mut self) {
        let snapshot = self.world.snapshot();
        self.engine.render(&snapshot);
    }

    /// Makes `tool` the single active tool, leaving the previous one first.
    pub fn activate(&mut self, tool: Tool) {
        if self.state.active_tool() == Some(tool) {
            return;
        }
        self.leave_active_tool();
        self.with_mode(tool, |mode, ctx| mode.activate(ctx));
        self.state.set_active_tool(Some(tool));
        self.toolbar.set_active_tool(Some(tool));
        self.events.emit(MeasureEvent::ToolActivated { tool });
        info!(%tool, "tool activated");
        self.render();
    }

    pub fn deactivate(&mut self) {
        if self.leave_active_tool() {
            self.render();
        }
    }

    fn leave_active_tool(&mut self) -> bool {
        let Some(tool) = self.state.active_tool() else {
            return false;
        };
        self.with_mode(tool, |mode, ctx| mode.deactivate(ctx));
        self.state.set_active_tool(None);
        self.toolbar.set_active_tool(None);
        self.events.emit(MeasureEvent::ToolDeactivated { tool });
        info!(%tool, "tool deactivated");
        true
    }

    pub fn press(&mut self, button: ButtonId) -> ToolbarAction {
        let action = self.toolbar.press(button);
        debug!(button = %button.key(), ?action, "toolbar pressed");
        match action {
            ToolbarAction::Activate(tool) => self.activate(tool),
            ToolbarAction::Deactivate(_) => self.deactivate(),
            ToolbarAction::Clear => self.clear(),
            ToolbarAction::SetExpanded(expanded) => self.state.set_toolbar_expanded(expanded),
            ToolbarAction::SetLogVisible(visible) => self.state.set_log_visible(visible),
            ToolbarAction::SetHelpVisible(visible) => self.state.set_help_visible(visible),
        }
        action
    }

    /// Routes one input event to the active mode. Events arriving with no
    /// active tool are ignored.
    pub fn handle_input(&mut self, event: InputEvent) {
        let Some(tool) = self.state.active_tool() else {
            return;
        };
        self.with_mode(tool, |mode, ctx| dispatch(mode, ctx, event));
        if let Some((target, group)) = self.state.take_switch() {
            debug!(%target, %group, "switching to owning tool");
            self.activate(target);
            self.with_mode(target, |mode, ctx| mode.select(ctx, group));
        }
        self.render();
    }

    /// Replaces the text of a measurement label. The override survives
    /// later redraws of the annotation.
    pub fn set_label_text(
        &mut self,
        entity: EntityId,
        text: impl Into<String>,
    ) -> Result<(), MeasureError> {
        let tag = self
            .world
            .tag(entity)
            .filter(|tag| tag.role.is_label())
            .ok_or(MeasureError::NotALabel(entity))?;
        let annotation = self
            .annotations
            .get_mut(tag.group)
            .ok_or(MeasureError::UnknownGroup(tag.group))?;
        let text = text.into();
        annotation
            .label_overrides
            .insert((tag.role, tag.index), text.clone());
        self.world.set_label_text(entity, text);
        debug!(group = %tag.group, "label text replaced");
        self.render();
        Ok(())
    }

    pub fn delete_annotation(&mut self, group: GroupId) -> Result<(), MeasureError> {
        if !self.annotations.contains(group) {
            return Err(MeasureError::UnknownGroup(group));
        }
        let (modes, mut ctx) = self.split();
        for mode in modes.values_mut() {
            let core = mode.core_mut();
            if core.active == Some(group) {
                core.active = None;
                ctx.state.set_drawing(false);
            }
            if core.drag.is_some_and(|drag| drag.group == group) {
                core.drag = None;
                ctx.engine.set_camera_controls(true);
                ctx.state.set_dragging(false);
            }
        }
        ctx.remove(group);
        self.render();
        Ok(())
    }

    /// Shows or hides an annotation. Hidden annotations stay in the log.
    pub fn set_annotation_visible(
        &mut self,
        group: GroupId,
        visible: bool,
    ) -> Result<(), MeasureError> {
        let annotation = self
            .annotations
            .get_mut(group)
            .ok_or(MeasureError::UnknownGroup(group))?;
        if annotation.hidden == !visible {
            return Ok(());
        }
        annotation.hidden = !visible;
        render::redraw(&mut self.world, annotation, &self.engine, &self.config);
        debug!(%group, visible, "annotation visibility changed");
        self.render();
        Ok(())
    }

    /// Switches to the tool owning `group` and highlights it.
    pub fn select(&mut self, group: GroupId) -> Result<(), MeasureError> {
        let kind = self
            .annotations
            .get(group)
            .map(|annotation| annotation.kind)
            .ok_or(MeasureError::UnknownGroup(group))?;
        let tool = Tool::for_kind(kind);
        self.activate(tool);
        self.with_mode(tool, |mode, ctx| mode.select(ctx, group));
        self.render();
        Ok(())
    }

    /// Removes every annotation. The active tool stays active.
    pub fn clear(&mut self) {
        let mut released_camera = false;
        for mode in self.modes.values_mut() {
            let core = mode.core_mut();
            released_camera |= core.drag.is_some();
            *core = ModeCore::default();
        }
        if released_camera {
            warn!("clear interrupted a drag");
            self.engine.set_camera_controls(true);
        }
        let removed = self.annotations.len();
        self.annotations.clear(&mut self.world);
        self.log.clear();
        self.state.reset_annotations();
        self.events.emit(MeasureEvent::Cleared);
        info!(removed, "measurements cleared");
        self.render();
    }
}

#[cfg(test)]
mod tests {
    use super::MeasureToolbox;
    use crate::config::MeasureConfig;
    use crate::engine::{EllipsoidEngine, GlobeEngine};
    use crate::error::MeasureError;
    use crate::events::MeasureEvent;
    use crate::input::InputEvent;
    use crate::measurement::Measurement;
    use crate::modes::Tool;
    use crate::toolbar::{ButtonId, ToolbarAction};
    use foundation::math::Vec2;
    use pretty_assertions::assert_eq;
    use scene::{EntityId, GroupId, Primitive, PrimitiveRole};

    fn toolbox() -> MeasureToolbox<EllipsoidEngine> {
        MeasureToolbox::new(EllipsoidEngine::default(), MeasureConfig::default())
    }

    fn click(tb: &mut MeasureToolbox<EllipsoidEngine>, x: f64, y: f64) {
        tb.handle_input(InputEvent::left_down(x, y));
        tb.handle_input(InputEvent::left_up(x, y));
        tb.handle_input(InputEvent::left_click(x, y));
    }

    fn event_names(tb: &mut MeasureToolbox<EllipsoidEngine>) -> Vec<&'static str> {
        tb.take_events()
            .into_iter()
            .map(|e| match e.event {
                MeasureEvent::ToolActivated { .. } => "tool_activated",
                MeasureEvent::ToolDeactivated { .. } => "tool_deactivated",
                MeasureEvent::AnnotationCommitted { .. } => "committed",
                MeasureEvent::AnnotationUpdated { .. } => "updated",
                MeasureEvent::AnnotationRemoved { .. } => "removed",
                MeasureEvent::ProfileReady { .. } => "profile_ready",
                MeasureEvent::ProfileHover { .. } => "profile_hover",
                MeasureEvent::LabelEditRequested { .. } => "label_edit",
                MeasureEvent::Cleared => "cleared",
            })
            .collect()
    }

    fn draw_distance(tb: &mut MeasureToolbox<EllipsoidEngine>) -> GroupId {
        tb.press(ButtonId::Tool(Tool::Distance));
        click(tb, 100.0, 100.0);
        click(tb, 300.0, 100.0);
        tb.log().records()[0].group
    }

    fn total_label(tb: &MeasureToolbox<EllipsoidEngine>, group: GroupId) -> EntityId {
        tb.summary_label(group).expect("total label")
    }

    /// Where a label is drawn on screen.
    fn label_screen(tb: &MeasureToolbox<EllipsoidEngine>, entity: EntityId) -> Vec2 {
        let Some(Primitive::Label(label)) = tb.world().primitive(entity) else {
            panic!("expected a label");
        };
        let anchor = tb.engine().project(label.position).expect("visible");
        Vec2::new(
            anchor.x + f64::from(label.style.pixel_offset[0]),
            anchor.y + f64::from(label.style.pixel_offset[1]),
        )
    }

    /// What a browser sends for one double click.
    fn double_click(tb: &mut MeasureToolbox<EllipsoidEngine>, at: Vec2) {
        click(tb, at.x, at.y);
        click(tb, at.x, at.y);
        tb.handle_input(InputEvent::double_click(at.x, at.y));
    }

    #[test]
    fn input_without_a_tool_is_ignored() {
        let mut tb = toolbox();
        click(&mut tb, 100.0, 100.0);
        assert!(tb.annotations().is_empty());
        assert!(tb.take_events().is_empty());
    }

    #[test]
    fn measuring_renders_and_logs() {
        let mut tb = toolbox();
        let frames = tb.engine().frames_rendered();
        let group = draw_distance(&mut tb);

        assert!(tb.engine().frames_rendered() > frames);
        assert_eq!(tb.engine().last_snapshot(), &tb.snapshot());
        assert!(!tb.snapshot().is_empty());
        assert!(matches!(tb.measurement(group), Some(Measurement::Distance { .. })));
        assert_eq!(event_names(&mut tb), vec!["tool_activated", "committed"]);
    }

    #[test]
    fn switching_tools_drops_the_pending_drawing() {
        let mut tb = toolbox();
        tb.activate(Tool::Distance);
        click(&mut tb, 100.0, 100.0);
        assert_eq!(tb.annotations().len(), 1);

        tb.activate(Tool::Polygon);
        assert!(tb.annotations().is_empty());
        assert!(tb.world().is_empty());
        assert_eq!(tb.toolbar().active_tool(), Some(Tool::Polygon));
        assert_eq!(
            event_names(&mut tb),
            vec!["tool_activated", "tool_deactivated", "tool_activated"]
        );
    }

    #[test]
    fn pressing_the_active_tool_turns_it_off() {
        let mut tb = toolbox();
        tb.press(ButtonId::Tool(Tool::Height));
        assert_eq!(
            tb.press(ButtonId::Tool(Tool::Height)),
            ToolbarAction::Deactivate(Tool::Height)
        );
        assert_eq!(tb.active_tool(), None);
        assert_eq!(tb.toolbar().active_tool(), None);
        assert_eq!(event_names(&mut tb), vec!["tool_activated", "tool_deactivated"]);
    }

    #[test]
    fn panel_buttons_update_state() {
        let mut tb = toolbox();
        tb.press(ButtonId::Log);
        tb.press(ButtonId::Help);
        tb.press(ButtonId::Toggle);
        assert!(tb.state().log_visible());
        assert!(tb.state().help_visible());
        assert!(!tb.state().toolbar_expanded());
    }

    #[test]
    fn picker_switches_to_the_owning_tool() {
        let mut tb = toolbox();
        tb.activate(Tool::MultiDistance);
        click(&mut tb, 100.0, 100.0);
        click(&mut tb, 300.0, 100.0);
        tb.handle_input(InputEvent::right_click(300.0, 100.0));
        let group = tb.log().records()[0].group;

        tb.activate(Tool::Picker);
        click(&mut tb, 100.0, 100.0);
        assert_eq!(tb.active_tool(), Some(Tool::MultiDistance));
        assert_eq!(tb.toolbar().active_tool(), Some(Tool::MultiDistance));
        assert_eq!(tb.state().selected(), Some(group));
        let chain = tb.annotations().get(group).expect("chain");
        assert!(chain.highlighted);
        assert!(chain.is_pending());

        // The resumed chain keeps growing from its last vertex.
        click(&mut tb, 500.0, 100.0);
        tb.handle_input(InputEvent::right_click(500.0, 100.0));
        let Some(Measurement::Chain { segments_m, .. }) = tb.measurement(group) else {
            panic!("expected chain");
        };
        assert_eq!(segments_m.len(), 2);
    }

    #[test]
    fn double_clicking_a_label_edits_it_without_drawing() {
        let shapes: [(Tool, &[(f64, f64)]); 3] = [
            (Tool::Distance, &[(100.0, 100.0), (300.0, 100.0)]),
            (Tool::MultiDistance, &[(100.0, 100.0), (300.0, 100.0), (300.0, 300.0)]),
            (Tool::Polygon, &[(100.0, 100.0), (300.0, 100.0), (200.0, 300.0)]),
        ];
        for (tool, vertices) in shapes {
            let mut tb = toolbox();
            tb.activate(tool);
            for &(x, y) in vertices {
                click(&mut tb, x, y);
            }
            if tool != Tool::Distance {
                let (x, y) = vertices[vertices.len() - 1];
                tb.handle_input(InputEvent::right_click(x, y));
            }
            let group = tb.log().records()[0].group;
            tb.take_events();

            let at = label_screen(&tb, total_label(&tb, group));
            double_click(&mut tb, at);
            assert_eq!(tb.annotations().len(), 1, "{tool}");
            assert_eq!(tb.log().len(), 1, "{tool}");
            assert!(!tb.state().is_drawing(), "{tool}");
            assert_eq!(event_names(&mut tb), vec!["label_edit"], "{tool}");
        }
    }

    #[test]
    fn label_text_survives_redraws() {
        let mut tb = toolbox();
        let group = draw_distance(&mut tb);
        let label = total_label(&tb, group);
        tb.set_label_text(label, "Fence").expect("label");

        let label = total_label(&tb, group);
        let text = tb.world().primitive(label).and_then(|p| p.as_label()).map(|l| l.text.clone());
        assert_eq!(text.as_deref(), Some("Fence"));

        // Dragging a vertex redraws the annotation but keeps the override.
        tb.handle_input(InputEvent::left_down(300.0, 100.0));
        tb.handle_input(InputEvent::mouse_move(300.0, 300.0));
        tb.handle_input(InputEvent::left_up(300.0, 300.0));
        tb.handle_input(InputEvent::left_click(300.0, 300.0));
        let label = total_label(&tb, group);
        let text = tb.world().primitive(label).and_then(|p| p.as_label()).map(|l| l.text.clone());
        assert_eq!(text.as_deref(), Some("Fence"));
        assert!(tb.engine().camera_controls_enabled());
    }

    #[test]
    fn label_text_rejects_other_entities() {
        let mut tb = toolbox();
        let group = draw_distance(&mut tb);
        let vertex = *tb
            .annotations()
            .get(group)
            .expect("annotation")
            .entities
            .iter()
            .find(|e| tb.world().tag(**e).is_some_and(|t| t.role == PrimitiveRole::Vertex))
            .expect("vertex");
        assert_eq!(tb.set_label_text(vertex, "x"), Err(MeasureError::NotALabel(vertex)));
    }

    #[test]
    fn delete_and_select_need_a_known_group() {
        let mut tb = toolbox();
        assert_eq!(
            tb.delete_annotation(GroupId(99)),
            Err(MeasureError::UnknownGroup(GroupId(99)))
        );
        assert_eq!(tb.select(GroupId(99)), Err(MeasureError::UnknownGroup(GroupId(99))));
    }

    #[test]
    fn delete_removes_geometry_and_record() {
        let mut tb = toolbox();
        let group = draw_distance(&mut tb);
        tb.take_events();
        tb.delete_annotation(group).expect("delete");
        assert!(tb.world().is_empty());
        assert!(tb.log().is_empty());
        assert!(tb.engine().last_snapshot().is_empty());
        assert_eq!(event_names(&mut tb), vec!["removed"]);
    }

    #[test]
    fn deleting_the_drawing_in_progress_resets_the_mode() {
        let mut tb = toolbox();
        tb.activate(Tool::Polygon);
        click(&mut tb, 100.0, 100.0);
        let group = tb.annotations().ids()[0];
        tb.delete_annotation(group).expect("delete");
        assert!(!tb.state().is_drawing());

        click(&mut tb, 100.0, 100.0);
        assert_eq!(tb.annotations().len(), 1);
        assert_ne!(tb.annotations().ids()[0], group);
    }

    #[test]
    fn hidden_annotations_are_not_drawn_or_picked() {
        let mut tb = toolbox();
        let group = draw_distance(&mut tb);
        tb.set_annotation_visible(group, false).expect("hide");
        assert!(tb.engine().last_snapshot().is_empty());
        assert!(!tb.world().is_empty());
        assert_eq!(tb.log().len(), 1);

        // A middle click where the line was finds nothing to delete.
        tb.handle_input(InputEvent::middle_click(100.0, 100.0));
        assert_eq!(tb.annotations().len(), 1);

        tb.set_annotation_visible(group, true).expect("show");
        assert!(!tb.engine().last_snapshot().is_empty());
        assert_eq!(
            tb.set_annotation_visible(GroupId(99), true),
            Err(MeasureError::UnknownGroup(GroupId(99)))
        );
    }

    #[test]
    fn select_activates_the_owner_and_highlights() {
        let mut tb = toolbox();
        let group = draw_distance(&mut tb);
        tb.activate(Tool::Point);
        tb.select(group).expect("select");
        assert_eq!(tb.active_tool(), Some(Tool::Distance));
        assert!(tb.annotations().get(group).expect("annotation").highlighted);

        let highlight = tb.config().palette.highlight;
        let recolored = tb
            .annotations()
            .get(group)
            .expect("annotation")
            .entities
            .iter()
            .filter_map(|e| tb.world().primitive(*e))
            .any(|p| matches!(p, Primitive::Line(l) if l.color == highlight));
        assert!(recolored);
    }

    #[test]
    fn switching_tools_drops_the_highlight() {
        let mut tb = toolbox();
        let group = draw_distance(&mut tb);
        tb.activate(Tool::Picker);
        click(&mut tb, 100.0, 100.0);
        assert_eq!(tb.active_tool(), Some(Tool::Distance));
        assert!(tb.annotations().get(group).expect("annotation").highlighted);

        tb.activate(Tool::Polygon);
        assert!(!tb.annotations().get(group).expect("annotation").highlighted);
        assert_eq!(tb.state().selected(), None);

        let highlight = tb.config().palette.highlight;
        let still_highlighted = tb
            .annotations()
            .get(group)
            .expect("annotation")
            .entities
            .iter()
            .filter_map(|e| tb.world().primitive(*e))
            .any(|p| matches!(p, Primitive::Line(l) if l.color == highlight));
        assert!(!still_highlighted);
    }

    #[test]
    fn clear_keeps_the_tool_and_panels() {
        let mut tb = toolbox();
        tb.press(ButtonId::Log);
        draw_distance(&mut tb);
        tb.take_events();

        assert_eq!(tb.press(ButtonId::Clear), ToolbarAction::Clear);
        assert!(tb.annotations().is_empty());
        assert!(tb.world().is_empty());
        assert!(tb.log().is_empty());
        assert!(tb.state().log_visible());
        assert_eq!(tb.active_tool(), Some(Tool::Distance));
        assert_eq!(event_names(&mut tb), vec!["cleared"]);

        // Drawing starts afresh afterwards.
        click(&mut tb, 100.0, 100.0);
        click(&mut tb, 300.0, 100.0);
        assert_eq!(tb.log().len(), 1);
    }

    #[test]
    fn clear_mid_drag_releases_the_camera() {
        let mut tb = toolbox();
        draw_distance(&mut tb);
        tb.handle_input(InputEvent::left_down(300.0, 100.0));
        assert!(!tb.engine().camera_controls_enabled());
        tb.clear();
        assert!(tb.engine().camera_controls_enabled());
        assert!(!tb.state().is_dragging());
    }

    #[test]
    fn engine_picks_what_the_toolbox_drew() {
        let mut tb = toolbox();
        let group = draw_distance(&mut tb);
        let world = tb.world();
        let hit = tb.engine().pick_entity(world, foundation::math::Vec2::new(100.0, 100.0), 8.0);
        assert_eq!(hit.and_then(|h| world.tag(h.entity)).map(|t| t.group), Some(group));
    }
}

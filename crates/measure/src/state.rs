//! Typed session state shared by the toolbox, the modes and the host UI.

use scene::{EntityId, GroupId};

use crate::modes::Tool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateManager {
    active_tool: Option<Tool>,
    selected: Option<GroupId>,
    hovered: Option<EntityId>,
    dragging: bool,
    drawing: bool,
    toolbar_expanded: bool,
    log_visible: bool,
    help_visible: bool,
    pending_switch: Option<(Tool, GroupId)>,
    /// Bumped on every mutation.
    version: u64,
}

impl Default for StateManager {
    fn default() -> Self {
        Self {
            active_tool: None,
            selected: None,
            hovered: None,
            dragging: false,
            drawing: false,
            toolbar_expanded: true,
            log_visible: false,
            help_visible: false,
            pending_switch: None,
            version: 0,
        }
    }
}

impl StateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    pub fn active_tool(&self) -> Option<Tool> {
        self.active_tool
    }

    pub fn set_active_tool(&mut self, tool: Option<Tool>) {
        self.active_tool = tool;
        self.touch();
    }

    pub fn selected(&self) -> Option<GroupId> {
        self.selected
    }

    pub fn set_selected(&mut self, group: Option<GroupId>) {
        self.selected = group;
        self.touch();
    }

    pub fn hovered(&self) -> Option<EntityId> {
        self.hovered
    }

    pub fn set_hovered(&mut self, entity: Option<EntityId>) {
        if self.hovered != entity {
            self.hovered = entity;
            self.touch();
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
        self.touch();
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn set_drawing(&mut self, drawing: bool) {
        self.drawing = drawing;
        self.touch();
    }

    pub fn toolbar_expanded(&self) -> bool {
        self.toolbar_expanded
    }

    pub fn set_toolbar_expanded(&mut self, expanded: bool) {
        self.toolbar_expanded = expanded;
        self.touch();
    }

    pub fn log_visible(&self) -> bool {
        self.log_visible
    }

    pub fn set_log_visible(&mut self, visible: bool) {
        self.log_visible = visible;
        self.touch();
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn set_help_visible(&mut self, visible: bool) {
        self.help_visible = visible;
        self.touch();
    }

    /// Asks the toolbox to switch to `tool` and select `group` once the
    /// current input event has been handled.
    pub fn request_switch(&mut self, tool: Tool, group: GroupId) {
        self.pending_switch = Some((tool, group));
        self.touch();
    }

    pub fn take_switch(&mut self) -> Option<(Tool, GroupId)> {
        let switch = self.pending_switch.take();
        if switch.is_some() {
            self.touch();
        }
        switch
    }

    /// Resets everything tied to annotations. UI panel flags survive.
    pub fn reset_annotations(&mut self) {
        self.selected = None;
        self.hovered = None;
        self.dragging = false;
        self.drawing = false;
        self.pending_switch = None;
        self.touch();
    }
}

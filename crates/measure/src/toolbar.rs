use serde::Serialize;

use crate::modes::Tool;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "tool", rename_all = "snake_case")]
pub enum ButtonId {
    Tool(Tool),
    Clear,
    /// Collapses or expands the tool buttons.
    Toggle,
    Log,
    Help,
}

impl ButtonId {
    /// Stable DOM-friendly identifier.
    pub fn key(self) -> String {
        match self {
            ButtonId::Tool(tool) => format!("tool-{}", tool.name()),
            ButtonId::Clear => "clear".into(),
            ButtonId::Toggle => "toggle".into(),
            ButtonId::Log => "log".into(),
            ButtonId::Help => "help".into(),
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "clear" => Some(ButtonId::Clear),
            "toggle" => Some(ButtonId::Toggle),
            "log" => Some(ButtonId::Log),
            "help" => Some(ButtonId::Help),
            _ => key
                .strip_prefix("tool-")
                .and_then(Tool::from_name)
                .map(ButtonId::Tool),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolButton {
    pub id: ButtonId,
    pub label: &'static str,
    pub tooltip: &'static str,
    pub active: bool,
    pub visible: bool,
}

/// What the toolbox must do in response to a button press.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ToolbarAction {
    Activate(Tool),
    Deactivate(Tool),
    Clear,
    SetExpanded(bool),
    SetLogVisible(bool),
    SetHelpVisible(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toolbar {
    buttons: Vec<ToolButton>,
    expanded: bool,
    log_visible: bool,
    help_visible: bool,
}

impl Default for Toolbar {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolbar {
    pub fn new() -> Self {
        let mut buttons: Vec<ToolButton> = Tool::ALL
            .into_iter()
            .map(|tool| ToolButton {
                id: ButtonId::Tool(tool),
                label: tool.label(),
                tooltip: tool.tooltip(),
                active: false,
                visible: true,
            })
            .collect();
        buttons.extend([
            ToolButton {
                id: ButtonId::Clear,
                label: "Clear",
                tooltip: "Remove every measurement",
                active: false,
                visible: true,
            },
            ToolButton {
                id: ButtonId::Log,
                label: "Log",
                tooltip: "Show the measurement log",
                active: false,
                visible: true,
            },
            ToolButton {
                id: ButtonId::Help,
                label: "Help",
                tooltip: "Show mouse controls",
                active: false,
                visible: true,
            },
            ToolButton {
                id: ButtonId::Toggle,
                label: "Tools",
                tooltip: "Collapse or expand the toolbar",
                active: true,
                visible: true,
            },
        ]);
        Self {
            buttons,
            expanded: true,
            log_visible: false,
            help_visible: false,
        }
    }

    pub fn buttons(&self) -> &[ToolButton] {
        &self.buttons
    }

    pub fn button(&self, id: ButtonId) -> Option<&ToolButton> {
        self.buttons.iter().find(|b| b.id == id)
    }

    pub fn active_tool(&self) -> Option<Tool> {
        self.buttons.iter().find_map(|b| match b.id {
            ButtonId::Tool(tool) if b.active => Some(tool),
            _ => None,
        })
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Marks `tool` (or nothing) as the single active tool button.
    pub fn set_active_tool(&mut self, tool: Option<Tool>) {
        for button in &mut self.buttons {
            if let ButtonId::Tool(t) = button.id {
                button.active = Some(t) == tool;
            }
        }
    }

    pub fn press(&mut self, id: ButtonId) -> ToolbarAction {
        match id {
            ButtonId::Tool(tool) => {
                if self.active_tool() == Some(tool) {
                    self.set_active_tool(None);
                    ToolbarAction::Deactivate(tool)
                } else {
                    self.set_active_tool(Some(tool));
                    ToolbarAction::Activate(tool)
                }
            }
            ButtonId::Clear => ToolbarAction::Clear,
            ButtonId::Toggle => {
                self.expanded = !self.expanded;
                let expanded = self.expanded;
                for button in &mut self.buttons {
                    if button.id != ButtonId::Toggle {
                        button.visible = expanded;
                    } else {
                        button.active = expanded;
                    }
                }
                ToolbarAction::SetExpanded(expanded)
            }
            ButtonId::Log => {
                self.log_visible = !self.log_visible;
                self.set_flag(ButtonId::Log, self.log_visible);
                ToolbarAction::SetLogVisible(self.log_visible)
            }
            ButtonId::Help => {
                self.help_visible = !self.help_visible;
                self.set_flag(ButtonId::Help, self.help_visible);
                ToolbarAction::SetHelpVisible(self.help_visible)
            }
        }
    }

    fn set_flag(&mut self, id: ButtonId, active: bool) {
        if let Some(button) = self.buttons.iter_mut().find(|b| b.id == id) {
            button.active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ButtonId, Toolbar, ToolbarAction};
    use crate::modes::Tool;
    use pretty_assertions::assert_eq;

    #[test]
    fn one_button_per_tool_plus_controls() {
        let toolbar = Toolbar::new();
        assert_eq!(toolbar.buttons().len(), Tool::ALL.len() + 4);
        assert!(toolbar.button(ButtonId::Clear).is_some());
        assert_eq!(toolbar.active_tool(), None);
    }

    #[test]
    fn only_one_tool_is_active() {
        let mut toolbar = Toolbar::new();
        assert_eq!(
            toolbar.press(ButtonId::Tool(Tool::Distance)),
            ToolbarAction::Activate(Tool::Distance)
        );
        assert_eq!(
            toolbar.press(ButtonId::Tool(Tool::Polygon)),
            ToolbarAction::Activate(Tool::Polygon)
        );
        let active: Vec<_> = toolbar
            .buttons()
            .iter()
            .filter(|b| b.active && matches!(b.id, ButtonId::Tool(_)))
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(toolbar.active_tool(), Some(Tool::Polygon));
    }

    #[test]
    fn pressing_the_active_tool_deactivates_it() {
        let mut toolbar = Toolbar::new();
        toolbar.press(ButtonId::Tool(Tool::Height));
        assert_eq!(
            toolbar.press(ButtonId::Tool(Tool::Height)),
            ToolbarAction::Deactivate(Tool::Height)
        );
        assert_eq!(toolbar.active_tool(), None);
    }

    #[test]
    fn toggle_hides_everything_but_itself() {
        let mut toolbar = Toolbar::new();
        assert_eq!(toolbar.press(ButtonId::Toggle), ToolbarAction::SetExpanded(false));
        assert!(toolbar.buttons().iter().all(|b| b.visible == (b.id == ButtonId::Toggle)));
        assert_eq!(toolbar.press(ButtonId::Toggle), ToolbarAction::SetExpanded(true));
        assert!(toolbar.buttons().iter().all(|b| b.visible));
    }

    #[test]
    fn panels_toggle() {
        let mut toolbar = Toolbar::new();
        assert_eq!(toolbar.press(ButtonId::Log), ToolbarAction::SetLogVisible(true));
        assert_eq!(toolbar.button(ButtonId::Log).map(|b| b.active), Some(true));
        assert_eq!(toolbar.press(ButtonId::Log), ToolbarAction::SetLogVisible(false));
        assert_eq!(toolbar.press(ButtonId::Help), ToolbarAction::SetHelpVisible(true));
    }

    #[test]
    fn keys_round_trip() {
        for button in Toolbar::new().buttons() {
            assert_eq!(ButtonId::from_key(&button.id.key()), Some(button.id));
        }
        assert_eq!(ButtonId::from_key("tool-bogus"), None);
    }
}

use foundation::math::Vec2;
use serde::{Deserialize, Serialize};

/// Pointer input in canvas pixels, top-left origin.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    LeftClick { position: Vec2 },
    LeftDown { position: Vec2 },
    LeftUp { position: Vec2 },
    MouseMove { position: Vec2 },
    RightClick { position: Vec2 },
    MiddleClick { position: Vec2 },
    DoubleClick { position: Vec2 },
}

impl InputEvent {
    pub fn position(&self) -> Vec2 {
        match *self {
            InputEvent::LeftClick { position }
            | InputEvent::LeftDown { position }
            | InputEvent::LeftUp { position }
            | InputEvent::MouseMove { position }
            | InputEvent::RightClick { position }
            | InputEvent::MiddleClick { position }
            | InputEvent::DoubleClick { position } => position,
        }
    }

    /// Builds an event from a DOM event name (`"click"`, `"mousemove"`, ...)
    /// and its `MouseEvent.button` (0 primary, 1 middle, 2 secondary).
    /// Press, release and click events of the wrong button yield `None`, as
    /// does the `auxclick` browsers also fire for the secondary button.
    /// Snake_case names carry their button and ignore `button`.
    pub fn from_name(name: &str, x: f64, y: f64, button: i16) -> Option<Self> {
        const PRIMARY: i16 = 0;
        const MIDDLE: i16 = 1;
        let position = Vec2::new(x, y);
        let primary = button == PRIMARY;
        Some(match name {
            "click" if primary => InputEvent::LeftClick { position },
            "mousedown" if primary => InputEvent::LeftDown { position },
            "mouseup" if primary => InputEvent::LeftUp { position },
            "dblclick" if primary => InputEvent::DoubleClick { position },
            "auxclick" if button == MIDDLE => InputEvent::MiddleClick { position },
            "mousemove" | "mouse_move" => InputEvent::MouseMove { position },
            "contextmenu" | "right_click" => InputEvent::RightClick { position },
            "left_click" => InputEvent::LeftClick { position },
            "left_down" => InputEvent::LeftDown { position },
            "left_up" => InputEvent::LeftUp { position },
            "middle_click" => InputEvent::MiddleClick { position },
            "double_click" => InputEvent::DoubleClick { position },
            _ => return None,
        })
    }

    pub fn left_click(x: f64, y: f64) -> Self {
        InputEvent::LeftClick {
            position: Vec2::new(x, y),
        }
    }

    pub fn left_down(x: f64, y: f64) -> Self {
        InputEvent::LeftDown {
            position: Vec2::new(x, y),
        }
    }

    pub fn left_up(x: f64, y: f64) -> Self {
        InputEvent::LeftUp {
            position: Vec2::new(x, y),
        }
    }

    pub fn mouse_move(x: f64, y: f64) -> Self {
        InputEvent::MouseMove {
            position: Vec2::new(x, y),
        }
    }

    pub fn right_click(x: f64, y: f64) -> Self {
        InputEvent::RightClick {
            position: Vec2::new(x, y),
        }
    }

    pub fn middle_click(x: f64, y: f64) -> Self {
        InputEvent::MiddleClick {
            position: Vec2::new(x, y),
        }
    }

    pub fn double_click(x: f64, y: f64) -> Self {
        InputEvent::DoubleClick {
            position: Vec2::new(x, y),
        }
    }
}

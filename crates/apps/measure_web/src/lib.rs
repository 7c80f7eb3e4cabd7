//! Browser front end: builds the toolbar DOM, routes canvas mouse events into
//! the toolbox and bridges a host JS globe through [`JsGlobe`].
//!
//! The host owns the globe (camera, terrain, drawing). It forwards canvas
//! events with `measure_handle_event` and receives the primitives to draw as
//! JSON through `JsGlobe.render`. `render` must not call back into this
//! module synchronously.

use std::cell::RefCell;

use console_error_panic_hook::set_once;
use foundation::math::{Geodetic, Vec2, Vec3};
use measure::log::MeasurementLog;
use measure::toolbar::{ButtonId, Toolbar};
use measure::{EntityId, GlobeEngine, GroupId, InputEvent, MeasureConfig, MeasureToolbox};
use scene::snapshot::SceneSnapshot;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

const HELP_TEXT: &str = "Left click: place a point\n\
Right click: finish or cancel\n\
Middle click: delete a point or measurement\n\
Drag a point: move it\n\
Double click a label: rename it";

#[wasm_bindgen]
extern "C" {
    /// Host globe adapter. World positions are ECEF meters as `[x, y, z]`,
    /// screen positions canvas pixels as `[x, y]`.
    pub type JsGlobe;

    #[wasm_bindgen(method, js_name = pickPosition)]
    fn pick_position(this: &JsGlobe, x: f64, y: f64) -> JsValue;

    #[wasm_bindgen(method)]
    fn project(this: &JsGlobe, x: f64, y: f64, z: f64) -> JsValue;

    #[wasm_bindgen(method, js_name = sampleHeight)]
    fn sample_height(this: &JsGlobe, lat_deg: f64, lon_deg: f64) -> JsValue;

    #[wasm_bindgen(method, js_name = setCameraControls)]
    fn set_camera_controls(this: &JsGlobe, enabled: bool);

    #[wasm_bindgen(method)]
    fn render(this: &JsGlobe, snapshot_json: &str);
}

/// Reads a JS array of numbers; `null` and `undefined` mean "nothing".
fn numbers(value: &JsValue) -> Option<Vec<f64>> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    js_sys::Array::from(value)
        .iter()
        .map(|v| v.as_f64())
        .collect()
}

fn vec2_from(values: &[f64]) -> Option<Vec2> {
    match *values {
        [x, y, ..] if x.is_finite() && y.is_finite() => Some(Vec2::new(x, y)),
        _ => None,
    }
}

fn vec3_from(values: &[f64]) -> Option<Vec3> {
    match *values {
        [x, y, z, ..] if x.is_finite() && y.is_finite() && z.is_finite() => {
            Some(Vec3::new(x, y, z))
        }
        _ => None,
    }
}

struct JsEngine {
    globe: JsGlobe,
}

impl GlobeEngine for JsEngine {
    fn pick_position(&self, screen: Vec2) -> Option<Vec3> {
        numbers(&self.globe.pick_position(screen.x, screen.y)).and_then(|v| vec3_from(&v))
    }

    fn project(&self, position: Vec3) -> Option<Vec2> {
        numbers(&self.globe.project(position.x, position.y, position.z)).and_then(|v| vec2_from(&v))
    }

    fn sample_height(&self, position: Geodetic) -> Option<f64> {
        self.globe
            .sample_height(position.lat_rad.to_degrees(), position.lon_rad.to_degrees())
            .as_f64()
            .filter(|h| h.is_finite())
    }

    fn set_camera_controls(&mut self, enabled: bool) {
        self.globe.set_camera_controls(enabled);
    }

    fn render(&mut self, snapshot: &SceneSnapshot) {
        match serde_json::to_string(snapshot) {
            Ok(json) => self.globe.render(&json),
            Err(err) => web_sys::console::error_1(&js_err(err)),
        }
    }
}

struct Widget {
    toolbox: MeasureToolbox<JsEngine>,
    root: Option<Element>,
}

thread_local! {
    static STATE: RefCell<Option<Widget>> = const { RefCell::new(None) };
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn with_widget<R>(f: impl FnOnce(&mut Widget) -> Result<R, JsValue>) -> Result<R, JsValue> {
    STATE.with(|state| {
        let mut state = state
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("measure widget is busy"))?;
        let widget = state
            .as_mut()
            .ok_or_else(|| JsValue::from_str("measure widget not initialised"))?;
        let result = f(widget)?;
        sync_dom(widget)?;
        Ok(result)
    })
}

fn log_text(log: &MeasurementLog) -> String {
    log.records()
        .iter()
        .map(|record| format!("{}. {}: {}", record.seq, record.kind, record.summary))
        .collect::<Vec<_>>()
        .join("\n")
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn build_toolbar(
    document: &Document,
    container: &Element,
    toolbar: &Toolbar,
) -> Result<Element, JsValue> {
    let root = document.create_element("div")?;
    root.set_class_name("measure-toolbar");
    for button in toolbar.buttons() {
        let key = button.id.key();
        let el = document.create_element("button")?;
        el.set_class_name("measure-button");
        el.set_text_content(Some(button.label));
        el.set_attribute("title", button.tooltip)?;
        el.set_attribute("data-button", &key)?;
        let onclick = Closure::<dyn FnMut()>::new(move || {
            if let Err(err) = measure_press(&key) {
                web_sys::console::error_1(&err);
            }
        });
        el.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
        root.append_child(&el)?;
    }

    let log = document.create_element("pre")?;
    log.set_class_name("measure-log hidden");
    root.append_child(&log)?;

    let help = document.create_element("pre")?;
    help.set_class_name("measure-help hidden");
    help.set_text_content(Some(HELP_TEXT));
    root.append_child(&help)?;

    container.append_child(&root)?;
    Ok(root)
}

/// Mirrors the toolbar model and the panel flags onto the DOM.
fn sync_dom(widget: &Widget) -> Result<(), JsValue> {
    let Some(root) = &widget.root else {
        return Ok(());
    };
    let toolbox = &widget.toolbox;
    for button in toolbox.toolbar().buttons() {
        let selector = format!("[data-button=\"{}\"]", button.id.key());
        if let Some(el) = root.query_selector(&selector)? {
            el.class_list().toggle_with_force("active", button.active)?;
            el.class_list().toggle_with_force("hidden", !button.visible)?;
        }
    }
    let state = toolbox.state();
    if let Some(log) = root.query_selector(".measure-log")? {
        log.class_list().toggle_with_force("hidden", !state.log_visible())?;
        log.set_text_content(Some(&log_text(toolbox.log())));
    }
    if let Some(help) = root.query_selector(".measure-help")? {
        help.class_list().toggle_with_force("hidden", !state.help_visible())?;
    }
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Creates the widget. The toolbar is appended to the element with id
/// `container_id` when given; `config_json` overrides config defaults.
#[wasm_bindgen]
pub fn measure_init(
    globe: JsGlobe,
    container_id: Option<String>,
    config_json: Option<String>,
) -> Result<(), JsValue> {
    let config = match config_json {
        Some(json) => MeasureConfig::from_json_str(&json).map_err(js_err)?,
        None => MeasureConfig::default(),
    };
    let toolbox = MeasureToolbox::new(JsEngine { globe }, config);
    let root = match container_id {
        Some(id) => {
            let document = document()?;
            let container = document
                .get_element_by_id(&id)
                .ok_or_else(|| JsValue::from_str(&format!("no element #{id}")))?;
            Some(build_toolbar(&document, &container, toolbox.toolbar())?)
        }
        None => None,
    };
    let widget = Widget { toolbox, root };
    sync_dom(&widget)?;
    STATE.with(|state| {
        *state
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("measure widget is busy"))? = Some(widget);
        Ok(())
    })
}

/// Routes a canvas mouse event (`click`, `mousedown`, `contextmenu`...)
/// together with its `MouseEvent.button`. Returns `false` for events the
/// toolbox does not handle.
#[wasm_bindgen]
pub fn measure_handle_event(kind: &str, x: f64, y: f64, button: i16) -> Result<bool, JsValue> {
    let Some(event) = InputEvent::from_name(kind, x, y, button) else {
        return Ok(false);
    };
    with_widget(|widget| {
        widget.toolbox.handle_input(event);
        Ok(true)
    })
}

/// Presses a toolbar button by key (`tool-distance`, `clear`, `log`...).
#[wasm_bindgen]
pub fn measure_press(key: &str) -> Result<(), JsValue> {
    let id = ButtonId::from_key(key)
        .ok_or_else(|| JsValue::from_str(&format!("unknown button {key}")))?;
    with_widget(|widget| {
        widget.toolbox.press(id);
        Ok(())
    })
}

/// Answers a `label_edit_requested` event; `entity_json` is the event's
/// `entity` field.
#[wasm_bindgen]
pub fn measure_set_label_text(entity_json: &str, text: &str) -> Result<(), JsValue> {
    let entity: EntityId = serde_json::from_str(entity_json).map_err(js_err)?;
    with_widget(|widget| widget.toolbox.set_label_text(entity, text).map_err(js_err))
}

/// Group ids arrive as JS numbers. Only whole numbers in the safe integer
/// range name a group.
fn group_id(value: f64) -> Option<GroupId> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    (value.fract() == 0.0 && (0.0..=MAX_SAFE_INTEGER).contains(&value))
        .then(|| GroupId(value as u64))
}

fn parse_group(value: f64) -> Result<GroupId, JsValue> {
    group_id(value).ok_or_else(|| JsValue::from_str(&format!("invalid group id {value}")))
}

#[wasm_bindgen]
pub fn measure_delete(group: f64) -> Result<(), JsValue> {
    let group = parse_group(group)?;
    with_widget(|widget| widget.toolbox.delete_annotation(group).map_err(js_err))
}

#[wasm_bindgen]
pub fn measure_select(group: f64) -> Result<(), JsValue> {
    let group = parse_group(group)?;
    with_widget(|widget| widget.toolbox.select(group).map_err(js_err))
}

#[wasm_bindgen]
pub fn measure_set_visible(group: f64, visible: bool) -> Result<(), JsValue> {
    let group = parse_group(group)?;
    with_widget(|widget| {
        widget
            .toolbox
            .set_annotation_visible(group, visible)
            .map_err(js_err)
    })
}

#[wasm_bindgen]
pub fn measure_clear() -> Result<(), JsValue> {
    with_widget(|widget| {
        widget.toolbox.clear();
        Ok(())
    })
}

#[wasm_bindgen]
pub fn measure_active_tool() -> Result<Option<String>, JsValue> {
    with_widget(|widget| Ok(widget.toolbox.active_tool().map(|t| t.name().to_string())))
}

/// Events since the previous call, as a JSON array.
#[wasm_bindgen]
pub fn measure_take_events() -> Result<String, JsValue> {
    with_widget(|widget| serde_json::to_string(&widget.toolbox.take_events()).map_err(js_err))
}

#[wasm_bindgen]
pub fn measure_log_json() -> Result<String, JsValue> {
    with_widget(|widget| widget.toolbox.log().to_json().map_err(js_err))
}

#[cfg(test)]
mod tests {
    use super::{HELP_TEXT, group_id, log_text, vec2_from, vec3_from};
    use foundation::math::{Vec2, Vec3};
    use measure::log::MeasurementLog;
    use measure::{AnnotationKind, GroupId, Measurement};
    use pretty_assertions::assert_eq;

    #[test]
    fn host_arrays_need_enough_finite_numbers() {
        assert_eq!(vec3_from(&[1.0, 2.0, 3.0]), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(vec3_from(&[1.0, 2.0]), None);
        assert_eq!(vec3_from(&[1.0, f64::NAN, 3.0]), None);
        assert_eq!(vec2_from(&[4.0, 5.0]), Some(Vec2::new(4.0, 5.0)));
        assert_eq!(vec2_from(&[]), None);
    }

    #[test]
    fn group_ids_cover_the_safe_integer_range() {
        assert_eq!(group_id(7.0), Some(GroupId(7)));
        assert_eq!(group_id(4_294_967_296.0), Some(GroupId(4_294_967_296)));
        assert_eq!(group_id(9_007_199_254_740_991.0), Some(GroupId(9_007_199_254_740_991)));
        assert_eq!(group_id(-1.0), None);
        assert_eq!(group_id(1.5), None);
        assert_eq!(group_id(f64::NAN), None);
        assert_eq!(group_id(f64::INFINITY), None);
    }

    #[test]
    fn log_panel_lists_records_in_order() {
        let mut log = MeasurementLog::new();
        log.upsert(
            GroupId(1),
            AnnotationKind::Height,
            Measurement::Height { height_m: 12.5 },
            "12.50 m".into(),
        );
        log.upsert(
            GroupId(2),
            AnnotationKind::Height,
            Measurement::Height { height_m: 3.0 },
            "3.00 m".into(),
        );
        let text = log_text(&log);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("12.50 m"), "{}", lines[0]);
        assert!(lines[1].ends_with("3.00 m"), "{}", lines[1]);
    }

    #[test]
    fn help_covers_every_mouse_button() {
        for word in ["Left", "Right", "Middle", "Double"] {
            assert!(HELP_TEXT.contains(word), "{word}");
        }
    }
}

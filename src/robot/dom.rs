//! Page adapter: finds robot widgets by class convention and forwards their
//! DOM events. Everything here is fail-soft; a widget missing a part simply
//! loses the behaviour tied to that part.

use std::collections::BTreeMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

use super::{Control, Part, RobotView};

/// Robot containers carry a class ending in this suffix, e.g. `classic-robot`.
pub const CONTAINER_SELECTOR: &str = "[class$=\"-robot\"]";

/// `"classic-robot"` -> `"classic"`. Empty leading segments yield `None`.
pub fn robot_key(class_name: &str) -> Option<&str> {
    class_name
        .trim()
        .split('-')
        .next()
        .filter(|k| !k.is_empty())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RobotEvent {
    Press(Control),
    HoverEnter,
    HoverLeave,
}

pub struct DomRobot {
    container: HtmlElement,
    parts: BTreeMap<Part, HtmlElement>,
}

impl DomRobot {
    pub fn from_container(container: HtmlElement) -> Self {
        let mut parts = BTreeMap::new();
        for part in Part::ALL {
            let sel = format!(".{}", part.class_name());
            match container.query_selector(&sel) {
                Ok(Some(el)) => {
                    if let Ok(el) = el.dyn_into::<HtmlElement>() {
                        parts.insert(part, el);
                    }
                }
                Ok(None) => {}
                Err(e) => log::debug!("query {sel} failed: {e:?}"),
            }
        }
        Self { container, parts }
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    fn part(&self, part: Part) -> Option<&HtmlElement> {
        self.parts.get(&part)
    }

    /// Wire the four buttons and the container hover to `handler`.
    pub fn bind_events(&self, handler: Rc<dyn Fn(RobotEvent)>) -> Result<(), JsValue> {
        for control in Control::ALL {
            let Some(button) = self.part(control.button()) else {
                continue;
            };
            let h = handler.clone();
            let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
                h(RobotEvent::Press(control));
            }) as Box<dyn FnMut(_)>);
            button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        for (event, kind) in [
            ("mouseenter", RobotEvent::HoverEnter),
            ("mouseleave", RobotEvent::HoverLeave),
        ] {
            let h = handler.clone();
            let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
                h(kind);
            }) as Box<dyn FnMut(_)>);
            self.container
                .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }
}

impl RobotView for DomRobot {
    fn has(&self, part: Part) -> bool {
        self.parts.contains_key(&part)
    }

    fn set_text(&self, part: Part, text: &str) {
        if let Some(el) = self.part(part) {
            el.set_text_content(Some(text));
        }
    }

    fn set_class(&self, part: Part, class: &str, on: bool) {
        if let Some(el) = self.part(part) {
            let _ = el.class_list().toggle_with_force(class, on);
        }
    }

    fn set_style(&self, part: Part, property: &str, value: &str) {
        if let Some(el) = self.part(part) {
            let _ = el.style().set_property(property, value);
        }
    }

    fn style(&self, part: Part, property: &str) -> Option<String> {
        self.part(part)
            .map(|el| el.style().get_property_value(property).unwrap_or_default())
    }
}

/// Scan `doc` for robot containers, in document order.
pub fn discover(doc: &Document) -> Result<Vec<(String, DomRobot)>, JsValue> {
    let nodes = doc.query_selector_all(CONTAINER_SELECTOR)?;
    let mut found = Vec::new();
    for i in 0..nodes.length() {
        let Some(node) = nodes.item(i) else {
            continue;
        };
        let Ok(container) = node.dyn_into::<HtmlElement>() else {
            continue;
        };
        let class_name = container.class_name();
        let Some(key) = robot_key(&class_name) else {
            log::debug!("skipping robot container with class '{class_name}'");
            continue;
        };
        let robot = DomRobot::from_container(container);
        for part in Part::ALL {
            if !robot.has(part) {
                log::debug!("{key}: no .{} element", part.class_name());
            }
        }
        found.push((key.to_string(), robot));
    }
    Ok(found)
}

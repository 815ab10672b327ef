//! DOM renderer: positions a `div` with inline styles

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

use super::{PixelFrame, PixelRenderer};

/// Element id of the pixel
pub const PIXEL_ID: &str = "conscious-pixel";
/// Class toggled while the probe reports a connection
pub const CONNECTED_CLASS: &str = "connected";

pub struct DomRenderer {
    element: HtmlElement,
    connected: bool,
}

impl DomRenderer {
    /// Reuse `#conscious-pixel` or create it inside `.wrapper` (falling back to `body`)
    pub fn attach(document: &Document) -> Result<Self, JsValue> {
        let element = match document.get_element_by_id(PIXEL_ID) {
            Some(el) => el,
            None => {
                let el = document.create_element("div")?;
                el.set_id(PIXEL_ID);
                let parent = match document.query_selector(".wrapper")? {
                    Some(wrapper) => wrapper,
                    None => {
                        log::warn!("No .wrapper element, attaching pixel to body");
                        document
                            .body()
                            .ok_or_else(|| JsValue::from_str("document has no body"))?
                            .into()
                    }
                };
                parent.append_child(&el)?;
                el
            }
        };

        let element: HtmlElement = element.dyn_into().map_err(JsValue::from)?;
        element.style().set_property("position", "fixed")?;
        element.style().set_property("border-radius", "50%")?;
        element.style().set_property("pointer-events", "none")?;

        Ok(Self {
            element,
            connected: false,
        })
    }

    fn apply(&mut self, frame: &PixelFrame) -> Result<(), JsValue> {
        let style = self.element.style();
        style.set_property("left", &format!("{:.2}px", frame.left))?;
        style.set_property("top", &format!("{:.2}px", frame.top))?;
        style.set_property("width", &format!("{:.2}px", frame.size))?;
        style.set_property("height", &format!("{:.2}px", frame.size))?;
        style.set_property("background-color", &frame.color.to_css())?;
        style.set_property("box-shadow", &frame.box_shadow())?;
        style.set_property("opacity", &format!("{:.3}", frame.opacity))?;

        if frame.connected != self.connected {
            self.element
                .class_list()
                .toggle_with_force(CONNECTED_CLASS, frame.connected)?;
            self.connected = frame.connected;
        }
        Ok(())
    }
}

impl PixelRenderer for DomRenderer {
    fn render(&mut self, frame: &PixelFrame) {
        if let Err(e) = self.apply(frame) {
            log::warn!("Pixel style update failed: {:?}", e);
        }
    }
}

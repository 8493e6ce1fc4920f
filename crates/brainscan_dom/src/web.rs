//! Browser backend over `web-sys`.
//!
//! Closures handed to the DOM are leaked with `forget()`: listeners live as
//! long as the page does.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    DragEvent, Event, FileReader, HtmlElement, HtmlImageElement, HtmlInputElement, ScrollBehavior,
    ScrollIntoViewOptions, ScrollToOptions,
};

use crate::element::{Element, ElementRef};
use crate::error::DomError;
use crate::event::{DomEvent, EventKind, Handler};
use crate::file::{FileBlob, FileRef};
use crate::window::{ReadCallback, Window, WindowRef};

fn js_error(value: &JsValue) -> DomError {
    DomError::Js(format!("{:?}", value))
}

/// A `File` from a file input or a drop.
pub struct WebFile {
    file: web_sys::File,
}

impl WebFile {
    pub fn new(file: web_sys::File) -> Self {
        Self { file }
    }

    /// The underlying browser file, e.g. for `FormData::append_with_blob`.
    pub fn file(&self) -> &web_sys::File {
        &self.file
    }
}

impl FileBlob for WebFile {
    fn name(&self) -> String {
        self.file.name()
    }

    fn media_type(&self) -> String {
        self.file.type_()
    }

    fn size(&self) -> u64 {
        self.file.size() as u64
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn files_from_list(list: Option<web_sys::FileList>) -> Vec<FileRef> {
    let Some(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|file| Rc::new(WebFile::new(file)) as FileRef)
        .collect()
}

fn to_dom_event(kind: EventKind, event: &Event) -> DomEvent {
    let files = match kind {
        EventKind::Drop => event
            .dyn_ref::<DragEvent>()
            .and_then(|e| e.data_transfer())
            .map(|transfer| files_from_list(transfer.files()))
            .unwrap_or_default(),
        EventKind::Change => event
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            .map(|input| files_from_list(input.files()))
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let target_is_current = match (event.target(), event.current_target()) {
        (Some(target), Some(current)) => JsValue::from(target) == JsValue::from(current),
        _ => false,
    };

    DomEvent::new(kind)
        .with_files(files)
        .with_target_is_current(target_is_current)
}

/// An `HTMLElement` in the live document.
pub struct WebElement {
    element: HtmlElement,
}

impl WebElement {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }

    /// Wrap a generic element, skipping non-HTML nodes (SVG and friends).
    pub fn shared(element: web_sys::Element) -> Option<ElementRef> {
        element
            .dyn_into::<HtmlElement>()
            .ok()
            .map(|e| Rc::new(Self::new(e)) as ElementRef)
    }

    fn input(&self) -> Option<&HtmlInputElement> {
        self.element.dyn_ref::<HtmlInputElement>()
    }
}

impl Element for WebElement {
    fn id(&self) -> Option<String> {
        let id = self.element.id();
        (!id.is_empty()).then_some(id)
    }

    fn set_text(&self, text: &str) {
        self.element.set_text_content(Some(text));
    }

    fn text(&self) -> String {
        self.element.text_content().unwrap_or_default()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Err(e) = self.element.set_attribute(name, value) {
            log::warn!("Failed to set attribute '{}': {:?}", name, e);
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn src(&self) -> Option<String> {
        match self.element.dyn_ref::<HtmlImageElement>() {
            Some(image) => Some(image.src()).filter(|src| !src.is_empty()),
            None => self.attribute("src"),
        }
    }

    fn set_style(&self, property: &str, value: &str) {
        if let Err(e) = self.element.style().set_property(property, value) {
            log::warn!("Failed to set style '{}': {:?}", property, e);
        }
    }

    fn style(&self, property: &str) -> Option<String> {
        self.element
            .style()
            .get_property_value(property)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn add_class(&self, class: &str) {
        if let Err(e) = self.element.class_list().add_1(class) {
            log::warn!("Failed to add class '{}': {:?}", class, e);
        }
    }

    fn remove_class(&self, class: &str) {
        if let Err(e) = self.element.class_list().remove_1(class) {
            log::warn!("Failed to remove class '{}': {:?}", class, e);
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.element.class_list().contains(class)
    }

    fn set_disabled(&self, disabled: bool) {
        if disabled {
            self.set_attribute("disabled", "");
        } else if let Err(e) = self.element.remove_attribute("disabled") {
            log::warn!("Failed to clear disabled: {:?}", e);
        }
    }

    fn is_disabled(&self) -> bool {
        self.element.has_attribute("disabled")
    }

    fn set_checked(&self, checked: bool) {
        if let Some(input) = self.input() {
            input.set_checked(checked);
        }
    }

    fn is_checked(&self) -> bool {
        self.input().map(|input| input.checked()).unwrap_or(false)
    }

    fn set_value(&self, value: &str) {
        if let Some(input) = self.input() {
            input.set_value(value);
        }
    }

    fn value(&self) -> String {
        self.input().map(|input| input.value()).unwrap_or_default()
    }

    fn click(&self) {
        self.element.click();
    }

    fn scroll_into_view(&self) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        self.element
            .scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn clear_children(&self) {
        self.element.set_inner_html("");
    }

    fn append_element(&self, tag: &str, class: &str) -> Result<ElementRef, DomError> {
        let document = self
            .element
            .owner_document()
            .ok_or_else(|| DomError::Js("element has no owner document".to_string()))?;
        let child = document.create_element(tag).map_err(|e| js_error(&e))?;
        child.set_class_name(class);
        self.element
            .append_child(&child)
            .map_err(|e| js_error(&e))?;
        WebElement::shared(child)
            .ok_or_else(|| DomError::Js(format!("<{}> is not an HTML element", tag)))
    }

    fn children(&self) -> Vec<ElementRef> {
        let collection = self.element.children();
        (0..collection.length())
            .filter_map(|i| collection.item(i))
            .filter_map(WebElement::shared)
            .collect()
    }

    fn query_selector(&self, selector: &str) -> Option<ElementRef> {
        self.element
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(WebElement::shared)
    }

    fn add_listener(&self, kind: EventKind, mut handler: Handler) {
        let listener = Closure::wrap(Box::new(move |event: Event| {
            let dom_event = to_dom_event(kind, &event);
            handler(&dom_event);
            if dom_event.default_prevented() {
                event.prevent_default();
            }
            if dom_event.propagation_stopped() {
                event.stop_propagation();
            }
        }) as Box<dyn FnMut(Event)>);

        if let Err(e) = self
            .element
            .add_event_listener_with_callback(kind.name(), listener.as_ref().unchecked_ref())
        {
            log::warn!("Failed to register {} listener: {:?}", kind.name(), e);
        }
        listener.forget();
    }
}

/// The browser window and its document.
pub struct WebWindow {
    window: web_sys::Window,
    document: web_sys::Document,
}

impl WebWindow {
    pub fn new() -> Result<Self, DomError> {
        let window = web_sys::window()
            .ok_or_else(|| DomError::Js("No window object available".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| DomError::Js("No document available".to_string()))?;
        Ok(Self { window, document })
    }

    /// Shared handle for page controllers.
    pub fn shared() -> Result<WindowRef, DomError> {
        Ok(Rc::new(Self::new()?))
    }

    fn local_storage(&self) -> Result<web_sys::Storage, DomError> {
        self.window
            .local_storage()
            .map_err(|e| DomError::Storage(format!("localStorage access error: {:?}", e)))?
            .ok_or_else(|| DomError::Storage("localStorage not available".to_string()))
    }
}

impl Window for WebWindow {
    fn document_element(&self) -> Option<ElementRef> {
        self.document
            .document_element()
            .and_then(WebElement::shared)
    }

    fn element_by_id(&self, id: &str) -> Option<ElementRef> {
        self.document
            .get_element_by_id(id)
            .and_then(WebElement::shared)
    }

    fn query_selector_all(&self, selector: &str) -> Vec<ElementRef> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Invalid selector '{}': {:?}", selector, e);
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .filter_map(WebElement::shared)
            .collect()
    }

    fn is_loading(&self) -> bool {
        self.document.ready_state() == "loading"
    }

    fn on_ready(&self, callback: Box<dyn FnOnce()>) {
        let listener = Closure::once_into_js(move || callback());
        if let Err(e) = self
            .document
            .add_event_listener_with_callback("DOMContentLoaded", listener.unchecked_ref())
        {
            log::warn!("Failed to register DOMContentLoaded listener: {:?}", e);
        }
    }

    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            log::warn!("alert() failed: {:?}", e);
        }
    }

    fn confirm(&self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or(false)
    }

    fn reload(&self) {
        if let Err(e) = self.window.location().reload() {
            log::error!("Page reload failed: {:?}", e);
        }
    }

    fn scroll_to_top(&self) {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn storage_get(&self, key: &str) -> Result<Option<String>, DomError> {
        self.local_storage()?
            .get_item(key)
            .map_err(|e| DomError::Storage(format!("Failed to read '{}': {:?}", key, e)))
    }

    fn storage_set(&self, key: &str, value: &str) -> Result<(), DomError> {
        self.local_storage()?
            .set_item(key, value)
            .map_err(|e| DomError::Storage(format!("Failed to save '{}': {:?}", key, e)))
    }

    fn read_data_url(&self, file: FileRef, done: ReadCallback) {
        let name = file.name();
        let Some(web_file) = file.as_any().downcast_ref::<WebFile>() else {
            done(Err(DomError::FileRead {
                name,
                message: "not a browser file".to_string(),
            }));
            return;
        };

        let reader = match FileReader::new() {
            Ok(reader) => reader,
            Err(e) => {
                done(Err(js_error(&e)));
                return;
            }
        };

        // onload and onerror race for the single completion callback
        let done = Rc::new(RefCell::new(Some(done)));

        let done_load = done.clone();
        let name_load = name.clone();
        let onload = Closure::wrap(Box::new(move |event: Event| {
            let result = event
                .target()
                .and_then(|t| t.dyn_into::<FileReader>().ok())
                .and_then(|reader| reader.result().ok())
                .and_then(|value| value.as_string())
                .ok_or_else(|| DomError::FileRead {
                    name: name_load.clone(),
                    message: "reader produced no data URL".to_string(),
                });
            let callback = done_load.borrow_mut().take();
            if let Some(callback) = callback {
                callback(result);
            }
        }) as Box<dyn FnMut(Event)>);

        let done_error = done.clone();
        let name_error = name.clone();
        let onerror = Closure::wrap(Box::new(move |_event: Event| {
            let callback = done_error.borrow_mut().take();
            if let Some(callback) = callback {
                callback(Err(DomError::FileRead {
                    name: name_error.clone(),
                    message: "FileReader reported an error".to_string(),
                }));
            }
        }) as Box<dyn FnMut(Event)>);

        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onload.forget();
        onerror.forget();

        if let Err(e) = reader.read_as_data_url(web_file.file()) {
            let callback = done.borrow_mut().take();
            if let Some(callback) = callback {
                callback(Err(js_error(&e)));
            }
        }
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

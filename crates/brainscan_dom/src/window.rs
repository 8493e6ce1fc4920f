//! Page-level capabilities: lookup, dialogs, storage, file reading, tasks.

use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::element::ElementRef;
use crate::error::DomError;
use crate::file::FileRef;

/// Shared handle to the page.
pub type WindowRef = Rc<dyn Window>;

/// Completion callback for [`Window::read_data_url`].
pub type ReadCallback = Box<dyn FnOnce(Result<String, DomError>)>;

/// Everything page logic needs from `window` and `document`.
pub trait Window {
    /// The `<html>` element.
    fn document_element(&self) -> Option<ElementRef>;

    fn element_by_id(&self, id: &str) -> Option<ElementRef>;

    /// All elements matching a simple selector, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<ElementRef>;

    /// First element matching a simple selector.
    fn query_selector(&self, selector: &str) -> Option<ElementRef> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// Look up an element by id, failing if the markup lacks it.
    fn require_element(&self, id: &str) -> Result<ElementRef, DomError> {
        self.element_by_id(id)
            .ok_or_else(|| DomError::MissingElement { id: id.to_string() })
    }

    /// True while `document.readyState` is `"loading"`.
    fn is_loading(&self) -> bool;

    /// Run `callback` on `DOMContentLoaded`.
    fn on_ready(&self, callback: Box<dyn FnOnce()>);

    /// Run `callback` now, or on `DOMContentLoaded` if still loading.
    fn when_ready(&self, callback: Box<dyn FnOnce()>) {
        if self.is_loading() {
            self.on_ready(callback);
        } else {
            callback();
        }
    }

    /// Blocking alert.
    fn alert(&self, message: &str);

    /// Blocking yes/no prompt.
    fn confirm(&self, message: &str) -> bool;

    /// Full page reload.
    fn reload(&self);

    /// Smoothly scroll the page back to the top.
    fn scroll_to_top(&self);

    fn storage_get(&self, key: &str) -> Result<Option<String>, DomError>;
    fn storage_set(&self, key: &str, value: &str) -> Result<(), DomError>;

    /// Read a file into a `data:` URL. `done` runs once the read finishes.
    fn read_data_url(&self, file: FileRef, done: ReadCallback);

    /// Run a future on the page's event loop.
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

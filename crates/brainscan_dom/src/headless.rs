//! In-memory document backend.
//!
//! Mirrors just enough browser behaviour for page logic to run without a
//! browser: element state, event bubbling with `stopPropagation`, blocking
//! dialogs (recorded, with a scripted confirm answer), local storage,
//! deferred `FileReader` completions and a local task pool standing in for
//! `spawn_local`. Tests drive asynchronous work explicitly through
//! [`HeadlessWindow::complete_file_reads`] and
//! [`HeadlessWindow::run_until_stalled`].

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

use crate::element::{Element, ElementRef};
use crate::error::DomError;
use crate::event::{DomEvent, EventKind, Handler};
use crate::file::{FileBlob, FileRef};
use crate::window::{ReadCallback, Window};

type SharedHandler = Rc<RefCell<Handler>>;

#[derive(Default)]
struct ElementState {
    text: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    classes: Vec<String>,
    disabled: bool,
    checked: bool,
    value: String,
    children: Vec<Rc<HeadlessElement>>,
    clicks: usize,
    scrolled_into_view: usize,
}

/// Outcome of [`HeadlessElement::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatched {
    /// Some handler called `prevent_default`
    pub default_prevented: bool,
    /// Some handler called `stop_propagation`
    pub propagation_stopped: bool,
}

/// An element of the headless document.
pub struct HeadlessElement {
    tag: String,
    id: Option<String>,
    this: Weak<HeadlessElement>,
    parent: RefCell<Weak<HeadlessElement>>,
    state: RefCell<ElementState>,
    listeners: RefCell<Vec<(EventKind, SharedHandler)>>,
}

impl HeadlessElement {
    /// Create a detached element.
    pub fn new(tag: &str) -> Rc<Self> {
        Self::build(tag, None)
    }

    /// Create a detached element with an id.
    pub fn with_id(tag: &str, id: &str) -> Rc<Self> {
        Self::build(tag, Some(id.to_string()))
    }

    fn build(tag: &str, id: Option<String>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            tag: tag.to_ascii_lowercase(),
            id,
            this: this.clone(),
            parent: RefCell::new(Weak::new()),
            state: RefCell::new(ElementState::default()),
            listeners: RefCell::new(Vec::new()),
        })
    }

    /// Append `child`, moving it out of any previous parent.
    pub fn append(&self, child: &Rc<HeadlessElement>) {
        if let Some(old_parent) = child.parent.borrow().upgrade() {
            old_parent
                .state
                .borrow_mut()
                .children
                .retain(|c| !Rc::ptr_eq(c, child));
        }
        *child.parent.borrow_mut() = self.this.clone();
        self.state.borrow_mut().children.push(child.clone());
    }

    /// Builder-style class addition for test fixtures.
    pub fn with_class(self: Rc<Self>, class: &str) -> Rc<Self> {
        self.add_class(class);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Number of programmatic or dispatched clicks received.
    pub fn click_count(&self) -> usize {
        self.state.borrow().clicks
    }

    /// Number of `scroll_into_view` requests.
    pub fn scroll_count(&self) -> usize {
        self.state.borrow().scrolled_into_view
    }

    /// Number of handlers registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Dispatch an event that carries no files.
    pub fn fire(&self, kind: EventKind) -> Dispatched {
        self.dispatch(kind, Vec::new())
    }

    /// Dispatch an event on this element and bubble it through ancestors.
    ///
    /// Disabled elements swallow clicks, as disabled form controls do.
    pub fn dispatch(&self, kind: EventKind, files: Vec<FileRef>) -> Dispatched {
        if kind == EventKind::Click && self.is_disabled() {
            return Dispatched::default();
        }
        if kind == EventKind::Click {
            self.state.borrow_mut().clicks += 1;
        }

        let mut outcome = Dispatched::default();
        let mut current = self.this.upgrade();
        let mut at_target = true;

        while let Some(element) = current {
            let event = DomEvent::new(kind)
                .with_files(files.clone())
                .with_target_is_current(at_target);

            // Clone out the handler list so handlers may register more listeners.
            let handlers: Vec<SharedHandler> = element
                .listeners
                .borrow()
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, h)| h.clone())
                .collect();
            for handler in handlers {
                // A handler that re-triggers its own event is not re-entered,
                // as browsers do for synthetic clicks.
                if let Ok(mut handler) = handler.try_borrow_mut() {
                    (*handler)(&event);
                }
            }

            outcome.default_prevented |= event.default_prevented();
            if event.propagation_stopped() {
                outcome.propagation_stopped = true;
                break;
            }

            current = element.parent.borrow().upgrade();
            at_target = false;
        }

        outcome
    }

    fn matches(&self, selector: &str) -> bool {
        if let Some(class) = selector.strip_prefix('.') {
            self.has_class(class)
        } else if let Some(id) = selector.strip_prefix('#') {
            self.id.as_deref() == Some(id)
        } else {
            self.tag.eq_ignore_ascii_case(selector)
        }
    }

    fn collect_matching(self: &Rc<Self>, selector: &str, out: &mut Vec<Rc<HeadlessElement>>) {
        if self.matches(selector) {
            out.push(self.clone());
        }
        let children = self.state.borrow().children.clone();
        for child in children {
            child.collect_matching(selector, out);
        }
    }

    fn find_descendant(&self, selector: &str) -> Option<Rc<HeadlessElement>> {
        let children = self.state.borrow().children.clone();
        for child in children {
            if child.matches(selector) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(selector) {
                return Some(found);
            }
        }
        None
    }
}

impl Element for HeadlessElement {
    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn set_text(&self, text: &str) {
        let mut state = self.state.borrow_mut();
        state.children.clear();
        state.text = text.to_string();
    }

    fn text(&self) -> String {
        let state = self.state.borrow();
        let mut text = state.text.clone();
        for child in &state.children {
            text.push_str(&child.text());
        }
        text
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.state.borrow().attributes.get(name).cloned()
    }

    fn set_style(&self, property: &str, value: &str) {
        self.state
            .borrow_mut()
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn style(&self, property: &str) -> Option<String> {
        self.state.borrow().styles.get(property).cloned()
    }

    fn add_class(&self, class: &str) {
        let mut state = self.state.borrow_mut();
        if !state.classes.iter().any(|c| c == class) {
            state.classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.state.borrow_mut().classes.retain(|c| c != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.state.borrow().classes.iter().any(|c| c == class)
    }

    fn set_disabled(&self, disabled: bool) {
        self.state.borrow_mut().disabled = disabled;
    }

    fn is_disabled(&self) -> bool {
        self.state.borrow().disabled
    }

    fn set_checked(&self, checked: bool) {
        self.state.borrow_mut().checked = checked;
    }

    fn is_checked(&self) -> bool {
        self.state.borrow().checked
    }

    fn set_value(&self, value: &str) {
        self.state.borrow_mut().value = value.to_string();
    }

    fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    fn click(&self) {
        self.fire(EventKind::Click);
    }

    fn scroll_into_view(&self) {
        self.state.borrow_mut().scrolled_into_view += 1;
    }

    fn clear_children(&self) {
        let children = std::mem::take(&mut self.state.borrow_mut().children);
        for child in children {
            *child.parent.borrow_mut() = Weak::new();
        }
    }

    fn append_element(&self, tag: &str, class: &str) -> Result<ElementRef, DomError> {
        let child = HeadlessElement::new(tag);
        for class in class.split_whitespace() {
            child.add_class(class);
        }
        self.append(&child);
        Ok(child)
    }

    fn children(&self) -> Vec<ElementRef> {
        self.state
            .borrow()
            .children
            .iter()
            .map(|c| c.clone() as ElementRef)
            .collect()
    }

    fn query_selector(&self, selector: &str) -> Option<ElementRef> {
        self.find_descendant(selector).map(|e| e as ElementRef)
    }

    fn add_listener(&self, kind: EventKind, handler: Handler) {
        self.listeners
            .borrow_mut()
            .push((kind, Rc::new(RefCell::new(handler))));
    }
}

/// An in-memory file.
pub struct MemoryFile {
    name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl MemoryFile {
    pub fn new(name: &str, media_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            media_type: media_type.to_string(),
            bytes,
        }
    }

    /// Convenience constructor returning a shared handle.
    pub fn shared(name: &str, media_type: &str, bytes: Vec<u8>) -> FileRef {
        Rc::new(Self::new(name, media_type, bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The `data:` URL a `FileReader` would produce.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

impl FileBlob for MemoryFile {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn media_type(&self) -> String {
        self.media_type.clone()
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The headless page.
pub struct HeadlessWindow {
    root: Rc<HeadlessElement>,
    loading: Cell<bool>,
    ready_callbacks: RefCell<Vec<Box<dyn FnOnce()>>>,
    alerts: RefCell<Vec<String>>,
    confirms: RefCell<Vec<String>>,
    confirm_answer: Cell<bool>,
    reloads: Cell<usize>,
    scrolls_to_top: Cell<usize>,
    storage: RefCell<BTreeMap<String, String>>,
    storage_available: Cell<bool>,
    fail_reads: Cell<bool>,
    pending_reads: RefCell<Vec<(FileRef, ReadCallback)>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl HeadlessWindow {
    /// An empty, fully loaded document.
    pub fn new() -> Rc<Self> {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Rc::new(Self {
            root: HeadlessElement::new("html"),
            loading: Cell::new(false),
            ready_callbacks: RefCell::new(Vec::new()),
            alerts: RefCell::new(Vec::new()),
            confirms: RefCell::new(Vec::new()),
            confirm_answer: Cell::new(false),
            reloads: Cell::new(0),
            scrolls_to_top: Cell::new(0),
            storage: RefCell::new(BTreeMap::new()),
            storage_available: Cell::new(true),
            fail_reads: Cell::new(false),
            pending_reads: RefCell::new(Vec::new()),
            pool: RefCell::new(pool),
            spawner,
        })
    }

    /// The `<html>` element as its concrete type.
    pub fn root(&self) -> &Rc<HeadlessElement> {
        &self.root
    }

    /// Create an element with an id and attach it under the root.
    pub fn add_element(&self, tag: &str, id: &str) -> Rc<HeadlessElement> {
        let element = HeadlessElement::with_id(tag, id);
        self.root.append(&element);
        element
    }

    /// Put the document back into the `loading` ready state.
    pub fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }

    /// Leave the `loading` state and fire `DOMContentLoaded` callbacks.
    pub fn finish_loading(&self) {
        self.loading.set(false);
        let callbacks = std::mem::take(&mut *self.ready_callbacks.borrow_mut());
        for callback in callbacks {
            callback();
        }
    }

    /// Messages shown through `alert`, oldest first.
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    /// Prompts shown through `confirm`, oldest first.
    pub fn confirms(&self) -> Vec<String> {
        self.confirms.borrow().clone()
    }

    /// Answer every subsequent `confirm` with `answer`.
    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.set(answer);
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.get()
    }

    pub fn scroll_to_top_count(&self) -> usize {
        self.scrolls_to_top.get()
    }

    /// Direct read of local storage, bypassing availability.
    pub fn storage_item(&self, key: &str) -> Option<String> {
        self.storage.borrow().get(key).cloned()
    }

    /// Seed local storage, as a previous page load would have.
    pub fn set_storage_item(&self, key: &str, value: &str) {
        self.storage
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    /// Simulate storage being disabled (private browsing, quota).
    pub fn set_storage_available(&self, available: bool) {
        self.storage_available.set(available);
    }

    /// Make pending and future file reads fail.
    pub fn fail_file_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Number of reads waiting for [`Self::complete_file_reads`].
    pub fn pending_file_reads(&self) -> usize {
        self.pending_reads.borrow().len()
    }

    /// Finish every pending file read, returning how many completed.
    pub fn complete_file_reads(&self) -> usize {
        let reads = std::mem::take(&mut *self.pending_reads.borrow_mut());
        let count = reads.len();
        for (file, done) in reads {
            let result = if self.fail_reads.get() {
                Err(DomError::FileRead {
                    name: file.name(),
                    message: "read aborted".to_string(),
                })
            } else {
                match file.as_any().downcast_ref::<MemoryFile>() {
                    Some(memory) => Ok(memory.data_url()),
                    None => Err(DomError::FileRead {
                        name: file.name(),
                        message: "not an in-memory file".to_string(),
                    }),
                }
            };
            done(result);
        }
        count
    }

    /// Poll spawned tasks until none can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }
}

impl Window for HeadlessWindow {
    fn document_element(&self) -> Option<ElementRef> {
        Some(self.root.clone())
    }

    fn element_by_id(&self, id: &str) -> Option<ElementRef> {
        let mut found = Vec::new();
        self.root.collect_matching(&format!("#{id}"), &mut found);
        found.into_iter().next().map(|e| e as ElementRef)
    }

    fn query_selector_all(&self, selector: &str) -> Vec<ElementRef> {
        let mut found = Vec::new();
        self.root.collect_matching(selector, &mut found);
        found.into_iter().map(|e| e as ElementRef).collect()
    }

    fn is_loading(&self) -> bool {
        self.loading.get()
    }

    fn on_ready(&self, callback: Box<dyn FnOnce()>) {
        self.ready_callbacks.borrow_mut().push(callback);
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirms.borrow_mut().push(message.to_string());
        self.confirm_answer.get()
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }

    fn scroll_to_top(&self) {
        self.scrolls_to_top.set(self.scrolls_to_top.get() + 1);
    }

    fn storage_get(&self, key: &str) -> Result<Option<String>, DomError> {
        if !self.storage_available.get() {
            return Err(DomError::Storage("localStorage not available".to_string()));
        }
        Ok(self.storage_item(key))
    }

    fn storage_set(&self, key: &str, value: &str) -> Result<(), DomError> {
        if !self.storage_available.get() {
            return Err(DomError::Storage("localStorage not available".to_string()));
        }
        self.set_storage_item(key, value);
        Ok(())
    }

    fn read_data_url(&self, file: FileRef, done: ReadCallback) {
        self.pending_reads.borrow_mut().push((file, done));
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawner.spawn_local(task) {
            log::error!("Failed to spawn task: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_bubbles_to_ancestors() {
        let window = HeadlessWindow::new();
        let zone = window.add_element("div", "zone");
        let button = HeadlessElement::with_id("button", "inner");
        zone.append(&button);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        zone.add_listener(
            EventKind::Click,
            Box::new(move |e: &DomEvent| seen_clone.borrow_mut().push(e.target_is_current())),
        );

        button.fire(EventKind::Click);
        zone.fire(EventKind::Click);

        assert_eq!(*seen.borrow(), vec![false, true]);
    }

    #[test]
    fn test_stop_propagation_halts_bubbling() {
        let window = HeadlessWindow::new();
        let zone = window.add_element("div", "zone");
        let button = HeadlessElement::with_id("button", "inner");
        zone.append(&button);

        let zone_clicks = Rc::new(Cell::new(0));
        let counter = zone_clicks.clone();
        zone.add_listener(
            EventKind::Click,
            Box::new(move |_: &DomEvent| counter.set(counter.get() + 1)),
        );
        button.add_listener(
            EventKind::Click,
            Box::new(|e: &DomEvent| e.stop_propagation()),
        );

        let outcome = button.fire(EventKind::Click);
        assert!(outcome.propagation_stopped);
        assert_eq!(zone_clicks.get(), 0);
    }

    #[test]
    fn test_query_selectors() {
        let window = HeadlessWindow::new();
        let list = window.add_element("div", "list");
        list.append_element("img", "history-thumbnail").unwrap();
        list.append_element("img", "history-thumbnail other").unwrap();
        list.append_element("span", "close-modal").unwrap();

        assert_eq!(window.query_selector_all(".history-thumbnail").len(), 2);
        assert!(window.query_selector(".close-modal").is_some());
        assert!(window.element_by_id("list").is_some());
        assert!(window.element_by_id("missing").is_none());
        assert!(list.query_selector("span").is_some());
        assert!(matches!(
            window.require_element("missing"),
            Err(DomError::MissingElement { .. })
        ));
    }

    #[test]
    fn test_set_text_replaces_children() {
        let parent = HeadlessElement::new("div");
        let child = parent.append_element("span", "a").unwrap();
        child.set_text("inner");
        assert_eq!(parent.text(), "inner");

        parent.set_text("plain");
        assert!(parent.children().is_empty());
        assert_eq!(parent.text(), "plain");
    }

    #[test]
    fn test_file_reads_complete_on_demand() {
        let window = HeadlessWindow::new();
        let result = Rc::new(RefCell::new(None));
        let sink = result.clone();

        window.read_data_url(
            MemoryFile::shared("a.png", "image/png", vec![1, 2, 3]),
            Box::new(move |r| *sink.borrow_mut() = Some(r)),
        );
        assert_eq!(window.pending_file_reads(), 1);
        assert!(result.borrow().is_none());

        assert_eq!(window.complete_file_reads(), 1);
        assert_eq!(
            *result.borrow(),
            Some(Ok("data:image/png;base64,AQID".to_string()))
        );
    }

    #[test]
    fn test_storage_unavailable() {
        let window = HeadlessWindow::new();
        window.set_storage_available(false);
        assert!(window.storage_set("theme", "light").is_err());
        assert!(window.storage_get("theme").is_err());
        assert_eq!(window.storage_item("theme"), None);
    }

    #[test]
    fn test_spawned_tasks_run_when_polled() {
        let window = HeadlessWindow::new();
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        window.spawn(Box::pin(async move { flag.set(true) }));

        assert!(!done.get());
        window.run_until_stalled();
        assert!(done.get());
    }

    #[test]
    fn test_ready_callbacks_deferred_while_loading() {
        let window = HeadlessWindow::new();
        window.set_loading(true);
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        window.on_ready(Box::new(move || flag.set(true)));

        assert!(!ran.get());
        window.finish_loading();
        assert!(ran.get());
        assert!(!window.is_loading());
    }

    #[test]
    fn test_image_source_reads_src_attribute() {
        let image = HeadlessElement::new("img");
        assert_eq!(image.src(), None);
        image.set_attribute("src", "/static/uploads/a.png");
        assert_eq!(image.src().as_deref(), Some("/static/uploads/a.png"));
    }
}

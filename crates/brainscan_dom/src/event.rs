//! Events delivered to registered handlers.

use std::cell::Cell;

use crate::file::FileRef;

/// Event types the pages listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Change,
    DragOver,
    DragLeave,
    Drop,
}

impl EventKind {
    /// DOM event type name.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Change => "change",
            EventKind::DragOver => "dragover",
            EventKind::DragLeave => "dragleave",
            EventKind::Drop => "drop",
        }
    }
}

/// Event handler registered on an element.
pub type Handler = Box<dyn FnMut(&DomEvent)>;

/// A backend-neutral snapshot of a DOM event.
///
/// Handlers request `preventDefault`/`stopPropagation` through flags; the
/// backend applies them once the handler returns.
#[derive(Debug)]
pub struct DomEvent {
    kind: EventKind,
    files: Vec<FileRef>,
    target_is_current: bool,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl DomEvent {
    /// Create an event that was dispatched on the listening element itself.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            files: Vec::new(),
            target_is_current: true,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Attach files (dropped files or an input's selection).
    pub fn with_files(mut self, files: Vec<FileRef>) -> Self {
        self.files = files;
        self
    }

    /// Mark whether the listening element is the event's original target.
    pub fn with_target_is_current(mut self, target_is_current: bool) -> Self {
        self.target_is_current = target_is_current;
        self
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Files carried by the event.
    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    /// First carried file, if any.
    pub fn first_file(&self) -> Option<FileRef> {
        self.files.first().cloned()
    }

    /// True when the listener sits on the element that was actually clicked,
    /// not on an ancestor the event bubbled to.
    pub fn target_is_current(&self) -> bool {
        self.target_is_current
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

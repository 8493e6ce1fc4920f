//! Image selection: browse, drag and drop, validation, preview and reset.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use brainscan_dom::{
    Display, DomError, DomEvent, ElementRef, EventKind, FileRef, Window, WindowRef,
};

use crate::constants::{IMAGE_MEDIA_PREFIX, dom};
use crate::error::PredictError;

/// The elements the upload widget drives.
#[derive(Clone)]
pub struct UploadElements {
    pub drop_zone: ElementRef,
    pub file_input: ElementRef,
    pub preview_image: ElementRef,
    pub preview_container: ElementRef,
    pub remove_button: ElementRef,
    pub analyze_button: ElementRef,
}

impl UploadElements {
    /// Resolve every element by its id.
    pub fn from_window(window: &dyn Window) -> Result<Self, DomError> {
        Ok(Self {
            drop_zone: window.require_element(dom::DROP_ZONE)?,
            file_input: window.require_element(dom::FILE_INPUT)?,
            preview_image: window.require_element(dom::IMAGE_PREVIEW)?,
            preview_container: window.require_element(dom::PREVIEW_CONTAINER)?,
            remove_button: window.require_element(dom::REMOVE_BUTTON)?,
            analyze_button: window.require_element(dom::ANALYZE_BUTTON)?,
        })
    }
}

/// A file that passed validation and is waiting to be analyzed.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    file: FileRef,
}

impl SelectedFile {
    /// Accept `file` if its declared media type is `image/*`.
    pub fn new(file: FileRef) -> Result<Self, PredictError> {
        let media_type = file.media_type();
        if !media_type.starts_with(IMAGE_MEDIA_PREFIX) {
            return Err(PredictError::InvalidMediaType {
                name: file.name(),
                media_type,
            });
        }
        Ok(Self { file })
    }

    pub fn file(&self) -> FileRef {
        self.file.clone()
    }

    pub fn name(&self) -> String {
        self.file.name()
    }

    pub fn media_type(&self) -> String {
        self.file.media_type()
    }

    fn is(&self, file: &FileRef) -> bool {
        Rc::ptr_eq(&self.file, file)
    }
}

/// Drop zone plus preview.
pub struct UploadWidget {
    window: WindowRef,
    elements: UploadElements,
    selected: RefCell<Option<SelectedFile>>,
    previewing: Cell<bool>,
    this: Weak<UploadWidget>,
}

impl UploadWidget {
    pub fn new(window: WindowRef, elements: UploadElements) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            window,
            elements,
            selected: RefCell::new(None),
            previewing: Cell::new(false),
            this: this.clone(),
        })
    }

    pub fn elements(&self) -> &UploadElements {
        &self.elements
    }

    /// The currently selected file.
    pub fn selected_file(&self) -> Option<SelectedFile> {
        self.selected.borrow().clone()
    }

    /// True once the preview of the selected file is on screen.
    pub fn is_previewing(&self) -> bool {
        self.previewing.get()
    }

    /// Register the drop zone, file input and remove button handlers.
    pub fn bind(&self) {
        let drop_zone = &self.elements.drop_zone;

        let file_input = self.elements.file_input.clone();
        drop_zone.add_listener(
            EventKind::Click,
            Box::new(move |_: &DomEvent| file_input.click()),
        );

        let zone = drop_zone.clone();
        drop_zone.add_listener(
            EventKind::DragOver,
            Box::new(move |e: &DomEvent| {
                e.prevent_default();
                zone.add_class(dom::DRAG_OVER_CLASS);
            }),
        );

        let zone = drop_zone.clone();
        drop_zone.add_listener(
            EventKind::DragLeave,
            Box::new(move |_: &DomEvent| zone.remove_class(dom::DRAG_OVER_CLASS)),
        );

        let zone = drop_zone.clone();
        let widget = self.this.clone();
        drop_zone.add_listener(
            EventKind::Drop,
            Box::new(move |e: &DomEvent| {
                e.prevent_default();
                zone.remove_class(dom::DRAG_OVER_CLASS);
                if let (Some(widget), Some(file)) = (widget.upgrade(), e.first_file()) {
                    // Rejections are already reported to the user
                    let _ = widget.select_file(file);
                }
            }),
        );

        let widget = self.this.clone();
        self.elements.file_input.add_listener(
            EventKind::Change,
            Box::new(move |e: &DomEvent| {
                if let (Some(widget), Some(file)) = (widget.upgrade(), e.first_file()) {
                    let _ = widget.select_file(file);
                }
            }),
        );

        let widget = self.this.clone();
        self.elements.remove_button.add_listener(
            EventKind::Click,
            Box::new(move |e: &DomEvent| {
                // Keep the drop zone from reopening the file browser
                e.stop_propagation();
                if let Some(widget) = widget.upgrade() {
                    widget.reset();
                }
            }),
        );
    }

    /// Validate and preview a file.
    ///
    /// A non-image is rejected with an alert and leaves everything as it
    /// was. An image replaces the current selection at once; the preview
    /// appears when the data-URL read completes.
    pub fn select_file(&self, file: FileRef) -> Result<(), PredictError> {
        let selected = match SelectedFile::new(file.clone()) {
            Ok(selected) => selected,
            Err(e) => {
                log::warn!("{}", e);
                self.window.alert(&e.user_message());
                return Err(e);
            }
        };

        log::info!(
            "Selected '{}' ({}, {} bytes)",
            selected.name(),
            selected.media_type(),
            file.size()
        );
        *self.selected.borrow_mut() = Some(selected);
        self.previewing.set(false);

        let widget = self.this.clone();
        let pending = file.clone();
        self.window.read_data_url(
            file,
            Box::new(move |result| {
                if let Some(widget) = widget.upgrade() {
                    widget.finish_preview(&pending, result);
                }
            }),
        );
        Ok(())
    }

    fn finish_preview(&self, file: &FileRef, result: Result<String, DomError>) {
        let still_selected = self
            .selected
            .borrow()
            .as_ref()
            .is_some_and(|selected| selected.is(file));
        if !still_selected {
            log::debug!("Discarding preview of '{}': selection changed", file.name());
            return;
        }

        match result {
            Ok(data_url) => {
                self.elements.preview_image.set_attribute("src", &data_url);
                self.elements.preview_container.set_display(Display::Block);
                self.elements.drop_zone.set_display(Display::None);
                self.elements.analyze_button.set_disabled(false);
                self.previewing.set(true);
                log::debug!("Preview ready for '{}'", file.name());
            }
            Err(e) => {
                log::error!("{}", e);
                *self.selected.borrow_mut() = None;
                self.window.alert(crate::constants::messages::NOT_AN_IMAGE);
            }
        }
    }

    /// Back to the empty drop zone. Safe to call repeatedly.
    pub fn reset(&self) {
        *self.selected.borrow_mut() = None;
        self.previewing.set(false);
        // Clearing the value lets re-selecting the same file fire `change`
        self.elements.file_input.set_value("");
        self.elements.preview_image.set_attribute("src", "");
        self.elements.preview_container.set_display(Display::None);
        self.elements.drop_zone.set_display(Display::Block);
        self.elements.analyze_button.set_disabled(true);
        log::debug!("Upload reset");
    }
}

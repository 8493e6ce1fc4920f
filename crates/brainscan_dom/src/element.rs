//! Element capability trait.

use std::rc::Rc;

use crate::error::DomError;
use crate::event::{EventKind, Handler};

/// Shared handle to an element.
pub type ElementRef = Rc<dyn Element>;

/// Values of the CSS `display` property the pages switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    None,
    Block,
    Flex,
    Inline,
    InlineFlex,
}

impl Display {
    /// CSS keyword for this value.
    pub fn as_css(&self) -> &'static str {
        match self {
            Display::None => "none",
            Display::Block => "block",
            Display::Flex => "flex",
            Display::Inline => "inline",
            Display::InlineFlex => "inline-flex",
        }
    }

    /// Parse a CSS keyword.
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim() {
            "none" => Some(Display::None),
            "block" => Some(Display::Block),
            "flex" => Some(Display::Flex),
            "inline" => Some(Display::Inline),
            "inline-flex" => Some(Display::InlineFlex),
            _ => None,
        }
    }
}

/// The operations page logic performs on a single element.
///
/// Setters are infallible from the caller's point of view. Backends that can
/// fail (the browser) log the failure and carry on, the same way the pages
/// treated a missing style or attribute before.
pub trait Element {
    /// Element id, if any.
    fn id(&self) -> Option<String>;

    /// Replace the text content.
    fn set_text(&self, text: &str);
    /// Current text content.
    fn text(&self) -> String;

    fn set_attribute(&self, name: &str, value: &str);
    fn attribute(&self, name: &str) -> Option<String>;

    /// Image source as the browser resolved it (`img.src`), absolute for
    /// relative markup. Falls back to the raw `src` attribute.
    fn src(&self) -> Option<String> {
        self.attribute("src")
    }

    /// Set an inline style property, e.g. `("width", "42.00%")`.
    fn set_style(&self, property: &str, value: &str);
    /// Inline style property value, if set.
    fn style(&self, property: &str) -> Option<String>;

    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;

    fn set_disabled(&self, disabled: bool);
    fn is_disabled(&self) -> bool;

    /// Checked state of a checkbox input.
    fn set_checked(&self, checked: bool);
    fn is_checked(&self) -> bool;

    /// Value of an input element.
    fn set_value(&self, value: &str);
    fn value(&self) -> String;

    /// Programmatic click, e.g. to open the native file browser.
    fn click(&self);

    /// Smoothly scroll the element into view.
    fn scroll_into_view(&self);

    /// Remove every child.
    fn clear_children(&self);

    /// Create a child element with a class name and append it.
    fn append_element(&self, tag: &str, class: &str) -> Result<ElementRef, DomError>;

    /// Direct children, in document order.
    fn children(&self) -> Vec<ElementRef>;

    /// First descendant matching a simple selector (`.class`, `#id` or tag).
    fn query_selector(&self, selector: &str) -> Option<ElementRef>;

    /// Register a handler for an event on this element.
    fn add_listener(&self, kind: EventKind, handler: Handler);

    /// Set the CSS `display` property.
    fn set_display(&self, display: Display) {
        self.set_style("display", display.as_css());
    }

    /// Current CSS `display` property, if set inline.
    fn display(&self) -> Option<Display> {
        self.style("display").as_deref().and_then(Display::from_css)
    }

    /// Whether the element has been hidden inline with `display: none`.
    fn is_hidden(&self) -> bool {
        self.display() == Some(Display::None)
    }
}

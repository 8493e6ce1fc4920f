//! Light/dark theme toggle shared by every page.
//!
//! The stylesheet keys off `data-theme` on `<html>`; the choice survives
//! reloads through local storage.

use std::rc::Rc;

use brainscan_dom::{DomEvent, ElementRef, EventKind, WindowRef};

use crate::constants::dom;

/// Theme choice - dark or light mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    Light,
    #[default]
    Dark,
}

impl ThemePreference {
    /// Value stored in local storage and in `data-theme`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemePreference::Light),
            "dark" => Some(ThemePreference::Dark),
            _ => None,
        }
    }

    /// The toggle is checked for light mode.
    pub fn from_checked(checked: bool) -> Self {
        if checked {
            ThemePreference::Light
        } else {
            ThemePreference::Dark
        }
    }
}

/// Binds one toggle to the document theme.
pub struct ThemeController {
    window: WindowRef,
    root: ElementRef,
    toggle: ElementRef,
    storage_key: String,
}

impl ThemeController {
    pub fn new(
        window: WindowRef,
        root: ElementRef,
        toggle: ElementRef,
        storage_key: impl Into<String>,
    ) -> Rc<Self> {
        Rc::new(Self {
            window,
            root,
            toggle,
            storage_key: storage_key.into(),
        })
    }

    /// Persisted preference, dark if absent or unreadable.
    pub fn load_preference(&self) -> ThemePreference {
        match self.window.storage_get(&self.storage_key) {
            Ok(Some(value)) => ThemePreference::parse(&value).unwrap_or_else(|| {
                log::debug!("Ignoring unknown stored theme '{}'", value);
                ThemePreference::default()
            }),
            Ok(None) => ThemePreference::default(),
            Err(e) => {
                log::warn!("Failed to read theme: {}", e);
                ThemePreference::default()
            }
        }
    }

    /// Set `data-theme` on the document root.
    pub fn apply(&self, preference: ThemePreference) {
        self.root
            .set_attribute(dom::THEME_ATTRIBUTE, preference.as_str());
    }

    /// Theme currently applied to the document.
    pub fn current(&self) -> ThemePreference {
        self.root
            .attribute(dom::THEME_ATTRIBUTE)
            .as_deref()
            .and_then(ThemePreference::parse)
            .unwrap_or_default()
    }

    /// Apply the stored theme, sync the toggle and listen for changes.
    pub fn init(self: &Rc<Self>) {
        let preference = self.load_preference();
        self.apply(preference);
        self.toggle
            .set_checked(preference == ThemePreference::Light);
        log::debug!("Theme initialised to {}", preference.as_str());

        // The listener owns the controller for the life of the page
        let controller = self.clone();
        self.toggle.add_listener(
            EventKind::Change,
            Box::new(move |_: &DomEvent| {
                controller.on_toggle();
            }),
        );
    }

    /// Follow the toggle's new checked state.
    pub fn on_toggle(&self) -> ThemePreference {
        let preference = ThemePreference::from_checked(self.toggle.is_checked());
        self.apply(preference);
        if let Err(e) = self
            .window
            .storage_set(&self.storage_key, preference.as_str())
        {
            log::warn!("Failed to persist theme: {}", e);
        }
        log::info!("Theme switched to {}", preference.as_str());
        preference
    }
}

/// Set up the theme toggle on the current page.
///
/// Runs immediately unless the document is still loading, in which case
/// it waits for `DOMContentLoaded`. Pages without a toggle are left alone.
pub fn mount_theme(window: WindowRef, storage_key: &str) {
    let storage_key = storage_key.to_string();
    let page = window.clone();
    window.when_ready(Box::new(move || {
        let Some(toggle) = page.element_by_id(dom::THEME_TOGGLE) else {
            log::debug!("No theme toggle on this page");
            return;
        };
        let Some(root) = page.document_element() else {
            log::warn!("No document element to theme");
            return;
        };
        let controller = ThemeController::new(page.clone(), root, toggle, storage_key);
        controller.init();
    }));
}

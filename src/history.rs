//! History page: clearing stored predictions and the thumbnail lightbox.

use brainscan_dom::{Display, DomEvent, ElementRef, EventKind, WindowRef};
use serde::Deserialize;

use crate::api::TransportRef;
use crate::constants::messages;
use crate::error::HistoryError;

/// Body of the clear-history endpoint.
#[derive(Debug, Deserialize)]
struct ClearResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// What a clear-history action ended in.
#[derive(Debug, Clone, PartialEq)]
pub enum ClearOutcome {
    /// The user dismissed the confirmation; nothing was sent
    Declined,
    /// History was cleared and the page reloaded
    Cleared,
    /// The request failed and the user was alerted
    Failed(HistoryError),
}

/// Keeps a control disabled while a request is in flight.
struct DisabledGuard {
    control: Option<ElementRef>,
}

impl DisabledGuard {
    fn engage(control: Option<&ElementRef>) -> Self {
        if let Some(control) = control {
            control.set_disabled(true);
        }
        Self {
            control: control.cloned(),
        }
    }
}

impl Drop for DisabledGuard {
    fn drop(&mut self) {
        if let Some(control) = &self.control {
            control.set_disabled(false);
        }
    }
}

/// Confirms with the user, then asks the server to drop all history.
pub struct HistoryController {
    window: WindowRef,
    transport: TransportRef,
    endpoint: String,
    clear_button: Option<ElementRef>,
}

impl HistoryController {
    pub fn new(
        window: WindowRef,
        transport: TransportRef,
        endpoint: impl Into<String>,
        clear_button: Option<ElementRef>,
    ) -> Self {
        Self {
            window,
            transport,
            endpoint: endpoint.into(),
            clear_button,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the clear request and interpret the answer.
    pub async fn request_clear(&self) -> Result<(), HistoryError> {
        let started = web_time::Instant::now();
        let response = self.transport.post_empty(&self.endpoint).await?;
        log::debug!(
            "POST {} -> {} in {:.0?}",
            self.endpoint,
            response.status,
            started.elapsed()
        );

        let body: ClearResponse = serde_json::from_str(&response.body)
            .map_err(|e| HistoryError::Malformed(e.to_string()))?;

        if body.success {
            if let Some(message) = &body.message {
                log::info!("{}", message);
            }
            Ok(())
        } else {
            Err(HistoryError::Server(body.error.filter(|e| !e.is_empty())))
        }
    }

    /// The clear-history button action.
    pub async fn clear_history(&self) -> ClearOutcome {
        if !self.window.confirm(messages::CONFIRM_CLEAR_HISTORY) {
            log::debug!("Clear history cancelled");
            return ClearOutcome::Declined;
        }

        let result = {
            let _busy = DisabledGuard::engage(self.clear_button.as_ref());
            self.request_clear().await
        };

        match result {
            Ok(()) => {
                log::info!("History cleared, reloading");
                self.window.reload();
                ClearOutcome::Cleared
            }
            Err(e) => {
                match &e {
                    HistoryError::Server(_) => log::warn!("{}", e),
                    HistoryError::Transport(_) | HistoryError::Malformed(_) => {
                        log::error!("{}", e)
                    }
                }
                self.window.alert(&e.user_message());
                ClearOutcome::Failed(e)
            }
        }
    }
}

/// Full-size view of a history thumbnail.
#[derive(Clone)]
pub struct ImageLightbox {
    modal: ElementRef,
    image: ElementRef,
}

impl ImageLightbox {
    pub fn new(modal: ElementRef, image: ElementRef) -> Self {
        Self { modal, image }
    }

    pub fn open(&self, src: &str) {
        self.modal.set_display(Display::Flex);
        self.image.set_attribute("src", src);
    }

    pub fn close(&self) {
        self.modal.set_display(Display::None);
    }

    /// The stylesheet hides the modal; only an inline `flex` shows it.
    pub fn is_open(&self) -> bool {
        self.modal.display() == Some(Display::Flex)
    }

    /// Wire thumbnails, the close control, and backdrop clicks.
    ///
    /// Clicks inside the modal content do not close it; only clicks whose
    /// target is the modal itself do.
    pub fn bind(&self, thumbnails: &[ElementRef], close_control: Option<&ElementRef>) {
        for thumbnail in thumbnails {
            let lightbox = self.clone();
            let source = thumbnail.clone();
            thumbnail.add_listener(
                EventKind::Click,
                Box::new(move |_: &DomEvent| match source.src() {
                    Some(src) => lightbox.open(&src),
                    None => log::warn!("Thumbnail has no src"),
                }),
            );
        }

        if let Some(close) = close_control {
            let lightbox = self.clone();
            close.add_listener(
                EventKind::Click,
                Box::new(move |_: &DomEvent| lightbox.close()),
            );
        }

        let lightbox = self.clone();
        self.modal.add_listener(
            EventKind::Click,
            Box::new(move |event: &DomEvent| {
                if event.target_is_current() {
                    lightbox.close();
                }
            }),
        );
        log::debug!("Lightbox bound to {} thumbnails", thumbnails.len());
    }
}

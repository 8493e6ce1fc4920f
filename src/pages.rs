//! Page assembly: resolve elements, build components, bind handlers.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use brainscan_dom::{DomError, DomEvent, ElementRef, EventKind, WindowRef};

use crate::api::TransportRef;
use crate::config::AppConfig;
use crate::constants::{dom, messages};
use crate::history::{HistoryController, ImageLightbox};
use crate::prediction::PredictionClient;
use crate::results::{ResultsElements, ResultsRenderer};
use crate::state::UiState;
use crate::upload::{UploadElements, UploadWidget};

/// The upload and analyze page.
pub struct PredictPage {
    window: WindowRef,
    upload: Rc<UploadWidget>,
    client: PredictionClient,
    results: ResultsRenderer,
    new_analysis_button: ElementRef,
    submitting: Cell<bool>,
    this: Weak<PredictPage>,
}

impl PredictPage {
    /// Bind every control on the prediction page.
    ///
    /// Fails if the markup is missing any element the page drives.
    pub fn mount(
        window: WindowRef,
        transport: TransportRef,
        config: &AppConfig,
    ) -> Result<Rc<Self>, DomError> {
        let upload_elements = UploadElements::from_window(&*window)?;
        let results_elements = ResultsElements::from_window(&*window)?;
        let new_analysis_button = window.require_element(dom::NEW_ANALYSIS_BUTTON)?;

        let analyze_button = upload_elements.analyze_button.clone();
        let upload = UploadWidget::new(window.clone(), upload_elements);
        let client = PredictionClient::new(
            window.clone(),
            transport,
            config.endpoints.predict.clone(),
            analyze_button,
        );
        let results = ResultsRenderer::new(
            window.clone(),
            results_elements,
            upload.clone(),
            config.healthy_class.clone(),
        );

        let page = Rc::new_cyclic(|this| Self {
            window,
            upload,
            client,
            results,
            new_analysis_button,
            submitting: Cell::new(false),
            this: this.clone(),
        });
        page.bind();
        log::info!("Prediction page ready (endpoint {})", page.client.endpoint());
        Ok(page)
    }

    fn bind(&self) {
        self.upload.bind();

        let page = self.this.clone();
        self.upload.elements().analyze_button.add_listener(
            EventKind::Click,
            Box::new(move |_: &DomEvent| {
                if let Some(page) = page.upgrade() {
                    page.submit();
                }
            }),
        );

        let page = self.this.clone();
        self.new_analysis_button.add_listener(
            EventKind::Click,
            Box::new(move |_: &DomEvent| {
                if let Some(page) = page.upgrade() {
                    page.start_new_analysis();
                }
            }),
        );
    }

    pub fn upload(&self) -> &Rc<UploadWidget> {
        &self.upload
    }

    pub fn results(&self) -> &ResultsRenderer {
        &self.results
    }

    pub fn ui_state(&self) -> UiState {
        UiState::derive(
            self.upload.is_previewing(),
            self.submitting.get(),
            self.results.is_showing(),
        )
    }

    /// Send the previewed image for analysis.
    ///
    /// Ignored unless an image is previewed and no request is in flight.
    /// Returns whether a request was started.
    pub fn submit(&self) -> bool {
        if !self.ui_state().can_submit() {
            log::debug!("Analyze ignored in state {:?}", self.ui_state());
            return false;
        }
        let Some(selected) = self.upload.selected_file() else {
            return false;
        };

        self.submitting.set(true);
        let page = self.this.clone();
        self.window.spawn(Box::pin(async move {
            let Some(page) = page.upgrade() else {
                return;
            };
            if let Some(result) = page.client.analyze(selected.file()).await {
                if let Err(e) = page.results.render(&result) {
                    log::error!("Failed to render results: {}", e);
                    page.window.alert(messages::PREDICTION_FAILED);
                }
            }
            page.submitting.set(false);
        }));
        true
    }

    /// Leave the results and return to an empty upload view.
    pub fn start_new_analysis(&self) {
        log::debug!("Starting new analysis");
        self.results.reset();
    }
}

/// The history page: clear button and thumbnail lightbox.
///
/// Every element is optional; an empty history renders neither the
/// thumbnails nor, in some templates, the clear button.
pub struct HistoryPage {
    controller: Rc<HistoryController>,
    lightbox: Option<ImageLightbox>,
}

impl HistoryPage {
    pub fn mount(window: WindowRef, transport: TransportRef, config: &AppConfig) -> Rc<Self> {
        let clear_button = window.element_by_id(dom::CLEAR_HISTORY_BUTTON);
        let controller = Rc::new(HistoryController::new(
            window.clone(),
            transport,
            config.endpoints.clear_history.clone(),
            clear_button.clone(),
        ));

        if let Some(button) = &clear_button {
            let control = button.clone();
            let controller = Rc::downgrade(&controller);
            let spawner = window.clone();
            button.add_listener(
                EventKind::Click,
                Box::new(move |_: &DomEvent| {
                    if control.is_disabled() {
                        return;
                    }
                    let Some(controller) = controller.upgrade() else {
                        return;
                    };
                    spawner.spawn(Box::pin(async move {
                        controller.clear_history().await;
                    }));
                }),
            );
        }

        let lightbox = match (
            window.element_by_id(dom::IMAGE_MODAL),
            window.element_by_id(dom::MODAL_IMAGE),
        ) {
            (Some(modal), Some(image)) => {
                let lightbox = ImageLightbox::new(modal, image);
                let thumbnails = window.query_selector_all(dom::HISTORY_THUMBNAIL);
                let close = window.query_selector(dom::CLOSE_MODAL);
                lightbox.bind(&thumbnails, close.as_ref());
                Some(lightbox)
            }
            _ => {
                log::debug!("No image modal on this page");
                None
            }
        };

        log::info!("History page ready");
        Rc::new(Self {
            controller,
            lightbox,
        })
    }

    pub fn controller(&self) -> &HistoryController {
        &self.controller
    }

    pub fn lightbox(&self) -> Option<&ImageLightbox> {
        self.lightbox.as_ref()
    }
}

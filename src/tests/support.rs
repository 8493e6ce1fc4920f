//! Shared fixtures for page tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use brainscan_dom::headless::{HeadlessElement, HeadlessWindow};
use brainscan_dom::{Display, Element, FileRef, LocalBoxFuture};
use futures::channel::oneshot;

use crate::api::{ApiTransport, HttpResponse, TransportError};
use crate::constants::dom;

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

/// A request the transport received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub url: String,
    /// Multipart field and file name, for file uploads
    pub upload: Option<(String, String)>,
}

type Reply = Result<HttpResponse, TransportError>;

enum Scripted {
    Now(Reply),
    Later(oneshot::Receiver<Reply>),
}

/// Transport that replays queued replies and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    requests: RefCell<Vec<Recorded>>,
    replies: RefCell<VecDeque<Scripted>>,
}

impl ScriptedTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Queue an immediate reply.
    pub fn reply(&self, reply: Reply) {
        self.replies.borrow_mut().push_back(Scripted::Now(reply));
    }

    /// Queue a JSON body with the given status.
    pub fn reply_json(&self, status: u16, body: &str) {
        self.reply(Ok(HttpResponse::new(status, body)));
    }

    /// Queue a reply the test releases later through the returned sender.
    pub fn reply_later(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.replies.borrow_mut().push_back(Scripted::Later(rx));
        tx
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.borrow().clone()
    }

    fn next(&self, recorded: Recorded) -> LocalBoxFuture<'static, Reply> {
        self.requests.borrow_mut().push(recorded);
        let scripted = self.replies.borrow_mut().pop_front();
        Box::pin(async move {
            match scripted {
                Some(Scripted::Now(reply)) => reply,
                Some(Scripted::Later(rx)) => rx
                    .await
                    .unwrap_or_else(|_| Err(TransportError::Network("reply dropped".to_string()))),
                None => Err(TransportError::Network("no scripted reply".to_string())),
            }
        })
    }
}

impl ApiTransport for ScriptedTransport {
    fn post_file(&self, url: &str, field: &str, file: FileRef) -> LocalBoxFuture<'static, Reply> {
        self.next(Recorded {
            url: url.to_string(),
            upload: Some((field.to_string(), file.name())),
        })
    }

    fn post_empty(&self, url: &str) -> LocalBoxFuture<'static, Reply> {
        self.next(Recorded {
            url: url.to_string(),
            upload: None,
        })
    }
}

/// The prediction page markup, as the server template renders it.
pub struct PredictMarkup {
    pub window: Rc<HeadlessWindow>,
    pub theme_toggle: Rc<HeadlessElement>,
    pub upload_section: Rc<HeadlessElement>,
    pub drop_zone: Rc<HeadlessElement>,
    pub file_input: Rc<HeadlessElement>,
    pub preview_container: Rc<HeadlessElement>,
    pub image_preview: Rc<HeadlessElement>,
    pub remove_button: Rc<HeadlessElement>,
    pub analyze_button: Rc<HeadlessElement>,
    pub button_text: Rc<HeadlessElement>,
    pub button_loader: Rc<HeadlessElement>,
    pub results_section: Rc<HeadlessElement>,
    pub result_class: Rc<HeadlessElement>,
    pub result_icon: Rc<HeadlessElement>,
    pub confidence_value: Rc<HeadlessElement>,
    pub confidence_fill: Rc<HeadlessElement>,
    pub predictions_grid: Rc<HeadlessElement>,
    pub new_analysis_button: Rc<HeadlessElement>,
}

fn child(parent: &HeadlessElement, tag: &str, id: &str) -> Rc<HeadlessElement> {
    let element = HeadlessElement::with_id(tag, id);
    parent.append(&element);
    element
}

impl PredictMarkup {
    pub fn build() -> Self {
        let window = HeadlessWindow::new();
        let theme_toggle = window.add_element("input", dom::THEME_TOGGLE);

        let upload_section = window.add_element("section", dom::UPLOAD_SECTION);
        let drop_zone = child(&upload_section, "div", dom::DROP_ZONE);
        let file_input = child(&drop_zone, "input", dom::FILE_INPUT);
        let preview_container = child(&upload_section, "div", dom::PREVIEW_CONTAINER);
        preview_container.set_display(Display::None);
        let image_preview = child(&preview_container, "img", dom::IMAGE_PREVIEW);
        let remove_button = child(&preview_container, "button", dom::REMOVE_BUTTON);

        let analyze_button = child(&upload_section, "button", dom::ANALYZE_BUTTON);
        analyze_button.set_disabled(true);
        let button_text = HeadlessElement::new("span").with_class("btn-text");
        let button_loader = HeadlessElement::new("span").with_class("btn-loader");
        button_loader.set_display(Display::None);
        analyze_button.append(&button_text);
        analyze_button.append(&button_loader);

        let results_section = window.add_element("section", dom::RESULTS_SECTION);
        results_section.set_display(Display::None);
        let result_icon = child(&results_section, "span", dom::RESULT_ICON);
        let result_class = child(&results_section, "h2", dom::RESULT_CLASS);
        let confidence_value = child(&results_section, "span", dom::CONFIDENCE_VALUE);
        let confidence_fill = child(&results_section, "div", dom::CONFIDENCE_FILL);
        let predictions_grid = child(&results_section, "div", dom::PREDICTIONS_GRID);
        let new_analysis_button = child(&results_section, "button", dom::NEW_ANALYSIS_BUTTON);

        Self {
            window,
            theme_toggle,
            upload_section,
            drop_zone,
            file_input,
            preview_container,
            image_preview,
            remove_button,
            analyze_button,
            button_text,
            button_loader,
            results_section,
            result_class,
            result_icon,
            confidence_value,
            confidence_fill,
            predictions_grid,
            new_analysis_button,
        }
    }

    /// Rows of the probability list as (name, bar width, percentage text).
    pub fn rows(&self) -> Vec<(String, String, String)> {
        self.predictions_grid
            .children()
            .iter()
            .map(|item| {
                let name = item
                    .query_selector(".prediction-name")
                    .map(|e| e.text())
                    .unwrap_or_default();
                let width = item
                    .query_selector(".prediction-bar-fill")
                    .and_then(|e| e.style("width"))
                    .unwrap_or_default();
                let percent = item
                    .query_selector(".prediction-percentage")
                    .map(|e| e.text())
                    .unwrap_or_default();
                (name, width, percent)
            })
            .collect()
    }
}

/// The history page markup.
pub struct HistoryMarkup {
    pub window: Rc<HeadlessWindow>,
    pub clear_button: Rc<HeadlessElement>,
    pub thumbnails: Vec<Rc<HeadlessElement>>,
    pub modal: Rc<HeadlessElement>,
    pub modal_image: Rc<HeadlessElement>,
    pub close: Rc<HeadlessElement>,
}

impl HistoryMarkup {
    pub fn build(thumbnail_sources: &[&str]) -> Self {
        let window = HeadlessWindow::new();
        window.add_element("input", dom::THEME_TOGGLE);
        let clear_button = window.add_element("button", dom::CLEAR_HISTORY_BUTTON);

        let list = window.add_element("div", "historyList");
        let thumbnails = thumbnail_sources
            .iter()
            .map(|src| {
                let thumb = HeadlessElement::new("img").with_class("history-thumbnail");
                thumb.set_attribute("src", src);
                list.append(&thumb);
                thumb
            })
            .collect();

        let modal = window.add_element("div", dom::IMAGE_MODAL);
        modal.set_display(Display::None);
        let content = HeadlessElement::new("div").with_class("modal-content");
        let close = HeadlessElement::new("span").with_class("close-modal");
        modal.append(&content);
        content.append(&close);
        let modal_image = child(&content, "img", dom::MODAL_IMAGE);

        Self {
            window,
            clear_button,
            thumbnails,
            modal,
            modal_image,
            close,
        }
    }
}

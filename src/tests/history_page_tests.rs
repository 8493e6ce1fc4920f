//! History page flows: clearing and the lightbox.

use std::rc::Rc;

use brainscan_dom::headless::HeadlessWindow;
use brainscan_dom::{Display, Element, EventKind};

use super::support::{HistoryMarkup, Recorded, ScriptedTransport, init_logging};
use crate::api::{HttpResponse, TransportError};
use crate::config::AppConfig;
use crate::constants::messages;
use crate::pages::HistoryPage;

fn mount(markup: &HistoryMarkup, transport: &Rc<ScriptedTransport>) -> Rc<HistoryPage> {
    init_logging();
    HistoryPage::mount(markup.window.clone(), transport.clone(), &AppConfig::new())
}

#[test]
fn test_clear_history_success_reloads() {
    let markup = HistoryMarkup::build(&["/static/uploads/a.png"]);
    let transport = ScriptedTransport::new();
    let _page = mount(&markup, &transport);
    markup.window.answer_confirm(true);
    transport.reply_json(200, r#"{"success": true, "message": "History cleared successfully"}"#);

    markup.clear_button.fire(EventKind::Click);
    markup.window.run_until_stalled();

    assert_eq!(markup.window.confirms(), vec![messages::CONFIRM_CLEAR_HISTORY]);
    assert_eq!(
        transport.requests(),
        vec![Recorded {
            url: "/api/clear-history".to_string(),
            upload: None,
        }]
    );
    assert_eq!(markup.window.reload_count(), 1);
    assert!(markup.window.alerts().is_empty());
}

#[test]
fn test_clear_history_declined_sends_nothing() {
    let markup = HistoryMarkup::build(&[]);
    let transport = ScriptedTransport::new();
    let _page = mount(&markup, &transport);
    markup.window.answer_confirm(false);

    markup.clear_button.fire(EventKind::Click);
    markup.window.run_until_stalled();

    assert!(transport.requests().is_empty());
    assert_eq!(markup.window.reload_count(), 0);
}

#[test]
fn test_clear_history_failure_alerts_server_reason() {
    let markup = HistoryMarkup::build(&[]);
    let transport = ScriptedTransport::new();
    let _page = mount(&markup, &transport);
    markup.window.answer_confirm(true);
    transport.reply_json(500, r#"{"success": false, "error": "x"}"#);

    markup.clear_button.fire(EventKind::Click);
    markup.window.run_until_stalled();

    assert_eq!(markup.window.alerts(), vec!["Error clearing history: x"]);
    assert_eq!(markup.window.reload_count(), 0);
    assert!(!markup.clear_button.is_disabled());
}

#[test]
fn test_clear_history_network_failure() {
    let markup = HistoryMarkup::build(&[]);
    let transport = ScriptedTransport::new();
    let _page = mount(&markup, &transport);
    markup.window.answer_confirm(true);
    transport.reply(Err(TransportError::Network("offline".to_string())));

    markup.clear_button.fire(EventKind::Click);
    markup.window.run_until_stalled();

    assert_eq!(markup.window.alerts(), vec![messages::CLEAR_HISTORY_FAILED]);
}

#[test]
fn test_clear_button_disabled_while_in_flight() {
    let markup = HistoryMarkup::build(&[]);
    let transport = ScriptedTransport::new();
    let _page = mount(&markup, &transport);
    markup.window.answer_confirm(true);
    let reply = transport.reply_later();

    markup.clear_button.fire(EventKind::Click);
    markup.window.run_until_stalled();
    assert!(markup.clear_button.is_disabled());

    // Swallowed by the disabled button
    markup.clear_button.fire(EventKind::Click);
    markup.window.run_until_stalled();
    assert_eq!(markup.window.confirms().len(), 1);

    reply
        .send(Ok(HttpResponse::new(200, r#"{"success": true}"#)))
        .unwrap();
    markup.window.run_until_stalled();
    assert!(!markup.clear_button.is_disabled());
    assert_eq!(markup.window.reload_count(), 1);
}

#[test]
fn test_thumbnail_opens_and_closes_lightbox() {
    let markup = HistoryMarkup::build(&["/static/uploads/a.png", "/static/uploads/b.png"]);
    let transport = ScriptedTransport::new();
    let page = mount(&markup, &transport);
    let lightbox = page.lightbox().expect("modal present");

    markup.thumbnails[1].fire(EventKind::Click);
    assert!(lightbox.is_open());
    assert_eq!(markup.modal.display(), Some(Display::Flex));
    assert_eq!(
        markup.modal_image.attribute("src").as_deref(),
        Some("/static/uploads/b.png")
    );

    // Clicking the image itself keeps the modal open
    markup.modal_image.fire(EventKind::Click);
    assert!(lightbox.is_open());

    markup.close.fire(EventKind::Click);
    assert!(!lightbox.is_open());

    markup.thumbnails[0].fire(EventKind::Click);
    markup.modal.fire(EventKind::Click);
    assert_eq!(markup.modal.display(), Some(Display::None));
}

#[test]
fn test_page_without_history_markup() {
    init_logging();
    let window = HeadlessWindow::new();
    let page = HistoryPage::mount(window.clone(), ScriptedTransport::new(), &AppConfig::new());

    assert!(page.lightbox().is_none());
    assert_eq!(page.controller().endpoint(), "/api/clear-history");
}

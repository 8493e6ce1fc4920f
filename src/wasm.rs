use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use brainscan_dom::WindowRef;
use brainscan_dom::web::WebWindow;
use wasm_bindgen::prelude::*;

use crate::config::AppConfig;
use crate::fetch::FetchTransport;
use crate::pages::{HistoryPage, PredictPage};
use crate::theme::mount_theme;

thread_local! {
    // Listeners only hold weak references; mounted pages live here.
    static MOUNTED: RefCell<Vec<Rc<dyn Any>>> = const { RefCell::new(Vec::new()) };
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Window handle plus config, with logging set up at the configured level.
fn boot() -> Result<(WindowRef, AppConfig), JsValue> {
    let window = WebWindow::shared().map_err(|e| JsValue::from_str(&e.to_string()))?;
    let config = AppConfig::load_or_default(&*window);
    // A second page script on the same document has already installed it
    let _ = console_log::init_with_level(log::Level::Trace);
    log::set_max_level(config.log_level.to_level_filter());
    log::debug!("{} starting with {:?}", config.app_name, config.endpoints);
    Ok((window, config))
}

fn keep_alive(page: Rc<dyn Any>) {
    MOUNTED.with(|mounted| mounted.borrow_mut().push(page));
}

/// Theme toggle only, for pages with no other behavior.
#[wasm_bindgen]
pub fn start_theme() -> Result<(), JsValue> {
    let (window, config) = boot()?;
    mount_theme(window, &config.theme_storage_key);
    Ok(())
}

/// Upload and analyze page.
#[wasm_bindgen]
pub fn start_predict_page() -> Result<(), JsValue> {
    let (window, config) = boot()?;
    mount_theme(window.clone(), &config.theme_storage_key);

    let page_window = window.clone();
    window.when_ready(Box::new(move || {
        match PredictPage::mount(page_window, Rc::new(FetchTransport::new()), &config) {
            Ok(page) => keep_alive(page),
            Err(e) => log::error!("Prediction page not mounted: {}", e),
        }
    }));
    Ok(())
}

/// History page.
#[wasm_bindgen]
pub fn start_history_page() -> Result<(), JsValue> {
    let (window, config) = boot()?;
    mount_theme(window.clone(), &config.theme_storage_key);

    let page_window = window.clone();
    window.when_ready(Box::new(move || {
        let page = HistoryPage::mount(page_window, Rc::new(FetchTransport::new()), &config);
        keep_alive(page);
    }));
    Ok(())
}

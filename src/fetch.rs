//! `fetch`-based [`ApiTransport`] for the browser build.

use brainscan_dom::web::WebFile;
use brainscan_dom::{FileRef, LocalBoxFuture};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, RequestInit, Response};

use crate::api::{ApiTransport, HttpResponse, TransportError};

fn js_error(value: JsValue) -> TransportError {
    TransportError::Network(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}

/// Issues requests through `window.fetch`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

impl FetchTransport {
    pub fn new() -> Self {
        Self
    }
}

/// POST `body` to `url` and collect status and text.
async fn post(url: String, body: Option<JsValue>) -> Result<HttpResponse, TransportError> {
    let window = web_sys::window()
        .ok_or_else(|| TransportError::Network("No window object available".to_string()))?;

    let init = RequestInit::new();
    init.set_method("POST");
    if let Some(body) = &body {
        init.set_body(body);
    }

    let response = JsFuture::from(window.fetch_with_str_and_init(&url, &init))
        .await
        .map_err(js_error)?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| TransportError::Network("fetch did not return a Response".to_string()))?;

    let status = response.status();
    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;

    Ok(HttpResponse::new(status, text.as_string().unwrap_or_default()))
}

impl ApiTransport for FetchTransport {
    fn post_file(
        &self,
        url: &str,
        field: &str,
        file: FileRef,
    ) -> LocalBoxFuture<'static, Result<HttpResponse, TransportError>> {
        let url = url.to_string();
        let field = field.to_string();
        Box::pin(async move {
            let web_file = file
                .as_any()
                .downcast_ref::<WebFile>()
                .ok_or_else(|| TransportError::UnsupportedFile(file.name()))?;

            let form = FormData::new().map_err(js_error)?;
            form.append_with_blob(&field, web_file.file())
                .map_err(js_error)?;

            post(url, Some(form.into())).await
        })
    }

    fn post_empty(&self, url: &str) -> LocalBoxFuture<'static, Result<HttpResponse, TransportError>> {
        Box::pin(post(url.to_string(), None))
    }
}

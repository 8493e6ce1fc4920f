//! HTTP seam between the pages and the backend.
//!
//! Controllers only know [`ApiTransport`]. The browser build plugs in the
//! `fetch`-based transport; tests script responses.

use std::rc::Rc;

use brainscan_dom::{FileRef, LocalBoxFuture};
use thiserror::Error;

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A request that did not produce a response body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Network failure, CORS rejection, aborted request
    #[error("Network error: {0}")]
    Network(String),

    /// The file handle cannot be attached by this transport
    #[error("Cannot upload '{0}' with this transport")]
    UnsupportedFile(String),
}

/// Shared handle to a transport.
pub type TransportRef = Rc<dyn ApiTransport>;

/// Outbound POST requests used by the pages.
pub trait ApiTransport {
    /// POST a multipart form holding `file` under `field`.
    fn post_file(
        &self,
        url: &str,
        field: &str,
        file: FileRef,
    ) -> LocalBoxFuture<'static, Result<HttpResponse, TransportError>>;

    /// POST with an empty body.
    fn post_empty(&self, url: &str) -> LocalBoxFuture<'static, Result<HttpResponse, TransportError>>;
}

//! brainscan_dom - the slice of the browser the brainscan pages talk to.
//!
//! Page logic never touches `web_sys` directly. It holds [`ElementRef`] and
//! [`WindowRef`] handles and registers handlers through
//! [`Element::add_listener`], so the same code runs against:
//!
//! - [`web`]: the real DOM through `web-sys` (wasm32 only)
//! - [`headless`]: an in-memory document used by tests and native builds

mod element;
mod error;
mod event;
mod file;
pub mod headless;
mod window;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use element::{Display, Element, ElementRef};
pub use error::DomError;
pub use event::{DomEvent, EventKind, Handler};
pub use file::{FileBlob, FileRef};
pub use window::{ReadCallback, Window, WindowRef};

/// Boxed future type used for work spawned on a [`Window`].
pub use futures::future::LocalBoxFuture;

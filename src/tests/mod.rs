//! Page-level tests against the headless document.
//!
//! These drive whole pages through DOM events and a scripted transport,
//! the way a user and the backend would.

mod history_page_tests;
mod support;

//! brainscan - browser front end for the MRI tumor classifier
//!
//! Upload an image, send it to the prediction endpoint and render the class
//! probabilities; plus the history page actions and the shared theme toggle.
//! Page logic runs against [`brainscan_dom`], so it is exercised natively
//! against the headless document and in the browser through `web-sys`.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod pages;
pub mod prediction;
pub mod results;
pub mod state;
pub mod theme;
pub mod upload;

pub use api::{ApiTransport, HttpResponse, TransportError, TransportRef};
pub use config::{AppConfig, ConfigError, LogLevel};
pub use error::{HistoryError, PredictError};
pub use history::{ClearOutcome, HistoryController, ImageLightbox};
pub use pages::{HistoryPage, PredictPage};
pub use prediction::{PredictionClient, PredictionResult};
pub use results::ResultsRenderer;
pub use state::UiState;
pub use theme::{ThemeController, ThemePreference, mount_theme};
pub use upload::{SelectedFile, UploadWidget};

#[cfg(test)]
mod tests;

// Browser transport and entry points
#[cfg(target_arch = "wasm32")]
mod fetch;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use fetch::FetchTransport;
#[cfg(target_arch = "wasm32")]
pub use wasm::*;

//! Prediction endpoint client and response model.

use std::cmp::Ordering;
use std::fmt;

use brainscan_dom::{Display, ElementRef, FileRef, WindowRef};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::api::TransportRef;
use crate::constants::{UPLOAD_FIELD, dom};
use crate::error::PredictError;

/// Classification returned by the prediction endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Label of the most likely class, as the server formats it
    pub predicted_class: String,
    /// Probability of `predicted_class`, in `[0, 1]`
    pub confidence: f64,
    /// Probability per class, in the order the server listed them
    pub all_predictions: Vec<(String, f64)>,
}

/// Wire shape covering both the success and the `{error}` response.
#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    predicted_class: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default, deserialize_with = "ordered_probabilities")]
    all_predictions: Option<Vec<(String, f64)>>,
}

/// Deserialize a JSON object of class -> probability keeping key order.
fn ordered_probabilities<'de, D>(deserializer: D) -> Result<Option<Vec<(String, f64)>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Option<Vec<(String, f64)>>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object mapping class names to probabilities")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(4));
            while let Some((name, probability)) = map.next_entry::<String, f64>()? {
                entries.push((name, probability));
            }
            Ok(Some(entries))
        }
    }

    deserializer.deserialize_any(OrderedVisitor)
}

impl PredictionResult {
    /// Parse a response body.
    ///
    /// A non-empty `error` field wins over everything else. A body that is
    /// not JSON, or lacks any of the three success fields, is malformed.
    pub fn from_json(body: &str) -> Result<Self, PredictError> {
        let response: PredictResponse =
            serde_json::from_str(body).map_err(|e| PredictError::Malformed(e.to_string()))?;

        if let Some(message) = response.error.filter(|m| !m.is_empty()) {
            return Err(PredictError::Server(message));
        }

        match (
            response.predicted_class,
            response.confidence,
            response.all_predictions,
        ) {
            (Some(predicted_class), Some(confidence), Some(all_predictions)) => Ok(Self {
                predicted_class,
                confidence,
                all_predictions,
            }),
            _ => Err(PredictError::Malformed(
                "expected predicted_class, confidence and all_predictions".to_string(),
            )),
        }
    }

    /// Entries by probability, highest first.
    ///
    /// The sort is stable: equal probabilities keep the server's order.
    /// NaN compares below every number.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .all_predictions
            .iter()
            .map(|(name, p)| (name.as_str(), *p))
            .collect();
        ranked.sort_by(|a, b| descending(a.1, b.1));
        ranked
    }

    /// Whether the headline class is the healthy sentinel.
    pub fn is_healthy(&self, healthy_class: &str) -> bool {
        self.predicted_class == healthy_class
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    }
}

/// Puts the analyze control into its loading state; dropping restores it.
struct LoadingGuard {
    button: ElementRef,
    text: Option<ElementRef>,
    loader: Option<ElementRef>,
}

impl LoadingGuard {
    fn engage(button: &ElementRef) -> Self {
        let text = button.query_selector(dom::BUTTON_TEXT);
        let loader = button.query_selector(dom::BUTTON_LOADER);
        if let Some(text) = &text {
            text.set_display(Display::None);
        }
        if let Some(loader) = &loader {
            loader.set_display(Display::InlineFlex);
        }
        button.set_disabled(true);
        Self {
            button: button.clone(),
            text,
            loader,
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if let Some(text) = &self.text {
            text.set_display(Display::Inline);
        }
        if let Some(loader) = &self.loader {
            loader.set_display(Display::None);
        }
        self.button.set_disabled(false);
    }
}

/// Sends the selected image to the prediction endpoint.
pub struct PredictionClient {
    window: WindowRef,
    transport: TransportRef,
    endpoint: String,
    analyze_button: ElementRef,
}

impl PredictionClient {
    pub fn new(
        window: WindowRef,
        transport: TransportRef,
        endpoint: impl Into<String>,
        analyze_button: ElementRef,
    ) -> Self {
        Self {
            window,
            transport,
            endpoint: endpoint.into(),
            analyze_button,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload `file` and parse the answer, without touching the page.
    pub async fn request(&self, file: FileRef) -> Result<PredictionResult, PredictError> {
        let started = web_time::Instant::now();
        let response = self
            .transport
            .post_file(&self.endpoint, UPLOAD_FIELD, file)
            .await?;

        log::debug!(
            "POST {} -> {} in {:.0?}",
            self.endpoint,
            response.status,
            started.elapsed()
        );
        if !response.is_success() {
            log::warn!("Prediction endpoint answered HTTP {}", response.status);
        }

        PredictionResult::from_json(&response.body)
    }

    /// Full analyze action: loading affordance, request, alert on failure.
    ///
    /// Returns the result on success. On any failure the user has been
    /// alerted and `None` is returned; the analyze control is restored
    /// either way.
    pub async fn analyze(&self, file: FileRef) -> Option<PredictionResult> {
        let _loading = LoadingGuard::engage(&self.analyze_button);
        log::info!("Analyzing '{}' ({} bytes)", file.name(), file.size());

        match self.request(file).await {
            Ok(result) => {
                log::info!(
                    "Predicted '{}' with confidence {:.4}",
                    result.predicted_class,
                    result.confidence
                );
                Some(result)
            }
            Err(e) => {
                match &e {
                    PredictError::Server(_) | PredictError::InvalidMediaType { .. } => {
                        log::warn!("{}", e)
                    }
                    PredictError::Transport(_) | PredictError::Malformed(_) => {
                        log::error!("{}", e)
                    }
                }
                self.window.alert(&e.user_message());
                None
            }
        }
    }
}

//! Rendering of a prediction: headline, confidence bar and ranked list.

use std::cell::Cell;
use std::rc::Rc;

use brainscan_dom::{Display, DomError, ElementRef, Window, WindowRef};

use crate::constants::{ICON_HEALTHY, ICON_WARNING, dom};
use crate::prediction::PredictionResult;
use crate::upload::UploadWidget;

/// Two decimals with exact halves rounded away from zero, like JS `toFixed(2)`.
///
/// `{:.2}` alone rounds exact halves to even (`0.125` -> `0.12`).
fn to_fixed_2(value: f64) -> String {
    // Only multiples of 1/8 can sit exactly halfway between two hundredths
    let exact_half = (value * 8.0).fract() == 0.0 && (value * 100.0).fract().abs() == 0.5;
    if exact_half {
        format!("{:.2}", (value * 100.0).round() / 100.0)
    } else {
        format!("{:.2}", value)
    }
}

/// Probability as a percentage with two decimals, e.g. `0.8675` -> `86.75%`.
pub fn format_percent(probability: f64) -> String {
    format!("{}%", to_fixed_2(probability * 100.0))
}

/// CSS width for a probability bar, clamped to `0%..=100%`.
pub fn bar_width(probability: f64) -> String {
    let percent = probability * 100.0;
    let percent = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    };
    format!("{}%", to_fixed_2(percent))
}

/// Headline icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultIcon {
    Healthy,
    Warning,
}

impl ResultIcon {
    pub fn for_result(result: &PredictionResult, healthy_class: &str) -> Self {
        if result.is_healthy(healthy_class) {
            ResultIcon::Healthy
        } else {
            ResultIcon::Warning
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ResultIcon::Healthy => ICON_HEALTHY,
            ResultIcon::Warning => ICON_WARNING,
        }
    }
}

/// The elements the results view drives.
#[derive(Clone)]
pub struct ResultsElements {
    pub upload_section: ElementRef,
    pub results_section: ElementRef,
    pub result_class: ElementRef,
    pub result_icon: ElementRef,
    pub confidence_value: ElementRef,
    pub confidence_fill: ElementRef,
    pub predictions_grid: ElementRef,
}

impl ResultsElements {
    pub fn from_window(window: &dyn Window) -> Result<Self, DomError> {
        Ok(Self {
            upload_section: window.require_element(dom::UPLOAD_SECTION)?,
            results_section: window.require_element(dom::RESULTS_SECTION)?,
            result_class: window.require_element(dom::RESULT_CLASS)?,
            result_icon: window.require_element(dom::RESULT_ICON)?,
            confidence_value: window.require_element(dom::CONFIDENCE_VALUE)?,
            confidence_fill: window.require_element(dom::CONFIDENCE_FILL)?,
            predictions_grid: window.require_element(dom::PREDICTIONS_GRID)?,
        })
    }
}

pub struct ResultsRenderer {
    window: WindowRef,
    elements: ResultsElements,
    upload: Rc<UploadWidget>,
    healthy_class: String,
    showing: Cell<bool>,
}

impl ResultsRenderer {
    pub fn new(
        window: WindowRef,
        elements: ResultsElements,
        upload: Rc<UploadWidget>,
        healthy_class: impl Into<String>,
    ) -> Self {
        Self {
            window,
            elements,
            upload,
            healthy_class: healthy_class.into(),
            showing: Cell::new(false),
        }
    }

    pub fn elements(&self) -> &ResultsElements {
        &self.elements
    }

    /// True while the results section is displayed.
    pub fn is_showing(&self) -> bool {
        self.showing.get()
    }

    /// Fill in the results view and switch to it.
    pub fn render(&self, result: &PredictionResult) -> Result<(), DomError> {
        let el = &self.elements;

        el.result_class.set_text(&result.predicted_class);
        el.result_icon
            .set_text(ResultIcon::for_result(result, &self.healthy_class).glyph());

        el.confidence_value
            .set_text(&format_percent(result.confidence));
        el.confidence_fill
            .set_style("width", &bar_width(result.confidence));

        el.predictions_grid.clear_children();
        for (name, probability) in result.ranked() {
            self.render_row(name, probability)?;
        }

        el.upload_section.set_display(Display::None);
        el.results_section.set_display(Display::Block);
        el.results_section.scroll_into_view();
        self.showing.set(true);
        log::debug!(
            "Rendered {} class probabilities",
            result.all_predictions.len()
        );
        Ok(())
    }

    fn render_row(&self, name: &str, probability: f64) -> Result<(), DomError> {
        let item = self
            .elements
            .predictions_grid
            .append_element("div", "prediction-item")?;

        item.append_element("div", "prediction-name")?.set_text(name);

        let bar = item.append_element("div", "prediction-bar-container")?;
        bar.append_element("div", "prediction-bar-fill")?
            .set_style("width", &bar_width(probability));

        item.append_element("div", "prediction-percentage")?
            .set_text(&format_percent(probability));
        Ok(())
    }

    /// Leave the results view and start over with an empty drop zone.
    pub fn reset(&self) {
        self.elements.results_section.set_display(Display::None);
        self.elements.upload_section.set_display(Display::Block);
        self.showing.set(false);
        self.window.scroll_to_top();
        self.upload.reset();
    }
}

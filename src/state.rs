//! Prediction page state.

/// Which part of the prediction flow the page is in.
///
/// Upload controls and result controls are never visible together; the
/// variants are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiState {
    /// Drop zone visible, nothing selected
    #[default]
    Idle,
    /// An image is selected and previewed; analyze is enabled
    PreviewReady,
    /// A prediction request is in flight
    Submitting,
    /// The results section is showing
    ResultsShown,
}

impl UiState {
    /// Derive the state from the components that own each piece of it.
    ///
    /// Results take precedence over an in-flight request, which takes
    /// precedence over the preview.
    pub fn derive(previewing: bool, submitting: bool, results_shown: bool) -> Self {
        if results_shown {
            UiState::ResultsShown
        } else if submitting {
            UiState::Submitting
        } else if previewing {
            UiState::PreviewReady
        } else {
            UiState::Idle
        }
    }

    /// Only a previewed image may be submitted.
    pub fn can_submit(&self) -> bool {
        *self == UiState::PreviewReady
    }
}

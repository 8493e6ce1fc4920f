//! Global constants for the brainscan front end

/// Element ids and classes the pages bind to.
pub mod dom {
    pub const DROP_ZONE: &str = "dropZone";
    pub const FILE_INPUT: &str = "fileInput";
    pub const IMAGE_PREVIEW: &str = "imagePreview";
    pub const PREVIEW_CONTAINER: &str = "previewContainer";
    pub const REMOVE_BUTTON: &str = "removeBtn";
    pub const ANALYZE_BUTTON: &str = "analyzeBtn";
    pub const UPLOAD_SECTION: &str = "uploadSection";
    pub const RESULTS_SECTION: &str = "resultsSection";
    pub const NEW_ANALYSIS_BUTTON: &str = "newAnalysisBtn";
    pub const RESULT_CLASS: &str = "resultClass";
    pub const RESULT_ICON: &str = "resultIcon";
    pub const CONFIDENCE_VALUE: &str = "confidenceValue";
    pub const CONFIDENCE_FILL: &str = "confidenceFill";
    pub const PREDICTIONS_GRID: &str = "predictionsGrid";
    pub const THEME_TOGGLE: &str = "themeToggle";
    pub const CLEAR_HISTORY_BUTTON: &str = "clearHistoryBtn";
    pub const IMAGE_MODAL: &str = "imageModal";
    pub const MODAL_IMAGE: &str = "modalImage";

    /// Selectors
    pub const CLOSE_MODAL: &str = ".close-modal";
    pub const HISTORY_THUMBNAIL: &str = ".history-thumbnail";
    pub const BUTTON_TEXT: &str = ".btn-text";
    pub const BUTTON_LOADER: &str = ".btn-loader";

    /// Class toggled on the drop zone while a file hovers over it
    pub const DRAG_OVER_CLASS: &str = "drag-over";

    /// Attribute on `<html>` consumed by the stylesheet
    pub const THEME_ATTRIBUTE: &str = "data-theme";
}

/// Default endpoint for image classification
pub const DEFAULT_PREDICT_ENDPOINT: &str = "/api/predict";

/// Default endpoint for wiping the prediction history
pub const DEFAULT_CLEAR_HISTORY_ENDPOINT: &str = "/api/clear-history";

/// Multipart field the prediction endpoint reads the image from
pub const UPLOAD_FIELD: &str = "file";

/// LocalStorage key holding `"light"` or `"dark"`
pub const THEME_STORAGE_KEY: &str = "theme";

/// Class label that gets the positive icon
pub const HEALTHY_CLASS: &str = "No Tumor";

/// Media type prefix accepted by the upload widget
pub const IMAGE_MEDIA_PREFIX: &str = "image/";

/// Result icons
pub const ICON_HEALTHY: &str = "✅";
pub const ICON_WARNING: &str = "⚠️";

/// User-facing messages.
pub mod messages {
    pub const NOT_AN_IMAGE: &str = "Please upload an image file";
    pub const PREDICTION_FAILED: &str = "An error occurred during prediction. Please try again.";
    pub const CONFIRM_CLEAR_HISTORY: &str =
        "Are you sure you want to clear all prediction history? This cannot be undone.";
    pub const CLEAR_HISTORY_FAILED: &str = "An error occurred while clearing history.";
    pub const UNKNOWN_ERROR: &str = "Unknown error";
}

use thiserror::Error;

/// Errors raised while building inputs or configuration for a layout.
///
/// The layout engine itself never fails; these surface from the helpers that
/// parse word counts, validate canvases and load configuration files.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("invalid canvas {width}x{height} with margin {margin}")]
    InvalidCanvas { width: f32, height: f32, margin: f32 },

    #[error("invalid font size range [{min}, {max}]")]
    InvalidFontRange { min: f32, max: f32 },

    #[error("count for '{word}' must be an integer between 1 and 4294967295")]
    InvalidCount { word: String },

    #[error("invalid collision padding {padding}")]
    InvalidPadding { padding: f32 },

    #[error("word must not be empty")]
    EmptyWord,

    #[error("malformed word counts: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object of word counts")]
    NotAnObject,
}

impl CloudError {
    pub fn invalid_count(word: impl Into<String>) -> Self {
        Self::InvalidCount { word: word.into() }
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WatchError>;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("invalid root margin {input:?}: {reason}")]
    InvalidRootMargin { input: String, reason: String },

    #[error("threshold must be a finite fraction in [0, 1], got {value}")]
    InvalidThreshold { value: f64 },

    #[error("viewport refused observation: {reason}")]
    ObserveFailed { reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WatchError {
    #[must_use]
    pub fn root_margin(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRootMargin {
            input: input.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn observe_failed(reason: impl Into<String>) -> Self {
        Self::ObserveFailed {
            reason: reason.into(),
        }
    }

    /// Whether the error came from caller-supplied configuration rather than
    /// the viewport backend.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidRootMargin { .. } | Self::InvalidThreshold { .. } | Self::Json(_)
        )
    }
}

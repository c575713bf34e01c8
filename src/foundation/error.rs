/// Convenience result type used across motifweave.
pub type WeaveResult<T> = Result<T, WeaveError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Layout and rendering degrade gracefully (missing motifs are skipped, failed masks disable
/// masking), so these errors only surface for host misuse: invalid configuration, undecodable
/// input bytes, or surfaces that cannot be allocated.
#[derive(thiserror::Error, Debug)]
pub enum WeaveError {
    /// Invalid user-provided configuration or motif data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Motif or mask bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Surface allocation or rasterization failures.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WeaveError {
    /// Build a [`WeaveError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WeaveError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`WeaveError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`WeaveError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for WeaveError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

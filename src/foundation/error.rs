/// Convenience result type used across wordart.
pub type WordArtResult<T> = Result<T, WordArtError>;

/// Top-level error taxonomy used by loader, layout, and render APIs.
#[derive(thiserror::Error, Debug)]
pub enum WordArtError {
    /// Malformed or ambiguous style descriptor.
    #[error("parse error: {0}")]
    Parse(String),

    /// Degenerate safe area or invalid layout input.
    #[error("layout error: {0}")]
    Layout(String),

    /// Text geometry could not be rasterized.
    #[error("render error: {0}")]
    Render(String),

    /// A caller asked for a style name that is not registered.
    #[error("style not found: {0}")]
    StyleNotFound(String),

    /// An optional configuration file is absent.
    #[error("configuration missing: {0}")]
    ConfigMissing(String),

    /// Caller precondition violated (buffer sizes, dimensions, ranges).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WordArtError {
    /// Build a [`WordArtError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`WordArtError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`WordArtError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`WordArtError::StyleNotFound`] value.
    pub fn style_not_found(name: impl Into<String>) -> Self {
        Self::StyleNotFound(name.into())
    }

    /// Build a [`WordArtError::ConfigMissing`] value.
    pub fn config_missing(msg: impl Into<String>) -> Self {
        Self::ConfigMissing(msg.into())
    }

    /// Build a [`WordArtError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WordArtError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

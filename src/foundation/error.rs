/// Convenience result type used across charsheet.
pub type CharsheetResult<T> = Result<T, CharsheetError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Missing images are not errors: the image cache resolves them to `None` and the compositor skips
/// them. Errors are reserved for defects in catalog data, configuration and export output.
#[derive(thiserror::Error, Debug)]
pub enum CharsheetError {
    /// Invalid catalog, selection or geometry data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid runtime configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Failure to fetch or decode an asset where the caller asked for a hard failure.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors while painting or reading back a surface.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while producing an export archive.
    #[error("export error: {0}")]
    Export(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CharsheetError {
    /// Build a [`CharsheetError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CharsheetError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`CharsheetError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`CharsheetError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CharsheetError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`CharsheetError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for CharsheetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

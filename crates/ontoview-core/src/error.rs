//! Error types for OntoView.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A caller-supplied extractor failed. `kind` names the input list
    /// (node, edge, hyperedge, item) and `index` the offending record.
    #[error("Extractor failed on {kind} #{index}: {message}")]
    Extractor {
        kind: &'static str,
        index: usize,
        message: String,
    },

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No visualization is loaded")]
    NoActiveStore,

    #[error("Unsupported for this visualization: {0}")]
    Unsupported(String),

    #[error("Callback not registered: {0}")]
    CallbackMissing(String),

    #[error("Callback failed: {0}")]
    Callback(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an extractor failure with the position of the record it failed on.
    pub fn extractor(kind: &'static str, index: usize, source: impl std::fmt::Display) -> Self {
        Self::Extractor {
            kind,
            index,
            message: source.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_message_names_record() {
        let err = Error::extractor("edge", 3, Error::MissingField("source".into()));
        assert_eq!(
            err.to_string(),
            "Extractor failed on edge #3: Missing field: source"
        );
    }
}

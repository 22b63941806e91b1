use std::path::PathBuf;

/// Errors that can occur while reading a Glyphs file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("syntax error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },
    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("missing required key '{0}'")]
    MissingKey(String),
    #[error("in '{key}'")]
    InKey {
        key: String,
        #[source]
        source: Box<Error>,
    },
    #[error("invalid coordinates '{0}'")]
    InvalidCoordinates(String),
    #[error("invalid node '{0}'")]
    InvalidNode(String),
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
    #[error("invalid codepoint '{0}'")]
    InvalidCodepoint(String),
}

impl Error {
    /// Wrap the error with the dictionary key or array index it occurred in.
    pub(crate) fn in_key(self, key: impl Into<String>) -> Self {
        Error::InKey {
            key: key.into(),
            source: Box::new(self),
        }
    }
}

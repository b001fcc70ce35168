use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("empty resource key")]
    EmptyKey,

    #[error("key root {key} does not match tree root {root}")]
    RootMismatch { key: String, root: String },

    #[error("key not found: {0}")]
    KeyNotFound(String),
}

use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("Invalid sort_by key `{0}`")]
    InvalidSortKey(String),

    #[error("invalid ref name {name:?}: {reason}")]
    InvalidRefName { name: String, reason: String },

    #[error("invalid repository handle: {0}")]
    InvalidRepository(String),
}

use thiserror::Error;

/// Errors raised by the query builder and by the collaborators it delegates to.
///
/// Session and cursor implementations return this same type, so their failures reach the
/// caller of `get_cursor`/`execute` unchanged.
#[derive(Debug, Error)]
pub enum OdmError {
    #[error("no document class bound to query; call `from` first")]
    UnboundType,

    #[error("invalid identifier for `{field}`: {reason}")]
    InvalidIdentifier { field: String, reason: String },

    #[error("Class not found: {0}")]
    NoSuchClass(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Collaborator(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

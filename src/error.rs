use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrellisError>;

/// Errors surfaced by the collection engine.
///
/// The enum is `Clone + PartialEq` so the [`ErrorReporter`](crate::reporter::ErrorReporter)
/// can hold the last error by value and tests can assert on variants.
/// IO and serde failures are converted to string payloads at the
/// storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrellisError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("A {child} cannot be placed under a {parent}")]
    KindMismatch { parent: String, child: String },

    #[error("Failed to save your changes: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

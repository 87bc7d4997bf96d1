use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while building a store.
///
/// Everything past construction is infallible: merging state and emitting
/// notifications have no failure modes of their own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("store name must not be empty")]
    EmptyName,
    #[error("field defined more than once: {0}")]
    DuplicateField(String),
}

//! The module contains the errors the engine can throw.
//!
//! - [`NotFound`] thrown when an entity targeted by id does not exist.
//! - [`Invalid`] thrown when a value fails validation.
//! - [`UnknownRelation`] thrown when a referenced entity does not exist.
//!
//!  [`NotFound`]: EngineError::NotFound
//!  [`Invalid`]: EngineError::Invalid
//!  [`UnknownRelation`]: EngineError::UnknownRelation
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Invalid value: {0}")]
    Invalid(String),
    #[error("Unknown relation: {0}")]
    UnknownRelation(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Maps the errors of an update against a missing row to [`EngineError::NotFound`].
    pub(crate) fn from_update(err: DbErr, what: impl FnOnce() -> String) -> Self {
        match err {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => Self::NotFound(what()),
            other => Self::Database(other),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Invalid(a), Self::Invalid(b)) => a == b,
            (Self::UnknownRelation(a), Self::UnknownRelation(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

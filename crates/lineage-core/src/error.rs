//! Errors raised by lineage operations.

use crate::person::PersonId;
use std::path::PathBuf;

/// Errors from graph mutations, lookups and snapshot I/O.
#[derive(Debug, thiserror::Error)]
pub enum LineageError {
    #[error("invalid relation: {0}")]
    InvalidRelation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0} still has relatives; remove the relations first")]
    HasRelatives(PersonId),
    #[error("corrupt lineage data: {0}")]
    CorruptData(String),
    #[error("name must not be empty")]
    InvalidName,
    #[error("invalid gender {0:?}: expected m or f")]
    InvalidGender(String),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LineageError {
    pub(crate) fn unknown_person(id: PersonId) -> Self {
        Self::NotFound(format!("no person with ID {}", id.get()))
    }
}

pub type Result<T, E = LineageError> = std::result::Result<T, E>;

use thiserror::Error;

pub mod documents;
pub mod queries;
pub mod seed;
pub mod tenancy;

/// Storage-level error taxonomy. Constraint violations surface directly to
/// the caller; nothing in this layer retries.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} '{value}' already exists")]
    Conflict { entity: &'static str, value: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Integrity(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

impl StoreError {
    pub fn conflict(entity: &'static str, value: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            value: value.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity(message.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

//! Error types for estate-authz
//!
//! This module defines the error hierarchy used throughout the crate.
//! We use `thiserror` for library-style errors that are part of the API.
//! A denied permission check is never an error: it is `Ok(false)`.

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authorization error: {0}")]
    Authz(#[from] AuthzError),

    #[error("Administration error: {0}")]
    Admin(#[from] AdminError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the role/rule stores
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Errors returned by the permission evaluator
///
/// Only malformed input and storage failures are errors. Every other
/// negative outcome collapses into a plain `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

impl AuthzError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AuthzError::InvalidArgument(message.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, AuthzError::InvalidArgument(_))
    }

    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, AuthzError::StorageUnavailable(_))
    }
}

/// Errors raised by admin console writes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl AdminError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AdminError::InvalidArgument(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        AdminError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => AdminError::NotFound { entity, id },
            other => AdminError::Store(other),
        }
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for permission checks
pub type AuthzResult<T> = std::result::Result<T, AuthzError>;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for admin console operations
pub type AdminResult<T> = std::result::Result<T, AdminError>;

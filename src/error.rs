// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! Validation and corrupt-state errors live next to the code that raises
//! them (`models::input`, `services::persistence`); this module gathers
//! them into one umbrella type for callers that don't care which layer failed.

use crate::db::StorageError;
use crate::models::ValidationError;
use crate::services::persistence::{CorruptStateError, PersistenceError};
use crate::services::store::StoreError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid workout: {0}")]
    Validation(#[from] ValidationError),

    #[error("Stored workouts are corrupt: {0}")]
    CorruptState(#[from] CorruptStateError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Errors the user can fix by changing their input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

/// Result type alias for fallible application operations
pub type Result<T> = std::result::Result<T, AppError>;

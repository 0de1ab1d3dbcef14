// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - workout state and synchronization.

pub mod coordinator;
pub mod markers;
pub mod persistence;
pub mod store;

pub use coordinator::{CoordinatorSettings, FormState, SubmitError, SyncCoordinator, UiEvent};
pub use markers::MarkerRegistry;
pub use persistence::{CorruptStateError, PersistenceAdapter, PersistenceError};
pub use store::{SortOrder, StoreError, WorkoutStore};

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Mapty: log running and cycling workouts on a map.
//!
//! This crate holds the workout state engine: the workout list, its map
//! markers and its saved copy, kept in step by a single coordinator.

pub mod config;
pub mod db;
pub mod error;
pub mod map;
pub mod models;
pub mod services;
pub mod time_utils;

use config::Config;
use db::KeyValueStore;
use services::{CoordinatorSettings, PersistenceAdapter, SyncCoordinator, UiEvent};
use tokio::sync::mpsc::UnboundedSender;

/// Build the coordinator for `storage` using the configured key and display
/// settings.
pub fn start_coordinator<S: KeyValueStore>(
    config: &Config,
    storage: S,
    events: UnboundedSender<UiEvent>,
) -> SyncCoordinator<S> {
    let persistence = PersistenceAdapter::new(storage, config.storage_key.clone());
    SyncCoordinator::start(persistence, CoordinatorSettings::from(config), events)
}

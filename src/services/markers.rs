// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Association between workouts and their map markers.

use std::collections::HashMap;

use crate::map::MarkerHandle;
use crate::models::WorkoutId;

/// Maps workout ids to the marker handles the map widget gave us.
///
/// The registry does what it's told; keeping it in step with the workout
/// store is the coordinator's job.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    markers: HashMap<WorkoutId, MarkerHandle>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the marker for `id`. Returns a handle previously stored under
    /// the same id so the caller can still tear it down.
    pub fn attach(&mut self, id: WorkoutId, handle: MarkerHandle) -> Option<MarkerHandle> {
        let stale = self.markers.insert(id, handle);
        if stale.is_some() {
            tracing::warn!(id = %id, "Marker attached twice for workout");
        }
        stale
    }

    /// Forget the marker for `id`, returning it for teardown.
    pub fn detach(&mut self, id: WorkoutId) -> Option<MarkerHandle> {
        self.markers.remove(&id)
    }

    /// Forget every marker, returning all handles for teardown.
    pub fn clear(&mut self) -> Vec<MarkerHandle> {
        self.markers.drain().map(|(_, handle)| handle).collect()
    }

    pub fn get(&self, id: WorkoutId) -> Option<MarkerHandle> {
        self.markers.get(&id).copied()
    }

    pub fn contains(&self, id: WorkoutId) -> bool {
        self.markers.contains_key(&id)
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> Vec<WorkoutId> {
        let mut ids: Vec<WorkoutId> = self.markers.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

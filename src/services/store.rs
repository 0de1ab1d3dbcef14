// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ordered in-memory collection of workouts.

use crate::models::{Workout, WorkoutId};

/// Sort orders for the workout list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Distance ascending.
    #[default]
    Distance,
    /// Creation order (id ascending).
    Insertion,
}

impl SortOrder {
    /// The order applied by the following sort intent.
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Distance => SortOrder::Insertion,
            SortOrder::Insertion => SortOrder::Distance,
        }
    }
}

/// Errors from store mutations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Workout {0} already exists")]
    DuplicateId(WorkoutId),
}

/// Ordered sequence of workouts, unique by id.
#[derive(Debug, Default, Clone)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from hydrated workouts.
    pub fn from_workouts(workouts: Vec<Workout>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for workout in workouts {
            store.append(workout)?;
        }
        Ok(store)
    }

    /// Add a workout at the end. Fails without changes if the id is taken.
    pub fn append(&mut self, workout: Workout) -> Result<(), StoreError> {
        if self.position(workout.id()).is_some() {
            return Err(StoreError::DuplicateId(workout.id()));
        }
        self.workouts.push(workout);
        Ok(())
    }

    /// Remove a workout, returning it if it was present.
    pub fn remove(&mut self, id: WorkoutId) -> Option<Workout> {
        self.position(id).map(|index| self.workouts.remove(index))
    }

    pub fn find_by_id(&self, id: WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: WorkoutId) -> Option<&mut Workout> {
        self.workouts.iter_mut().find(|w| w.id() == id)
    }

    /// Stable in-place sort; ties keep their current relative order.
    pub fn sort_by(&mut self, order: SortOrder) {
        match order {
            SortOrder::Distance => self
                .workouts
                .sort_by(|a, b| a.distance_km().total_cmp(&b.distance_km())),
            SortOrder::Insertion => self.workouts.sort_by_key(|w| w.id()),
        }
    }

    /// Drop every workout.
    pub fn reset(&mut self) {
        self.workouts.clear();
    }

    pub fn as_slice(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workout> {
        self.workouts.iter()
    }

    pub fn ids(&self) -> Vec<WorkoutId> {
        self.workouts.iter().map(|w| w.id()).collect()
    }

    /// Highest id in the store, used to seed the id generator.
    pub fn max_id(&self) -> Option<WorkoutId> {
        self.workouts.iter().map(|w| w.id()).max()
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    fn position(&self, id: WorkoutId) -> Option<usize> {
        self.workouts.iter().position(|w| w.id() == id)
    }
}

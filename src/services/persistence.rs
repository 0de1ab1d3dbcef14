// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Saving and re-hydrating the workout list.
//!
//! The whole list is stored as one JSON array under a single key. Loading
//! parses plain data first, then rebuilds each entry into the right
//! [`WorkoutKind`](crate::models::WorkoutKind) by its `type` field. Nothing is
//! defaulted: an entry missing any field makes the whole value corrupt.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::db::{KeyValueStore, StorageError};
use crate::models::{Coordinates, ValidationError, Workout, WorkoutId, WorkoutInput, WorkoutType};
use crate::time_utils::{format_utc_rfc3339, parse_utc_rfc3339};

/// One persisted workout entry.
///
/// Every field is optional so that a missing field is reported by name
/// rather than as a generic parse error.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWorkout {
    #[serde(rename = "type")]
    kind: Option<String>,
    id: Option<String>,
    date: Option<String>,
    coords: Option<[f64; 2]>,
    distance: Option<f64>,
    duration: Option<f64>,
    description: Option<String>,
    clicks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cadence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pace: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elevation_gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f64>,
}

impl From<&Workout> for StoredWorkout {
    fn from(workout: &Workout) -> Self {
        Self {
            kind: Some(workout.workout_type().as_str().to_string()),
            id: Some(workout.id().to_string()),
            date: Some(format_utc_rfc3339(workout.created_at())),
            coords: Some(workout.coords().into()),
            distance: Some(workout.distance_km()),
            duration: Some(workout.duration_min()),
            description: Some(workout.description().to_string()),
            clicks: Some(workout.clicks()),
            cadence: workout.cadence(),
            pace: workout.pace(),
            elevation_gain: workout.elevation_gain(),
            speed: workout.speed(),
        }
    }
}

impl StoredWorkout {
    /// Rebuild a workout. `index` is the entry's position, for error messages.
    fn hydrate(self, index: usize) -> Result<Workout, CorruptStateError> {
        let missing = |field: &'static str| CorruptStateError::MissingField { index, field };

        let kind_tag = self.kind.ok_or_else(|| missing("type"))?;
        let kind: WorkoutType = kind_tag
            .parse()
            .map_err(|_| CorruptStateError::UnknownType {
                index,
                value: kind_tag.clone(),
            })?;

        let id_text = self.id.ok_or_else(|| missing("id"))?;
        let id: WorkoutId = id_text.parse().map_err(|_| CorruptStateError::InvalidField {
            index,
            field: "id",
            value: id_text.clone(),
        })?;

        let date_text = self.date.ok_or_else(|| missing("date"))?;
        let created_at =
            parse_utc_rfc3339(&date_text).ok_or_else(|| CorruptStateError::InvalidField {
                index,
                field: "date",
                value: date_text.clone(),
            })?;

        let coords: Coordinates = self.coords.ok_or_else(|| missing("coords"))?.into();
        let distance_km = self.distance.ok_or_else(|| missing("distance"))?;
        let duration_min = self.duration.ok_or_else(|| missing("duration"))?;
        let description = self.description.ok_or_else(|| missing("description"))?;
        let clicks = self.clicks.ok_or_else(|| missing("clicks"))?;

        let extra = match kind {
            WorkoutType::Running => self.cadence.ok_or_else(|| missing("cadence"))?,
            WorkoutType::Cycling => self.elevation_gain.ok_or_else(|| missing("elevationGain"))?,
        };

        let input = WorkoutInput {
            kind,
            distance_km,
            duration_min,
            extra,
        };
        Workout::restore(id, created_at, coords, &input, description, clicks)
            .map_err(|source| CorruptStateError::Invalid { index, source })
    }
}

/// Persisted workouts could not be turned back into records.
#[derive(Debug, thiserror::Error)]
pub enum CorruptStateError {
    #[error("Stored value is not a workout list: {0}")]
    Malformed(String),

    #[error("Entry {index} is missing field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Entry {index} has unknown workout type '{value}'")]
    UnknownType { index: usize, value: String },

    #[error("Entry {index} has invalid {field} '{value}'")]
    InvalidField {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("Entry {index} is not a valid workout: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("Workout id {0} appears more than once")]
    DuplicateId(WorkoutId),
}

/// Errors from reading or writing persisted workouts.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Corrupt(#[from] CorruptStateError),

    #[error("Failed to serialize workouts: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PersistenceError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, PersistenceError::Corrupt(_))
    }
}

/// Reads and writes the workout list under one namespace key.
#[derive(Debug)]
pub struct PersistenceAdapter<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Overwrite the stored list with `workouts`, in order.
    pub fn save(&mut self, workouts: &[Workout]) -> Result<(), PersistenceError> {
        let entries: Vec<StoredWorkout> = workouts.iter().map(StoredWorkout::from).collect();
        let json = serde_json::to_string(&entries)?;
        self.storage.set(&self.key, &json)?;
        tracing::debug!(key = %self.key, count = workouts.len(), bytes = json.len(), "Saved workouts");
        Ok(())
    }

    /// Read the stored list. A missing key is an empty list.
    pub fn load(&self) -> Result<Vec<Workout>, PersistenceError> {
        let Some(json) = self.storage.get(&self.key)? else {
            tracing::debug!(key = %self.key, "No stored workouts");
            return Ok(Vec::new());
        };
        let workouts = parse_workouts(&json)?;
        tracing::info!(key = %self.key, count = workouts.len(), "Loaded workouts");
        Ok(workouts)
    }

    /// Remove the stored list entirely.
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.storage.remove(&self.key)?;
        tracing::info!(key = %self.key, "Cleared stored workouts");
        Ok(())
    }
}

/// Parse and re-hydrate a stored workout list.
pub fn parse_workouts(json: &str) -> Result<Vec<Workout>, CorruptStateError> {
    let entries: Vec<StoredWorkout> =
        serde_json::from_str(json).map_err(|e| CorruptStateError::Malformed(e.to_string()))?;

    let mut seen = HashSet::with_capacity(entries.len());
    let mut workouts = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let workout = entry.hydrate(index)?;
        if !seen.insert(workout.id()) {
            return Err(CorruptStateError::DuplicateId(workout.id()));
        }
        workouts.push(workout);
    }
    Ok(workouts)
}

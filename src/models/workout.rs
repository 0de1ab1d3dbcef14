// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout record model.
//!
//! A [`Workout`] is built from validated input and is immutable afterwards,
//! apart from its click counter. The variant ([`WorkoutKind`]) fixes which
//! extra field and which derived metric are present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::input::{InvalidReason, ValidationError, WorkoutField, WorkoutInput, WorkoutType};
use crate::time_utils::{month_day_label, truncate_to_millis};

/// Unique workout identifier.
///
/// Holds the creation time in milliseconds since the epoch, bumped by the id
/// generator so it is strictly increasing. Numeric order is creation order.
/// Persisted as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct WorkoutId(u64);

impl WorkoutId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkoutId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(WorkoutId)
    }
}

impl From<WorkoutId> for String {
    fn from(id: WorkoutId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for WorkoutId {
    type Error = std::num::ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A (latitude, longitude) pair, persisted as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both values must be finite, latitude within ±90 and longitude within
    /// ±180. Non-finite values would be written to storage as `null`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range(WorkoutField::Latitude, self.lat, 90.0)?;
        check_range(WorkoutField::Longitude, self.lng, 180.0)
    }
}

fn check_range(field: WorkoutField, value: f64, limit: f64) -> Result<(), ValidationError> {
    let reason = if !value.is_finite() {
        InvalidReason::NotFinite
    } else if value.abs() > limit {
        InvalidReason::OutOfRange
    } else {
        return Ok(());
    };
    Err(ValidationError {
        field,
        reason,
        value,
    })
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lng]
    }
}

impl From<Coordinates> for geo::Coord<f64> {
    /// Map coordinates use x = longitude, y = latitude.
    fn from(c: Coordinates) -> Self {
        geo::coord! { x: c.lng, y: c.lat }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

/// Variant payload: the extra field and the metric derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutKind {
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

impl WorkoutKind {
    /// Derive the variant payload. Inputs must already be validated.
    fn derive(input: &WorkoutInput) -> Self {
        match input.kind {
            WorkoutType::Running => WorkoutKind::Running {
                cadence_spm: input.extra,
                pace_min_per_km: pace(input.distance_km, input.duration_min),
            },
            WorkoutType::Cycling => WorkoutKind::Cycling {
                elevation_gain_m: input.extra,
                speed_km_per_h: speed(input.distance_km, input.duration_min),
            },
        }
    }

    pub fn workout_type(&self) -> WorkoutType {
        match self {
            WorkoutKind::Running { .. } => WorkoutType::Running,
            WorkoutKind::Cycling { .. } => WorkoutType::Cycling,
        }
    }
}

/// Running pace in min/km.
pub fn pace(distance_km: f64, duration_min: f64) -> f64 {
    duration_min / distance_km
}

/// Cycling speed in km/h.
pub fn speed(distance_km: f64, duration_min: f64) -> f64 {
    distance_km / (duration_min / 60.0)
}

/// Description text, e.g. "Running on April 14".
pub fn describe(kind: WorkoutType, created_at: DateTime<Utc>) -> String {
    format!("{} on {}", kind.label(), month_day_label(created_at))
}

/// One logged workout.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coords: Coordinates,
    distance_km: f64,
    duration_min: f64,
    description: String,
    clicks: u32,
    kind: WorkoutKind,
}

impl Workout {
    /// Validate `coords` and `input` and build a new record with a fresh
    /// description. `created_at` is truncated to milliseconds so the record
    /// reloads unchanged.
    pub fn new(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coords: Coordinates,
        input: &WorkoutInput,
    ) -> Result<Self, ValidationError> {
        coords.validate()?;
        input.validate()?;
        let created_at = truncate_to_millis(created_at);
        Ok(Self {
            id,
            created_at,
            coords,
            distance_km: input.distance_km,
            duration_min: input.duration_min,
            description: describe(input.kind, created_at),
            clicks: 0,
            kind: WorkoutKind::derive(input),
        })
    }

    /// Rebuild a stored record, keeping its persisted description and clicks.
    pub fn restore(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coords: Coordinates,
        input: &WorkoutInput,
        description: String,
        clicks: u32,
    ) -> Result<Self, ValidationError> {
        coords.validate()?;
        input.validate()?;
        Ok(Self {
            id,
            created_at,
            coords,
            distance_km: input.distance_km,
            duration_min: input.duration_min,
            description,
            clicks,
            kind: WorkoutKind::derive(input),
        })
    }

    pub fn id(&self) -> WorkoutId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coords(&self) -> Coordinates {
        self.coords
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn kind(&self) -> &WorkoutKind {
        &self.kind
    }

    pub fn workout_type(&self) -> WorkoutType {
        self.kind.workout_type()
    }

    /// Pace in min/km; `None` for cycling.
    pub fn pace(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running {
                pace_min_per_km, ..
            } => Some(pace_min_per_km),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    /// Speed in km/h; `None` for running.
    pub fn speed(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling { speed_km_per_h, .. } => Some(speed_km_per_h),
            WorkoutKind::Running { .. } => None,
        }
    }

    pub fn cadence(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running { cadence_spm, .. } => Some(cadence_spm),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    pub fn elevation_gain(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling {
                elevation_gain_m, ..
            } => Some(elevation_gain_m),
            WorkoutKind::Running { .. } => None,
        }
    }

    /// The input this record was built from, used to pre-fill the edit form.
    pub fn to_input(&self) -> WorkoutInput {
        let extra = match self.kind {
            WorkoutKind::Running { cadence_spm, .. } => cadence_spm,
            WorkoutKind::Cycling {
                elevation_gain_m, ..
            } => elevation_gain_m,
        };
        WorkoutInput {
            kind: self.workout_type(),
            distance_km: self.distance_km,
            duration_min: self.duration_min,
            extra,
        }
    }

    /// Count one interaction with this workout's marker.
    pub fn record_click(&mut self) {
        self.clicks = self.clicks.saturating_add(1);
    }
}

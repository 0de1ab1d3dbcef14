// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout form input and its validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workout variant discriminator, persisted as `"running"` / `"cycling"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Running,
    Cycling,
}

impl WorkoutType {
    /// Lowercase tag used in storage and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Running => "running",
            WorkoutType::Cycling => "cycling",
        }
    }

    /// Capitalized label used in descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutType::Running => "Running",
            WorkoutType::Cycling => "Cycling",
        }
    }

    /// The form field holding this variant's extra metric.
    pub fn extra_field(&self) -> WorkoutField {
        match self {
            WorkoutType::Running => WorkoutField::Cadence,
            WorkoutType::Cycling => WorkoutField::ElevationGain,
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(WorkoutType::Running),
            "cycling" => Ok(WorkoutType::Cycling),
            other => Err(format!("unknown workout type '{}'", other)),
        }
    }
}

/// Numeric fields named in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutField {
    Distance,
    Duration,
    Cadence,
    ElevationGain,
    Latitude,
    Longitude,
}

impl fmt::Display for WorkoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkoutField::Distance => "distance",
            WorkoutField::Duration => "duration",
            WorkoutField::Cadence => "cadence",
            WorkoutField::ElevationGain => "elevation gain",
            WorkoutField::Latitude => "latitude",
            WorkoutField::Longitude => "longitude",
        })
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    NotFinite,
    NotPositive,
    OutOfRange,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InvalidReason::NotFinite => "not a finite number",
            InvalidReason::NotPositive => "not greater than zero",
            InvalidReason::OutOfRange => "out of range",
        })
    }
}

/// A numeric workout field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("{field} is {reason} (got {value})")]
pub struct ValidationError {
    pub field: WorkoutField,
    pub reason: InvalidReason,
    pub value: f64,
}

/// Raw workout values as entered in the form.
///
/// `extra` is the cadence (steps/min) for running and the elevation gain (m)
/// for cycling. The same struct pre-fills the form when a workout is edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutInput {
    pub kind: WorkoutType,
    pub distance_km: f64,
    pub duration_min: f64,
    pub extra: f64,
}

impl WorkoutInput {
    pub fn running(distance_km: f64, duration_min: f64, cadence_spm: f64) -> Self {
        Self {
            kind: WorkoutType::Running,
            distance_km,
            duration_min,
            extra: cadence_spm,
        }
    }

    pub fn cycling(distance_km: f64, duration_min: f64, elevation_gain_m: f64) -> Self {
        Self {
            kind: WorkoutType::Cycling,
            distance_km,
            duration_min,
            extra: elevation_gain_m,
        }
    }

    /// Build input from raw form text. Text that isn't a number becomes NaN
    /// and is rejected by [`WorkoutInput::validate`].
    pub fn from_form(kind: WorkoutType, distance: &str, duration: &str, extra: &str) -> Self {
        Self {
            kind,
            distance_km: parse_field(distance),
            duration_min: parse_field(duration),
            extra: parse_field(extra),
        }
    }

    /// Check distance, duration and the variant metric, in that order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive(WorkoutField::Distance, self.distance_km)?;
        check_positive(WorkoutField::Duration, self.duration_min)?;
        check_positive(self.kind.extra_field(), self.extra)?;
        Ok(())
    }
}

fn parse_field(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn check_positive(field: WorkoutField, value: f64) -> Result<(), ValidationError> {
    let reason = if !value.is_finite() {
        InvalidReason::NotFinite
    } else if value <= 0.0 {
        InvalidReason::NotPositive
    } else {
        return Ok(());
    };
    Err(ValidationError {
        field,
        reason,
        value,
    })
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod input;
pub mod workout;

pub use input::{InvalidReason, ValidationError, WorkoutField, WorkoutInput, WorkoutType};
pub use workout::{Coordinates, Workout, WorkoutId, WorkoutKind};

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map widget and geolocation boundaries.
//!
//! The core never draws anything. It asks a [`MapWidget`] for markers and
//! view changes, and gets the starting position from a [`PositionSource`]
//! exactly once at startup.

use geo::{BoundingRect, MultiPoint, Point};
use std::future::Future;
use std::time::Duration;

use crate::models::{Coordinates, Workout};

/// Opaque handle for a marker owned by the map widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Rectangle covering a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl Bounds {
    /// Smallest rectangle containing every workout location.
    pub fn around(workouts: &[Workout]) -> Option<Self> {
        let points: MultiPoint<f64> = workouts
            .iter()
            .map(|w| Point::from(geo::Coord::from(w.coords())))
            .collect();
        let rect = points.bounding_rect()?;
        Some(Self {
            south_west: Coordinates::new(rect.min().y, rect.min().x),
            north_east: Coordinates::new(rect.max().y, rect.max().x),
        })
    }
}

/// The interactive map the workouts are drawn on.
pub trait MapWidget {
    /// Draw a marker (with its popup) for `workout` and hand back its handle.
    fn add_marker(&mut self, workout: &Workout) -> MarkerHandle;

    /// Remove a marker and release its resources.
    fn remove_marker(&mut self, handle: MarkerHandle);

    /// Centre the view on `coords` at `zoom`.
    fn set_view(&mut self, coords: Coordinates, zoom: u8);

    /// Fit the view to `bounds`.
    fn fit_bounds(&mut self, bounds: Bounds);
}

/// Why a position could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Geolocation is not supported")]
    Unsupported,

    #[error("Position unavailable: {0}")]
    Unavailable(String),

    #[error("Timed out waiting for position")]
    Timeout,
}

/// Provider of the user's current position.
pub trait PositionSource {
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, GeolocationError>> + Send;
}

/// Result of the one-time position lookup at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionOutcome {
    Located(Coordinates),
    Failed(String),
    Unsupported,
}

/// Ask `source` for the current position, giving up after `timeout`.
pub async fn acquire_position<S: PositionSource>(source: &S, timeout: Duration) -> PositionOutcome {
    let result = match tokio::time::timeout(timeout, source.current_position()).await {
        Ok(result) => result,
        Err(_) => Err(GeolocationError::Timeout),
    };

    match result {
        Ok(coords) => {
            tracing::info!(%coords, "Position acquired");
            PositionOutcome::Located(coords)
        }
        Err(GeolocationError::Unsupported) => {
            tracing::warn!("Geolocation not supported");
            PositionOutcome::Unsupported
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not get current position");
            PositionOutcome::Failed(e.to_string())
        }
    }
}

/// Position source that reports a fixed location, or no support at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition {
    coords: Option<Coordinates>,
}

impl FixedPosition {
    pub fn new(coords: Option<Coordinates>) -> Self {
        Self { coords }
    }
}

impl PositionSource for FixedPosition {
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, GeolocationError>> + Send {
        let coords = self.coords;
        async move { coords.ok_or(GeolocationError::Unsupported) }
    }
}

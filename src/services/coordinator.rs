// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout synchronization coordinator.
//!
//! Every user intent goes through [`SyncCoordinator`], which applies it in a
//! fixed order:
//! 1. Mutate the workout store
//! 2. Add or remove the matching map marker
//! 3. Save the full list
//! 4. Tell the presentation layer to re-render
//!
//! The store is the source of truth. Markers and the stored JSON are
//! projections of it and are updated before the intent returns.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::Config;
use crate::db::KeyValueStore;
use crate::map::{Bounds, MapWidget, PositionOutcome};
use crate::models::{Coordinates, ValidationError, Workout, WorkoutId, WorkoutInput};
use crate::services::markers::MarkerRegistry;
use crate::services::persistence::{PersistenceAdapter, PersistenceError};
use crate::services::store::{SortOrder, WorkoutStore};

pub const MSG_NO_LOCATION: &str = "Please select a location on the map";
pub const MSG_INVALID_LOCATION: &str = "That location is not on the map";
pub const MSG_INVALID_INPUT: &str = "Inputs have to be positive numbers";
pub const MSG_NO_POSITION: &str = "Couldn't get your current position.";

/// Signals for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The workout list changed; redraw it from `workouts()`.
    Render,
    /// Show `message`, then dismiss it after `duration`.
    Notify { message: String, duration: Duration },
    /// Open the workout form, optionally pre-filled for an edit.
    ShowForm(Option<WorkoutInput>),
    /// Clear and close the workout form.
    HideForm,
    /// The map could not be initialized; map features stay disabled.
    PositionUnavailable(String),
    /// Stored data was cleared; restart from storage.
    Reload,
}

/// Where the form flow currently is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormState {
    Idle,
    AwaitingLocation { coords: Coordinates },
}

/// Why a form submission was not committed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error("No location selected")]
    NoLocation,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Workout {0} already exists")]
    DuplicateId(WorkoutId),

    #[error("No workout ids left")]
    IdsExhausted,
}

/// Display settings used by the coordinator.
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorSettings {
    pub map_zoom: u8,
    pub alert_duration: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            map_zoom: 13,
            alert_duration: Duration::from_secs(5),
        }
    }
}

impl From<&Config> for CoordinatorSettings {
    fn from(config: &Config) -> Self {
        Self {
            map_zoom: config.map_zoom,
            alert_duration: config.alert_duration,
        }
    }
}

/// Hands out strictly increasing ids based on creation time in milliseconds.
#[derive(Debug, Default)]
struct IdGenerator {
    last: Option<WorkoutId>,
}

impl IdGenerator {
    fn seeded(last: Option<WorkoutId>) -> Self {
        Self { last }
    }

    /// `None` once the previous id is `u64::MAX`.
    fn next(&mut self, now: DateTime<Utc>) -> Option<WorkoutId> {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let value = match self.last {
            Some(last) => millis.max(last.value().checked_add(1)?),
            None => millis,
        };
        let id = WorkoutId::new(value);
        self.last = Some(id);
        Some(id)
    }
}

type Clock = Box<dyn Fn() -> DateTime<Utc>>;

/// Owns the workout store, marker registry and persistence, and keeps them
/// consistent across every intent.
pub struct SyncCoordinator<S> {
    store: WorkoutStore,
    markers: MarkerRegistry,
    persistence: PersistenceAdapter<S>,
    map: Option<Box<dyn MapWidget>>,
    form: FormState,
    next_sort: SortOrder,
    ids: IdGenerator,
    clock: Clock,
    settings: CoordinatorSettings,
    events: UnboundedSender<UiEvent>,
}

impl<S: KeyValueStore> SyncCoordinator<S> {
    /// Load stored workouts and emit the initial render.
    ///
    /// Corrupt or unreadable storage starts an empty session instead of
    /// failing; the bad value is overwritten by the next save.
    pub fn start(
        persistence: PersistenceAdapter<S>,
        settings: CoordinatorSettings,
        events: UnboundedSender<UiEvent>,
    ) -> Self {
        let store = match persistence.load() {
            Ok(workouts) => WorkoutStore::from_workouts(workouts).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Stored workouts rejected, starting empty");
                WorkoutStore::new()
            }),
            Err(e) => {
                if e.is_corrupt() {
                    tracing::warn!(error = %e, "Stored workouts are corrupt, starting empty");
                } else {
                    tracing::error!(error = %e, "Could not read stored workouts, starting empty");
                }
                WorkoutStore::new()
            }
        };

        let coordinator = Self {
            ids: IdGenerator::seeded(store.max_id()),
            store,
            markers: MarkerRegistry::new(),
            persistence,
            map: None,
            form: FormState::Idle,
            next_sort: SortOrder::default(),
            clock: Box::new(Utc::now),
            settings,
            events,
        };
        tracing::info!(count = coordinator.store.len(), "Coordinator started");
        coordinator.emit(UiEvent::Render);
        coordinator
    }

    /// Replace the wall clock used for ids and creation times.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // ─── Read Accessors ──────────────────────────────────────────

    /// Current workouts, in list order.
    pub fn workouts(&self) -> &[Workout] {
        self.store.as_slice()
    }

    pub fn find(&self, id: WorkoutId) -> Option<&Workout> {
        self.store.find_by_id(id)
    }

    pub fn form_state(&self) -> FormState {
        self.form
    }

    pub fn is_map_ready(&self) -> bool {
        self.map.is_some()
    }

    /// Ids that currently have a marker, ascending.
    pub fn marker_ids(&self) -> Vec<WorkoutId> {
        self.markers.ids()
    }

    /// The order the next sort intent will apply.
    pub fn next_sort_order(&self) -> SortOrder {
        self.next_sort
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    /// Give up ownership of the storage, e.g. to restart after a reset.
    pub fn into_storage(self) -> S {
        self.persistence.into_storage()
    }

    // ─── Map Lifecycle ───────────────────────────────────────────

    /// Finish map setup once the position lookup has resolved.
    ///
    /// On success the map is centred on the position and markers are created
    /// for every stored workout. Otherwise the map is dropped and marker
    /// rendering stays deferred. Markers on a previously attached map are
    /// torn down first.
    pub fn init_map(&mut self, outcome: PositionOutcome, mut map: Box<dyn MapWidget>) -> bool {
        self.detach_map();

        let coords = match outcome {
            PositionOutcome::Located(coords) => coords,
            PositionOutcome::Failed(reason) => {
                tracing::warn!(%reason, "Map disabled");
                self.emit(UiEvent::PositionUnavailable(MSG_NO_POSITION.to_string()));
                return false;
            }
            PositionOutcome::Unsupported => {
                tracing::warn!("Map disabled: geolocation unsupported");
                self.emit(UiEvent::PositionUnavailable(MSG_NO_POSITION.to_string()));
                return false;
            }
        };

        map.set_view(coords, self.settings.map_zoom);
        for workout in self.store.iter() {
            let handle = map.add_marker(workout);
            if let Some(stale) = self.markers.attach(workout.id(), handle) {
                map.remove_marker(stale);
            }
        }
        tracing::info!(%coords, markers = self.markers.len(), "Map ready");
        self.map = Some(map);
        true
    }

    // ─── Form Flow ───────────────────────────────────────────────

    /// A location was picked on the map: open the form for it.
    ///
    /// Coordinates that are not a real position are rejected with a
    /// notification and leave the form as it was.
    pub fn map_clicked(&mut self, coords: Coordinates) -> bool {
        if let Err(e) = coords.validate() {
            tracing::warn!(error = %e, "Rejected map location");
            self.notify(MSG_INVALID_LOCATION);
            return false;
        }
        self.form = FormState::AwaitingLocation { coords };
        self.emit(UiEvent::ShowForm(None));
        true
    }

    /// Close the form and forget the picked location.
    pub fn cancel_form(&mut self) {
        if self.form != FormState::Idle {
            self.form = FormState::Idle;
            self.emit(UiEvent::HideForm);
        }
    }

    /// Validate and commit a new workout at the picked location.
    ///
    /// On failure nothing is committed, a notification is emitted and the
    /// form stays open.
    pub fn submit(&mut self, input: WorkoutInput) -> Result<WorkoutId, SubmitError> {
        let FormState::AwaitingLocation { coords } = self.form else {
            self.notify(MSG_NO_LOCATION);
            return Err(SubmitError::NoLocation);
        };

        if let Err(e) = input.validate() {
            tracing::debug!(error = %e, "Rejected workout input");
            self.notify(MSG_INVALID_INPUT);
            return Err(SubmitError::Invalid(e));
        }

        let now = (self.clock)();
        let Some(id) = self.ids.next(now) else {
            tracing::error!("Workout ids exhausted");
            self.notify(&SubmitError::IdsExhausted.to_string());
            return Err(SubmitError::IdsExhausted);
        };
        let workout = match Workout::new(id, now, coords, &input) {
            Ok(workout) => workout,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected workout");
                self.notify(MSG_INVALID_INPUT);
                return Err(SubmitError::Invalid(e));
            }
        };

        if let Err(e) = self.store.append(workout) {
            // Ids are generated above every stored id, so this is a bug.
            tracing::error!(error = %e, "Generated workout id collided");
            return Err(SubmitError::DuplicateId(id));
        }
        self.attach_marker(id);
        self.form = FormState::Idle;
        self.emit(UiEvent::HideForm);
        tracing::info!(id = %id, kind = %input.kind, %coords, "Workout created");
        self.commit();
        Ok(id)
    }

    // ─── List Intents ────────────────────────────────────────────

    /// Delete a workout. Returns `false` (and does nothing) for unknown ids.
    pub fn delete(&mut self, id: WorkoutId) -> bool {
        if !self.remove_workout(id) {
            tracing::debug!(id = %id, "Delete of unknown workout ignored");
            return false;
        }
        tracing::info!(id = %id, "Workout deleted");
        self.commit();
        true
    }

    /// Start editing a workout.
    ///
    /// The workout is removed right away, exactly like a delete, and the
    /// form is reopened at its location with its values. Submitting creates
    /// a new workout with a new id and a zero click count. Returns the
    /// pre-fill values, or `None` for unknown ids.
    pub fn edit(&mut self, id: WorkoutId) -> Option<WorkoutInput> {
        let (prefill, coords) = {
            let workout = self.store.find_by_id(id)?;
            (workout.to_input(), workout.coords())
        };

        self.remove_workout(id);
        self.form = FormState::AwaitingLocation { coords };
        self.emit(UiEvent::ShowForm(Some(prefill)));
        tracing::info!(id = %id, "Workout opened for editing");
        self.commit();
        Some(prefill)
    }

    /// Sort the list, alternating between distance and creation order.
    /// Markers are left alone. Returns the order applied.
    pub fn sort(&mut self) -> SortOrder {
        let order = self.next_sort;
        self.store.sort_by(order);
        self.next_sort = order.toggled();
        tracing::debug!(?order, "Workouts sorted");
        self.commit();
        order
    }

    /// Count a click on a workout's marker.
    pub fn marker_clicked(&mut self, id: WorkoutId) -> bool {
        let Some(workout) = self.store.find_by_id_mut(id) else {
            return false;
        };
        workout.record_click();
        tracing::debug!(id = %id, clicks = workout.clicks(), "Marker clicked");
        self.save();
        true
    }

    /// Centre the map on a workout.
    pub fn focus_workout(&mut self, id: WorkoutId) -> bool {
        let Some(coords) = self.store.find_by_id(id).map(|w| w.coords()) else {
            return false;
        };
        let zoom = self.settings.map_zoom;
        match self.map.as_mut() {
            Some(map) => {
                map.set_view(coords, zoom);
                true
            }
            None => false,
        }
    }

    /// Fit the map around every workout.
    pub fn show_all(&mut self) -> bool {
        let Some(bounds) = Bounds::around(self.store.as_slice()) else {
            return false;
        };
        match self.map.as_mut() {
            Some(map) => {
                map.fit_bounds(bounds);
                true
            }
            None => false,
        }
    }

    /// Delete all stored workouts and ask the host to reload.
    ///
    /// The in-memory state is left as is; the host is expected to build a
    /// fresh coordinator from storage.
    pub fn reset(&mut self) -> Result<(), PersistenceError> {
        if let Err(e) = self.persistence.clear() {
            tracing::error!(error = %e, "Failed to clear stored workouts");
            self.notify(&format!("Could not reset workouts: {}", e));
            return Err(e);
        }
        self.emit(UiEvent::Reload);
        Ok(())
    }

    // ─── Internals ───────────────────────────────────────────────

    /// Remove a workout and its marker. Returns whether it existed.
    fn remove_workout(&mut self, id: WorkoutId) -> bool {
        if self.store.remove(id).is_none() {
            return false;
        }
        if let Some(handle) = self.markers.detach(id) {
            if let Some(map) = self.map.as_mut() {
                map.remove_marker(handle);
            }
        }
        true
    }

    /// Drop the current map, removing every marker drawn on it.
    fn detach_map(&mut self) {
        let Some(mut old) = self.map.take() else {
            return;
        };
        let handles = self.markers.clear();
        tracing::info!(markers = handles.len(), "Replacing map");
        for handle in handles {
            old.remove_marker(handle);
        }
    }

    fn attach_marker(&mut self, id: WorkoutId) {
        let (Some(map), Some(workout)) = (self.map.as_mut(), self.store.find_by_id(id)) else {
            return;
        };
        let handle = map.add_marker(workout);
        if let Some(stale) = self.markers.attach(id, handle) {
            map.remove_marker(stale);
        }
    }

    /// Save, then re-render.
    fn commit(&mut self) {
        self.save();
        self.emit(UiEvent::Render);
    }

    /// Save the full list. Failures are reported, never rolled back.
    fn save(&mut self) {
        if let Err(e) = self.persistence.save(self.store.as_slice()) {
            tracing::error!(error = %e, count = self.store.len(), "Failed to save workouts");
            self.notify(&format!("Could not save workouts: {}", e));
        }
    }

    fn notify(&self, message: &str) {
        self.emit(UiEvent::Notify {
            message: message.to_string(),
            duration: self.settings.alert_duration,
        });
    }

    fn emit(&self, event: UiEvent) {
        // A closed channel means nobody is rendering; state is still valid.
        let _ = self.events.send(event);
    }
}

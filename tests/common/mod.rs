// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, TimeZone, Utc};
use mapty_tracker::db::{KeyValueStore, MemoryStore, StorageError};
use mapty_tracker::map::{Bounds, MapWidget, MarkerHandle, PositionOutcome};
use mapty_tracker::models::{Coordinates, Workout, WorkoutId};
use mapty_tracker::services::{
    CoordinatorSettings, PersistenceAdapter, SyncCoordinator, UiEvent,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Creation time used by every test coordinator: 2024-04-14T11:13:32.345Z.
#[allow(dead_code)]
pub const TEST_NOW_MILLIS: i64 = 1_713_093_212_345;

#[allow(dead_code)]
pub fn test_now() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(TEST_NOW_MILLIS).unwrap()
}

/// Everything a map widget was asked to do.
#[derive(Debug, Default)]
pub struct MapLog {
    /// Markers currently on the map
    pub live: BTreeMap<MarkerHandle, WorkoutId>,
    pub removed: Vec<MarkerHandle>,
    pub views: Vec<(Coordinates, u8)>,
    pub fitted: Vec<Bounds>,
    next_handle: u64,
}

impl MapLog {
    /// Workout ids that have a marker on the map, ascending.
    #[allow(dead_code)]
    pub fn marker_ids(&self) -> Vec<WorkoutId> {
        let mut ids: Vec<WorkoutId> = self.live.values().copied().collect();
        ids.sort();
        ids
    }
}

/// Map widget that records calls into a shared log.
#[derive(Clone, Default)]
pub struct RecordingMap(pub Rc<RefCell<MapLog>>);

impl MapWidget for RecordingMap {
    fn add_marker(&mut self, workout: &Workout) -> MarkerHandle {
        let mut log = self.0.borrow_mut();
        log.next_handle += 1;
        let handle = MarkerHandle::new(log.next_handle);
        log.live.insert(handle, workout.id());
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        let mut log = self.0.borrow_mut();
        assert!(
            log.live.remove(&handle).is_some(),
            "removed unknown marker {:?}",
            handle
        );
        log.removed.push(handle);
    }

    fn set_view(&mut self, coords: Coordinates, zoom: u8) {
        self.0.borrow_mut().views.push((coords, zoom));
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.0.borrow_mut().fitted.push(bounds);
    }
}

/// In-memory storage whose writes can be made to fail on demand.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    broken: Rc<Cell<bool>>,
}

impl FlakyStore {
    /// Switch that breaks (`true`) or repairs (`false`) writes after the
    /// store has been handed to a coordinator.
    #[allow(dead_code)]
    pub fn switch(&self) -> Rc<Cell<bool>> {
        self.broken.clone()
    }

    fn check(&self, key: &str) -> Result<(), StorageError> {
        if self.broken.get() {
            return Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::other("disk unplugged"),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.remove(key)
    }
}

/// A coordinator wired to test storage, with its event receiver.
pub struct Harness<S: KeyValueStore = MemoryStore> {
    pub coordinator: SyncCoordinator<S>,
    pub events: UnboundedReceiver<UiEvent>,
    pub map: Rc<RefCell<MapLog>>,
}

impl<S: KeyValueStore> Harness<S> {
    /// Start without a map.
    #[allow(dead_code)]
    pub fn without_map(storage: S) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let persistence = PersistenceAdapter::new(storage, "workouts");
        let coordinator = SyncCoordinator::start(persistence, CoordinatorSettings::default(), tx)
            .with_clock(test_now);
        Self {
            coordinator,
            events,
            map: Rc::new(RefCell::new(MapLog::default())),
        }
    }

    /// Start and bring up a map centred on the origin.
    #[allow(dead_code)]
    pub fn with_map(storage: S) -> Self {
        let mut harness = Self::without_map(storage);
        harness.attach_map();
        harness
    }

    #[allow(dead_code)]
    pub fn attach_map(&mut self) -> bool {
        let map = RecordingMap(self.map.clone());
        self.coordinator.init_map(
            PositionOutcome::Located(Coordinates::new(0.0, 0.0)),
            Box::new(map),
        )
    }

    /// Take every event emitted so far.
    #[allow(dead_code)]
    pub fn drain(&mut self) -> Vec<UiEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    /// Check that the store and the markers agree.
    #[allow(dead_code)]
    pub fn assert_markers_consistent(&self) {
        let mut store_ids: Vec<WorkoutId> =
            self.coordinator.workouts().iter().map(|w| w.id()).collect();
        store_ids.sort();

        if self.coordinator.is_map_ready() {
            assert_eq!(self.coordinator.marker_ids(), store_ids, "registry out of sync");
            assert_eq!(self.map.borrow().marker_ids(), store_ids, "map out of sync");
        } else {
            assert!(self.coordinator.marker_ids().is_empty());
        }
    }

    /// Check that store, markers and storage all agree.
    #[allow(dead_code)]
    pub fn assert_consistent(&self) {
        self.assert_markers_consistent();

        let saved = self
            .coordinator
            .persistence()
            .load()
            .expect("stored workouts should load");
        assert_eq!(saved.as_slice(), self.coordinator.workouts(), "storage out of sync");
    }
}

/// Shortcut: pick a location and submit valid input.
#[allow(dead_code)]
pub fn log_workout<S: KeyValueStore>(
    harness: &mut Harness<S>,
    coords: Coordinates,
    input: mapty_tracker::models::WorkoutInput,
) -> WorkoutId {
    harness.coordinator.map_clicked(coords);
    harness
        .coordinator
        .submit(input)
        .expect("valid workout should be accepted")
}

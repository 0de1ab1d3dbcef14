// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mapty terminal host
//!
//! Plays the part of the browser page: reads intents from stdin, forwards
//! them to the coordinator, and prints the list, markers and notifications.

use mapty_tracker::{
    config::Config,
    db::FileStore,
    map::{acquire_position, Bounds, FixedPosition, MapWidget, MarkerHandle},
    models::{Coordinates, Workout, WorkoutId, WorkoutInput, WorkoutType},
    services::{SyncCoordinator, UiEvent},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
commands:
  click <lat> <lng>                          pick a location on the map
  submit running <km> <min> <cadence>        log a run at the picked location
  submit cycling <km> <min> <elevation>      log a ride at the picked location
  cancel                                     close the form
  edit <id> | delete <id>                    change or remove a workout
  select <id>                                click a workout's marker
  focus <id>                                 centre the map on a workout
  sort                                       toggle distance / creation order
  show-all                                   fit the map around all workouts
  list                                       print the workout list
  reset                                      delete everything and reload
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_logging(config.log_json);
    tracing::info!(data_dir = %config.data_dir.display(), "Starting Mapty");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let storage = FileStore::open(&config.data_dir)?;
    let mut coordinator = boot(&config, storage, tx.clone()).await;

    println!("{}", HELP);
    drain_events(&mut rx, &coordinator);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("? {}", e);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::List => render_list(coordinator.workouts()),
            Command::Click(coords) => {
                coordinator.map_clicked(coords);
            }
            Command::Cancel => coordinator.cancel_form(),
            Command::Submit(input) => {
                if let Ok(id) = coordinator.submit(input) {
                    println!("+ workout {}", id);
                }
            }
            Command::Delete(id) => report_unknown(coordinator.delete(id), id),
            Command::Edit(id) => report_unknown(coordinator.edit(id).is_some(), id),
            Command::Select(id) => report_unknown(coordinator.marker_clicked(id), id),
            Command::Focus(id) => {
                if !coordinator.focus_workout(id) {
                    println!("? cannot focus {}", id);
                }
            }
            Command::Sort => {
                let order = coordinator.sort();
                println!("sorted by {:?}", order);
            }
            Command::ShowAll => {
                coordinator.show_all();
            }
            Command::Reset => {
                if let Err(e) = coordinator.reset() {
                    tracing::error!(error = %e, "Reset failed");
                }
            }
        }

        if drain_events(&mut rx, &coordinator) {
            let storage = coordinator.into_storage();
            coordinator = boot(&config, storage, tx.clone()).await;
            drain_events(&mut rx, &coordinator);
        }
    }

    tracing::info!("Bye");
    Ok(())
}

/// Build a coordinator from storage and bring up the map.
async fn boot(
    config: &Config,
    storage: FileStore,
    tx: UnboundedSender<UiEvent>,
) -> SyncCoordinator<FileStore> {
    let mut coordinator = mapty_tracker::start_coordinator(config, storage, tx);
    let source = FixedPosition::new(config.home_position);
    let outcome = acquire_position(&source, config.geolocation_timeout).await;
    coordinator.init_map(outcome, Box::new(ConsoleMap::default()));
    coordinator
}

/// Print pending UI events. Returns true if a reload was requested.
fn drain_events(
    rx: &mut UnboundedReceiver<UiEvent>,
    coordinator: &SyncCoordinator<FileStore>,
) -> bool {
    let mut reload = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            UiEvent::Render => render_list(coordinator.workouts()),
            UiEvent::Notify { message, duration } => {
                println!("! {} ({}s)", message, duration.as_secs())
            }
            UiEvent::ShowForm(None) => println!("form open: submit <type> <km> <min> <extra>"),
            UiEvent::ShowForm(Some(prefill)) => println!(
                "form open (editing): submit {} {} {} {}",
                prefill.kind, prefill.distance_km, prefill.duration_min, prefill.extra
            ),
            UiEvent::HideForm => println!("form closed"),
            UiEvent::PositionUnavailable(message) => println!("!! {}", message),
            UiEvent::Reload => reload = true,
        }
    }
    reload
}

fn render_list(workouts: &[Workout]) {
    if workouts.is_empty() {
        println!("(no workouts)");
        return;
    }
    for w in workouts {
        let detail = match w.workout_type() {
            WorkoutType::Running => format!(
                "{:.1} min/km  {} spm",
                w.pace().unwrap_or_default(),
                w.cadence().unwrap_or_default()
            ),
            WorkoutType::Cycling => format!(
                "{:.1} km/h  {} m",
                w.speed().unwrap_or_default(),
                w.elevation_gain().unwrap_or_default()
            ),
        };
        println!(
            "{}  {:<22} {} km  {} min  {}  clicks {}",
            w.id(),
            w.description(),
            w.distance_km(),
            w.duration_min(),
            detail,
            w.clicks()
        );
    }
}

fn report_unknown(found: bool, id: WorkoutId) {
    if !found {
        println!("? no workout {}", id);
    }
}

/// Map widget that prints what it would draw.
#[derive(Default)]
struct ConsoleMap {
    next_handle: u64,
}

impl MapWidget for ConsoleMap {
    fn add_marker(&mut self, workout: &Workout) -> MarkerHandle {
        self.next_handle += 1;
        println!(
            "map: marker #{} at {} \"{}\"",
            self.next_handle,
            workout.coords(),
            workout.description()
        );
        MarkerHandle::new(self.next_handle)
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        println!("map: removed marker #{}", handle.raw());
    }

    fn set_view(&mut self, coords: Coordinates, zoom: u8) {
        println!("map: view {} zoom {}", coords, zoom);
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        println!("map: fit {} .. {}", bounds.south_west, bounds.north_east);
    }
}

/// A parsed line of input.
#[derive(Debug, PartialEq)]
enum Command {
    Click(Coordinates),
    Submit(WorkoutInput),
    Cancel,
    Delete(WorkoutId),
    Edit(WorkoutId),
    Select(WorkoutId),
    Focus(WorkoutId),
    Sort,
    ShowAll,
    List,
    Reset,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match (name, args) {
            ("click", [lat, lng]) => Command::Click(parse_coords(lat, lng)?),
            ("submit", [kind, distance, duration, extra]) => {
                let kind: WorkoutType = kind.parse()?;
                // Bad numbers are left for form validation to reject.
                Command::Submit(WorkoutInput::from_form(kind, distance, duration, extra))
            }
            ("cancel", []) => Command::Cancel,
            ("delete", [id]) => Command::Delete(parse_id(id)?),
            ("edit", [id]) => Command::Edit(parse_id(id)?),
            ("select", [id]) => Command::Select(parse_id(id)?),
            ("focus", [id]) => Command::Focus(parse_id(id)?),
            ("sort", []) => Command::Sort,
            ("show-all", []) => Command::ShowAll,
            ("list", []) => Command::List,
            ("reset", []) => Command::Reset,
            ("help", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ => return Err(format!("unrecognized command: {}", line.trim())),
        };
        Ok(Some(command))
    }
}

fn parse_number(text: &str) -> Result<f64, String> {
    text.parse()
        .map_err(|_| format!("'{}' is not a number", text))
}

fn parse_coords(lat: &str, lng: &str) -> Result<Coordinates, String> {
    let coords = Coordinates::new(parse_number(lat)?, parse_number(lng)?);
    coords.validate().map_err(|e| e.to_string())?;
    Ok(coords)
}

fn parse_id(text: &str) -> Result<WorkoutId, String> {
    text.parse()
        .map_err(|_| format!("'{}' is not a workout id", text))
}

/// Initialize logging to stderr, JSON or human-readable.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mapty_tracker=debug,info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is read first if present.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::db::keys;
use crate::models::Coordinates;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for the file-backed workout store
    pub data_dir: PathBuf,
    /// Storage key the workout list is saved under
    pub storage_key: String,
    /// Zoom level used when centring the map
    pub map_zoom: u8,
    /// How long notifications stay visible
    pub alert_duration: Duration,
    /// How long to wait for the starting position
    pub geolocation_timeout: Duration,
    /// Position reported by the terminal host (None = geolocation unsupported)
    pub home_position: Option<Coordinates>,
    /// Emit JSON logs instead of human-readable ones
    pub log_json: bool,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            storage_key: keys::WORKOUTS.to_string(),
            map_zoom: 13,
            alert_duration: Duration::from_secs(5),
            geolocation_timeout: Duration::from_secs(10),
            home_position: None,
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let home_position = match (env::var("MAPTY_HOME_LAT"), env::var("MAPTY_HOME_LNG")) {
            (Ok(lat), Ok(lng)) => Some(Coordinates::new(
                parse_var("MAPTY_HOME_LAT", &lat)?,
                parse_var("MAPTY_HOME_LNG", &lng)?,
            )),
            (Err(_), Err(_)) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    name: "MAPTY_HOME_LAT/MAPTY_HOME_LNG",
                    reason: "both or neither must be set".to_string(),
                })
            }
        };

        Ok(Self {
            data_dir: env::var("MAPTY_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            storage_key: env::var("MAPTY_STORAGE_KEY")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| keys::WORKOUTS.to_string()),
            map_zoom: optional_var("MAPTY_MAP_ZOOM")?.unwrap_or(13),
            alert_duration: Duration::from_secs(optional_var("MAPTY_ALERT_SECS")?.unwrap_or(5)),
            geolocation_timeout: Duration::from_secs(
                optional_var("MAPTY_GEOLOCATION_TIMEOUT_SECS")?.unwrap_or(10),
            ),
            home_position,
            log_json: env::var("MAPTY_LOG_JSON")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }
}

fn parse_var<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn optional_var<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => parse_var(name, &value).map(Some),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

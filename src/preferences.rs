//! Player preferences that survive between sessions.
//!
//! Stored as JSON in `<config dir>/tsp-challenge/preferences.json`:
//!
//! ```text
//! {"numberOfStops": 10, "distanceMode": "haversine"}
//! ```

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::PathBuf};
use thiserror::Error;

use crate::challenge::DistanceMode;

pub const DEFAULT_STOPS: usize = 10;
pub const MIN_STOPS: usize = 3;
pub const MAX_STOPS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub number_of_stops: usize,
    pub distance_mode: DistanceMode,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences { number_of_stops: DEFAULT_STOPS, distance_mode: DistanceMode::default() }
    }
}

/// Clamps a requested stop count to what a game supports.
pub fn clamp_stops(count: usize) -> usize {
    count.clamp(MIN_STOPS, MAX_STOPS)
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed preference storage.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PreferenceStore { path: path.into() }
    }

    /// `<config dir>/tsp-challenge/preferences.json`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tsp-challenge").join("preferences.json"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Reads stored preferences. Missing or unreadable files yield defaults.
    pub fn load(&self) -> Preferences {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No preferences at {}, using defaults", self.path.display());
                return Preferences::default();
            }
            Err(err) => {
                warn!("Could not read {}: {err}. Using defaults.", self.path.display());
                return Preferences::default();
            }
        };
        match serde_json::from_str::<Preferences>(&contents) {
            Ok(prefs) => Preferences {
                number_of_stops: clamp_stops(prefs.number_of_stops),
                ..prefs
            },
            Err(err) => {
                warn!("Invalid preferences at {}: {err}. Using defaults.", self.path.display());
                Preferences::default()
            }
        }
    }

    pub fn save(&self, prefs: &Preferences) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(prefs)?)?;
        debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }
}

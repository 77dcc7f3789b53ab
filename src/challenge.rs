use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::geometry::Coord;

/// Index of the depot in every generated point set.
pub const DEPOT: usize = 0;

/// A generated stop. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: String,
    pub coord: Coord,
}

impl Point {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Point { id: id.into(), coord: Coord::new(lat, lng) }
    }

    pub fn lat(&self) -> f64 {
        self.coord.lat
    }

    pub fn lng(&self) -> f64 {
        self.coord.lng
    }
}

impl AsRef<Coord> for Point {
    fn as_ref(&self) -> &Coord {
        &self.coord
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    Calculating,
    Finished,
}

/// Which routing profile the service uses to cost a tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMode {
    Road,
    #[default]
    Haversine,
}

impl DistanceMode {
    /// Name of the service profile for this mode.
    pub fn profile(&self) -> &'static str {
        match self {
            DistanceMode::Road => "car",
            DistanceMode::Haversine => "as_the_crow_flies",
        }
    }

    /// Whether the service should compute road geometry.
    pub fn calc_points(&self) -> bool {
        matches!(self, DistanceMode::Road)
    }
}

impl fmt::Display for DistanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMode::Road => write!(f, "road"),
            DistanceMode::Haversine => write!(f, "haversine"),
        }
    }
}

impl FromStr for DistanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "road" | "car" => Ok(DistanceMode::Road),
            "haversine" | "crow" => Ok(DistanceMode::Haversine),
            other => Err(format!("unknown distance mode '{other}'")),
        }
    }
}

/// Cost of following a tour, as reported by the routing service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteCost {
    pub distance_m: f64,
    pub duration_s: f64,
}

/// One stop in the order chosen by the optimizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Start,
    End,
    Service(String),
}

/// Result of letting the service choose its own visiting order.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedRoute {
    pub cost: RouteCost,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub user_distance: f64,
    pub user_time: f64,
    pub ai_distance: f64,
    pub ai_time: f64,
}

impl Metrics {
    pub fn has_ai_result(&self) -> bool {
        self.ai_distance > 0.0
    }

    /// Outcome of the comparison, once the game is over.
    pub fn verdict(&self) -> Verdict {
        if self.ai_time <= 0.0 {
            Verdict::Completed
        } else if self.user_time < self.ai_time {
            Verdict::BeatAi
        } else if self.user_time == self.ai_time && self.user_distance == self.ai_distance {
            Verdict::PerfectMatch
        } else if self.user_time > self.ai_time && self.user_distance < self.ai_distance {
            // The optimizer minimizes duration, not distance.
            Verdict::ShorterRoute
        } else {
            Verdict::AiWon
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Tour closed, no comparison available.
    Completed,
    BeatAi,
    PerfectMatch,
    ShorterRoute,
    AiWon,
}

impl Verdict {
    pub fn celebrate(&self) -> bool {
        matches!(self, Verdict::BeatAi | Verdict::PerfectMatch)
    }
}

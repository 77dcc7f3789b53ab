// Wire types for the GraphHopper Route Optimization (VRP) API.
// Only the fields we send or read are modeled.

use serde::{Deserialize, Serialize};

use crate::challenge::DistanceMode;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Address {
    pub location_id: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub vehicle_id: String,
    pub type_id: String,
    pub start_address: Address,
    pub return_to_depot: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VehicleType {
    pub type_id: String,
    pub profile: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Service {
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Relation {
    #[serde(rename = "type")]
    pub kind: String,
    pub ids: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Routing {
    pub calc_points: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_snapped_waypoints: Option<bool>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Configuration {
    pub routing: Routing,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Objective {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Objective {
    pub fn min_route_duration() -> Self {
        Objective { kind: "min".to_string(), value: "route_duration".to_string() }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Problem {
    pub vehicles: Vec<Vehicle>,
    pub vehicle_types: Vec<VehicleType>,
    pub services: Vec<Service>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Relation>,
    pub configuration: Configuration,
    pub objectives: Vec<Objective>,
}

pub const VEHICLE_TYPE_ID: &str = "custom_vehicle_type";

impl VehicleType {
    pub fn for_mode(mode: DistanceMode) -> Self {
        VehicleType {
            type_id: VEHICLE_TYPE_ID.to_string(),
            profile: mode.profile().to_string(),
        }
    }
}

/// Response body. `solution` is absent on asynchronous or failed jobs.
#[derive(Deserialize, Debug)]
pub struct VrpResponse {
    pub solution: Option<Solution>,
}

#[derive(Deserialize, Debug)]
pub struct Solution {
    pub routes: Vec<Route>,
}

/// A vehicle's route. `distance` is in meters, `completion_time` in seconds.
#[derive(Deserialize, Debug)]
pub struct Route {
    pub distance: f64,
    pub completion_time: f64,
    pub activities: Vec<RawActivity>,
}

#[derive(Deserialize, Debug)]
pub struct RawActivity {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Option<String>,
}

/// Body of a non-2xx answer.
#[derive(Deserialize, Debug, Default)]
pub struct ErrorResponse {
    pub message: Option<String>,
}

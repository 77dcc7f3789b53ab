// Routing strategies the game delegates tour costing and optimization to.
//
// The game never computes a road tour itself: the player's fixed order and
// the optimized order are both costed by the same service.

use async_trait::async_trait;
use log::{info, warn};
use std::time::Instant;

use crate::challenge::{Activity, DistanceMode, OptimizedRoute, Point, RouteCost};
use crate::client::{Error, RoutingClient};
use crate::game_interface::{
    Address, Configuration, Objective, Problem, RawActivity, Relation, Route, Routing, Service,
    Vehicle, VehicleType, VEHICLE_TYPE_ID,
};

#[async_trait]
pub trait Solver: Send + Sync {
    // Name to display for this solver.
    fn name(&self) -> &str;

    // Cost of visiting `tour[1..]` in exactly that order, from and back to
    // the depot `tour[0]`.
    async fn do_evaluate_fixed_route(
        &self, tour: &[Point], api_key: &str, mode: DistanceMode) -> Result<RouteCost, Error>;

    // Let the solver pick its own order over all of `points`.
    async fn do_optimize_route(
        &self, points: &[Point], api_key: &str, mode: DistanceMode) -> Result<OptimizedRoute, Error>;

    // Wrappers to the do_* calls, to log timing and results.
    async fn evaluate_fixed_route(
        &self, tour: &[Point], api_key: &str, mode: DistanceMode) -> Result<RouteCost, Error> {
        let start = Instant::now();
        let result = self.do_evaluate_fixed_route(tour, api_key, mode).await;
        info!("Solver {} evaluated fixed route in {:?}", self.name(), start.elapsed());
        match &result {
            Ok(cost) => info!("Solver {} costs the player's route at {:.0} m, {:.0} s",
                              self.name(), cost.distance_m, cost.duration_s),
            Err(err) => warn!("Solver {} failed to cost the player's route: {err}", self.name()),
        };
        result
    }

    async fn optimize_route(
        &self, points: &[Point], api_key: &str, mode: DistanceMode) -> Result<OptimizedRoute, Error> {
        let start = Instant::now();
        let result = self.do_optimize_route(points, api_key, mode).await;
        info!("Solver {} optimized route in {:?}", self.name(), start.elapsed());
        match &result {
            Ok(route) => info!("Solver {} found a route of {:.0} m, {:.0} s, {} activities",
                               self.name(), route.cost.distance_m, route.cost.duration_s,
                               route.activities.len()),
            Err(err) => warn!("Solver {} did NOT find a route: {err}", self.name()),
        };
        result
    }
}

/// Delegates to the GraphHopper VRP endpoint.
pub struct GraphHopperSolver {
    client: RoutingClient,
}

impl GraphHopperSolver {
    pub fn new(client: RoutingClient) -> Self {
        GraphHopperSolver { client }
    }
}

#[async_trait]
impl Solver for GraphHopperSolver {
    fn name(&self) -> &str {
        "graphhopper"
    }

    async fn do_evaluate_fixed_route(
        &self, tour: &[Point], api_key: &str, mode: DistanceMode) -> Result<RouteCost, Error> {
        let problem = fixed_sequence_problem(tour, mode)?;
        let route = self.client.solve(&problem, api_key).await?;
        Ok(route_cost(&route))
    }

    async fn do_optimize_route(
        &self, points: &[Point], api_key: &str, mode: DistanceMode) -> Result<OptimizedRoute, Error> {
        if points.is_empty() {
            return Err(Error::Service("no points to optimize".to_string()));
        }
        let problem = optimization_problem(points, mode);
        let route = self.client.solve(&problem, api_key).await?;
        Ok(OptimizedRoute {
            cost: route_cost(&route),
            activities: parse_activities(&route.activities)?,
        })
    }
}

fn address(location_id: &str, point: &Point) -> Address {
    Address { location_id: location_id.to_string(), lat: point.lat(), lon: point.lng() }
}

fn route_cost(route: &Route) -> RouteCost {
    RouteCost { distance_m: route.distance, duration_s: route.completion_time }
}

/// Problem pinning the vehicle to visit `tour[1..]` in order, starting and
/// ending at `tour[0]`.
pub fn fixed_sequence_problem(tour: &[Point], mode: DistanceMode) -> Result<Problem, Error> {
    let (depot, stops) = tour.split_first()
        .ok_or_else(|| Error::Service("no tour to evaluate".to_string()))?;
    let services: Vec<Service> = stops.iter()
        .map(|p| Service {
            id: p.id.clone(),
            kind: Some("service".to_string()),
            address: address(&p.id, p),
            duration: Some(0),
        })
        .collect();
    let ids: Vec<String> = services.iter().map(|s| s.id.clone()).collect();
    // A sequence needs at least two services.
    let relations = if ids.len() >= 2 {
        vec![Relation { kind: "in_direct_sequence".to_string(), ids }]
    } else {
        Vec::new()
    };

    Ok(Problem {
        vehicles: vec![Vehicle {
            vehicle_id: "v1".to_string(),
            type_id: VEHICLE_TYPE_ID.to_string(),
            start_address: address("depot", depot),
            return_to_depot: true,
        }],
        vehicle_types: vec![VehicleType::for_mode(mode)],
        services,
        relations,
        configuration: Configuration {
            routing: Routing {
                calc_points: mode.calc_points(),
                return_snapped_waypoints: Some(mode.calc_points()),
            },
        },
        objectives: vec![Objective::min_route_duration()],
    })
}

/// Problem letting the service order every point but the depot `points[0]`.
///
/// Panics on an empty slice.
pub fn optimization_problem(points: &[Point], mode: DistanceMode) -> Problem {
    let depot = &points[0];
    let services = points[1..].iter()
        .map(|p| Service {
            id: p.id.clone(),
            kind: None,
            address: address(&p.id, p),
            duration: None,
        })
        .collect();

    Problem {
        vehicles: vec![Vehicle {
            vehicle_id: "my_vehicle".to_string(),
            type_id: VEHICLE_TYPE_ID.to_string(),
            start_address: address(&depot.id, depot),
            return_to_depot: true,
        }],
        vehicle_types: vec![VehicleType::for_mode(mode)],
        services,
        relations: Vec::new(),
        configuration: Configuration {
            routing: Routing { calc_points: mode.calc_points(), return_snapped_waypoints: None },
        },
        objectives: vec![Objective::min_route_duration()],
    }
}

pub fn parse_activities(raw: &[RawActivity]) -> Result<Vec<Activity>, Error> {
    raw.iter()
        .map(|activity| match activity.kind.as_str() {
            "start" => Ok(Activity::Start),
            "end" => Ok(Activity::End),
            kind => activity.id.clone()
                .map(Activity::Service)
                .ok_or_else(|| Error::Service(format!("{kind} activity without an id"))),
        })
        .collect()
}

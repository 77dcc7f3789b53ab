// Authoritative game state and the transitions between phases.
//
// Idle -> Playing (generate) -> Finished (tour closed) -> Calculating (solve)
// -> Finished. reset() goes back to Idle from anywhere.
//
// Every generate/reset bumps an epoch. A solve captures the epoch when it
// starts and its result is dropped if the epoch moved on while the routing
// calls were in flight.

use log::{debug, error, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::challenge::{
    Activity, DistanceMode, Metrics, Phase, Point, RouteCost, DEPOT,
};
use crate::client::Error as ClientError;
use crate::geometry::{path_length, sample_in_disk, Coord};
use crate::preferences::{self, clamp_stops, PreferenceStore, Preferences};
use crate::solvers::Solver;

#[derive(Error, Debug)]
pub enum SolveError {
    #[error("No routing API key configured (set GRAPHHOPPER_API_KEY)")]
    Configuration,
    #[error("The tour is not complete yet")]
    NotReady,
    #[error("Could not reach the routing service ({0})")]
    Network(#[source] reqwest::Error),
    #[error("Routing service failed ({0})")]
    Service(String),
    #[error("Routing service returned an unknown stop id '{0}'")]
    Mapping(String),
    #[error("Game changed while the routes were being computed, result dropped")]
    StaleResult,
}

impl From<ClientError> for SolveError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Network(e) => SolveError::Network(e),
            ClientError::Service(msg) => SolveError::Service(msg),
            ClientError::JSONError(e) => SolveError::Service(e.to_string()),
        }
    }
}

/// What a click did to the user path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Ignored,
    Started,
    Added,
    Completed,
}

/// Inputs of a solve, detached from the game so the routing calls don't need
/// to borrow it.
#[derive(Debug, Clone)]
pub struct SolveTicket {
    pub epoch: u64,
    // Player's order, depot first, without the closing return to the depot.
    pub tour: Vec<Point>,
    pub points: Vec<Point>,
    pub mode: DistanceMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub user: RouteCost,
    pub ai: RouteCost,
    pub ai_path: Vec<usize>,
}

/// Read-only view for the presentation layer.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub phase: Phase,
    pub points: &'a [Point],
    pub user_path: &'a [usize],
    pub ai_path: &'a [usize],
    pub metrics: Metrics,
    pub preferences: Preferences,
    pub mode: DistanceMode,
}

impl Snapshot<'_> {
    /// Every stop is visited and only the return to the depot is left.
    pub fn awaiting_return(&self) -> bool {
        self.phase == Phase::Playing
            && !self.points.is_empty()
            && self.user_path.len() == self.points.len()
    }

    /// Whether a comparison can still be requested.
    pub fn can_solve(&self) -> bool {
        self.phase == Phase::Finished && !self.metrics.has_ai_result()
    }
}

pub struct Game {
    points: Vec<Point>,
    user_path: Vec<usize>,
    ai_path: Vec<usize>,
    metrics: Metrics,
    phase: Phase,
    // Distance mode the current game was generated with.
    mode: DistanceMode,
    epoch: u64,
    preferences: Preferences,
    store: Option<PreferenceStore>,
    rng: SmallRng,
}

impl Game {
    pub fn new(preferences: Preferences, store: Option<PreferenceStore>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Game {
            points: Vec::new(),
            user_path: Vec::new(),
            ai_path: Vec::new(),
            metrics: Metrics::default(),
            phase: Phase::Idle,
            mode: preferences.distance_mode,
            epoch: 0,
            preferences,
            store,
            rng,
        }
    }

    /// Loads preferences from `store` and starts idle.
    pub fn with_store(store: PreferenceStore, seed: Option<u64>) -> Self {
        let preferences = store.load();
        info!("Preferences: {} stops, {} mode",
              preferences.number_of_stops, preferences.distance_mode);
        Game::new(preferences, Some(store), seed)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn user_path(&self) -> &[usize] {
        &self.user_path
    }

    pub fn ai_path(&self) -> &[usize] {
        &self.ai_path
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            points: &self.points,
            user_path: &self.user_path,
            ai_path: &self.ai_path,
            metrics: self.metrics,
            preferences: self.preferences,
            mode: self.mode,
        }
    }

    fn clear_round(&mut self) {
        self.user_path.clear();
        self.ai_path.clear();
        self.metrics = Metrics::default();
        self.epoch += 1;
    }

    /// Starts a new game with `count` points sampled within `radius_m` meters
    /// of `center`. Point 0 is the depot.
    pub fn generate(&mut self, center: Coord, radius_m: f64, count: usize) {
        let rng = &mut self.rng;
        self.points = (0..count)
            .map(|i| {
                let coord = sample_in_disk(center, radius_m, &mut *rng);
                Point { id: i.to_string(), coord }
            })
            .collect();
        self.clear_round();
        self.mode = self.preferences.distance_mode;
        self.phase = Phase::Playing;
        info!("New game #{}: {} stops around ({:.4}, {:.4}), {} mode",
              self.epoch, count, center.lat, center.lng, self.mode);
    }

    /// Starts a new game with the preferred number of stops.
    pub fn new_game(&mut self, center: Coord, radius_m: f64) {
        self.generate(center, radius_m, self.preferences.number_of_stops);
    }

    pub fn reset(&mut self) {
        if self.phase == Phase::Calculating {
            warn!("Reset while routes are being computed, their result will be dropped");
        }
        self.points.clear();
        self.clear_round();
        self.phase = Phase::Idle;
        info!("Game reset");
    }

    /// Handles a click on point `index`. Illegal clicks are ignored.
    pub fn select_point(&mut self, index: usize) -> Selection {
        let selection = self.try_select(index);
        match selection {
            Selection::Ignored => debug!("Ignored click on {index} (path {:?})", self.user_path),
            Selection::Completed => info!("Tour closed: {:?}, {:.0} m as the crow flies",
                                          self.user_path, self.metrics.user_distance),
            _ => debug!("Path: {:?}", self.user_path),
        }
        selection
    }

    fn try_select(&mut self, index: usize) -> Selection {
        if self.phase != Phase::Playing || index >= self.points.len() {
            return Selection::Ignored;
        }

        let last = match self.user_path.last() {
            Some(&last) => last,
            None => {
                // First click must be the depot.
                if index != DEPOT {
                    return Selection::Ignored;
                }
                self.user_path.push(DEPOT);
                self.metrics.user_distance = 0.0;
                return Selection::Started;
            }
        };
        if last == index {
            return Selection::Ignored;
        }

        if index == DEPOT && self.user_path.len() == self.points.len() {
            self.user_path.push(DEPOT);
            // Straight-line estimate, replaced by the service's figure on solve.
            self.metrics.user_distance = path_length(&self.points, &self.user_path);
            self.phase = Phase::Finished;
            return Selection::Completed;
        }

        if self.user_path.contains(&index) {
            return Selection::Ignored;
        }

        self.user_path.push(index);
        self.metrics.user_distance = path_length(&self.points, &self.user_path);
        Selection::Added
    }

    /// Sets and persists the preferred stop count, clamped to the supported
    /// range. Returns the value kept.
    pub fn set_stop_count(&mut self, count: usize) -> Result<usize, preferences::Error> {
        self.preferences.number_of_stops = clamp_stops(count);
        self.persist()?;
        Ok(self.preferences.number_of_stops)
    }

    /// Sets and persists the preferred distance mode. Applies from the next
    /// game on.
    pub fn set_distance_mode(&mut self, mode: DistanceMode) -> Result<(), preferences::Error> {
        self.preferences.distance_mode = mode;
        self.persist()
    }

    fn persist(&self) -> Result<(), preferences::Error> {
        match &self.store {
            Some(store) => store.save(&self.preferences),
            None => Ok(()),
        }
    }

    /// Checks the solve preconditions and moves to Calculating.
    pub fn begin_solve(&mut self, api_key: Option<&str>) -> Result<SolveTicket, SolveError> {
        if api_key.map_or(true, str::is_empty) {
            error!("Cannot compare routes: no API key configured");
            return Err(SolveError::Configuration);
        }
        if self.phase != Phase::Finished || !is_complete_tour(&self.user_path, self.points.len()) {
            return Err(SolveError::NotReady);
        }

        self.phase = Phase::Calculating;
        let open_tour = &self.user_path[..self.user_path.len() - 1];
        info!("Comparing routes for game #{}", self.epoch);
        Ok(SolveTicket {
            epoch: self.epoch,
            tour: open_tour.iter().map(|&i| self.points[i].clone()).collect(),
            points: self.points.clone(),
            mode: self.mode,
        })
    }

    /// Applies the result of a solve started with `begin_solve`.
    pub fn finish_solve(
        &mut self, epoch: u64, result: Result<SolveOutcome, SolveError>) -> Result<(), SolveError> {
        if epoch != self.epoch {
            warn!("Dropping routes computed for game #{epoch}, now on #{}", self.epoch);
            return Err(SolveError::StaleResult);
        }
        self.phase = Phase::Finished;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("Error comparing routes: {err}");
                return Err(err);
            }
        };
        self.metrics.user_distance = outcome.user.distance_m;
        self.metrics.user_time = outcome.user.duration_s;
        self.metrics.ai_distance = outcome.ai.distance_m;
        self.metrics.ai_time = outcome.ai.duration_s;
        self.ai_path = outcome.ai_path;
        info!("Verdict: {:?}", self.metrics.verdict());
        Ok(())
    }

    /// Costs the player's tour then asks `solver` for its own, and records
    /// both.
    pub async fn solve(&mut self, solver: &dyn Solver, api_key: Option<&str>) -> Result<(), SolveError> {
        let ticket = self.begin_solve(api_key)?;
        let epoch = ticket.epoch;
        let result = run_pipeline(ticket, solver, api_key.unwrap_or_default()).await;
        self.finish_solve(epoch, result)
    }
}

/// The two routing calls of a solve, strictly one after the other. Stops at
/// the first failure.
pub async fn run_pipeline(
    ticket: SolveTicket, solver: &dyn Solver, api_key: &str) -> Result<SolveOutcome, SolveError> {
    let user = solver.evaluate_fixed_route(&ticket.tour, api_key, ticket.mode).await?;
    let optimized = solver.optimize_route(&ticket.points, api_key, ticket.mode).await?;
    let ai_path = map_activities(&ticket.points, &optimized.activities)?;
    Ok(SolveOutcome { user, ai: optimized.cost, ai_path })
}

/// Maps the optimizer's activities back to point indices. Start and end
/// markers are the depot.
pub fn map_activities(points: &[Point], activities: &[Activity]) -> Result<Vec<usize>, SolveError> {
    let by_id: FxHashMap<&str, usize> = points.iter()
        .enumerate()
        .map(|(i, p)| (p.id.as_str(), i))
        .collect();
    activities.iter()
        .map(|activity| match activity {
            Activity::Start | Activity::End => Ok(DEPOT),
            Activity::Service(id) => by_id.get(id.as_str())
                .copied()
                .ok_or_else(|| SolveError::Mapping(id.clone())),
        })
        .collect()
}

/// Whether `path` is a closed tour over `n` points: depot at both ends and
/// every other point exactly once in between.
pub fn is_complete_tour(path: &[usize], n: usize) -> bool {
    if n == 0 || path.len() != n + 1 || path[0] != DEPOT || path[n] != DEPOT {
        return false;
    }
    let mut seen = vec![false; n];
    for &i in &path[1..n] {
        if i == DEPOT || i >= n || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::challenge::{OptimizedRoute, Verdict};
    use crate::client::Error as ClientError;
    use super::*;

    const MUNICH: Coord = Coord { lat: 48.1351, lng: 11.5820 };

    // In-memory solver: returns canned answers and records what it was asked.
    struct FakeSolver {
        fixed: Result<RouteCost, String>,
        optimized: Result<OptimizedRoute, String>,
        calls: Mutex<Vec<String>>,
        tours: Mutex<Vec<Vec<String>>>,
    }

    impl FakeSolver {
        fn new(fixed: Result<RouteCost, String>, optimized: Result<OptimizedRoute, String>) -> Self {
            FakeSolver { fixed, optimized, calls: Mutex::new(Vec::new()), tours: Mutex::new(Vec::new()) }
        }

        fn succeeding(n: usize) -> Self {
            let mut activities = vec![Activity::Start];
            activities.extend((1..n).rev().map(|i| Activity::Service(i.to_string())));
            activities.push(Activity::End);
            FakeSolver::new(
                Ok(RouteCost { distance_m: 9000.0, duration_s: 800.0 }),
                Ok(OptimizedRoute {
                    cost: RouteCost { distance_m: 8000.0, duration_s: 700.0 },
                    activities,
                }))
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Solver for FakeSolver {
        fn name(&self) -> &str {
            "fake"
        }

        async fn do_evaluate_fixed_route(
            &self, tour: &[Point], _api_key: &str, _mode: DistanceMode) -> Result<RouteCost, ClientError> {
            self.calls.lock().unwrap().push("fixed".to_string());
            self.tours.lock().unwrap().push(tour.iter().map(|p| p.id.clone()).collect());
            self.fixed.clone().map_err(ClientError::Service)
        }

        async fn do_optimize_route(
            &self, _points: &[Point], _api_key: &str, _mode: DistanceMode) -> Result<OptimizedRoute, ClientError> {
            self.calls.lock().unwrap().push("optimize".to_string());
            self.optimized.clone().map_err(ClientError::Service)
        }
    }

    fn make_game(count: usize) -> Game {
        let mut game = Game::new(Preferences::default(), None, Some(42));
        game.generate(MUNICH, 5000.0, count);
        game
    }

    fn play(game: &mut Game, clicks: &[usize]) -> Vec<Selection> {
        clicks.iter().map(|&i| game.select_point(i)).collect()
    }

    fn finished_game(count: usize) -> Game {
        let mut game = make_game(count);
        let mut clicks: Vec<usize> = (0..count).collect();
        clicks.push(0);
        play(&mut game, &clicks);
        assert_eq!(game.phase(), Phase::Finished);
        game
    }

    #[test]
    fn test_generate() {
        let mut game = Game::new(Preferences::default(), None, Some(1));
        assert_eq!(game.phase(), Phase::Idle);
        game.generate(MUNICH, 5000.0, 12);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.points().len(), 12);
        for (i, p) in game.points().iter().enumerate() {
            assert_eq!(p.id, i.to_string());
            assert!(crate::geometry::distance(MUNICH, p.coord) <= 5050.0);
        }

        play(&mut game, &[0, 3, 4]);
        let first_points = game.points().to_vec();
        game.generate(MUNICH, 5000.0, 5);
        assert_eq!(game.points().len(), 5);
        assert_ne!(game.points()[1], first_points[1]);
        assert!(game.user_path().is_empty());
        assert_eq!(game.metrics(), Metrics::default());
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = make_game(8);
        let b = make_game(8);
        assert_eq!(a.points(), b.points());
    }

    #[test]
    fn test_first_click_must_be_depot() {
        let mut game = make_game(3);
        assert_eq!(game.select_point(1), Selection::Ignored);
        assert!(game.user_path().is_empty());
        assert_eq!(game.select_point(0), Selection::Started);
        assert_eq!(game.user_path(), &[0]);
    }

    #[test]
    fn test_three_point_tour() {
        let mut game = make_game(3);
        let selections = play(&mut game, &[0, 1, 2, 0]);
        assert_eq!(selections, vec![
            Selection::Started, Selection::Added, Selection::Added, Selection::Completed]);
        assert_eq!(game.user_path(), &[0, 1, 2, 0]);
        assert_eq!(game.phase(), Phase::Finished);
        let expected = path_length(game.points(), &[0, 1, 2, 0]);
        assert!((game.metrics().user_distance - expected).abs() < 1e-6);
        assert!(is_complete_tour(game.user_path(), 3));
    }

    #[test]
    fn test_repeat_and_revisit_ignored() {
        let mut game = make_game(4);
        play(&mut game, &[0, 1]);
        assert_eq!(game.select_point(1), Selection::Ignored);
        assert_eq!(game.user_path(), &[0, 1]);

        // Back to the depot too early.
        assert_eq!(game.select_point(0), Selection::Ignored);
        play(&mut game, &[2]);
        assert_eq!(game.select_point(1), Selection::Ignored);
        assert_eq!(game.select_point(9), Selection::Ignored);
        assert_eq!(game.user_path(), &[0, 1, 2]);
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn test_provisional_distance_tracks_path() {
        let mut game = make_game(4);
        play(&mut game, &[0]);
        assert_eq!(game.metrics().user_distance, 0.0);
        play(&mut game, &[2, 1]);
        let expected = path_length(game.points(), &[0, 2, 1]);
        assert!((game.metrics().user_distance - expected).abs() < 1e-6);
        assert!(!game.snapshot().awaiting_return());
        play(&mut game, &[3]);
        assert!(game.snapshot().awaiting_return());
    }

    #[test]
    fn test_clicks_ignored_outside_playing() {
        let mut game = Game::new(Preferences::default(), None, Some(3));
        assert_eq!(game.select_point(0), Selection::Ignored);

        let mut game = finished_game(3);
        assert_eq!(game.select_point(1), Selection::Ignored);
        assert_eq!(game.user_path(), &[0, 1, 2, 0]);
    }

    #[test]
    fn test_reset_from_any_phase() {
        let mut idle = Game::new(Preferences::default(), None, None);
        let mut playing = make_game(5);
        play(&mut playing, &[0, 2]);
        let mut finished = finished_game(4);
        let mut calculating = finished_game(4);
        calculating.begin_solve(Some("key")).unwrap();
        assert_eq!(calculating.phase(), Phase::Calculating);

        for game in [&mut idle, &mut playing, &mut finished, &mut calculating] {
            game.reset();
            assert_eq!(game.phase(), Phase::Idle);
            assert!(game.points().is_empty());
            assert!(game.user_path().is_empty());
            assert!(game.ai_path().is_empty());
            assert_eq!(game.metrics(), Metrics::default());
        }
    }

    #[test]
    fn test_is_complete_tour() {
        assert!(is_complete_tour(&[0, 2, 1, 3, 0], 4));
        assert!(!is_complete_tour(&[0, 2, 2, 3, 0], 4));
        assert!(!is_complete_tour(&[0, 2, 1, 0], 4));
        assert!(!is_complete_tour(&[1, 2, 0, 3, 1], 4));
        assert!(!is_complete_tour(&[0, 2, 0, 3, 0], 4));
        assert!(!is_complete_tour(&[], 0));
    }

    #[test]
    fn test_map_activities_round_trip() {
        let game = make_game(6);
        let ids = ["4", "2", "5", "1", "3"];
        let mut activities = vec![Activity::Start];
        activities.extend(ids.iter().map(|id| Activity::Service(id.to_string())));
        activities.push(Activity::End);

        let path = map_activities(game.points(), &activities).unwrap();
        assert_eq!(path, vec![0, 4, 2, 5, 1, 3, 0]);
        assert!(is_complete_tour(&path, 6));
    }

    #[test]
    fn test_map_activities_unknown_id() {
        let game = make_game(3);
        let activities = vec![Activity::Start, Activity::Service("17".to_string()), Activity::End];
        assert!(matches!(map_activities(game.points(), &activities),
                         Err(SolveError::Mapping(id)) if id == "17"));
    }

    #[tokio::test]
    async fn test_solve_success() {
        let mut game = finished_game(4);
        let solver = FakeSolver::succeeding(4);
        game.solve(&solver, Some("key")).await.unwrap();

        assert_eq!(solver.calls(), vec!["fixed", "optimize"]);
        // The closing return to the depot is implied by the vehicle.
        assert_eq!(solver.tours.lock().unwrap()[0], vec!["0", "1", "2", "3"]);
        assert_eq!(game.phase(), Phase::Finished);
        let metrics = game.metrics();
        assert_eq!(metrics.user_distance, 9000.0);
        assert_eq!(metrics.user_time, 800.0);
        assert_eq!(metrics.ai_distance, 8000.0);
        assert_eq!(metrics.ai_time, 700.0);
        assert_eq!(game.ai_path(), &[0, 3, 2, 1, 0]);
        assert_eq!(metrics.verdict(), Verdict::AiWon);
        assert!(!game.snapshot().can_solve());
    }

    #[tokio::test]
    async fn test_solve_without_api_key() {
        let mut game = finished_game(3);
        let solver = FakeSolver::succeeding(3);
        assert!(matches!(game.solve(&solver, None).await, Err(SolveError::Configuration)));
        assert!(matches!(game.solve(&solver, Some("")).await, Err(SolveError::Configuration)));
        assert!(solver.calls().is_empty());
        assert_eq!(game.phase(), Phase::Finished);
    }

    #[tokio::test]
    async fn test_solve_before_tour_closed() {
        let mut game = make_game(3);
        play(&mut game, &[0, 1]);
        let solver = FakeSolver::succeeding(3);
        assert!(matches!(game.solve(&solver, Some("key")).await, Err(SolveError::NotReady)));
        assert_eq!(game.phase(), Phase::Playing);
        assert!(solver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_solve_fixed_route_failure_short_circuits() {
        let mut game = finished_game(3);
        let provisional = game.metrics().user_distance;
        let solver = FakeSolver::new(
            Err("invalid key".to_string()),
            FakeSolver::succeeding(3).optimized);
        let result = game.solve(&solver, Some("key")).await;

        assert!(matches!(result, Err(SolveError::Service(_))));
        assert_eq!(solver.calls(), vec!["fixed"]);
        assert_eq!(game.phase(), Phase::Finished);
        assert_eq!(game.metrics().ai_distance, 0.0);
        assert_eq!(game.metrics().user_distance, provisional);
        assert!(game.ai_path().is_empty());
        assert!(game.snapshot().can_solve());
    }

    #[tokio::test]
    async fn test_solve_optimize_failure() {
        let mut game = finished_game(3);
        let solver = FakeSolver::new(
            Ok(RouteCost { distance_m: 1.0, duration_s: 1.0 }),
            Err("no solution".to_string()));
        let result = game.solve(&solver, Some("key")).await;

        assert!(matches!(result, Err(SolveError::Service(_))));
        assert_eq!(solver.calls(), vec!["fixed", "optimize"]);
        assert_eq!(game.phase(), Phase::Finished);
        assert_eq!(game.metrics().ai_distance, 0.0);
        assert_eq!(game.metrics().ai_time, 0.0);
    }

    #[tokio::test]
    async fn test_solve_mapping_failure() {
        let mut game = finished_game(3);
        let solver = FakeSolver::new(
            Ok(RouteCost { distance_m: 1.0, duration_s: 1.0 }),
            Ok(OptimizedRoute {
                cost: RouteCost { distance_m: 2.0, duration_s: 2.0 },
                activities: vec![Activity::Start, Activity::Service("x".to_string()), Activity::End],
            }));
        assert!(matches!(game.solve(&solver, Some("key")).await, Err(SolveError::Mapping(_))));
        assert_eq!(game.phase(), Phase::Finished);
        assert_eq!(game.metrics().ai_distance, 0.0);
    }

    #[tokio::test]
    async fn test_stale_result_after_reset() {
        let mut game = finished_game(3);
        let solver = FakeSolver::succeeding(3);
        let ticket = game.begin_solve(Some("key")).unwrap();
        let epoch = ticket.epoch;
        game.reset();
        game.generate(MUNICH, 5000.0, 3);

        let result = run_pipeline(ticket, &solver, "key").await;
        assert!(result.is_ok());
        assert!(matches!(game.finish_solve(epoch, result), Err(SolveError::StaleResult)));
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.metrics(), Metrics::default());
        assert!(game.ai_path().is_empty());
    }

    #[tokio::test]
    async fn test_solve_can_be_repeated() {
        let mut game = finished_game(3);
        let solver = FakeSolver::succeeding(3);
        game.solve(&solver, Some("key")).await.unwrap();
        game.solve(&solver, Some("key")).await.unwrap();
        assert_eq!(solver.calls(), vec!["fixed", "optimize", "fixed", "optimize"]);
        assert_eq!(game.ai_path(), &[0, 2, 1, 0]);
    }

    #[test]
    fn test_preferences_apply_to_next_game() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("preferences.json"));
        let mut game = Game::with_store(store.clone(), Some(5));
        game.new_game(MUNICH, 5000.0);
        assert_eq!(game.points().len(), 10);

        assert_eq!(game.set_stop_count(60).unwrap(), 50);
        game.set_distance_mode(DistanceMode::Road).unwrap();
        assert_eq!(game.points().len(), 10);
        assert_eq!(game.snapshot().mode, DistanceMode::Haversine);

        game.new_game(MUNICH, 5000.0);
        assert_eq!(game.points().len(), 50);
        assert_eq!(game.snapshot().mode, DistanceMode::Road);
        assert_eq!(store.load(), Preferences { number_of_stops: 50, distance_mode: DistanceMode::Road });
    }
}

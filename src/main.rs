use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;

use tsp_challenge::app::{self, Area};
use tsp_challenge::challenge::DistanceMode;
use tsp_challenge::client::RoutingClient;
use tsp_challenge::config::ApiConfig;
use tsp_challenge::game::Game;
use tsp_challenge::geometry::Coord;
use tsp_challenge::preferences::{PreferenceStore, Preferences};
use tsp_challenge::solvers::GraphHopperSolver;

#[derive(Parser)]
#[command(author, version, about = "Draw a round trip by hand, then race GraphHopper's optimizer.",
          long_about = None)]
struct Cli {
    /// Number of stops for new games (3-50). Saved as a preference.
    #[arg(short, long)]
    stops: Option<usize>,

    /// Distance mode for new games: road or haversine. Saved as a preference.
    #[arg(short, long)]
    mode: Option<DistanceMode>,

    /// Latitude of the area center.
    #[arg(long, default_value_t = 48.1351, allow_negative_numbers = true)]
    center_lat: f64,

    /// Longitude of the area center.
    #[arg(long, default_value_t = 11.5820, allow_negative_numbers = true)]
    center_lng: f64,

    /// Radius around the center stops are placed in, in meters.
    #[arg(long, default_value_t = 5000.0)]
    radius: f64,

    /// Seed for reproducible stop placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Preferences file to use instead of the default one.
    #[arg(long)]
    preferences: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file
    dotenvy::dotenv().ok();
    // Init logger with default value of info
    // This can be overriden with RUST_LOG env var
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut game = match cli.preferences.or_else(PreferenceStore::default_path) {
        Some(path) => Game::with_store(PreferenceStore::new(path), cli.seed),
        None => {
            info!("No config directory, preferences won't be saved.");
            Game::new(Preferences::default(), None, cli.seed)
        }
    };
    if let Some(stops) = cli.stops {
        if let Err(err) = game.set_stop_count(stops) {
            error!("Could not save preferences: {err}");
        }
    }
    if let Some(mode) = cli.mode {
        if let Err(err) = game.set_distance_mode(mode) {
            error!("Could not save preferences: {err}");
        }
    }

    let config = ApiConfig::from_env();
    let client = match RoutingClient::new(config.base_url.clone(), config.timeout) {
        Ok(client) => client,
        Err(err) => {
            error!("Could not set up the routing client: {err}");
            return;
        }
    };
    let solver = GraphHopperSolver::new(client);
    let area = Area { center: Coord::new(cli.center_lat, cli.center_lng), radius_m: cli.radius };

    if let Err(err) = app::run(&mut game, &solver, &config, area).await {
        error!("Error while running the game with underlying error:");
        error!("  {}", err);
    }
}

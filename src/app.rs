// Terminal front end: reads commands from stdin and forwards them to the game.
//
// A solve runs as a pending future next to the stdin reader, so the player
// can still reset or start over while GraphHopper is answering.

use lazy_static::lazy_static;
use log::{error, info};
use regex::Regex;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::challenge::DistanceMode;
use crate::config::ApiConfig;
use crate::game::{run_pipeline, Game, Selection, SolveError, SolveOutcome};
use crate::geometry::Coord;
use crate::hud;
use crate::solvers::Solver;

pub const HELP: &str = "\
Commands:
  new                 start a new game
  <n> | click <n>     visit stop n (0 is the start, S)
  solve               compare your route with GraphHopper
  reset               clear the board
  stops <n>           number of stops for the next game (3-50)
  mode road|haversine distance mode for the next game
  show                redraw the board
  help                this message
  quit";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    NewGame,
    Select(usize),
    Solve,
    Reset,
    Stops(usize),
    Mode(DistanceMode),
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref SELECT: Regex = Regex::new(r"^(?:(?:c|click|go)\s+)?(\d+)$").unwrap();
            static ref STOPS: Regex = Regex::new(r"^stops\s+(\d+)$").unwrap();
            static ref MODE: Regex = Regex::new(r"^mode\s+(\w+)$").unwrap();
        }
        let line = line.trim().to_ascii_lowercase();

        if let Some(caps) = SELECT.captures(&line) {
            return caps[1].parse().map(Command::Select).map_err(|e| format!("bad stop: {e}"));
        }
        if let Some(caps) = STOPS.captures(&line) {
            return caps[1].parse().map(Command::Stops).map_err(|e| format!("bad count: {e}"));
        }
        if let Some(caps) = MODE.captures(&line) {
            return caps[1].parse().map(Command::Mode);
        }
        match line.as_str() {
            "new" | "n" | "play" => Ok(Command::NewGame),
            "solve" | "compare" => Ok(Command::Solve),
            "reset" | "r" => Ok(Command::Reset),
            "show" | "map" | "" => Ok(Command::Show),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{other}', try 'help'")),
        }
    }
}

/// Area new games are generated in.
#[derive(Debug, Clone, Copy)]
pub struct Area {
    pub center: Coord,
    pub radius_m: f64,
}

type PendingSolve<'a> = Pin<Box<dyn Future<Output = Result<SolveOutcome, SolveError>> + 'a>>;

async fn wait_for(pending: &mut Option<(u64, PendingSolve<'_>)>) -> (u64, Result<SolveOutcome, SolveError>) {
    match pending {
        Some((epoch, solve)) => (*epoch, solve.as_mut().await),
        None => std::future::pending().await,
    }
}

/// Drops an in-flight solve started for an earlier game. Returns whether one
/// was dropped.
fn drop_stale(pending: &mut Option<(u64, PendingSolve<'_>)>, epoch: u64) -> bool {
    match pending {
        Some((started, _)) if *started != epoch => {
            info!("Abandoning routes of game #{started}");
            *pending = None;
            true
        }
        _ => false,
    }
}

/// Applies a command that doesn't involve the routing service. Returns false
/// to quit.
pub fn apply(game: &mut Game, area: Area, command: Command) -> bool {
    match command {
        Command::NewGame => game.new_game(area.center, area.radius_m),
        Command::Reset => game.reset(),
        Command::Select(index) => {
            if game.select_point(index) == Selection::Ignored {
                println!("Can't go to {index} now.");
            }
        }
        Command::Stops(count) => match game.set_stop_count(count) {
            Ok(kept) => println!("Next game will have {kept} stops."),
            Err(err) => error!("Could not save preferences: {err}"),
        },
        Command::Mode(mode) => match game.set_distance_mode(mode) {
            Ok(()) => println!("Next game will use {mode} distances."),
            Err(err) => error!("Could not save preferences: {err}"),
        },
        Command::Help => println!("{HELP}"),
        Command::Quit => return false,
        Command::Show | Command::Solve => {}
    }
    true
}

pub async fn run(game: &mut Game, solver: &dyn Solver, config: &ApiConfig, area: Area) -> io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<(u64, PendingSolve<'_>)> = None;
    let api_key = config.api_key().unwrap_or_default();

    println!("{}", hud::render(&game.snapshot()));
    println!("{HELP}");

    loop {
        tokio::select! {
            (epoch, result) = wait_for(&mut pending) => {
                pending = None;
                match game.finish_solve(epoch, result) {
                    Ok(()) => println!("{}", hud::render(&game.snapshot())),
                    Err(SolveError::StaleResult) => info!("Ignoring routes of a previous game"),
                    Err(err) => {
                        println!("Failed to compare routes: {err}");
                        println!("{}", hud::render(&game.snapshot()));
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };
                if command == Command::Solve {
                    if pending.is_some() {
                        println!("Already comparing routes, hang on.");
                        continue;
                    }
                    match game.begin_solve(config.api_key()) {
                        Ok(ticket) => {
                            let epoch = ticket.epoch;
                            let solve: PendingSolve<'_> = Box::pin(run_pipeline(ticket, solver, api_key));
                            pending = Some((epoch, solve));
                        }
                        Err(err) => println!("Can't compare routes: {err}"),
                    }
                } else if !apply(game, area, command) {
                    return Ok(());
                }
                drop_stale(&mut pending, game.epoch());
                if !matches!(command, Command::Help) {
                    println!("{}", hud::render(&game.snapshot()));
                }
            }
        }
    }
}

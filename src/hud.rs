// Text rendering of the game for the terminal front end.

use itertools::Itertools;
use std::fmt::Write;

use crate::challenge::{Phase, Verdict, DEPOT};
use crate::game::Snapshot;

const MAP_WIDTH: usize = 60;
const MAP_HEIGHT: usize = 20;

// Marker characters after the depot's 'S': 1-9, then a-z, then A-Z.
const LABELS: &[u8] = b"123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `1h 2m 3s`, or `2m 3s` under an hour. Seconds round up.
pub fn format_time(seconds: f64) -> String {
    let h = (seconds / 3600.0).floor();
    let m = ((seconds % 3600.0) / 60.0).floor();
    let s = (seconds % 60.0).ceil();
    if h > 0.0 {
        format!("{h}h {m}m {s}s")
    } else {
        format!("{m}m {s}s")
    }
}

pub fn format_km(meters: f64) -> String {
    format!("{:.2} km", meters / 1000.0)
}

/// Map marker of a point: `S` for the depot.
pub fn label(index: usize) -> char {
    if index == DEPOT {
        'S'
    } else {
        LABELS.get(index - 1).map(|&c| c as char).unwrap_or('#')
    }
}

/// `S 3 1 2 S`, using point numbers rather than map markers.
pub fn route_labels(path: &[usize]) -> String {
    path.iter()
        .map(|&i| if i == DEPOT { "S".to_string() } else { i.to_string() })
        .join(" ")
}

pub fn hint(snapshot: &Snapshot) -> Option<String> {
    match snapshot.phase {
        Phase::Playing if snapshot.awaiting_return() => Some("Return to Start!".to_string()),
        Phase::Playing if snapshot.user_path.is_empty() => {
            Some(format!("Start at S, then visit all {} stops", snapshot.points.len()))
        }
        Phase::Playing => Some(format!("Visit all {} stops", snapshot.points.len())),
        Phase::Calculating => Some("Asking GraphHopper for its route...".to_string()),
        _ => None,
    }
}

pub fn verdict_message(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::BeatAi => "You Beat GraphHopper!",
        Verdict::PerfectMatch => "Perfect Match!",
        Verdict::ShorterRoute => "Shorter Route Found! (GraphHopper optimizes for time)",
        Verdict::AiWon => "GraphHopper Won This Time",
        Verdict::Completed => "Route Completed!",
    }
}

/// Scatter plot of the points, north up. Visited stops are shown as `*`
/// unless they are the depot.
pub fn render_map(snapshot: &Snapshot) -> String {
    let points = snapshot.points;
    if points.is_empty() {
        return String::new();
    }
    let (min_lat, max_lat) = points.iter().map(|p| p.lat())
        .minmax_by(|a, b| a.total_cmp(b)).into_option().unwrap_or((0.0, 0.0));
    let (min_lng, max_lng) = points.iter().map(|p| p.lng())
        .minmax_by(|a, b| a.total_cmp(b)).into_option().unwrap_or((0.0, 0.0));
    let lat_span = (max_lat - min_lat).max(f64::EPSILON);
    let lng_span = (max_lng - min_lng).max(f64::EPSILON);

    let mut grid = vec![vec![' '; MAP_WIDTH]; MAP_HEIGHT];
    for (i, p) in points.iter().enumerate() {
        let col = ((p.lng() - min_lng) / lng_span * (MAP_WIDTH - 1) as f64).round() as usize;
        let row = ((max_lat - p.lat()) / lat_span * (MAP_HEIGHT - 1) as f64).round() as usize;
        let visited = i != DEPOT && snapshot.user_path.contains(&i);
        grid[row][col] = if visited { '*' } else { label(i) };
    }

    let border = format!("+{}+", "-".repeat(MAP_WIDTH));
    let mut out = String::new();
    writeln!(out, "{border}").ok();
    for row in grid {
        writeln!(out, "|{}|", row.into_iter().collect::<String>()).ok();
    }
    writeln!(out, "{border}").ok();
    out
}

/// Full screen: map, scores, hints and the commands that apply right now.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    writeln!(out, "=== TSP Challenge ({} mode, powered by GraphHopper) ===", snapshot.mode).ok();

    if snapshot.phase == Phase::Idle {
        writeln!(out, "No game yet. Type 'new' to start with {} stops.",
                 snapshot.preferences.number_of_stops).ok();
        return out;
    }

    out.push_str(&render_map(snapshot));
    let metrics = snapshot.metrics;
    writeln!(out, "You          distance: {}", format_km(metrics.user_distance)).ok();
    if metrics.user_time > 0.0 {
        writeln!(out, "             time:     {}", format_time(metrics.user_time)).ok();
    }
    if metrics.has_ai_result() {
        writeln!(out, "GraphHopper  distance: {}", format_km(metrics.ai_distance)).ok();
        writeln!(out, "             time:     {}", format_time(metrics.ai_time)).ok();
    }
    if !snapshot.user_path.is_empty() {
        writeln!(out, "Your route:        {}", route_labels(snapshot.user_path)).ok();
    }
    if !snapshot.ai_path.is_empty() {
        writeln!(out, "GraphHopper route: {}", route_labels(snapshot.ai_path)).ok();
    }

    if let Some(hint) = hint(snapshot) {
        writeln!(out, "> {hint}").ok();
    }
    if snapshot.phase == Phase::Finished {
        let verdict = metrics.verdict();
        let cheer = if verdict.celebrate() { " \u{1F389}" } else { "" };
        writeln!(out, "> {}{cheer}", verdict_message(verdict)).ok();
        if snapshot.can_solve() {
            writeln!(out, "Type 'solve' to compare with GraphHopper.").ok();
        }
    }
    out
}

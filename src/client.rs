use log::{debug, info};
use serde_json::Error as JSONError;
use std::time::Duration;
use thiserror::Error;

use crate::game_interface::{ErrorResponse, Problem, Route, VrpResponse};

pub const DEFAULT_BASE_URL: &str = "https://graphhopper.com/api/1";

/// HTTP transport to the routing service. One request per call, no retries.
#[derive(Clone)]
pub struct RoutingClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not reach the routing service ({0})")]
    Network(#[from] reqwest::Error),
    #[error("Received error from routing service ({0})")]
    Service(String),
    #[error("Unable to (de)serialize payload from/to routing service ({0})")]
    JSONError(#[from] JSONError),
}

impl RoutingClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(RoutingClient {
            http: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts a problem to the VRP endpoint and returns the first route of the
    /// synchronous solution.
    pub async fn solve(&self, problem: &Problem, api_key: &str) -> Result<Route, Error> {
        let url = format!("{}/vrp", self.base_url);
        debug!("VRP request payload: {}", serde_json::to_string(problem)?);

        let response = self.http.post(&url)
            .query(&[("key", api_key)])
            .json(problem)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("VRP response ({}): {}", status, text);

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(text);
            return Err(Error::Service(format!("status {status}: {message}")));
        }
        let route = parse_route(&text)?;
        info!("VRP route: {:.0} m, {:.0} s, {} activities",
              route.distance, route.completion_time, route.activities.len());
        Ok(route)
    }
}

/// Extracts `solution.routes[0]`, failing on anything missing or malformed.
pub fn parse_route(text: &str) -> Result<Route, Error> {
    let parsed: VrpResponse = serde_json::from_str(text)
        .map_err(|e| Error::Service(format!("malformed solution: {e}")))?;
    let solution = parsed.solution
        .ok_or_else(|| Error::Service("response has no solution".to_string()))?;
    solution.routes.into_iter().next()
        .ok_or_else(|| Error::Service("solution has no routes".to_string()))
}

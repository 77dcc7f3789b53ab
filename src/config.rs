// Service settings read from the environment (and `.env`, once loaded).

use log::warn;
use std::time::Duration;

use crate::client::DEFAULT_BASE_URL;

pub const API_KEY_VAR: &str = "GRAPHHOPPER_API_KEY";
pub const BASE_URL_VAR: &str = "GRAPHHOPPER_URL";
pub const TIMEOUT_VAR: &str = "GRAPHHOPPER_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        if api_key.is_none() {
            warn!("{API_KEY_VAR} is not set, route comparison will be unavailable");
        }
        let base_url = lookup(BASE_URL_VAR)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = lookup(TIMEOUT_VAR).and_then(|secs| match secs.parse::<u64>() {
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(_) => {
                warn!("Ignoring invalid {TIMEOUT_VAR}={secs}");
                None
            }
        });
        ApiConfig { api_key, base_url, timeout }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use super::*;

    fn config(vars: &[(&str, &str)]) -> ApiConfig {
        let vars: HashMap<String, String> = vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout, None);
    }

    #[test]
    fn test_values() {
        let cfg = config(&[
            (API_KEY_VAR, " abc "),
            (BASE_URL_VAR, "http://localhost:8989"),
            (TIMEOUT_VAR, "30"),
        ]);
        assert_eq!(cfg.api_key(), Some("abc"));
        assert_eq!(cfg.base_url, "http://localhost:8989");
        assert_eq!(cfg.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_blank_key_and_bad_timeout() {
        let cfg = config(&[(API_KEY_VAR, "   "), (TIMEOUT_VAR, "soon")]);
        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.timeout, None);
    }
}

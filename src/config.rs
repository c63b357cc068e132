//! Client configuration.
//!
//! Resolution order for each value: explicit override (CLI flag) >
//! `ANONBOX_*` variable > `NEXT_PUBLIC_*` variable shared with the web
//! front end > built-in default. `.env` is loaded by `main` before this runs.

use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_APP_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend API base URL, without trailing slash.
    pub api_url: String,
    /// Public web app URL, used to render shareable links.
    pub app_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(*k).filter(|v| !v.trim().is_empty()));

        let api_url = first(&["ANONBOX_API_URL", "NEXT_PUBLIC_API_URL"]).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let app_url = first(&["ANONBOX_APP_URL", "NEXT_PUBLIC_APP_URL"]).unwrap_or_else(|| DEFAULT_APP_URL.to_string());

        let timeout = match first(&["ANONBOX_TIMEOUT_SECS"]) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    log::warn!("Invalid ANONBOX_TIMEOUT_SECS value {:?}, using default", raw);
                    DEFAULT_TIMEOUT
                }
            },
            None => DEFAULT_TIMEOUT,
        };

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            app_url: app_url.trim_end_matches('/').to_string(),
            timeout,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Absolute web link for an app-relative path.
    pub fn app_link(&self, path: &str) -> String {
        format!("{}{}", self.app_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_anonbox_vars_win_over_next_public() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ANONBOX_API_URL", "https://api.anonbox.test/api/"),
            ("NEXT_PUBLIC_API_URL", "https://ignored.test"),
            ("NEXT_PUBLIC_APP_URL", "https://anonbox.test"),
        ]));
        assert_eq!(config.api_url, "https://api.anonbox.test/api");
        assert_eq!(config.app_url, "https://anonbox.test");
    }

    #[test]
    fn test_blank_values_fall_through() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ANONBOX_API_URL", "  "),
            ("NEXT_PUBLIC_API_URL", "https://fallback.test/api"),
        ]));
        assert_eq!(config.api_url, "https://fallback.test/api");
    }

    #[test]
    fn test_timeout_parsing() {
        let config = ClientConfig::from_lookup(lookup(&[("ANONBOX_TIMEOUT_SECS", "30")]));
        assert_eq!(config.timeout, Duration::from_secs(30));

        for bad in ["0", "soon", "-1"] {
            let config = ClientConfig::from_lookup(lookup(&[("ANONBOX_TIMEOUT_SECS", bad)]));
            assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        }
    }

    #[test]
    fn test_app_link() {
        let config = ClientConfig::default();
        assert_eq!(config.app_link("/u/ab123"), "http://localhost:3000/u/ab123");
    }
}

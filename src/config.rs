//! Runtime configuration from the environment (and `.env`)

use std::env;
use std::time::Duration;
use tracing::warn;

use crate::advisor::DEFAULT_CURRENCY;

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct MeshConfig {
    pub port: u16,
    /// Base URL of the delegate agent service; local-only when unset
    pub agent_url: Option<String>,
    /// Unset means no client-side timeout
    pub agent_timeout: Option<Duration>,
    pub default_currency: String,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            agent_url: None,
            agent_timeout: None,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl MeshConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = lookup("PORT")
            .or_else(|| lookup("API_PORT"))
            .and_then(|raw| match raw.trim().parse::<u16>() {
                Ok(port) => Some(port),
                Err(e) => {
                    warn!("Ignoring invalid port {:?}: {}", raw, e);
                    None
                }
            })
            .unwrap_or(defaults.port);

        let agent_url = lookup("MESH_AGENT_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let agent_timeout = lookup("MESH_AGENT_TIMEOUT_SECS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let default_currency = lookup("MESH_DEFAULT_CURRENCY")
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or(defaults.default_currency);

        Self {
            port,
            agent_url,
            agent_timeout,
            default_currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MeshConfig::from_lookup(lookup(&[]));
        assert_eq!(config, MeshConfig::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_currency, "CAD");
    }

    #[test]
    fn test_overrides() {
        let config = MeshConfig::from_lookup(lookup(&[
            ("API_PORT", "9090"),
            ("MESH_AGENT_URL", "http://agent.local:7000/"),
            ("MESH_AGENT_TIMEOUT_SECS", "15"),
            ("MESH_DEFAULT_CURRENCY", "usd"),
        ]));
        assert_eq!(config.port, 9090);
        assert_eq!(config.agent_url.as_deref(), Some("http://agent.local:7000"));
        assert_eq!(config.agent_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.default_currency, "USD");
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = MeshConfig::from_lookup(lookup(&[
            ("PORT", "not-a-port"),
            ("MESH_AGENT_URL", "   "),
            ("MESH_AGENT_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.agent_url, None);
        assert_eq!(config.agent_timeout, None);
    }
}

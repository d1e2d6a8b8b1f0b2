//! Client configuration: where the backend lives and how often feeds resync.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DOMAIN_VAR: &str = "ORECART_API_DOMAIN";
pub const SECURE_VAR: &str = "ORECART_API_SECURE";

/// Feeds resend their subscription set this often even without changes.
pub const DEFAULT_RESYNC_INTERVAL_MS: u64 = 2_000;

fn default_resync_interval_ms() -> u64 {
    DEFAULT_RESYNC_INTERVAL_MS
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL for REST calls, e.g. `https://orecart.example.edu`
    pub api_url: String,
    /// Base URL for feed sockets, e.g. `wss://orecart.example.edu`
    pub ws_api_url: String,
    #[serde(default = "default_resync_interval_ms")]
    pub resync_interval_ms: u64,
}

impl ClientConfig {
    /// Derive both base URLs from a bare domain (optionally with port).
    pub fn from_domain(domain: &str, secure: bool) -> Result<Self, ConfigError> {
        let domain = domain.trim().trim_end_matches('/');
        let (http, ws) = if secure { ("https", "wss") } else { ("http", "ws") };

        let config = Self {
            api_url: format!("{http}://{domain}"),
            ws_api_url: format!("{ws}://{domain}"),
            resync_interval_ms: DEFAULT_RESYNC_INTERVAL_MS,
        };
        config.validate()?;

        Ok(config)
    }

    /// Read `ORECART_API_DOMAIN` and `ORECART_API_SECURE` (`"1"` enables TLS).
    pub fn from_env() -> Result<Self, ConfigError> {
        let domain = std::env::var(DOMAIN_VAR).map_err(|_| ConfigError::MissingVar(DOMAIN_VAR))?;
        let secure = std::env::var(SECURE_VAR).is_ok_and(|value| value == "1");

        Self::from_domain(&domain, secure)
    }

    pub fn with_resync_interval(mut self, interval: Duration) -> Self {
        self.resync_interval_ms = interval.as_millis().max(1) as u64;
        self
    }

    pub fn resync_interval(&self) -> Duration {
        Duration::from_millis(self.resync_interval_ms.max(1))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (url, schemes) in [
            (&self.api_url, ["http", "https"]),
            (&self.ws_api_url, ["ws", "wss"]),
        ] {
            let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;

            if !schemes.contains(&parsed.scheme()) {
                return Err(ConfigError::InvalidUrl {
                    url: url.clone(),
                    reason: format!("expected a {} url", schemes.join("/")),
                });
            }
        }

        Ok(())
    }

    /// Join a path such as `/vans/v2/subscribe/` onto the socket base URL.
    pub fn ws_url(&self, path: &str) -> String {
        format!("{}{}", self.ws_api_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_domain() {
        let plain = ClientConfig::from_domain("localhost:8000", false).unwrap();
        assert_eq!(plain.api_url, "http://localhost:8000");
        assert_eq!(plain.ws_api_url, "ws://localhost:8000");

        let secure = ClientConfig::from_domain("orecart.example.edu/", true).unwrap();
        assert_eq!(secure.api_url, "https://orecart.example.edu");
        assert_eq!(secure.ws_url("/vans/v2/subscribe/"), "wss://orecart.example.edu/vans/v2/subscribe/");
    }

    #[test]
    fn test_resync_defaults_to_two_seconds() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"api_url":"http://a.test","ws_api_url":"ws://a.test"}"#,
        )
        .unwrap();

        assert_eq!(config.resync_interval(), Duration::from_secs(2));
        assert_eq!(
            config.with_resync_interval(Duration::from_millis(50)).resync_interval(),
            Duration::from_millis(50)
        );
    }

    #[test]
    fn test_validate_rejects_wrong_scheme() {
        let config = ClientConfig {
            api_url: "ws://a.test".into(),
            ws_api_url: "ws://a.test".into(),
            resync_interval_ms: 10,
        };

        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl { .. })));
    }
}

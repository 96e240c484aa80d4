//! Configuration types for multi-fetch

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Dispatch behavior configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Maximum number of requests in flight at once (default: 0 = one worker per request)
    #[serde(default)]
    pub concurrency_limit: usize,
}

/// Settings for the reqwest-backed transport
///
/// Redirects, TLS and connection pooling are left to reqwest's defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Total per-request timeout in seconds, fractions allowed (None = no timeout)
    #[serde(default, with = "optional_duration_serde")]
    pub timeout: Option<Duration>,

    /// Connect timeout in seconds (None = reqwest default)
    #[serde(default, with = "optional_duration_serde")]
    pub connect_timeout: Option<Duration>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Mirror request/response dumps to stderr through [`DebugTransport`](crate::transport::DebugTransport)
    #[serde(default)]
    pub debug: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            user_agent: default_user_agent(),
            debug: false,
        }
    }
}

/// Main configuration for dispatchers, collectors and the production transport
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Dispatch settings (concurrency)
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Transport settings (timeouts, user agent, debug dumps)
    #[serde(default)]
    pub transport: TransportConfig,
}

impl Config {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.transport.user_agent.trim().is_empty() {
            return Err(Error::Config {
                message: "user agent must not be empty".to_string(),
                key: Some("user_agent".to_string()),
            });
        }
        if self.transport.timeout == Some(Duration::ZERO) {
            return Err(Error::Config {
                message: "timeout must be greater than zero seconds".to_string(),
                key: Some("timeout".to_string()),
            });
        }
        if self.transport.connect_timeout == Some(Duration::ZERO) {
            return Err(Error::Config {
                message: "connect timeout must be greater than zero seconds".to_string(),
                key: Some("connect_timeout".to_string()),
            });
        }
        Ok(())
    }
}

fn default_user_agent() -> String {
    format!("multi-fetch/{}", env!("CARGO_PKG_VERSION"))
}

// Optional Duration serialization helper (fractional seconds)
mod optional_duration_serde {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<f64>::deserialize(deserializer)?
            .map(|secs| Duration::try_from_secs_f64(secs).map_err(D::Error::custom))
            .transpose()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_json("{}").expect("empty config should parse");

        assert_eq!(config.dispatch.concurrency_limit, 0);
        assert_eq!(config.transport.timeout, None);
        assert!(config.transport.user_agent.starts_with("multi-fetch/"));
        assert!(!config.transport.debug);
    }

    #[test]
    fn timeouts_are_read_as_seconds() {
        let config = Config::from_json(
            r#"{"dispatch": {"concurrency_limit": 4}, "transport": {"timeout": 30, "connect_timeout": 5}}"#,
        )
        .unwrap();

        assert_eq!(config.dispatch.concurrency_limit, 4);
        assert_eq!(config.transport.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.transport.connect_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn empty_user_agent_is_rejected_with_key() {
        let err = Config::from_json(r#"{"transport": {"user_agent": "  "}}"#).unwrap_err();

        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("user_agent")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Config::from_json(r#"{"transport": {"timeout": 0}}"#).unwrap_err();
        assert!(matches!(err, Error::Config { key: Some(ref k), .. } if k == "timeout"));
    }

    #[test]
    fn zero_connect_timeout_is_rejected() {
        let err = Config::from_json(r#"{"transport": {"connect_timeout": 0}}"#).unwrap_err();
        assert!(matches!(err, Error::Config { key: Some(ref k), .. } if k == "connect_timeout"));
    }

    #[test]
    fn fractional_seconds_are_accepted() {
        let config =
            Config::from_json(r#"{"transport": {"timeout": 1.5, "connect_timeout": 0.25}}"#)
                .unwrap();

        assert_eq!(config.transport.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.transport.connect_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn negative_timeout_fails_to_parse() {
        let result = Config::from_json(r#"{"transport": {"timeout": -3}}"#);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn sub_second_timeouts_survive_round_trip() {
        let config = Config {
            transport: TransportConfig {
                timeout: Some(Duration::from_millis(500)),
                connect_timeout: Some(Duration::from_millis(250)),
                ..TransportConfig::default()
            },
            ..Config::default()
        };

        let json = serde_json::to_string(&config).expect("serialize failed");
        let parsed = Config::from_json(&json).expect("sub-second timeouts must stay valid");

        assert_eq!(parsed.transport.timeout, Some(Duration::from_millis(500)));
        assert_eq!(parsed.transport.connect_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn optional_duration_serde_rejects_string_instead_of_integer() {
        let result = Config::from_json(r#"{"transport": {"timeout": "forever"}}"#);

        match result {
            Err(Error::Serialization(e)) => {
                let msg = e.to_string();
                assert!(
                    msg.contains("invalid type") || msg.contains("expected"),
                    "serde error should describe the type mismatch, got: {msg}"
                );
            }
            other => panic!("string value for a Duration field must fail to parse, got {other:?}"),
        }
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config {
            dispatch: DispatchConfig {
                concurrency_limit: 8,
            },
            transport: TransportConfig {
                timeout: Some(Duration::from_secs(10)),
                debug: true,
                ..TransportConfig::default()
            },
        };

        let json = serde_json::to_string(&config).expect("serialize failed");
        let parsed = Config::from_json(&json).expect("deserialize failed");

        assert_eq!(parsed.dispatch.concurrency_limit, 8);
        assert_eq!(parsed.transport.timeout, Some(Duration::from_secs(10)));
        assert_eq!(parsed.transport.connect_timeout, None);
        assert!(parsed.transport.debug);
    }
}

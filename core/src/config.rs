//! Client configuration: API key, host, authentication mode and timeout.

use std::fmt;
use std::time::Duration;

use uuid::Uuid;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://fdo.rocketlaunch.live";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_API_KEY: &str = "LAUNCH_API_KEY";
pub const ENV_BASE_URL: &str = "LAUNCH_API_BASE_URL";
pub const ENV_AUTH: &str = "LAUNCH_API_AUTH";
pub const ENV_TIMEOUT_SECS: &str = "LAUNCH_API_TIMEOUT_SECS";

/// A validated API key (UUID v4 text form). `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn parse(key: &str) -> Result<Self, ConfigError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        match Uuid::parse_str(key) {
            Ok(uuid) if uuid.get_version_num() == 4 => Ok(Self(key.to_string())),
            _ => Err(ConfigError::InvalidApiKey),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Where the API key travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// `Authorization: Bearer <key>`.
    #[default]
    Header,
    /// `?key=<key>` appended to the query string.
    QueryKey,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: ApiKey,
    pub base_url: String,
    pub auth: AuthMode,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: ApiKey::parse(api_key)?,
            base_url: DEFAULT_BASE_URL.to_string(),
            auth: AuthMode::default(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a config from `LAUNCH_API_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let key = lookup(ENV_API_KEY).ok_or(ConfigError::MissingApiKey)?;
        let mut config = Self::new(&key)?;

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(&base_url);
        }
        if let Some(auth) = lookup(ENV_AUTH) {
            config.auth = match auth.to_ascii_lowercase().as_str() {
                "header" => AuthMode::Header,
                "query" => AuthMode::QueryKey,
                _ => return Err(ConfigError::InvalidEnv { var: ENV_AUTH, value: auth }),
            };
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let parsed = secs
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidEnv { var: ENV_TIMEOUT_SECS, value: secs.clone() })?;
            config.timeout = Duration::from_secs(parsed);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY: &str = "9b2c4f1e-7d3a-4b8e-a1c5-2f6d8e0b3a71";

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn accepts_v4_keys_only() {
        assert!(ApiKey::parse(KEY).is_ok());
        assert_eq!(ApiKey::parse(""), Err(ConfigError::MissingApiKey));
        assert_eq!(ApiKey::parse("not-a-key"), Err(ConfigError::InvalidApiKey));
        // Version 1 UUID.
        assert_eq!(
            ApiKey::parse("c232ab00-9414-11ec-b3c8-9f6bdeced846"),
            Err(ConfigError::InvalidApiKey)
        );
    }

    #[test]
    fn debug_redacts_key() {
        let key = ApiKey::parse(KEY).unwrap();
        assert!(!format!("{key:?}").contains("9b2c"));
    }

    #[test]
    fn from_lookup_reads_every_variable() {
        let config = ClientConfig::from_lookup(env(&[
            (ENV_API_KEY, KEY),
            (ENV_BASE_URL, "http://localhost:3000/"),
            (ENV_AUTH, "query"),
            (ENV_TIMEOUT_SECS, "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.auth, AuthMode::QueryKey);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn from_lookup_defaults_and_errors() {
        let config = ClientConfig::from_lookup(env(&[(ENV_API_KEY, KEY)])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.auth, AuthMode::Header);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);

        assert_eq!(ClientConfig::from_lookup(env(&[])).unwrap_err(), ConfigError::MissingApiKey);
        assert!(matches!(
            ClientConfig::from_lookup(env(&[(ENV_API_KEY, KEY), (ENV_AUTH, "cookie")])),
            Err(ConfigError::InvalidEnv { var: ENV_AUTH, .. })
        ));
    }
}

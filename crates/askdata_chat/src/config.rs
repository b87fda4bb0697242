//! Client configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChatError, ChatResult};

/// Default query endpoint of a locally running backend.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/ask";

/// What to do with a response that arrives after a newer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleResponsePolicy {
    /// Every response is appended in completion order.
    #[default]
    Append,
    /// Only the most recent submission may append; older ones are discarded.
    DropStale,
}

/// Configuration for talking to the query backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Full URL of the query endpoint
    pub endpoint: String,
    /// Request timeout in seconds (None = wait indefinitely)
    pub timeout_secs: Option<u64>,
    /// Handling of overlapping requests
    pub stale_responses: StaleResponsePolicy,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: None,
            stale_responses: StaleResponsePolicy::Append,
        }
    }
}

/// On-disk settings file, all keys optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    backend_url: Option<String>,
    timeout_secs: Option<u64>,
    drop_stale_responses: Option<bool>,
}

impl ChatConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = Some(seconds);
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.timeout_secs = None;
        self
    }

    pub fn stale_responses(mut self, policy: StaleResponsePolicy) -> Self {
        self.stale_responses = policy;
        self
    }

    /// Request timeout as a duration, if one is set.
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }

    /// Build a configuration from environment variables
    ///
    /// Reads:
    /// 1. BACKEND_URL
    /// 2. ASKDATA_TIMEOUT_SECS
    pub fn from_env() -> ChatResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("BACKEND_URL") {
            if !url.is_empty() {
                config.endpoint = url;
            }
        }

        if let Ok(raw) = std::env::var("ASKDATA_TIMEOUT_SECS") {
            if !raw.is_empty() {
                let secs = raw.parse::<u64>().map_err(|_| {
                    ChatError::Config(format!("ASKDATA_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                config.timeout_secs = Some(secs);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a JSON settings file, falling back to defaults for missing keys.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is
    /// an error.
    pub fn from_settings(path: impl AsRef<Path>) -> ChatResult<Self> {
        let path = path.as_ref();
        let mut config = Self::default();

        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let settings: SettingsFile = serde_json::from_str(&content).map_err(|e| {
            ChatError::Config(format!("Invalid settings file {}: {}", path.display(), e))
        })?;

        if let Some(url) = settings.backend_url {
            config.endpoint = url;
        }
        config.timeout_secs = settings.timeout_secs;
        if settings.drop_stale_responses == Some(true) {
            config.stale_responses = StaleResponsePolicy::DropStale;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the endpoint is an http(s) URL.
    pub fn validate(&self) -> ChatResult<()> {
        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| ChatError::Config(format!("Invalid endpoint '{}': {}", self.endpoint, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ChatError::Config(format!(
                "Unsupported endpoint scheme '{}', expected http or https",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_duration(), None);
        assert_eq!(config.stale_responses, StaleResponsePolicy::Append);
    }

    #[test]
    fn test_builder() {
        let config = ChatConfig::new("http://db.local/ask")
            .timeout(30)
            .stale_responses(StaleResponsePolicy::DropStale);

        assert_eq!(config.endpoint, "http://db.local/ask");
        assert_eq!(config.timeout_duration(), Some(Duration::from_secs(30)));
        assert_eq!(config.clone().no_timeout().timeout_secs, None);
        assert_eq!(config.stale_responses, StaleResponsePolicy::DropStale);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        assert_eq!(ChatConfig::default().timeout(0).timeout_duration(), None);
    }

    #[test]
    fn test_from_settings() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(
            &path,
            r#"{"backendUrl": "https://query.example.com/ask", "timeoutSecs": 300, "dropStaleResponses": true}"#,
        )
        .unwrap();

        let config = ChatConfig::from_settings(&path).unwrap();
        assert_eq!(config.endpoint, "https://query.example.com/ask");
        assert_eq!(config.timeout_secs, Some(300));
        assert_eq!(config.stale_responses, StaleResponsePolicy::DropStale);
    }

    #[test]
    fn test_from_settings_missing_file() {
        let temp = tempdir().unwrap();
        let config = ChatConfig::from_settings(temp.path().join("nope.json")).unwrap();
        assert_eq!(config, ChatConfig::default());
    }

    #[test]
    fn test_from_settings_invalid() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(ChatConfig::from_settings(&path), Err(ChatError::Config(_))));

        fs::write(&path, r#"{"backendUrl": "ftp://example.com"}"#).unwrap();
        assert!(matches!(ChatConfig::from_settings(&path), Err(ChatError::Config(_))));
    }

    #[test]
    fn test_validate() {
        assert!(ChatConfig::default().validate().is_ok());
        assert!(ChatConfig::new("not a url").validate().is_err());
    }
}

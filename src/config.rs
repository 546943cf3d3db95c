//! Registration settings, fixed up front by the caller.

use std::path::PathBuf;
use std::time::Duration;

use crate::clawkey::DEFAULT_API_BASE;
use crate::error::{RegistrationError, Result};

pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Everything one registration attempt needs, fixed up front by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConfig {
    /// Registry service base URL.
    pub api_url: String,
    pub agent_name: String,
    pub clawkey_api_base: String,
    /// `None` falls back to `~/.openclaw/identity/device.json`.
    pub identity_path: Option<PathBuf>,
    pub poll_timeout: Duration,
    pub poll_interval: Duration,
}

impl RegistrationConfig {
    pub fn new(api_url: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self {
            api_url: normalize(api_url.into()),
            agent_name: agent_name.into(),
            clawkey_api_base: DEFAULT_API_BASE.to_string(),
            identity_path: None,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_clawkey_api_base(mut self, base: impl Into<String>) -> Self {
        self.clawkey_api_base = normalize(base.into());
        self
    }

    pub fn with_identity_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_path = Some(path.into());
        self
    }

    /// A zero timeout means "unset" and keeps the 5 minute default.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = if timeout.is_zero() {
            DEFAULT_POLL_TIMEOUT
        } else {
            timeout
        };
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Assemble from `SENTRY_API_URL`, `AGENT_NAME`, `CLAWKEY_API_BASE`,
    /// `CLAWKEY_IDENTITY_PATH` and `CLAWKEY_POLL_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // empty counts as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (Some(api_url), Some(agent_name)) = (get("SENTRY_API_URL"), get("AGENT_NAME")) else {
            return Err(RegistrationError::Config(
                "Missing env vars: SENTRY_API_URL, AGENT_NAME".into(),
            ));
        };

        let mut config = Self::new(api_url, agent_name);
        if let Some(base) = get("CLAWKEY_API_BASE") {
            config = config.with_clawkey_api_base(base);
        }
        if let Some(path) = get("CLAWKEY_IDENTITY_PATH") {
            config = config.with_identity_path(path);
        }
        if let Some(ms) = get("CLAWKEY_POLL_TIMEOUT_MS") {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                RegistrationError::Config(format!("CLAWKEY_POLL_TIMEOUT_MS is not a number: {ms}"))
            })?;
            config = config.with_poll_timeout(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

fn normalize(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_vars_set() {
        let config = RegistrationConfig::from_lookup(lookup(&[
            ("SENTRY_API_URL", "https://sentry.example.com/"),
            ("AGENT_NAME", "bot1"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://sentry.example.com");
        assert_eq!(config.agent_name, "bot1");
        assert_eq!(config.clawkey_api_base, "https://api.clawkey.ai/v1");
        assert_eq!(config.identity_path, None);
        assert_eq!(config.poll_timeout, Duration::from_secs(300));
        assert_eq!(config.poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn optional_vars_override_defaults() {
        let config = RegistrationConfig::from_lookup(lookup(&[
            ("SENTRY_API_URL", "https://sentry.example.com"),
            ("AGENT_NAME", "bot1"),
            ("CLAWKEY_API_BASE", "http://localhost:9000/v1/"),
            ("CLAWKEY_IDENTITY_PATH", "/tmp/device.json"),
            ("CLAWKEY_POLL_TIMEOUT_MS", "1500"),
        ]))
        .unwrap();

        assert_eq!(config.clawkey_api_base, "http://localhost:9000/v1");
        assert_eq!(config.identity_path, Some(PathBuf::from("/tmp/device.json")));
        assert_eq!(config.poll_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn missing_or_empty_required_vars_fail() {
        for vars in [
            vec![("AGENT_NAME", "bot1")],
            vec![("SENTRY_API_URL", "https://x"), ("AGENT_NAME", "")],
        ] {
            assert!(matches!(
                RegistrationConfig::from_lookup(lookup(&vars)),
                Err(RegistrationError::Config(_))
            ));
        }
    }

    #[test]
    fn empty_optional_vars_are_ignored() {
        let config = RegistrationConfig::from_lookup(lookup(&[
            ("SENTRY_API_URL", "https://x"),
            ("AGENT_NAME", "bot1"),
            ("CLAWKEY_API_BASE", ""),
            ("CLAWKEY_IDENTITY_PATH", ""),
        ]))
        .unwrap();
        assert_eq!(config.clawkey_api_base, DEFAULT_API_BASE);
        assert_eq!(config.identity_path, None);
    }

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let config = RegistrationConfig::from_lookup(lookup(&[
            ("SENTRY_API_URL", "https://x"),
            ("AGENT_NAME", "bot1"),
            ("CLAWKEY_POLL_TIMEOUT_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.poll_timeout, DEFAULT_POLL_TIMEOUT);

        let config = RegistrationConfig::new("https://x", "bot1").with_poll_timeout(Duration::ZERO);
        assert_eq!(config.poll_timeout, DEFAULT_POLL_TIMEOUT);
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        let err = RegistrationConfig::from_lookup(lookup(&[
            ("SENTRY_API_URL", "https://x"),
            ("AGENT_NAME", "bot1"),
            ("CLAWKEY_POLL_TIMEOUT_MS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RegistrationError::Config(_)));
    }
}

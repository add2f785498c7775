//! Run configuration.
//!
//! Defaults reproduce the fully sequential behaviour. Override via
//! environment variables or explicit construction.

use std::time::Duration;

/// Environment variable holding the worker count.
pub const MAX_WORKERS_VAR: &str = "ENVSPEC_MAX_WORKERS";
/// Environment variable holding the HTTP connect timeout in seconds.
pub const HTTP_TIMEOUT_VAR: &str = "ENVSPEC_HTTP_TIMEOUT_SECS";
/// Environment variable holding the HTTP user agent.
pub const USER_AGENT_VAR: &str = "ENVSPEC_USER_AGENT";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for one [`SpecificationValidator`](crate::SpecificationValidator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Upper bound on descriptors checked at once. `1` checks them in
    /// traversal order on the calling thread.
    pub max_workers: usize,
    /// Seconds to wait for an HTTP connection.
    pub http_timeout_secs: u64,
    /// User agent sent with every HTTP request.
    pub user_agent: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_workers: 1,
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ENVSPEC_MAX_WORKERS` (default: 1, must be at least 1)
    /// - `ENVSPEC_HTTP_TIMEOUT_SECS` (default: 30)
    /// - `ENVSPEC_USER_AGENT` (default: `envspec/<version>`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ValidatorConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            max_workers: parse_var(&lookup, MAX_WORKERS_VAR)?.unwrap_or(defaults.max_workers),
            http_timeout_secs: parse_var(&lookup, HTTP_TIMEOUT_VAR)?
                .unwrap_or(defaults.http_timeout_secs),
            user_agent: lookup(USER_AGENT_VAR)
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or(defaults.user_agent),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWorkers`] when `max_workers` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn default_user_agent() -> String {
    format!("envspec/{}", env!("CARGO_PKG_VERSION"))
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                var: var.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },
    #[error("max_workers must be at least 1")]
    ZeroWorkers,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_are_sequential() {
        let cfg = ValidatorConfig::default();
        assert_eq!(cfg.max_workers, 1);
        assert_eq!(cfg.http_timeout_secs, 30);
        assert!(cfg.user_agent.starts_with("envspec/"));
    }

    #[test]
    fn unset_variables_fall_back() {
        let cfg = ValidatorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, ValidatorConfig::default());
    }

    #[test]
    fn variables_override_defaults() {
        let cfg = ValidatorConfig::from_lookup(lookup(&[
            (MAX_WORKERS_VAR, "4"),
            (HTTP_TIMEOUT_VAR, " 90 "),
            (USER_AGENT_VAR, "mirror-audit/2"),
        ]))
        .unwrap();
        assert_eq!(cfg.max_workers, 4);
        assert_eq!(cfg.http_timeout(), Duration::from_secs(90));
        assert_eq!(cfg.user_agent, "mirror-audit/2");
    }

    #[test]
    fn unparseable_value_is_an_error() {
        let err = ValidatorConfig::from_lookup(lookup(&[(MAX_WORKERS_VAR, "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == MAX_WORKERS_VAR));
        assert!(ValidatorConfig::from_lookup(lookup(&[(HTTP_TIMEOUT_VAR, "-1")])).is_err());
    }

    #[test]
    fn zero_workers_rejected() {
        let err = ValidatorConfig::from_lookup(lookup(&[(MAX_WORKERS_VAR, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroWorkers));
    }

    #[test]
    fn blank_user_agent_uses_default() {
        let cfg = ValidatorConfig::from_lookup(lookup(&[(USER_AGENT_VAR, "  ")])).unwrap();
        assert!(cfg.user_agent.starts_with("envspec/"));
    }
}

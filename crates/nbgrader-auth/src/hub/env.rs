//! Hub credentials sourced from the process environment.
//!
//! The hub injects the API token, API URL, and user name into every
//! single-user server it spawns. They are read on every call rather than
//! cached, so a token rotated by the hub is picked up immediately.

use std::collections::HashMap;
use std::fmt;

use nbgrader_core::config::hub::HubConfig;

use super::error::HubError;

/// Source of environment variable values.
pub trait EnvSource: Send + Sync + fmt::Debug {
    /// Look up a variable. Empty values are reported as-is.
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed set of variables, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    vars: HashMap<String, String>,
}

impl StaticEnv {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvSource for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Hub credentials resolved for a single request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthEnvironment {
    /// API token sent in the `Authorization` header.
    pub token: String,
    /// API base URL without a trailing slash.
    pub api_url: String,
    /// Name of the authenticated user.
    pub user: String,
}

impl AuthEnvironment {
    /// Resolve credentials, failing if the token or user is absent or empty.
    pub fn resolve(config: &HubConfig, env: &dyn EnvSource) -> Result<Self, HubError> {
        let token = required(env, &config.token_var)?;
        let user = required(env, &config.user_var)?;
        let api_url = env
            .var(&config.api_url_var)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| config.default_api_url.clone());

        Ok(Self {
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
            user,
        })
    }

    /// Full URL for a path relative to the API base.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

impl fmt::Debug for AuthEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthEnvironment")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("user", &self.user)
            .finish()
    }
}

fn required(env: &dyn EnvSource, key: &str) -> Result<String, HubError> {
    env.var(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| HubError::Environment {
            variable: key.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub_env() -> StaticEnv {
        StaticEnv::new()
            .with("JUPYTERHUB_API_TOKEN", "secret")
            .with("JUPYTERHUB_USER", "instructor")
    }

    #[test]
    fn test_resolve_uses_default_url() {
        let resolved = AuthEnvironment::resolve(&HubConfig::default(), &hub_env()).unwrap();
        assert_eq!(resolved.token, "secret");
        assert_eq!(resolved.user, "instructor");
        assert_eq!(resolved.api_url, "http://127.0.0.1:8081/hub/api");
    }

    #[test]
    fn test_resolve_trims_trailing_slash() {
        let env = hub_env().with("JUPYTERHUB_API_URL", "http://hub:8081/hub/api/");
        let resolved = AuthEnvironment::resolve(&HubConfig::default(), &env).unwrap();
        assert_eq!(
            resolved.url_for("/groups"),
            "http://hub:8081/hub/api/groups"
        );
    }

    #[test]
    fn test_empty_token_is_environment_error() {
        let env = hub_env().with("JUPYTERHUB_API_TOKEN", "");
        let err = AuthEnvironment::resolve(&HubConfig::default(), &env).unwrap_err();
        assert_eq!(
            err,
            HubError::Environment {
                variable: "JUPYTERHUB_API_TOKEN".to_string()
            }
        );
    }

    #[test]
    fn test_missing_user_is_environment_error() {
        let env = StaticEnv::new().with("JUPYTERHUB_API_TOKEN", "secret");
        let err = AuthEnvironment::resolve(&HubConfig::default(), &env).unwrap_err();
        assert!(err.is_environment());
    }

    #[test]
    fn test_debug_redacts_token() {
        let resolved = AuthEnvironment::resolve(&HubConfig::default(), &hub_env()).unwrap();
        let printed = format!("{resolved:?}");
        assert!(!printed.contains("secret"));
    }
}

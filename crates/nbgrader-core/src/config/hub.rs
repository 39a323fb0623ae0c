//! Hub API connection configuration.
//!
//! Credentials are never stored here. Only the *names* of the environment
//! variables that carry them are configured; the values are read fresh on
//! every request.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Hub REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Environment variable holding the API token.
    #[serde(default = "default_token_var")]
    pub token_var: String,
    /// Environment variable holding the API base URL.
    #[serde(default = "default_api_url_var")]
    pub api_url_var: String,
    /// Environment variable holding the authenticated user's name.
    #[serde(default = "default_user_var")]
    pub user_var: String,
    /// API base URL used when `api_url_var` is unset.
    #[serde(default = "default_api_url")]
    pub default_api_url: String,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Connection establishment timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl HubConfig {
    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            token_var: default_token_var(),
            api_url_var: default_api_url_var(),
            user_var: default_user_var(),
            default_api_url: default_api_url(),
            request_timeout_seconds: default_request_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

fn default_token_var() -> String {
    "JUPYTERHUB_API_TOKEN".to_string()
}

fn default_api_url_var() -> String {
    "JUPYTERHUB_API_URL".to_string()
}

fn default_user_var() -> String {
    "JUPYTERHUB_USER".to_string()
}

fn default_api_url() -> String {
    "http://127.0.0.1:8081/hub/api".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

//! Thin client for the hub's user and group REST endpoints.

use std::sync::Arc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Method;
use serde_json::{Value, json};
use tracing::{debug, warn};

use nbgrader_core::config::hub::HubConfig;

use super::env::{AuthEnvironment, EnvSource};
use super::error::HubError;
use super::transport::{HubRequest, HubResponse, HubTransport};

/// Path placeholder replaced by the authenticated user's name.
pub const AUTHENTICATED_USER: &str = "{authenticated_user}";

/// Characters escaped in a path segment: everything but RFC 3986 unreserved.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Longest slice of a non-JSON error body kept in an [`HubError::Api`].
const MAX_ERROR_BODY: usize = 200;

/// Whether a group creation made a new group or found an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupCreation {
    /// The group was created by this call.
    Created,
    /// The group already existed.
    AlreadyExists,
}

/// Authenticated client for the hub group-management API.
///
/// Credentials are resolved from the environment on every call; nothing is
/// cached between calls.
#[derive(Debug, Clone)]
pub struct HubGroupClient {
    /// Variable names and defaults.
    config: HubConfig,
    /// Environment the credentials come from.
    env: Arc<dyn EnvSource>,
    /// Transport that performs the HTTP exchange.
    transport: Arc<dyn HubTransport>,
}

impl HubGroupClient {
    /// Creates a client with an explicit environment and transport.
    pub fn new(
        config: HubConfig,
        env: Arc<dyn EnvSource>,
        transport: Arc<dyn HubTransport>,
    ) -> Self {
        Self {
            config,
            env,
            transport,
        }
    }

    /// Resolves the current hub credentials.
    pub fn environment(&self) -> Result<AuthEnvironment, HubError> {
        AuthEnvironment::resolve(&self.config, self.env.as_ref())
    }

    /// Performs one authenticated call and returns the parsed JSON body.
    ///
    /// `path` is relative to the API base URL, with every interpolated name
    /// already percent-encoded. It may contain
    /// [`AUTHENTICATED_USER`]. An empty success body yields `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, HubError> {
        let env = self.environment()?;
        let path = path.replace(AUTHENTICATED_USER, &segment(&env.user)?);

        let request = HubRequest {
            method: method.clone(),
            url: env.url_for(&path),
            path: path.clone(),
            token: env.token,
            body,
        };

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            let err = HubError::Api {
                method: method.to_string(),
                path,
                status: response.status,
                message: error_message(&response),
            };
            debug!(error = %err, "Hub API rejected request");
            return Err(err);
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response.body).map_err(|e| HubError::MalformedResponse {
            path,
            detail: format!("invalid JSON: {e}"),
        })
    }

    /// Fetches a user model. `user` may be [`AUTHENTICATED_USER`].
    pub async fn get_user(&self, user: &str) -> Result<Value, HubError> {
        let user = if user == AUTHENTICATED_USER {
            AUTHENTICATED_USER.to_string()
        } else {
            segment(user)?
        };
        self.request(Method::GET, &format!("/users/{user}"), None)
            .await
    }

    /// Lists the names of all groups on the hub.
    ///
    /// Accepts both the plain list and the paginated `{ "items": [...] }`
    /// shape.
    pub async fn list_groups(&self) -> Result<Vec<String>, HubError> {
        let path = "/groups";
        let response = self.request(Method::GET, path, None).await?;

        let items = match &response {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("items") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(HubError::MalformedResponse {
                        path: path.to_string(),
                        detail: "expected a list of groups".to_string(),
                    });
                }
            },
            _ => {
                return Err(HubError::MalformedResponse {
                    path: path.to_string(),
                    detail: "expected a list of groups".to_string(),
                });
            }
        };

        Ok(items
            .iter()
            .filter_map(|group| group.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Creates a group, treating "already exists" as success.
    pub async fn create_group(&self, group: &str) -> Result<GroupCreation, HubError> {
        let path = format!("/groups/{}", segment(group)?);
        match self
            .request(Method::POST, &path, None)
            .await
        {
            Ok(_) => Ok(GroupCreation::Created),
            Err(err) if err.is_already_exists() => {
                debug!(group, "Group already exists on hub");
                Ok(GroupCreation::AlreadyExists)
            }
            Err(err) => Err(err),
        }
    }

    /// Adds users to a group. Re-adding a member is not an error on the hub.
    pub async fn add_group_members(&self, group: &str, users: &[&str]) -> Result<(), HubError> {
        self.request(
            Method::POST,
            &format!("/groups/{}/users", segment(group)?),
            Some(json!({ "users": users })),
        )
        .await
        .map(|_| ())
    }

    /// Removes users from a group. Removing a non-member is not an error.
    pub async fn remove_group_members(
        &self,
        group: &str,
        users: &[&str],
    ) -> Result<(), HubError> {
        self.request(
            Method::DELETE,
            &format!("/groups/{}/users", segment(group)?),
            Some(json!({ "users": users })),
        )
        .await
        .map(|_| ())
    }
}

/// Percent-encodes a user or group name for use as one path segment.
///
/// Empty and dot-segment names are rejected: URL normalisation would drop
/// them and address a different resource.
fn segment(name: &str) -> Result<String, HubError> {
    if matches!(name, "" | "." | "..") {
        return Err(HubError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(utf8_percent_encode(name, PATH_SEGMENT).to_string())
}

/// Extracts the hub's `message` field, falling back to the raw body.
fn error_message(response: &HubResponse) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&response.body) {
        if let Some(message) = map.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }

    let body = response.body.trim();
    if body.is_empty() {
        warn!(status = response.status, "Hub returned an error without a body");
        return format!("HTTP {}", response.status);
    }
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::env::StaticEnv;
    use crate::testing::MockTransport;

    fn client(transport: Arc<MockTransport>) -> HubGroupClient {
        let env = StaticEnv::new()
            .with("JUPYTERHUB_API_TOKEN", "secret")
            .with("JUPYTERHUB_USER", "instructor")
            .with("JUPYTERHUB_API_URL", "http://hub:8081/hub/api");
        HubGroupClient::new(HubConfig::default(), Arc::new(env), transport)
    }

    #[tokio::test]
    async fn test_request_injects_token_and_user() {
        let transport = Arc::new(MockTransport::new().with_user("instructor", &[]));
        let client = client(transport.clone());

        client.get_user(AUTHENTICATED_USER).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/users/instructor");
        assert_eq!(requests[0].url, "http://hub:8081/hub/api/users/instructor");
        assert_eq!(requests[0].authorization(), "token secret");
    }

    #[tokio::test]
    async fn test_non_success_is_api_error() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_once(
            Method::GET,
            "/groups",
            HubResponse::json(403, &json!({ "status": 403, "message": "Forbidden" })),
        );
        let client = client(transport);

        let err = client.list_groups().await.unwrap_err();
        assert_eq!(
            err,
            HubError::Api {
                method: "GET".to_string(),
                path: "/groups".to_string(),
                status: 403,
                message: "Forbidden".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_once(
            Method::GET,
            "/groups",
            HubResponse {
                status: 200,
                body: "<html>".to_string(),
            },
        );
        let err = client(transport).list_groups().await.unwrap_err();
        assert!(matches!(err, HubError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_list_groups_accepts_paginated_shape() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_once(
            Method::GET,
            "/groups",
            HubResponse::json(
                200,
                &json!({ "items": [{ "name": "nbgrader-a" }, { "name": "staff" }] }),
            ),
        );
        let groups = client(transport).list_groups().await.unwrap();
        assert_eq!(groups, vec!["nbgrader-a", "staff"]);
    }

    #[tokio::test]
    async fn test_create_group_conflict_is_already_exists() {
        let transport = Arc::new(MockTransport::new().with_group("nbgrader-c101", &[]));
        let client = client(transport);
        assert_eq!(
            client.create_group("nbgrader-c101").await.unwrap(),
            GroupCreation::AlreadyExists
        );
        assert_eq!(
            client.create_group("nbgrader-c102").await.unwrap(),
            GroupCreation::Created
        );
    }

    #[tokio::test]
    async fn test_unreachable_hub_is_transport_error() {
        let transport = Arc::new(MockTransport::new().unreachable());
        let err = client(transport).list_groups().await.unwrap_err();
        assert!(matches!(err, HubError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_user_names_stay_in_one_segment() {
        let transport = Arc::new(MockTransport::new().with_user("bob", &["nbgrader-c101"]));
        let client = client(transport.clone());

        let _ = client.get_user("bob#mallory").await;
        let _ = client.get_user("mallory/../bob").await;
        let _ = client.get_user("bob?admin=1").await;

        let paths: Vec<String> = transport
            .requests()
            .iter()
            .map(|r| reqwest::Url::parse(&r.url).unwrap().path().to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/hub/api/users/bob%23mallory",
                "/hub/api/users/mallory%2F..%2Fbob",
                "/hub/api/users/bob%3Fadmin%3D1",
            ]
        );
    }

    #[tokio::test]
    async fn test_dot_segment_names_are_rejected_without_calls() {
        let transport = Arc::new(MockTransport::new());
        let client = client(transport.clone());

        let err = client.get_user("..").await.unwrap_err();
        assert_eq!(
            err,
            HubError::InvalidName {
                name: "..".to_string()
            }
        );
        assert!(client.create_group(".").await.is_err());
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_segment_keeps_group_names_readable() {
        assert_eq!(segment("nbgrader-c101").unwrap(), "nbgrader-c101");
        assert_eq!(segment("nbgrader-a b/c").unwrap(), "nbgrader-a%20b%2Fc");
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        let response = HubResponse {
            status: 502,
            body: String::new(),
        };
        assert_eq!(error_message(&response), "HTTP 502");
    }
}

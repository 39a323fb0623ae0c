//! In-memory hub for tests.
//!
//! [`MockTransport`] behaves like the hub's user and group endpoints, records
//! every request it receives, and can be scripted with one-shot responses to
//! simulate stale listings, conflicts, and permission failures.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::Method;
use serde_json::{Value, json};

use crate::hub::error::HubError;
use crate::hub::transport::{HubRequest, HubResponse, HubTransport};

#[derive(Debug, Default)]
struct FakeHubState {
    /// Group name to member names.
    groups: BTreeMap<String, BTreeSet<String>>,
    /// Known user names.
    users: BTreeSet<String>,
    /// Raw user models returned instead of the computed one.
    user_overrides: HashMap<String, Value>,
    /// One-shot responses keyed by method and path.
    scripted: HashMap<(Method, String), VecDeque<HubResponse>>,
    /// Requests received, in order.
    requests: Vec<HubRequest>,
    /// Whether every request fails at the connection level.
    unreachable: bool,
}

/// Recording fake of the hub REST API.
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Mutex<FakeHubState>,
}

impl MockTransport {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user who belongs to the given groups, creating them as needed.
    pub fn with_user(self, user: &str, groups: &[&str]) -> Self {
        {
            let mut state = self.lock();
            state.users.insert(user.to_string());
            for group in groups {
                state
                    .groups
                    .entry(group.to_string())
                    .or_default()
                    .insert(user.to_string());
            }
        }
        self
    }

    /// Adds a group with the given members.
    pub fn with_group(self, group: &str, members: &[&str]) -> Self {
        {
            let mut state = self.lock();
            let entry = state.groups.entry(group.to_string()).or_default();
            entry.extend(members.iter().map(|m| m.to_string()));
            let members: Vec<String> = members.iter().map(|m| m.to_string()).collect();
            state.users.extend(members);
        }
        self
    }

    /// Returns `model` verbatim for `GET /users/{user}`.
    pub fn with_user_model(self, user: &str, model: Value) -> Self {
        self.lock().user_overrides.insert(user.to_string(), model);
        self
    }

    /// Makes every request fail as if the hub were down.
    pub fn unreachable(self) -> Self {
        self.lock().unreachable = true;
        self
    }

    /// Queues a response for the next matching request.
    pub fn respond_once(&self, method: Method, path: &str, response: HubResponse) {
        self.lock()
            .scripted
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<HubRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Requests matching a method and path.
    pub fn requests_to(&self, method: &Method, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }

    /// Members of a group, or `None` if it does not exist.
    pub fn group_members(&self, group: &str) -> Option<BTreeSet<String>> {
        self.lock().groups.get(group).cloned()
    }

    /// Names of all groups.
    pub fn group_names(&self) -> Vec<String> {
        self.lock().groups.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, FakeHubState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl HubTransport for MockTransport {
    async fn send(&self, request: HubRequest) -> Result<HubResponse, HubError> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        if state.unreachable {
            return Err(HubError::Transport {
                path: request.path,
                message: "connection refused".to_string(),
            });
        }

        let key = (request.method.clone(), request.path.clone());
        if let Some(response) = state.scripted.get_mut(&key).and_then(VecDeque::pop_front) {
            return Ok(response);
        }

        Ok(route(&mut state, &request))
    }
}

fn route(state: &mut FakeHubState, request: &HubRequest) -> HubResponse {
    let decoded: Vec<String> = request
        .path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .collect();
    let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();

    match (request.method.as_str(), segments.as_slice()) {
        ("GET", ["users", user]) => {
            if let Some(model) = state.user_overrides.get(*user) {
                return HubResponse::json(200, model);
            }
            if !state.users.contains(*user) {
                return not_found(&format!("No such user: {user}"));
            }
            let groups: Vec<&String> = state
                .groups
                .iter()
                .filter(|(_, members)| members.contains(*user))
                .map(|(name, _)| name)
                .collect();
            HubResponse::json(
                200,
                &json!({ "name": user, "groups": groups, "server": null, "pending": null }),
            )
        }
        ("GET", ["groups"]) => {
            let groups: Vec<Value> = state
                .groups
                .iter()
                .map(|(name, members)| json!({ "name": name, "users": members }))
                .collect();
            HubResponse::json(200, &Value::Array(groups))
        }
        ("POST", ["groups", group]) => {
            if state.groups.contains_key(*group) {
                return HubResponse::json(
                    409,
                    &json!({ "status": 409, "message": format!("Group {group} already exists") }),
                );
            }
            state.groups.insert(group.to_string(), BTreeSet::new());
            HubResponse::json(201, &json!({ "name": group, "users": [] }))
        }
        ("POST", ["groups", group, "users"]) => {
            let users = body_users(request);
            let Some(members) = state.groups.get_mut(*group) else {
                return not_found(&format!("No such group: {group}"));
            };
            members.extend(users.iter().cloned());
            let snapshot = json!({ "name": group, "users": members });
            state.users.extend(users);
            HubResponse::json(200, &snapshot)
        }
        ("DELETE", ["groups", group, "users"]) => {
            let users = body_users(request);
            let Some(members) = state.groups.get_mut(*group) else {
                return not_found(&format!("No such group: {group}"));
            };
            for user in &users {
                members.remove(user);
            }
            HubResponse::json(200, &json!({ "name": group, "users": members }))
        }
        _ => not_found("Not found"),
    }
}

fn body_users(request: &HubRequest) -> Vec<String> {
    request
        .body
        .as_ref()
        .and_then(|body| body.get("users"))
        .and_then(Value::as_array)
        .map(|users| {
            users
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn not_found(message: &str) -> HubResponse {
    HubResponse::json(404, &json!({ "status": 404, "message": message }))
}

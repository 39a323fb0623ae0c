//! Membership store backed by hub groups.
//!
//! Course `c` is represented by the hub group `nbgrader-c`. Every call is a
//! live round-trip; nothing is cached, so the hub is always authoritative.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

use nbgrader_core::types::{CourseId, MembershipResult, StudentId, SyncStatus, SyncStep};

use super::store::CourseMembershipStore;
use crate::hub::client::{AUTHENTICATED_USER, GroupCreation, HubGroupClient};
use crate::hub::error::HubError;

/// Course rosters stored as hub groups.
#[derive(Debug, Clone)]
pub struct HubMembershipStore {
    /// Client for the hub group API.
    client: HubGroupClient,
}

impl HubMembershipStore {
    /// Creates a store using the given client.
    pub fn new(client: HubGroupClient) -> Self {
        Self { client }
    }

    /// Concrete account name for writes; `"*"` becomes the current user.
    fn account_name(&self, student: &StudentId) -> Result<String, HubError> {
        if student.is_wildcard() {
            Ok(self.client.environment()?.user)
        } else {
            Ok(student.as_str().to_string())
        }
    }

    /// Account and course group for a write. A blank course or an
    /// unresolvable wildcard fails at [`SyncStep::Validate`].
    fn write_target(
        &self,
        student: &StudentId,
        course: &CourseId,
    ) -> Result<(String, String), (SyncStep, String)> {
        if course.is_blank() {
            return Err((SyncStep::Validate, "course id not specified".to_string()));
        }
        let account = self
            .account_name(student)
            .map_err(|err| (SyncStep::Validate, err.to_string()))?;
        Ok((account, course.group_name()))
    }

    async fn try_grant(&self, account: &str, group: &str) -> Result<(), (SyncStep, HubError)> {
        let groups = self
            .client
            .list_groups()
            .await
            .map_err(|e| (SyncStep::ListGroups, e))?;

        if groups.iter().any(|g| g == group) {
            debug!(group, "Course group already present");
        } else {
            match self
                .client
                .create_group(group)
                .await
                .map_err(|e| (SyncStep::CreateGroup, e))?
            {
                GroupCreation::Created => info!(group, "Created course group"),
                GroupCreation::AlreadyExists => {
                    debug!(group, "Course group created concurrently")
                }
            }
        }

        self.client
            .add_group_members(group, &[account])
            .await
            .map_err(|e| (SyncStep::AddMember, e))
    }

    async fn try_revoke(&self, account: &str, group: &str) -> Result<(), (SyncStep, HubError)> {
        match self.client.remove_group_members(group, &[account]).await {
            Ok(()) => Ok(()),
            // No group means no member to remove.
            Err(err) if err.status() == Some(404) => {
                debug!(group, error = %err, "Course group missing, nothing to revoke");
                Ok(())
            }
            Err(err) => Err((SyncStep::RemoveMember, err)),
        }
    }
}

#[async_trait]
impl CourseMembershipStore for HubMembershipStore {
    fn name(&self) -> &'static str {
        "hub"
    }

    async fn student_courses(&self, student: &StudentId) -> Result<MembershipResult, HubError> {
        let user = if student.is_wildcard() {
            AUTHENTICATED_USER
        } else {
            student.as_str()
        };

        let model = self.client.get_user(user).await?;

        match course_groups(&model) {
            Some(courses) => {
                debug!(student = %student, count = courses.len(), "Resolved course membership");
                Ok(MembershipResult::Restricted(courses))
            }
            None => {
                let err = HubError::MalformedResponse {
                    path: format!("/users/{user}"),
                    detail: "user model has no 'groups' list".to_string(),
                };
                error!(
                    student = %student,
                    error = %err,
                    "Could not read group membership from hub, denying all courses"
                );
                Ok(MembershipResult::none())
            }
        }
    }

    async fn grant_access(&self, student: &StudentId, course: &CourseId) -> SyncStatus {
        let result = match self.write_target(student, course) {
            Ok((account, group)) => self.try_grant(&account, &group).await.map_err(describe),
            Err(err) => Err(err),
        };
        sync_status("grant", student, course, result)
    }

    async fn revoke_access(&self, student: &StudentId, course: &CourseId) -> SyncStatus {
        let result = match self.write_target(student, course) {
            Ok((account, group)) => self.try_revoke(&account, &group).await.map_err(describe),
            Err(err) => Err(err),
        };
        sync_status("revoke", student, course, result)
    }
}

fn describe((step, err): (SyncStep, HubError)) -> (SyncStep, String) {
    (step, err.to_string())
}

/// Logs the outcome of a roster write and converts it to a [`SyncStatus`].
fn sync_status(
    action: &'static str,
    student: &StudentId,
    course: &CourseId,
    result: Result<(), (SyncStep, String)>,
) -> SyncStatus {
    match result {
        Ok(()) => {
            info!(
                student = %student,
                course = %course,
                group = %course.group_name(),
                action,
                "Course access updated"
            );
            SyncStatus::Synced
        }
        Err((step, reason)) => {
            error!(
                student = %student,
                course = %course,
                step = %step,
                action,
                error = %reason,
                "Failed to {action} course access on hub; the hub admin may need to give nbgrader permission to manage groups"
            );
            SyncStatus::Failed { step, reason }
        }
    }
}

/// Courses named by the user's course groups, or `None` if the model has no
/// `groups` list. Non-string entries and unrelated groups are ignored.
fn course_groups(model: &Value) -> Option<std::collections::BTreeSet<CourseId>> {
    let groups = model.get("groups")?.as_array()?;
    Some(
        groups
            .iter()
            .filter_map(Value::as_str)
            .filter_map(CourseId::from_group_name)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::Method;
    use serde_json::json;

    use nbgrader_core::config::hub::HubConfig;

    use super::*;
    use crate::hub::env::StaticEnv;
    use crate::hub::transport::HubResponse;
    use crate::testing::MockTransport;

    fn store(transport: Arc<MockTransport>) -> HubMembershipStore {
        let env = StaticEnv::new()
            .with("JUPYTERHUB_API_TOKEN", "secret")
            .with("JUPYTERHUB_USER", "instructor");
        HubMembershipStore::new(HubGroupClient::new(
            HubConfig::default(),
            Arc::new(env),
            transport,
        ))
    }

    #[test]
    fn test_course_groups_filters_prefixes() {
        let model = json!({ "groups": ["nbgrader-a", "formgrade-b", "other-c", 7] });
        let courses = course_groups(&model).unwrap();
        let names: Vec<&str> = courses.iter().map(CourseId::as_str).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_course_groups_requires_list() {
        assert!(course_groups(&json!({ "name": "alice" })).is_none());
        assert!(course_groups(&json!({ "groups": "nbgrader-a" })).is_none());
    }

    #[tokio::test]
    async fn test_blank_course_is_rejected_without_calls() {
        let transport = Arc::new(MockTransport::new());
        let store = store(transport.clone());

        let status = store
            .grant_access(&StudentId::new("alice"), &CourseId::new(""))
            .await;

        assert!(matches!(
            status,
            SyncStatus::Failed {
                step: SyncStep::Validate,
                ..
            }
        ));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_grant_wildcard_uses_authenticated_user() {
        let transport = Arc::new(MockTransport::new());
        let store = store(transport.clone());

        let status = store
            .grant_access(&StudentId::new("*"), &CourseId::new("c101"))
            .await;

        assert_eq!(status, SyncStatus::Synced);
        let members = transport.group_members("nbgrader-c101").unwrap();
        assert!(members.contains("instructor"));
        assert!(!members.contains("*"));
    }

    #[tokio::test]
    async fn test_grant_reports_failing_step() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_once(
            Method::POST,
            "/groups/nbgrader-c101",
            HubResponse::json(403, &json!({ "message": "Action is not authorized" })),
        );
        let store = store(transport.clone());

        let status = store
            .grant_access(&StudentId::new("alice"), &CourseId::new("c101"))
            .await;

        match status {
            SyncStatus::Failed { step, reason } => {
                assert_eq!(step, SyncStep::CreateGroup);
                assert!(reason.contains("403"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(
            transport.requests_to(&Method::POST, "/groups/nbgrader-c101/users"),
            0
        );
    }

    #[tokio::test]
    async fn test_blank_course_revoke_is_rejected_without_calls() {
        let transport = Arc::new(MockTransport::new());
        let store = store(transport.clone());

        let status = store
            .revoke_access(&StudentId::new("alice"), &CourseId::new("  "))
            .await;

        assert_eq!(
            status,
            SyncStatus::Failed {
                step: SyncStep::Validate,
                reason: "course id not specified".to_string(),
            }
        );
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_revoke_reports_failing_step() {
        let transport = Arc::new(MockTransport::new().with_group("nbgrader-c101", &["alice"]));
        transport.respond_once(
            Method::DELETE,
            "/groups/nbgrader-c101/users",
            HubResponse::json(403, &json!({ "message": "Action is not authorized" })),
        );
        let store = store(transport.clone());

        let status = store
            .revoke_access(&StudentId::new("alice"), &CourseId::new("c101"))
            .await;

        assert!(matches!(
            status,
            SyncStatus::Failed {
                step: SyncStep::RemoveMember,
                ..
            }
        ));
        assert!(transport.group_members("nbgrader-c101").unwrap().contains("alice"));
    }

    #[tokio::test]
    async fn test_revoke_from_missing_group_is_synced() {
        let transport = Arc::new(MockTransport::new());
        let store = store(transport);

        let status = store
            .revoke_access(&StudentId::new("alice"), &CourseId::new("c101"))
            .await;

        assert_eq!(status, SyncStatus::Synced);
    }
}

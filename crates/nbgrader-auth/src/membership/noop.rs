//! Membership store for deployments that do not restrict course access.

use async_trait::async_trait;
use tracing::debug;

use nbgrader_core::types::{CourseId, MembershipResult, StudentId, SyncStatus};

use super::store::CourseMembershipStore;
use crate::hub::error::HubError;

/// Every student may access every course; grants and revokes do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMembershipStore;

#[async_trait]
impl CourseMembershipStore for NoopMembershipStore {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn student_courses(&self, _student: &StudentId) -> Result<MembershipResult, HubError> {
        Ok(MembershipResult::Unrestricted)
    }

    async fn grant_access(&self, student: &StudentId, course: &CourseId) -> SyncStatus {
        debug!(student = %student, course = %course, "Course membership not tracked, skipping grant");
        SyncStatus::NotTracked
    }

    async fn revoke_access(&self, student: &StudentId, course: &CourseId) -> SyncStatus {
        debug!(student = %student, course = %course, "Course membership not tracked, skipping revoke");
        SyncStatus::NotTracked
    }
}

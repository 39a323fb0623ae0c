//! Course membership store trait.

use async_trait::async_trait;

use nbgrader_core::types::{CourseId, MembershipResult, StudentId, SyncStatus};

use crate::hub::error::HubError;

/// Source of truth for which courses a student may access.
///
/// Two implementations are provided:
/// - [`NoopMembershipStore`](super::NoopMembershipStore), which does not track
///   membership at all
/// - [`HubMembershipStore`](super::HubMembershipStore), which maps courses to
///   hub groups
///
/// Reads surface errors so callers never silently default to "allow".
/// Writes are best-effort and report failure through [`SyncStatus`].
#[async_trait]
pub trait CourseMembershipStore: Send + Sync + std::fmt::Debug {
    /// Short backend name for logs and CLI output.
    fn name(&self) -> &'static str;

    /// Returns the courses the student may access.
    ///
    /// `"*"` means the currently authenticated user.
    async fn student_courses(&self, student: &StudentId) -> Result<MembershipResult, HubError>;

    /// Adds the student to the course roster.
    async fn grant_access(&self, student: &StudentId, course: &CourseId) -> SyncStatus;

    /// Removes the student from the course roster.
    async fn revoke_access(&self, student: &StudentId, course: &CourseId) -> SyncStatus;
}

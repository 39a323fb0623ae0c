//! Course membership results and group-sync outcomes.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::CourseId;

/// The set of courses a student may access.
///
/// `Restricted` with an empty set means "no course access" and is never
/// interchangeable with `Unrestricted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "courses", rename_all = "snake_case")]
pub enum MembershipResult {
    /// Membership is not tracked; every course is accessible.
    Unrestricted,
    /// Only the listed courses are accessible.
    Restricted(BTreeSet<CourseId>),
}

impl MembershipResult {
    /// A restricted result granting nothing.
    pub fn none() -> Self {
        Self::Restricted(BTreeSet::new())
    }

    /// Whether the given course is covered by this result.
    pub fn allows(&self, course: &CourseId) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted(courses) => courses.contains(course),
        }
    }

    /// Return the allow-list, or `None` for unrestricted.
    pub fn courses(&self) -> Option<&BTreeSet<CourseId>> {
        match self {
            Self::Unrestricted => None,
            Self::Restricted(courses) => Some(courses),
        }
    }
}

impl FromIterator<CourseId> for MembershipResult {
    fn from_iter<I: IntoIterator<Item = CourseId>>(iter: I) -> Self {
        Self::Restricted(iter.into_iter().collect())
    }
}

/// Which step of a group sync was running when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    /// Input validation before any hub call.
    Validate,
    /// Listing existing hub groups.
    ListGroups,
    /// Creating the course group.
    CreateGroup,
    /// Adding the student to the course group.
    AddMember,
    /// Removing the student from the course group.
    RemoveMember,
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validate => write!(f, "validate"),
            Self::ListGroups => write!(f, "list_groups"),
            Self::CreateGroup => write!(f, "create_group"),
            Self::AddMember => write!(f, "add_member"),
            Self::RemoveMember => write!(f, "remove_member"),
        }
    }
}

/// Outcome of a best-effort grant or revoke.
///
/// Grants and revokes never return an error to the caller; a failure is
/// reported here (and logged) so automated workflows can detect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncStatus {
    /// The hub now reflects the requested membership.
    Synced,
    /// The backend does not track per-course membership.
    NotTracked,
    /// The hub could not be updated.
    Failed {
        /// Step that failed.
        step: SyncStep,
        /// Description of the failure.
        reason: String,
    },
}

impl SyncStatus {
    /// Whether the sync failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_allows_anything() {
        let result = MembershipResult::Unrestricted;
        assert!(result.allows(&CourseId::new("never-granted")));
        assert!(result.courses().is_none());
    }

    #[test]
    fn test_empty_restricted_allows_nothing() {
        let result = MembershipResult::none();
        assert!(!result.allows(&CourseId::new("c101")));
        assert_ne!(result, MembershipResult::Unrestricted);
    }

    #[test]
    fn test_restricted_from_iter() {
        let result: MembershipResult = ["a", "b"].into_iter().map(CourseId::from).collect();
        assert!(result.allows(&CourseId::new("a")));
        assert!(!result.allows(&CourseId::new("c")));
        assert_eq!(result.courses().map(|c| c.len()), Some(2));
    }

    #[test]
    fn test_sync_status_serializes_with_tag() {
        let status = SyncStatus::Failed {
            step: SyncStep::CreateGroup,
            reason: "403".to_string(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["step"], "create_group");
        assert!(status.is_failed());
        assert!(!SyncStatus::Synced.is_failed());
    }
}

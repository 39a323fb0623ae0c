//! Course access policy.
//!
//! [`AccessAuthorizer`] is the only component that decides whether a student
//! may access a course. Web handlers and the CLI go through it; nothing else
//! talks to the hub API.

use std::sync::Arc;

use tracing::{info, warn};

use nbgrader_core::config::AppConfig;
use nbgrader_core::config::access::AccessBackend;
use nbgrader_core::error::AppError;
use nbgrader_core::result::AppResult;
use nbgrader_core::types::{CourseId, MembershipResult, StudentId, SyncStatus};

use crate::hub::client::HubGroupClient;
use crate::hub::env::{AuthEnvironment, EnvSource, ProcessEnv};
use crate::hub::error::HubError;
use crate::hub::transport::{HubTransport, ReqwestTransport};
use crate::membership::{CourseMembershipStore, HubMembershipStore, NoopMembershipStore};

/// Access decisions over a [`CourseMembershipStore`].
#[derive(Debug, Clone)]
pub struct AccessAuthorizer {
    /// Backend holding course membership.
    store: Arc<dyn CourseMembershipStore>,
}

impl AccessAuthorizer {
    /// Creates an authorizer over an explicit store.
    pub fn new(store: Arc<dyn CourseMembershipStore>) -> Self {
        Self { store }
    }

    /// An authorizer that allows everything and tracks nothing.
    pub fn noop() -> Self {
        Self::new(Arc::new(NoopMembershipStore))
    }

    /// Builds the authorizer selected by configuration, using the process
    /// environment and an HTTP transport.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let transport = ReqwestTransport::new(&config.hub)?;
        Ok(Self::select(config, Arc::new(ProcessEnv), Arc::new(transport)))
    }

    /// Builds the authorizer selected by configuration over the given
    /// environment and transport.
    ///
    /// With [`AccessBackend::Auto`] the hub store is chosen only when the hub
    /// credentials resolve; otherwise the deployment is treated as non-hub.
    pub fn select(
        config: &AppConfig,
        env: Arc<dyn EnvSource>,
        transport: Arc<dyn HubTransport>,
    ) -> Self {
        let use_hub = match config.auth.backend {
            AccessBackend::Noop => false,
            AccessBackend::Hub => true,
            AccessBackend::Auto => match AuthEnvironment::resolve(&config.hub, env.as_ref()) {
                Ok(_) => true,
                Err(err) => {
                    warn!(error = %err, "Not running under the hub, course access is unrestricted");
                    false
                }
            },
        };

        let authorizer = if use_hub {
            let client = HubGroupClient::new(config.hub.clone(), env, transport);
            Self::new(Arc::new(HubMembershipStore::new(client)))
        } else {
            Self::noop()
        };

        info!(
            configured = %config.auth.backend,
            backend = authorizer.backend_name(),
            "Course access backend selected"
        );
        authorizer
    }

    /// Name of the active backend.
    pub fn backend_name(&self) -> &'static str {
        self.store.name()
    }

    /// Courses the student may access.
    pub async fn student_courses(
        &self,
        student: &StudentId,
    ) -> Result<MembershipResult, HubError> {
        self.store.student_courses(student).await
    }

    /// Whether the student may access the course.
    pub async fn has_access(&self, student: &StudentId, course: &CourseId) -> Result<bool, HubError> {
        let courses = self.store.student_courses(student).await?;
        Ok(courses.allows(course))
    }

    /// Request-handler form of [`has_access`](Self::has_access): a denial
    /// becomes an authorization error, hub failures keep their own kind.
    pub async fn ensure_access(&self, student: &StudentId, course: &CourseId) -> AppResult<()> {
        if self.has_access(student, course).await? {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Student '{student}' does not have access to course '{course}'"
            )))
        }
    }

    /// Adds the student to the course. Never fails; see [`SyncStatus`].
    pub async fn grant_access(&self, student: &StudentId, course: &CourseId) -> SyncStatus {
        self.store.grant_access(student, course).await
    }

    /// Removes the student from the course. Never fails; see [`SyncStatus`].
    pub async fn revoke_access(&self, student: &StudentId, course: &CourseId) -> SyncStatus {
        self.store.revoke_access(student, course).await
    }
}

impl Default for AccessAuthorizer {
    fn default() -> Self {
        Self::noop()
    }
}

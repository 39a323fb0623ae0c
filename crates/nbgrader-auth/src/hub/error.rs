//! Failure classification for hub API calls.

use thiserror::Error;

use nbgrader_core::error::{AppError, ErrorKind};

/// Errors raised while talking to the hub.
///
/// The variants are deliberately distinct: callers fall back to non-hub
/// behavior on [`HubError::Environment`] but must not guess on the others.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// A required environment variable is absent or empty, which means the
    /// process is not running under the hub.
    #[error("hub environment variable {variable} is not set")]
    Environment {
        /// Name of the missing variable.
        variable: String,
    },

    /// The hub answered with a non-success status.
    #[error("hub API {method} {path} failed with status {status}: {message}")]
    Api {
        /// HTTP method of the failed call.
        method: String,
        /// Request path relative to the API base URL.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The hub answered successfully but the payload had an unexpected shape.
    #[error("malformed hub response from {path}: {detail}")]
    MalformedResponse {
        /// Request path relative to the API base URL.
        path: String,
        /// What was wrong with the payload.
        detail: String,
    },

    /// A user or group name cannot be addressed as a single path segment.
    #[error("'{name}' is not a valid hub user or group name")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// The hub could not be reached or the request timed out.
    #[error("hub unreachable for {path}: {message}")]
    Transport {
        /// Request path relative to the API base URL.
        path: String,
        /// Transport failure description.
        message: String,
    },
}

impl HubError {
    /// Whether this error means "not running under the hub".
    pub fn is_environment(&self) -> bool {
        matches!(self, Self::Environment { .. })
    }

    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the hub reported that the target already exists.
    ///
    /// The hub answers a duplicate group creation with 409; some proxies in
    /// front of it downgrade that to a 400 with the same message.
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::Api {
                status, message, ..
            } => {
                *status == 409
                    || ((400..500).contains(status)
                        && message.to_ascii_lowercase().contains("already exists"))
            }
            _ => false,
        }
    }
}

impl From<HubError> for AppError {
    fn from(err: HubError) -> Self {
        let kind = match &err {
            HubError::Environment { .. } => ErrorKind::Configuration,
            HubError::Api { .. } => ErrorKind::ExternalService,
            HubError::MalformedResponse { .. } => ErrorKind::Serialization,
            HubError::Transport { .. } => ErrorKind::ServiceUnavailable,
            HubError::InvalidName { .. } => ErrorKind::Validation,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> HubError {
        HubError::Api {
            method: "POST".to_string(),
            path: "/groups/nbgrader-c101".to_string(),
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_conflict_is_already_exists() {
        assert!(api(409, "Group nbgrader-c101 already exists").is_already_exists());
        assert!(api(409, "").is_already_exists());
        assert!(api(400, "Group nbgrader-c101 already exists").is_already_exists());
        assert!(!api(403, "Forbidden").is_already_exists());
        assert!(!api(500, "already exists").is_already_exists());
    }

    #[test]
    fn test_app_error_mapping() {
        let env = HubError::Environment {
            variable: "JUPYTERHUB_API_TOKEN".to_string(),
        };
        assert_eq!(AppError::from(env).kind, ErrorKind::Configuration);
        assert_eq!(AppError::from(api(403, "no")).kind, ErrorKind::ExternalService);
        let unreachable = HubError::Transport {
            path: "/groups".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(
            AppError::from(unreachable).kind,
            ErrorKind::ServiceUnavailable
        );
        let invalid = HubError::InvalidName {
            name: "..".to_string(),
        };
        assert_eq!(AppError::from(invalid).kind, ErrorKind::Validation);
    }
}

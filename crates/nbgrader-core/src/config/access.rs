//! Access-control backend selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which course membership backend the authorizer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessBackend {
    /// Membership is not tracked; every student may access every course.
    Noop,
    /// Course rosters are hub groups.
    Hub,
    /// Use the hub when its credentials are present in the environment,
    /// otherwise behave like `noop`.
    #[default]
    Auto,
}

impl fmt::Display for AccessBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Noop => write!(f, "noop"),
            Self::Hub => write!(f, "hub"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

/// Access-control configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Membership backend: `"noop"`, `"hub"` or `"auto"`.
    #[serde(default)]
    pub backend: AccessBackend,
}

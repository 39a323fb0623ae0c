//! Newtype wrappers around the opaque string identifiers the hub hands us.
//!
//! Using distinct types prevents accidentally passing a `CourseId` where a
//! `StudentId` is expected, and keeps the group-name derivation in one place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Group-name prefix written by nbgrader for course rosters.
pub const COURSE_GROUP_PREFIX: &str = "nbgrader-";

/// Group-name prefix used by older formgrader deployments; read-only.
pub const LEGACY_COURSE_GROUP_PREFIX: &str = "formgrade-";

/// Macro to define a newtype identifier wrapper around `String`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the identifier is empty or only whitespace.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::new(s))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// A hub-managed user account name.
    ///
    /// The value `"*"` stands for "whoever is currently authenticated".
    StudentId
);

define_id!(
    /// A logical course name, distinct from its hub group name.
    CourseId
);

impl StudentId {
    /// The wildcard meaning "the currently authenticated user".
    pub const WILDCARD: &'static str = "*";

    /// Whether this is the wildcard rather than a concrete account.
    pub fn is_wildcard(&self) -> bool {
        self.0 == Self::WILDCARD
    }
}

impl CourseId {
    /// Hub group holding this course's roster.
    pub fn group_name(&self) -> String {
        format!("{COURSE_GROUP_PREFIX}{}", self.0)
    }

    /// Recover a course from a hub group name.
    ///
    /// Accepts both the current and the legacy prefix; the course is
    /// everything after the first `-`. Any other group, or a bare prefix
    /// naming no course, yields `None`.
    pub fn from_group_name(group: &str) -> Option<Self> {
        if !group.starts_with(COURSE_GROUP_PREFIX) && !group.starts_with(LEGACY_COURSE_GROUP_PREFIX)
        {
            return None;
        }
        group
            .split_once('-')
            .filter(|(_, course)| !course.trim().is_empty())
            .map(|(_, course)| Self::new(course))
    }
}

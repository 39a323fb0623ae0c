//! Core type definitions used across the nbgrader workspace.

pub mod id;
pub mod membership;

pub use id::*;
pub use membership::{MembershipResult, SyncStatus, SyncStep};

//! # nbgrader-auth
//!
//! Course access control for nbgrader running under a shared hub.
//!
//! ## Modules
//!
//! - `hub`: credentials, HTTP transport, and the group-management client
//! - `membership`: course membership stores (no-op and hub-backed)
//! - `authorizer`: the access policy consumed by handlers and the CLI

pub mod authorizer;
pub mod hub;
pub mod membership;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use authorizer::AccessAuthorizer;
pub use hub::{HubError, HubGroupClient, HubTransport};
pub use membership::{CourseMembershipStore, HubMembershipStore, NoopMembershipStore};

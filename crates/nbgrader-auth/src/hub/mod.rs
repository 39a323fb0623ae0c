//! Hub REST API access: credentials, transport, and the group client.

pub mod client;
pub mod env;
pub mod error;
pub mod transport;

pub use client::{AUTHENTICATED_USER, GroupCreation, HubGroupClient};
pub use env::{AuthEnvironment, EnvSource, ProcessEnv, StaticEnv};
pub use error::HubError;
pub use transport::{HubRequest, HubResponse, HubTransport, ReqwestTransport};

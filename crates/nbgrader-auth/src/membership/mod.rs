//! Course membership stores: where the per-student course allow-list lives.

pub mod hub;
pub mod noop;
pub mod store;

pub use hub::HubMembershipStore;
pub use noop::NoopMembershipStore;
pub use store::CourseMembershipStore;

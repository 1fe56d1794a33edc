//! Remote entity gateway abstraction
//!
//! Provides the `EntityGateway` trait the session talks to and an in-memory
//! implementation used by tests and local hosts.

pub mod memory;
pub mod traits;

pub use memory::{GatewayCall, GatewayOp, InMemoryGateway, StagedChange, DEFAULT_UPDATE_GROUP};
pub use traits::{CollectionView, EntityGateway, EntityHandle, Filter, Record, ViewId};

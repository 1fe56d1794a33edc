//! Core traits and types for the remote entity gateway
//!
//! The gateway is the data-access collaborator: it creates, reads, updates
//! (in batches) and deletes records of named collections, and binds filtered
//! list views over them. Transport and optimistic concurrency live beneath it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::error::GatewayError;

/// A remote record keyed by wire column name
pub type Record = serde_json::Map<String, Value>;

/// Opaque reference to one remote record
///
/// Field mutations staged against a handle are held by the gateway under the
/// handle's update group until `commit_batch` sends them in one round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    /// Collection the record belongs to (e.g. "Authors")
    pub collection: String,
    /// Stable record identifier
    pub id: Uuid,
    /// Batch group that staged mutations on this handle commit with
    pub update_group: String,
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.collection, self.id)
    }
}

/// Equality predicate on one column; a view's filters are ANDed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Check a record against this predicate
    pub fn matches(&self, record: &Record) -> bool {
        record.get(&self.column) == Some(&self.value)
    }
}

/// Identifier of a bound list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(pub u64);

/// A list view bound to a collection under a fixed filter predicate
///
/// Re-binding replaces the view (new id, new predicate); refreshing re-runs
/// the same predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionView {
    pub id: ViewId,
    pub collection: String,
    pub filters: Vec<Filter>,
}

/// The remote entity gateway
///
/// Implementations must be Send + Sync for use in async contexts.
#[async_trait]
pub trait EntityGateway: Send + Sync {
    /// Create a record and wait for the service to acknowledge it
    async fn create_entity(
        &self,
        collection: &str,
        payload: Value,
    ) -> Result<EntityHandle, GatewayError>;

    /// Read the current field values of a record
    async fn read_entity(&self, handle: &EntityHandle) -> Result<Record, GatewayError>;

    /// Stage a field mutation under the handle's update group
    ///
    /// Nothing is sent until `commit_batch` is called for that group.
    fn set_field(&self, handle: &EntityHandle, field: &str, value: Value);

    /// Send every mutation staged under `group` as one atomic request
    async fn commit_batch(&self, group: &str) -> Result<(), GatewayError>;

    /// Physically remove a record
    async fn delete_entity(&self, handle: &EntityHandle) -> Result<(), GatewayError>;

    /// Bind a new list view over `collection` filtered by `filters`
    async fn bind_collection(
        &self,
        collection: &str,
        filters: Vec<Filter>,
    ) -> Result<CollectionView, GatewayError>;

    /// Detach a list view so it shows nothing
    async fn unbind_collection(&self, view: &CollectionView) -> Result<(), GatewayError>;

    /// Re-run a bound view's query to pick up data changes
    async fn refresh(&self, view: &CollectionView) -> Result<(), GatewayError>;
}

//! In-process entity gateway
//!
//! Holds records in memory, enforces the server-side validation the session
//! delegates (required names, integer stock, decimal prices, currency codes,
//! author references) and records every call so workflows can be checked
//! for request counts, batch boundaries and payload shapes.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::traits::{CollectionView, EntityGateway, EntityHandle, Filter, Record, ViewId};
use crate::config::CollectionNames;
use crate::error::GatewayError;
use crate::model::{columns, Author, Book};

/// Default update group for handles issued by this gateway
pub const DEFAULT_UPDATE_GROUP: &str = "editGroup";

/// Gateway operation kinds, used for call counting and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    Create,
    Read,
    Commit,
    Delete,
    Bind,
    Unbind,
    Refresh,
}

/// A field mutation waiting for its batch
#[derive(Debug, Clone, PartialEq)]
pub struct StagedChange {
    pub handle: EntityHandle,
    pub field: String,
    pub value: Value,
}

/// One request received by the gateway
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Create {
        collection: String,
        payload: Value,
    },
    Read {
        handle: EntityHandle,
    },
    Commit {
        group: String,
        changes: Vec<StagedChange>,
    },
    Delete {
        handle: EntityHandle,
    },
    Bind {
        view: ViewId,
        collection: String,
        filters: Vec<Filter>,
    },
    Unbind {
        view: ViewId,
    },
    Refresh {
        view: ViewId,
    },
}

impl GatewayCall {
    pub fn op(&self) -> GatewayOp {
        match self {
            GatewayCall::Create { .. } => GatewayOp::Create,
            GatewayCall::Read { .. } => GatewayOp::Read,
            GatewayCall::Commit { .. } => GatewayOp::Commit,
            GatewayCall::Delete { .. } => GatewayOp::Delete,
            GatewayCall::Bind { .. } => GatewayOp::Bind,
            GatewayCall::Unbind { .. } => GatewayOp::Unbind,
            GatewayCall::Refresh { .. } => GatewayOp::Refresh,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Schema {
    Authors,
    Books,
}

#[derive(Default)]
struct GatewayState {
    records: HashMap<String, BTreeMap<Uuid, Record>>,
    staged: HashMap<String, Vec<StagedChange>>,
    views: HashMap<ViewId, CollectionView>,
    next_view: u64,
    failures: HashMap<GatewayOp, String>,
    calls: Vec<GatewayCall>,
}

impl GatewayState {
    /// Log a call and consume an injected failure for its op, if any
    fn record_call(&mut self, call: GatewayCall) -> Result<(), GatewayError> {
        let op = call.op();
        self.calls.push(call);
        match self.failures.remove(&op) {
            Some(message) => Err(GatewayError::Rejected(message)),
            None => Ok(()),
        }
    }
}

/// In-memory gateway
pub struct InMemoryGateway {
    collections: CollectionNames,
    update_group: String,
    state: Mutex<GatewayState>,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new(CollectionNames::default(), DEFAULT_UPDATE_GROUP)
    }
}

impl InMemoryGateway {
    pub fn new(collections: CollectionNames, update_group: impl Into<String>) -> Self {
        Self {
            collections,
            update_group: update_group.into(),
            state: Mutex::new(GatewayState::default()),
        }
    }

    fn schema(&self, collection: &str) -> Result<Schema, GatewayError> {
        if collection == self.collections.authors {
            Ok(Schema::Authors)
        } else if collection == self.collections.books {
            Ok(Schema::Books)
        } else {
            Err(GatewayError::Rejected(format!(
                "Unknown collection '{}'",
                collection
            )))
        }
    }

    /// Build a handle for an existing record id
    pub fn handle_for(&self, collection: &str, id: Uuid) -> EntityHandle {
        EntityHandle {
            collection: collection.to_string(),
            id,
            update_group: self.update_group.clone(),
        }
    }

    /// Seed an author without going through the call log
    pub fn seed_author(&self, name: &str, bio: &str) -> EntityHandle {
        let id = Uuid::new_v4();
        let author = Author {
            id,
            name: name.to_string(),
            bio: bio.to_string(),
            is_deleted: false,
        };
        self.seed(&self.collections.authors.clone(), id, author.to_record())
    }

    /// Seed a book without going through the call log
    pub fn seed_book(&self, book: &Book) -> EntityHandle {
        self.seed(&self.collections.books.clone(), book.id, book.to_record())
    }

    fn seed(&self, collection: &str, id: Uuid, record: Record) -> EntityHandle {
        let mut state = self.state.lock().unwrap();
        state
            .records
            .entry(collection.to_string())
            .or_default()
            .insert(id, record);
        self.handle_for(collection, id)
    }

    /// Current stored record, if present
    pub fn record(&self, collection: &str, id: Uuid) -> Option<Record> {
        let state = self.state.lock().unwrap();
        state.records.get(collection)?.get(&id).cloned()
    }

    /// Records visible through a bound view
    pub fn rows(&self, view: ViewId) -> Vec<Record> {
        let state = self.state.lock().unwrap();
        let Some(view) = state.views.get(&view) else {
            return Vec::new();
        };
        state
            .records
            .get(&view.collection)
            .map(|records| {
                records
                    .values()
                    .filter(|r| view.filters.iter().all(|f| f.matches(r)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether a view is currently bound
    pub fn is_bound(&self, view: ViewId) -> bool {
        self.state.lock().unwrap().views.contains_key(&view)
    }

    /// Make the next call of `op` fail with `message`
    pub fn fail_next(&self, op: GatewayOp, message: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(op, message.into());
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls of one kind
    pub fn count(&self, op: GatewayOp) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Mutations staged under `group` and not yet committed
    pub fn staged(&self, group: &str) -> Vec<StagedChange> {
        self.state
            .lock()
            .unwrap()
            .staged
            .get(group)
            .cloned()
            .unwrap_or_default()
    }

    fn build_author(&self, payload: &Record) -> Result<Record, GatewayError> {
        let mut record = Record::new();
        record.insert(columns::ID.to_string(), json!(Uuid::new_v4()));
        record.insert(
            columns::NAME.to_string(),
            payload.get(columns::NAME).cloned().unwrap_or(Value::Null),
        );
        record.insert(
            columns::BIO.to_string(),
            payload.get(columns::BIO).cloned().unwrap_or(json!("")),
        );
        record.insert(columns::IS_DELETED.to_string(), json!(false));
        Ok(record)
    }

    fn build_book(&self, payload: &Record) -> Result<Record, GatewayError> {
        // Create takes the nested currency structure; stored records are flat.
        let code = payload
            .get(columns::CURRENCY)
            .and_then(|c| c.get(columns::CODE))
            .cloned()
            .ok_or_else(|| GatewayError::Rejected("currency.code is required".to_string()))?;

        let mut record = Record::new();
        record.insert(columns::ID.to_string(), json!(Uuid::new_v4()));
        for column in [
            columns::AUTHOR_ID,
            columns::TITLE,
            columns::DESCR,
            columns::STOCK,
            columns::PRICE,
        ] {
            record.insert(
                column.to_string(),
                payload.get(column).cloned().unwrap_or(Value::Null),
            );
        }
        record.insert(columns::CURRENCY_CODE.to_string(), code);
        record.insert(columns::IS_DELETED.to_string(), json!(false));
        Ok(record)
    }

    /// Typed validation of a full record
    fn validate(
        &self,
        state: &GatewayState,
        schema: Schema,
        record: &Record,
    ) -> Result<(), GatewayError> {
        let value = Value::Object(record.clone());
        match schema {
            Schema::Authors => {
                let author: Author = serde_json::from_value(value)
                    .map_err(|e| GatewayError::Rejected(format!("Invalid author: {}", e)))?;
                author.validate().map_err(GatewayError::Rejected)
            }
            Schema::Books => {
                let book: Book = serde_json::from_value(value)
                    .map_err(|e| GatewayError::Rejected(format!("Invalid book: {}", e)))?;
                book.validate().map_err(GatewayError::Rejected)?;
                let author_exists = state
                    .records
                    .get(&self.collections.authors)
                    .is_some_and(|authors| authors.contains_key(&book.author_id));
                if author_exists {
                    Ok(())
                } else {
                    Err(GatewayError::Rejected(format!(
                        "Author {} does not exist",
                        book.author_id
                    )))
                }
            }
        }
    }
}

#[async_trait]
impl EntityGateway for InMemoryGateway {
    async fn create_entity(
        &self,
        collection: &str,
        payload: Value,
    ) -> Result<EntityHandle, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.record_call(GatewayCall::Create {
            collection: collection.to_string(),
            payload: payload.clone(),
        })?;

        let schema = self.schema(collection)?;
        let payload = match payload {
            Value::Object(map) if !map.is_empty() => map,
            _ => {
                return Err(GatewayError::Rejected(
                    "Request body must be a non-empty object".to_string(),
                ))
            }
        };

        let record = match schema {
            Schema::Authors => self.build_author(&payload)?,
            Schema::Books => self.build_book(&payload)?,
        };
        self.validate(&state, schema, &record)?;

        let id = record
            .get(columns::ID)
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| GatewayError::Rejected("Record without ID".to_string()))?;

        state
            .records
            .entry(collection.to_string())
            .or_default()
            .insert(id, record);
        debug!(collection, %id, "Created record");

        Ok(self.handle_for(collection, id))
    }

    async fn read_entity(&self, handle: &EntityHandle) -> Result<Record, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.record_call(GatewayCall::Read {
            handle: handle.clone(),
        })?;

        state
            .records
            .get(&handle.collection)
            .and_then(|records| records.get(&handle.id))
            .cloned()
            .ok_or_else(|| GatewayError::NotFound {
                collection: handle.collection.clone(),
                id: handle.id,
            })
    }

    fn set_field(&self, handle: &EntityHandle, field: &str, value: Value) {
        let mut state = self.state.lock().unwrap();
        state
            .staged
            .entry(handle.update_group.clone())
            .or_default()
            .push(StagedChange {
                handle: handle.clone(),
                field: field.to_string(),
                value,
            });
    }

    async fn commit_batch(&self, group: &str) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        let changes = state.staged.remove(group).unwrap_or_default();
        state.record_call(GatewayCall::Commit {
            group: group.to_string(),
            changes: changes.clone(),
        })?;

        // Apply to copies first so a single bad change rejects the whole batch.
        let mut updated: BTreeMap<(String, Uuid), Record> = BTreeMap::new();
        for change in &changes {
            if change.field == columns::ID || change.field == columns::AUTHOR_ID {
                return Err(GatewayError::Rejected(format!(
                    "Field '{}' is immutable",
                    change.field
                )));
            }
            let key = (change.handle.collection.clone(), change.handle.id);
            if !updated.contains_key(&key) {
                let current = state
                    .records
                    .get(&change.handle.collection)
                    .and_then(|records| records.get(&change.handle.id))
                    .cloned()
                    .ok_or_else(|| GatewayError::NotFound {
                        collection: change.handle.collection.clone(),
                        id: change.handle.id,
                    })?;
                updated.insert(key.clone(), current);
            }
            if let Some(record) = updated.get_mut(&key) {
                if !record.contains_key(&change.field) {
                    return Err(GatewayError::Rejected(format!(
                        "Unknown field '{}' on {}",
                        change.field, change.handle.collection
                    )));
                }
                record.insert(change.field.clone(), change.value.clone());
            }
        }

        for ((collection, _), record) in &updated {
            let schema = self.schema(collection)?;
            self.validate(&state, schema, record)?;
        }

        let applied = updated.len();
        for ((collection, id), record) in updated {
            state
                .records
                .entry(collection)
                .or_default()
                .insert(id, record);
        }
        debug!(group, changes = changes.len(), records = applied, "Committed batch");

        Ok(())
    }

    async fn delete_entity(&self, handle: &EntityHandle) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.record_call(GatewayCall::Delete {
            handle: handle.clone(),
        })?;

        let removed = state
            .records
            .get_mut(&handle.collection)
            .and_then(|records| records.remove(&handle.id));
        if removed.is_none() {
            return Err(GatewayError::NotFound {
                collection: handle.collection.clone(),
                id: handle.id,
            });
        }

        // Pending mutations on a removed record can never apply.
        for changes in state.staged.values_mut() {
            changes.retain(|c| c.handle != *handle);
        }
        debug!(%handle, "Deleted record");

        Ok(())
    }

    async fn bind_collection(
        &self,
        collection: &str,
        filters: Vec<Filter>,
    ) -> Result<CollectionView, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.next_view += 1;
        let id = ViewId(state.next_view);
        state.record_call(GatewayCall::Bind {
            view: id,
            collection: collection.to_string(),
            filters: filters.clone(),
        })?;

        let view = CollectionView {
            id,
            collection: collection.to_string(),
            filters,
        };
        state.views.insert(id, view.clone());
        Ok(view)
    }

    async fn unbind_collection(&self, view: &CollectionView) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.record_call(GatewayCall::Unbind { view: view.id })?;
        state
            .views
            .remove(&view.id)
            .map(|_| ())
            .ok_or(GatewayError::UnknownView(view.id.0))
    }

    async fn refresh(&self, view: &CollectionView) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.record_call(GatewayCall::Refresh { view: view.id })?;
        if state.views.contains_key(&view.id) {
            Ok(())
        } else {
            Err(GatewayError::UnknownView(view.id.0))
        }
    }
}

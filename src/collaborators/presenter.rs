//! Dialog presenter seam
//!
//! The presenter owns the actual dialog widgets. The session only loads,
//! opens, closes and destroys them, and reads or writes fields by logical
//! name.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use crate::error::PresenterError;
use crate::fields::{AUTHOR_FIELDS, BOOK_FIELDS};

/// The two dialog kinds the session manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Author,
    Book,
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogKind::Author => write!(f, "author"),
            DialogKind::Book => write!(f, "book"),
        }
    }
}

/// A loaded dialog instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogHandle {
    pub id: u64,
    pub kind: DialogKind,
}

/// Dialog presenter provided by the host UI
#[async_trait]
pub trait DialogPresenter: Send + Sync {
    /// Load (instantiate) a dialog of the given kind
    async fn load(&self, kind: DialogKind) -> Result<DialogHandle, PresenterError>;

    fn open(&self, dialog: &DialogHandle) -> Result<(), PresenterError>;

    fn close(&self, dialog: &DialogHandle) -> Result<(), PresenterError>;

    /// Release the dialog; the handle must not be used afterwards
    fn destroy(&self, dialog: DialogHandle) -> Result<(), PresenterError>;

    fn get_field(&self, dialog: &DialogHandle, field: &str) -> Result<String, PresenterError>;

    fn set_field(
        &self,
        dialog: &DialogHandle,
        field: &str,
        value: &str,
    ) -> Result<(), PresenterError>;
}

/// Presenter lifecycle events, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    Loaded(DialogHandle),
    Opened(DialogHandle),
    Closed(DialogHandle),
    Destroyed(DialogHandle),
}

#[derive(Debug)]
struct DialogInstance {
    kind: DialogKind,
    open: bool,
    fields: HashMap<String, String>,
}

#[derive(Default)]
struct PresenterState {
    next_id: u64,
    dialogs: HashMap<u64, DialogInstance>,
    events: Vec<PresenterEvent>,
    fail_next_load: Option<String>,
}

/// In-memory presenter with the author and book field sets
///
/// Tests play the user through `type_into` and inspect state through the
/// query helpers.
#[derive(Default)]
pub struct InMemoryPresenter {
    state: Mutex<PresenterState>,
}

impl InMemoryPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `load` fail
    pub fn fail_next_load(&self, message: impl Into<String>) {
        self.state.lock().unwrap().fail_next_load = Some(message.into());
    }

    /// Type into a field of the live dialog of `kind`
    pub fn type_into(&self, kind: DialogKind, field: &str, value: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        match latest_mut(&mut state, kind) {
            Some(dialog) if dialog.fields.contains_key(field) => {
                dialog.fields.insert(field.to_string(), value.to_string());
                true
            }
            _ => false,
        }
    }

    /// Current text of a field of the live dialog of `kind`
    pub fn field(&self, kind: DialogKind, field: &str) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        latest_mut(&mut state, kind).and_then(|d| d.fields.get(field).cloned())
    }

    /// Whether a dialog of `kind` is currently shown
    pub fn is_open(&self, kind: DialogKind) -> bool {
        let state = self.state.lock().unwrap();
        state.dialogs.values().any(|d| d.kind == kind && d.open)
    }

    /// Number of loaded, not yet destroyed dialogs of `kind`
    pub fn live(&self, kind: DialogKind) -> usize {
        let state = self.state.lock().unwrap();
        state.dialogs.values().filter(|d| d.kind == kind).count()
    }

    /// Number of `load` calls for `kind`
    pub fn load_count(&self, kind: DialogKind) -> usize {
        let state = self.state.lock().unwrap();
        state
            .events
            .iter()
            .filter(|e| matches!(e, PresenterEvent::Loaded(h) if h.kind == kind))
            .count()
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        self.state.lock().unwrap().events.clone()
    }

    fn with_dialog<T>(
        &self,
        dialog: &DialogHandle,
        f: impl FnOnce(&mut DialogInstance) -> Result<T, PresenterError>,
    ) -> Result<T, PresenterError> {
        let mut state = self.state.lock().unwrap();
        let instance = state
            .dialogs
            .get_mut(&dialog.id)
            .ok_or(PresenterError::UnknownHandle(dialog.id))?;
        f(instance)
    }
}

fn latest_mut(state: &mut PresenterState, kind: DialogKind) -> Option<&mut DialogInstance> {
    state
        .dialogs
        .iter_mut()
        .filter(|(_, d)| d.kind == kind)
        .max_by_key(|(id, _)| **id)
        .map(|(_, d)| d)
}

#[async_trait]
impl DialogPresenter for InMemoryPresenter {
    async fn load(&self, kind: DialogKind) -> Result<DialogHandle, PresenterError> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.fail_next_load.take() {
            return Err(PresenterError::Load { kind, message });
        }

        state.next_id += 1;
        let handle = DialogHandle {
            id: state.next_id,
            kind,
        };
        let descriptors = match kind {
            DialogKind::Author => AUTHOR_FIELDS,
            DialogKind::Book => BOOK_FIELDS,
        };
        let fields = descriptors
            .iter()
            .map(|f| (f.name.to_string(), String::new()))
            .collect();
        state.dialogs.insert(
            handle.id,
            DialogInstance {
                kind,
                open: false,
                fields,
            },
        );
        state.events.push(PresenterEvent::Loaded(handle.clone()));
        Ok(handle)
    }

    fn open(&self, dialog: &DialogHandle) -> Result<(), PresenterError> {
        self.with_dialog(dialog, |d| {
            d.open = true;
            Ok(())
        })?;
        self.state
            .lock()
            .unwrap()
            .events
            .push(PresenterEvent::Opened(dialog.clone()));
        Ok(())
    }

    fn close(&self, dialog: &DialogHandle) -> Result<(), PresenterError> {
        self.with_dialog(dialog, |d| {
            d.open = false;
            Ok(())
        })?;
        self.state
            .lock()
            .unwrap()
            .events
            .push(PresenterEvent::Closed(dialog.clone()));
        Ok(())
    }

    fn destroy(&self, dialog: DialogHandle) -> Result<(), PresenterError> {
        let mut state = self.state.lock().unwrap();
        state
            .dialogs
            .remove(&dialog.id)
            .ok_or(PresenterError::UnknownHandle(dialog.id))?;
        state.events.push(PresenterEvent::Destroyed(dialog));
        Ok(())
    }

    fn get_field(&self, dialog: &DialogHandle, field: &str) -> Result<String, PresenterError> {
        self.with_dialog(dialog, |d| {
            d.fields
                .get(field)
                .cloned()
                .ok_or_else(|| PresenterError::UnknownField {
                    field: field.to_string(),
                })
        })
    }

    fn set_field(
        &self,
        dialog: &DialogHandle,
        field: &str,
        value: &str,
    ) -> Result<(), PresenterError> {
        self.with_dialog(dialog, |d| match d.fields.get_mut(field) {
            Some(slot) => {
                *slot = value.to_string();
                Ok(())
            }
            None => Err(PresenterError::UnknownField {
                field: field.to_string(),
            }),
        })
    }
}

//! Selection provider seam

use std::sync::Mutex;

use crate::gateway::EntityHandle;

/// Exposes the selected rows of one list/table view
pub trait SelectionProvider: Send + Sync {
    fn selected(&self) -> Vec<EntityHandle>;
}

/// Selection set directly by the host (or a test)
#[derive(Default)]
pub struct StaticSelection {
    selected: Mutex<Vec<EntityHandle>>,
}

impl StaticSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, handles: Vec<EntityHandle>) {
        *self.selected.lock().unwrap() = handles;
    }

    /// Replace the selection with a single row
    pub fn select(&self, handle: EntityHandle) {
        self.set(vec![handle]);
    }

    pub fn clear(&self) {
        self.set(Vec::new());
    }
}

impl SelectionProvider for StaticSelection {
    fn selected(&self) -> Vec<EntityHandle> {
        self.selected.lock().unwrap().clone()
    }
}

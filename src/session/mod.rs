//! Editing Session
//!
//! One `EditingSession` per view. It owns the dialog slots, the pending-edit
//! handle, the selected author and the book view binding, and runs the
//! author/book workflows against the injected collaborators.
//!
//! Remote failures never leave the session stuck: the workflow reports the
//! gateway's message, then still closes the dialog and refreshes (or
//! re-binds) the affected view.

mod author;
mod book;
mod dialog;
mod selection;

pub use dialog::{DialogMode, DialogState};
pub(crate) use dialog::DialogSlot;
pub use selection::book_filters;

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::collaborators::{
    DialogHandle, DialogKind, DialogPresenter, Notifier, SelectionProvider,
};
use crate::config::EditorConfig;
use crate::error::{GatewayError, SessionError};
use crate::fields::{fill_form, FieldDescriptor};
use crate::gateway::{CollectionView, EntityGateway, EntityHandle, Filter, Record};
use crate::model::columns;

/// How a workflow ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// Remote work succeeded (or the dialog was shown)
    Completed,
    /// The gateway rejected the operation; the message was shown to the user
    Rejected(String),
    /// Wrong selection cardinality; an informational notice was shown
    Aborted,
    /// The user declined a confirmation prompt
    Cancelled,
}

/// What a confirm works on, taken from the slot as it enters `Submitting`
struct Submission {
    dialog: DialogHandle,
    /// Captured handle for edits
    edit: Option<EntityHandle>,
    /// Owning author captured when the dialog opened
    scope: Option<Uuid>,
}

/// Host-provided collaborators
#[derive(Clone)]
pub struct Collaborators {
    pub gateway: Arc<dyn EntityGateway>,
    pub presenter: Arc<dyn DialogPresenter>,
    pub notifier: Arc<dyn Notifier>,
    /// Selection of the author table
    pub author_selection: Arc<dyn SelectionProvider>,
    /// Selection of the book table
    pub book_selection: Arc<dyn SelectionProvider>,
}

#[derive(Debug)]
struct SessionState {
    author_dialog: DialogSlot,
    book_dialog: DialogSlot,
    /// Handle captured by an edit trigger, released when its dialog closes
    pending_edit: Option<(DialogKind, EntityHandle)>,
    selected_author: Option<Uuid>,
    /// `None` while no author is selected (unbound, not empty-filtered)
    book_view: Option<CollectionView>,
}

impl SessionState {
    fn slot(&mut self, kind: DialogKind) -> &mut DialogSlot {
        match kind {
            DialogKind::Author => &mut self.author_dialog,
            DialogKind::Book => &mut self.book_dialog,
        }
    }

    fn pending_for(&self, kind: DialogKind) -> Option<EntityHandle> {
        match &self.pending_edit {
            Some((pending_kind, handle)) if *pending_kind == kind => Some(handle.clone()),
            _ => None,
        }
    }

    /// Drop the pending edit if it belongs to the dialog of `kind`
    fn release_pending(&mut self, kind: DialogKind) {
        if self.pending_for(kind).is_some() {
            self.pending_edit = None;
        }
    }
}

/// Per-view editing session
pub struct EditingSession {
    gateway: Arc<dyn EntityGateway>,
    presenter: Arc<dyn DialogPresenter>,
    notifier: Arc<dyn Notifier>,
    author_selection: Arc<dyn SelectionProvider>,
    book_selection: Arc<dyn SelectionProvider>,
    config: EditorConfig,
    author_view: CollectionView,
    state: Mutex<SessionState>,
}

impl EditingSession {
    /// Bind the author list and start with no author selected
    pub async fn attach(
        collaborators: Collaborators,
        config: EditorConfig,
    ) -> Result<Self, SessionError> {
        let author_view = collaborators
            .gateway
            .bind_collection(
                &config.collections.authors,
                vec![Filter::eq(columns::IS_DELETED, false)],
            )
            .await?;
        info!(view = author_view.id.0, "Editing session attached");

        Ok(Self {
            gateway: collaborators.gateway,
            presenter: collaborators.presenter,
            notifier: collaborators.notifier,
            author_selection: collaborators.author_selection,
            book_selection: collaborators.book_selection,
            config,
            author_view,
            state: Mutex::new(SessionState {
                author_dialog: DialogSlot::new(DialogKind::Author),
                book_dialog: DialogSlot::new(DialogKind::Book),
                pending_edit: None,
                selected_author: None,
                book_view: None,
            }),
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn author_view(&self) -> &CollectionView {
        &self.author_view
    }

    pub async fn book_view(&self) -> Option<CollectionView> {
        self.state.lock().await.book_view.clone()
    }

    pub async fn selected_author(&self) -> Option<Uuid> {
        self.state.lock().await.selected_author
    }

    pub async fn dialog_state(&self, kind: DialogKind) -> DialogState {
        self.state.lock().await.slot(kind).state()
    }

    pub async fn dialog_mode(&self, kind: DialogKind) -> Option<DialogMode> {
        self.state.lock().await.slot(kind).mode()
    }

    /// The handle captured for the open edit dialog, if any
    pub async fn pending_edit(&self) -> Option<EntityHandle> {
        self.state
            .lock()
            .await
            .pending_edit
            .as_ref()
            .map(|(_, handle)| handle.clone())
    }

    /// The single selected row, or an informational notice
    fn single_selection(
        &self,
        provider: &dyn SelectionProvider,
        notice: &str,
    ) -> Option<EntityHandle> {
        let mut selected = provider.selected();
        if selected.len() == 1 {
            selected.pop()
        } else {
            debug!(count = selected.len(), "Selection cardinality is not one");
            self.notifier.info(notice);
            None
        }
    }

    /// Load (or reuse), prefill and open the dialog of `kind`
    async fn show_dialog(
        &self,
        kind: DialogKind,
        fields: &[FieldDescriptor],
        edit: Option<EntityHandle>,
        scope: Option<Uuid>,
    ) -> Result<WorkflowOutcome, SessionError> {
        let mode = if edit.is_some() {
            DialogMode::Edit
        } else {
            DialogMode::Create
        };

        let cached = {
            let mut state = self.state.lock().await;
            if let (Some(_), Some((pending_kind, _))) = (&edit, &state.pending_edit) {
                return Err(SessionError::EditPending {
                    kind: *pending_kind,
                });
            }
            let cached = state.slot(kind).begin_open(mode, scope)?;
            if let Some(handle) = &edit {
                state.pending_edit = Some((kind, handle.clone()));
            }
            cached
        };

        let reused = cached.is_some();
        let dialog = match cached {
            Some(dialog) => dialog,
            None => match self.presenter.load(kind).await {
                Ok(dialog) => dialog,
                Err(e) => {
                    warn!(%kind, error = %e, "Dialog load failed");
                    self.abort_open(kind, None).await;
                    return Err(e.into());
                }
            },
        };

        let record = match &edit {
            Some(handle) => match self.gateway.read_entity(handle).await {
                Ok(record) => Some(record),
                Err(e) => {
                    self.abort_open(kind, Some(dialog)).await;
                    return Ok(self.report_failure(&e));
                }
            },
            // A reused dialog still shows the last input.
            None if reused => Some(Record::new()),
            None => None,
        };

        let shown = match &record {
            Some(record) => fill_form(self.presenter.as_ref(), &dialog, fields, record),
            None => Ok(()),
        }
        .and_then(|_| self.presenter.open(&dialog));
        if let Err(e) = shown {
            self.abort_open(kind, Some(dialog)).await;
            return Err(e.into());
        }

        self.state.lock().await.slot(kind).finish_open(dialog);
        debug!(%kind, ?mode, "Dialog open");
        Ok(WorkflowOutcome::Completed)
    }

    async fn abort_open(&self, kind: DialogKind, dialog: Option<DialogHandle>) {
        let mut state = self.state.lock().await;
        state.slot(kind).abort_open(dialog);
        state.release_pending(kind);
    }

    /// Open → Submitting
    async fn begin_submit(&self, kind: DialogKind) -> Result<Submission, SessionError> {
        let mut state = self.state.lock().await;
        let (dialog, mode) = state.slot(kind).begin_submit().inspect_err(|_| {
            warn!(%kind, "Confirm without an open dialog");
        })?;
        let edit = match mode {
            DialogMode::Edit => state.pending_for(kind),
            DialogMode::Create => None,
        };
        Ok(Submission {
            dialog,
            edit,
            scope: state.slot(kind).scope(),
        })
    }

    /// Close and destroy the dialog and release the pending edit
    async fn teardown(&self, kind: DialogKind) {
        let dialog = {
            let mut state = self.state.lock().await;
            state.release_pending(kind);
            state.slot(kind).finish_submit()
        };
        if let Some(dialog) = dialog {
            if let Err(e) = self.presenter.close(&dialog) {
                warn!(%kind, error = %e, "Dialog close failed");
            }
            if let Err(e) = self.presenter.destroy(dialog) {
                warn!(%kind, error = %e, "Dialog destroy failed");
            }
        }
    }

    /// Close the dialog of `kind` without submitting; the dialog stays cached
    async fn cancel_dialog(&self, kind: DialogKind) -> Result<(), SessionError> {
        let dialog = {
            let mut state = self.state.lock().await;
            let dialog = state.slot(kind).cancel()?;
            state.release_pending(kind);
            dialog
        };
        self.presenter.close(&dialog)?;
        debug!(%kind, "Dialog cancelled");
        Ok(())
    }

    /// Stage every change on `handle` and commit them as one batch
    async fn commit_changes(
        &self,
        handle: &EntityHandle,
        changes: Vec<(&'static str, serde_json::Value)>,
    ) -> Result<(), GatewayError> {
        for (column, value) in changes {
            self.gateway.set_field(handle, column, value);
        }
        self.gateway.commit_batch(&handle.update_group).await
    }

    fn report(&self, result: Result<(), GatewayError>, success: &str) -> WorkflowOutcome {
        match result {
            Ok(()) => {
                self.notifier.info(success);
                WorkflowOutcome::Completed
            }
            Err(e) => self.report_failure(&e),
        }
    }

    fn report_failure(&self, error: &GatewayError) -> WorkflowOutcome {
        let message = error.message();
        warn!(error = %message, "Remote operation rejected");
        self.notifier.error(&message);
        WorkflowOutcome::Rejected(message)
    }

    async fn refresh_authors(&self) {
        if let Err(e) = self.gateway.refresh(&self.author_view).await {
            warn!(error = %e, "Author view refresh failed");
        }
    }
}

//! Author workflows
//!
//! Create and edit share the author dialog; delete is a soft delete
//! (`isDeleted = true`) so authors with books stay resolvable.

use serde_json::json;
use tracing::{info, instrument};

use super::{EditingSession, WorkflowOutcome};
use crate::collaborators::{ConfirmOutcome, DialogKind};
use crate::error::SessionError;
use crate::fields::{read_form, AUTHOR_FIELDS};
use crate::model::{columns, AuthorDraft};

impl EditingSession {
    /// Show the author dialog for a new author
    pub async fn open_author_create(&self) -> Result<WorkflowOutcome, SessionError> {
        self.show_dialog(DialogKind::Author, AUTHOR_FIELDS, None, None)
            .await
    }

    /// Show the author dialog prefilled from the single selected author
    pub async fn open_author_edit(&self) -> Result<WorkflowOutcome, SessionError> {
        let messages = &self.config.messages;
        let Some(handle) =
            self.single_selection(self.author_selection.as_ref(), &messages.select_one_author)
        else {
            return Ok(WorkflowOutcome::Aborted);
        };
        self.show_dialog(DialogKind::Author, AUTHOR_FIELDS, Some(handle), None)
            .await
    }

    /// Submit the author dialog in whichever mode it was opened
    ///
    /// The dialog is closed and destroyed and the author view refreshed
    /// whether or not the gateway accepted the change.
    #[instrument(skip(self))]
    pub async fn confirm_author_dialog(&self) -> Result<WorkflowOutcome, SessionError> {
        let submission = self.begin_submit(DialogKind::Author).await?;
        let form = match read_form(self.presenter.as_ref(), &submission.dialog, AUTHOR_FIELDS) {
            Ok(form) => form,
            Err(e) => {
                self.teardown(DialogKind::Author).await;
                return Err(e.into());
            }
        };
        let draft = AuthorDraft::from_form(&form);
        let messages = &self.config.messages;

        let outcome = match submission.edit {
            None => {
                let result = self
                    .gateway
                    .create_entity(&self.config.collections.authors, draft.create_payload())
                    .await;
                if let Ok(handle) = &result {
                    info!(%handle, "Author created");
                }
                self.report(result.map(|_| ()), &messages.author_created)
            }
            Some(handle) => {
                let result = self.commit_changes(&handle, draft.changes()).await;
                self.report(result, &messages.author_updated)
            }
        };

        self.teardown(DialogKind::Author).await;
        self.refresh_authors().await;
        Ok(outcome)
    }

    /// Close the author dialog without submitting
    pub async fn cancel_author_dialog(&self) -> Result<(), SessionError> {
        self.cancel_dialog(DialogKind::Author).await
    }

    /// Soft-delete the single selected author after confirmation
    #[instrument(skip(self))]
    pub async fn delete_author(&self) -> Result<WorkflowOutcome, SessionError> {
        let messages = &self.config.messages;
        let Some(handle) =
            self.single_selection(self.author_selection.as_ref(), &messages.select_one_author)
        else {
            return Ok(WorkflowOutcome::Aborted);
        };

        if self.notifier.confirm(&messages.confirm_author_delete).await == ConfirmOutcome::Cancel {
            return Ok(WorkflowOutcome::Cancelled);
        }

        let result = self
            .commit_changes(&handle, vec![(columns::IS_DELETED, json!(true))])
            .await;
        let deleted = result.is_ok();
        let outcome = self.report(result, &messages.author_deleted);
        self.refresh_authors().await;

        // The soft-deleted author leaves the list, so its books leave scope too.
        if deleted && self.selected_author().await == Some(handle.id) {
            info!(author_id = %handle.id, "Selected author deleted, clearing book scope");
            self.scope_books_to(None).await;
        }
        Ok(outcome)
    }
}

//! Book workflows
//!
//! Every book operation is scoped to the selected author: new books take
//! `author_ID` from the author selected when the dialog opened, never from
//! dialog input. Delete is a hard delete followed by a re-bind of the book
//! view.

use tracing::{debug, info, instrument, warn};

use super::{EditingSession, WorkflowOutcome};
use crate::collaborators::{ConfirmOutcome, DialogKind};
use crate::error::SessionError;
use crate::fields::{read_form, BOOK_FIELDS};
use crate::model::BookDraft;

impl EditingSession {
    /// Show the book dialog for a new book of the selected author
    ///
    /// The author is captured here, so a later selection change does not
    /// move the new book to another author or lose the dialog input.
    pub async fn open_book_create(&self) -> Result<WorkflowOutcome, SessionError> {
        let Some(author_id) = self.selected_author().await else {
            debug!("Book create triggered without a selected author");
            self.notifier.info(&self.config.messages.select_author_first);
            return Ok(WorkflowOutcome::Aborted);
        };
        self.show_dialog(DialogKind::Book, BOOK_FIELDS, None, Some(author_id))
            .await
    }

    /// Show the book dialog prefilled from the single selected book
    pub async fn open_book_edit(&self) -> Result<WorkflowOutcome, SessionError> {
        let messages = &self.config.messages;
        let Some(handle) =
            self.single_selection(self.book_selection.as_ref(), &messages.select_one_book)
        else {
            return Ok(WorkflowOutcome::Aborted);
        };
        self.show_dialog(DialogKind::Book, BOOK_FIELDS, Some(handle), None)
            .await
    }

    /// Submit the book dialog in whichever mode it was opened
    ///
    /// The dialog is closed and destroyed and the book view refreshed whether
    /// or not the gateway accepted the change.
    #[instrument(skip(self))]
    pub async fn confirm_book_dialog(&self) -> Result<WorkflowOutcome, SessionError> {
        let submission = self.begin_submit(DialogKind::Book).await?;
        let form = match read_form(self.presenter.as_ref(), &submission.dialog, BOOK_FIELDS) {
            Ok(form) => form,
            Err(e) => {
                self.teardown(DialogKind::Book).await;
                return Err(e.into());
            }
        };
        let draft = BookDraft::from_form(&form);
        let messages = &self.config.messages;

        let outcome = match (submission.edit, submission.scope) {
            (None, None) => {
                // Create opened without a captured author
                warn!("Book create confirmed without an author scope");
                self.notifier.info(&messages.select_author_first);
                WorkflowOutcome::Aborted
            }
            (None, Some(author_id)) => {
                let result = self
                    .gateway
                    .create_entity(
                        &self.config.collections.books,
                        draft.create_payload(author_id),
                    )
                    .await;
                if let Ok(handle) = &result {
                    info!(%handle, %author_id, "Book created");
                }
                self.report(result.map(|_| ()), &messages.book_created)
            }
            (Some(handle), _) => {
                let result = self.commit_changes(&handle, draft.changes()).await;
                self.report(result, &messages.book_updated)
            }
        };

        self.teardown(DialogKind::Book).await;
        self.refresh_books().await;
        Ok(outcome)
    }

    /// Close the book dialog without submitting
    pub async fn cancel_book_dialog(&self) -> Result<(), SessionError> {
        self.cancel_dialog(DialogKind::Book).await
    }

    /// Hard-delete the single selected book after confirmation
    #[instrument(skip(self))]
    pub async fn delete_book(&self) -> Result<WorkflowOutcome, SessionError> {
        let messages = &self.config.messages;
        let Some(handle) =
            self.single_selection(self.book_selection.as_ref(), &messages.select_one_book)
        else {
            return Ok(WorkflowOutcome::Aborted);
        };

        if self.notifier.confirm(&messages.confirm_book_delete).await == ConfirmOutcome::Cancel {
            return Ok(WorkflowOutcome::Cancelled);
        }

        let result = self.gateway.delete_entity(&handle).await;
        let outcome = self.report(result, &messages.book_deleted);
        self.rebind_books().await;
        Ok(outcome)
    }
}

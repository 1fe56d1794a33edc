//! Author selection and the author-scoped book view
//!
//! A predicate change (another author) re-binds the book view; a data change
//! under the same predicate only refreshes it. No selected author means no
//! book binding at all.

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::EditingSession;
use crate::gateway::{CollectionView, Filter};
use crate::model::columns;

/// Filters scoping the book view to one author's live books
pub fn book_filters(author_id: Uuid) -> Vec<Filter> {
    vec![
        Filter::eq(columns::AUTHOR_ID, author_id.to_string()),
        Filter::eq(columns::IS_DELETED, false),
    ]
}

impl EditingSession {
    /// Handle a selection change in the author table
    ///
    /// Exactly one selected row scopes the book view to that author; anything
    /// else clears the selected author and unbinds the book view. Reselecting
    /// the author whose books are already bound leaves the view untouched.
    pub async fn author_selection_changed(&self) {
        let selected = self.author_selection.selected();
        let author = match selected.as_slice() {
            [only] => Some(only.id),
            _ => None,
        };

        {
            let state = self.state.lock().await;
            if author.is_some() && state.selected_author == author && state.book_view.is_some() {
                debug!("Author selection unchanged, book view kept");
                return;
            }
        }
        self.scope_books_to(author).await;
    }

    /// Record `author` as the selected author and re-bind (or unbind) books
    pub(crate) async fn scope_books_to(&self, author: Option<Uuid>) {
        let previous = {
            let mut state = self.state.lock().await;
            state.selected_author = author;
            state.book_view.take()
        };
        if let Some(view) = previous {
            self.release_view(&view).await;
        }

        let Some(author_id) = author else {
            info!("No author selected, book view unbound");
            return;
        };

        match self
            .gateway
            .bind_collection(&self.config.collections.books, book_filters(author_id))
            .await
        {
            Ok(view) => {
                debug!(%author_id, view = view.id.0, "Book view bound");
                self.state.lock().await.book_view = Some(view);
            }
            Err(e) => {
                warn!(%author_id, error = %e, "Book view bind failed");
                self.notifier.error(&e.message());
            }
        }
    }

    /// Re-bind the book view under the current author scope
    pub(crate) async fn rebind_books(&self) {
        let author = self.state.lock().await.selected_author;
        self.scope_books_to(author).await;
    }

    /// Refresh the book view under its unchanged predicate
    pub(crate) async fn refresh_books(&self) {
        let view = self.state.lock().await.book_view.clone();
        match view {
            Some(view) => {
                if let Err(e) = self.gateway.refresh(&view).await {
                    warn!(error = %e, "Book view refresh failed");
                }
            }
            None => debug!("Book view not bound, nothing to refresh"),
        }
    }

    async fn release_view(&self, view: &CollectionView) {
        if let Err(e) = self.gateway.unbind_collection(view).await {
            warn!(view = view.id.0, error = %e, "Book view unbind failed");
        }
    }
}

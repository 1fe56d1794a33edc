//! Shared fixture for session workflow tests
//!
//! Wires an `EditingSession` to the in-process collaborators and keeps typed
//! handles on each so tests can drive the "user" and inspect every call.

#![allow(dead_code)]

use std::sync::Arc;

use bookshop_editor::{
    telemetry, Book, Collaborators, EditingSession, EditorConfig, EntityGateway, EntityHandle,
    GatewayCall, GatewayOp, InMemoryGateway, InMemoryPresenter, RecordingNotifier, StaticSelection,
    ViewId,
};
use uuid::Uuid;

pub struct Fixture {
    pub gateway: Arc<InMemoryGateway>,
    pub presenter: Arc<InMemoryPresenter>,
    pub notifier: Arc<RecordingNotifier>,
    pub authors: Arc<StaticSelection>,
    pub books: Arc<StaticSelection>,
    pub session: EditingSession,
}

impl Fixture {
    /// Attach a session; the call log starts empty
    pub async fn new() -> Self {
        Self::with_config(EditorConfig::default()).await
    }

    pub async fn with_config(config: EditorConfig) -> Self {
        telemetry::init_tracing();

        let gateway = Arc::new(InMemoryGateway::default());
        let presenter = Arc::new(InMemoryPresenter::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let authors = Arc::new(StaticSelection::new());
        let books = Arc::new(StaticSelection::new());

        let gateway_dyn: Arc<dyn EntityGateway> = gateway.clone();
        let collaborators = Collaborators {
            gateway: gateway_dyn,
            presenter: presenter.clone(),
            notifier: notifier.clone(),
            author_selection: authors.clone(),
            book_selection: books.clone(),
        };
        let session = EditingSession::attach(collaborators, config)
            .await
            .unwrap();
        gateway.clear_calls();

        Self {
            gateway,
            presenter,
            notifier,
            authors,
            books,
            session,
        }
    }

    pub fn seed_book(&self, author: &EntityHandle, title: &str, stock: u32) -> EntityHandle {
        self.gateway.seed_book(&Book {
            id: Uuid::new_v4(),
            author_id: author.id,
            title: title.to_string(),
            descr: String::new(),
            stock,
            price: "9.99".to_string(),
            currency_code: "EUR".to_string(),
            is_deleted: false,
        })
    }

    /// Select one author row and let the session re-scope the book view
    pub async fn select_author(&self, author: &EntityHandle) {
        self.authors.select(author.clone());
        self.session.author_selection_changed().await;
    }

    pub fn author_view(&self) -> ViewId {
        self.session.author_view().id
    }

    /// Refresh calls against one view
    pub fn refreshes_of(&self, view: ViewId) -> usize {
        self.gateway
            .calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::Refresh { view: v } if *v == view))
            .count()
    }

    pub fn commits(&self) -> Vec<GatewayCall> {
        self.gateway
            .calls()
            .into_iter()
            .filter(|c| c.op() == GatewayOp::Commit)
            .collect()
    }
}

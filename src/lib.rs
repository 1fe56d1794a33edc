//! Bookshop Editor - Editing Session Core
//!
//! Coordinates creating, editing and removing authors and their books against
//! a remote entity service. The core owns dialog lifecycle state, the
//! currently edited entity and the currently selected author; everything
//! visual lives behind collaborator traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Host UI events (add / edit / delete / confirm / select)        │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    EditingSession                                │
//! │       dialog slots · pending edit · selected author              │
//! └─────────────────────────────────────────────────────────────────┘
//!          │                    │                     │
//!          ▼                    ▼                     ▼
//! ┌────────────────┐  ┌──────────────────┐  ┌──────────────────────┐
//! │ EntityGateway  │  │ DialogPresenter  │  │ Notifier / Selection │
//! └────────────────┘  └──────────────────┘  └──────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use bookshop_editor::{Collaborators, EditingSession, EditorConfig};
//!
//! let session = EditingSession::attach(collaborators, EditorConfig::default()).await?;
//! session.open_author_create().await?;
//! // ... user fills the dialog ...
//! session.confirm_author_dialog().await?;
//! ```

pub mod collaborators;
pub mod config;
pub mod error;
pub mod fields;
pub mod gateway;
pub mod model;
pub mod session;
pub mod telemetry;

// Re-export main types
pub use collaborators::{
    ChannelNotifier, ConfirmOutcome, DialogHandle, DialogKind, DialogPresenter, InMemoryPresenter,
    Notice, NoticeSeverity, Notifier, NotifierRequest, RecordingNotifier, SelectionProvider,
    StaticSelection,
};
pub use config::{CollectionNames, EditorConfig, Messages};
pub use error::{GatewayError, PresenterError, SessionError};
pub use fields::{FieldDescriptor, FieldKind, FieldValue, FormValues, AUTHOR_FIELDS, BOOK_FIELDS};
pub use gateway::{
    CollectionView, EntityGateway, EntityHandle, Filter, GatewayCall, GatewayOp, InMemoryGateway,
    Record, ViewId,
};
pub use model::{Author, AuthorDraft, Book, BookDraft};
pub use session::{
    book_filters, Collaborators, DialogMode, DialogState, EditingSession, WorkflowOutcome,
};

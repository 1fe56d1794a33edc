//! Error types for the editing session and its collaborators
//!
//! Remote rejections are data for the workflows (they end up in an error
//! notice), while `SessionError` is reserved for broken preconditions and
//! collaborator faults that keep a dialog from being shown at all.

use thiserror::Error;
use uuid::Uuid;

use crate::collaborators::DialogKind;
use crate::session::DialogState;

/// Errors surfaced by the remote entity gateway
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The service refused the operation; the message is user-presentable
    #[error("{0}")]
    Rejected(String),

    #[error("{collection}({id}) not found")]
    NotFound { collection: String, id: Uuid },

    #[error("Unknown collection view {0}")]
    UnknownView(u64),
}

impl GatewayError {
    /// Human-readable message for an error notice
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Errors surfaced by the dialog presenter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PresenterError {
    #[error("Failed to load {kind} dialog: {message}")]
    Load { kind: DialogKind, message: String },

    #[error("Dialog handle {0} is not known to the presenter")]
    UnknownHandle(u64),

    #[error("Dialog field '{field}' does not exist")]
    UnknownField { field: String },
}

/// Errors returned by `EditingSession` entry points
#[derive(Error, Debug)]
pub enum SessionError {
    /// A second open was attempted while the dialog is still loading or shown
    #[error("{kind} dialog is already {state:?}")]
    DialogBusy { kind: DialogKind, state: DialogState },

    /// Confirm or cancel fired without an open dialog to read from
    #[error("{kind} dialog is not open")]
    DialogNotOpen { kind: DialogKind },

    /// An edit of another record is still pending in an open dialog
    #[error("An edit in the {kind} dialog is still pending")]
    EditPending { kind: DialogKind },

    #[error("Presenter error: {0}")]
    Presenter(#[from] PresenterError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

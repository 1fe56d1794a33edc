//! Host-provided collaborators
//!
//! The session drives dialogs, notifications and selections only through
//! these traits. Each seam also ships an in-process implementation.

pub mod notifier;
pub mod presenter;
pub mod selection;

pub use notifier::{
    ChannelNotifier, ConfirmOutcome, Notice, NoticeSeverity, Notifier, NotifierRequest,
    RecordingNotifier,
};
pub use presenter::{DialogHandle, DialogKind, DialogPresenter, InMemoryPresenter, PresenterEvent};
pub use selection::{SelectionProvider, StaticSelection};

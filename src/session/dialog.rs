//! Dialog lifecycle state machine
//!
//! One slot per dialog kind:
//!
//! ```text
//!   Closed ──open──▶ Loading ──loaded/prefilled──▶ Open ──confirm──▶ Submitting
//!     ▲                 │                           │                   │
//!     └──── failed ─────┘◀─────────── cancel ───────┘                   │
//!     └─────────────────────── close + destroy ─────────────────────────┘
//! ```
//!
//! Cancel keeps the loaded handle cached for the next open; confirm tears the
//! dialog down and clears the cache, so the next open loads it again.

use uuid::Uuid;

use crate::collaborators::{DialogHandle, DialogKind};
use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Loading,
    Open,
    /// Confirm fired; the remote work runs before teardown
    Submitting,
}

/// What the dialog was opened for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit,
}

#[derive(Debug)]
pub(crate) struct DialogSlot {
    kind: DialogKind,
    state: DialogState,
    mode: Option<DialogMode>,
    /// Owning author captured at open, for dialogs that create scoped records
    scope: Option<Uuid>,
    cached: Option<DialogHandle>,
}

impl DialogSlot {
    pub(crate) fn new(kind: DialogKind) -> Self {
        Self {
            kind,
            state: DialogState::Closed,
            mode: None,
            scope: None,
            cached: None,
        }
    }

    pub(crate) fn state(&self) -> DialogState {
        self.state
    }

    pub(crate) fn mode(&self) -> Option<DialogMode> {
        self.mode
    }

    pub(crate) fn scope(&self) -> Option<Uuid> {
        self.scope
    }

    /// Closed → Loading. Hands out the cached handle, if any.
    pub(crate) fn begin_open(
        &mut self,
        mode: DialogMode,
        scope: Option<Uuid>,
    ) -> Result<Option<DialogHandle>, SessionError> {
        match self.state {
            DialogState::Closed => {
                self.state = DialogState::Loading;
                self.mode = Some(mode);
                self.scope = scope;
                Ok(self.cached.take())
            }
            state => Err(SessionError::DialogBusy {
                kind: self.kind,
                state,
            }),
        }
    }

    /// Loading → Open
    pub(crate) fn finish_open(&mut self, dialog: DialogHandle) {
        debug_assert_eq!(self.state, DialogState::Loading);
        self.state = DialogState::Open;
        self.cached = Some(dialog);
    }

    /// Loading → Closed after a failed load, prefill or open.
    /// A handle that did load stays cached.
    pub(crate) fn abort_open(&mut self, dialog: Option<DialogHandle>) {
        self.state = DialogState::Closed;
        self.mode = None;
        self.scope = None;
        self.cached = dialog;
    }

    /// Open → Submitting
    pub(crate) fn begin_submit(&mut self) -> Result<(DialogHandle, DialogMode), SessionError> {
        match (self.state, &self.cached, self.mode) {
            (DialogState::Open, Some(dialog), Some(mode)) => {
                self.state = DialogState::Submitting;
                Ok((dialog.clone(), mode))
            }
            _ => Err(SessionError::DialogNotOpen { kind: self.kind }),
        }
    }

    /// Submitting → Closed, dropping the cached handle
    pub(crate) fn finish_submit(&mut self) -> Option<DialogHandle> {
        self.state = DialogState::Closed;
        self.mode = None;
        self.scope = None;
        self.cached.take()
    }

    /// Open → Closed, keeping the handle cached
    pub(crate) fn cancel(&mut self) -> Result<DialogHandle, SessionError> {
        match (self.state, &self.cached) {
            (DialogState::Open, Some(dialog)) => {
                self.state = DialogState::Closed;
                self.mode = None;
                self.scope = None;
                Ok(dialog.clone())
            }
            _ => Err(SessionError::DialogNotOpen { kind: self.kind }),
        }
    }
}

//! Notification seam
//!
//! Two severities (transient toast, blocking error) plus a two-outcome
//! confirmation prompt. Confirmation is a future the host resolves, so the
//! session never depends on callback binding.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    /// Transient informational toast
    Info,
    /// Blocking error dialog
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub message: String,
}

/// User answer to a confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirm,
    Cancel,
}

/// Notification collaborator provided by the host UI
#[async_trait]
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);

    fn error(&self, message: &str);

    /// Ask the user to confirm; resolves once they answer
    async fn confirm(&self, prompt: &str) -> ConfirmOutcome;
}

/// Request forwarded by `ChannelNotifier` to the host UI loop
#[derive(Debug)]
pub enum NotifierRequest {
    Notice(Notice),
    Confirm {
        prompt: String,
        reply: oneshot::Sender<ConfirmOutcome>,
    },
}

/// Notifier that forwards everything over a channel to the UI loop
///
/// A confirm whose reply sender is dropped, or sent after the UI loop has
/// gone away, resolves to `Cancel`.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<NotifierRequest>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NotifierRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn notice(&self, severity: NoticeSeverity, message: &str) {
        let _ = self.tx.send(NotifierRequest::Notice(Notice {
            severity,
            message: message.to_string(),
        }));
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    fn info(&self, message: &str) {
        self.notice(NoticeSeverity::Info, message);
    }

    fn error(&self, message: &str) {
        self.notice(NoticeSeverity::Error, message);
    }

    async fn confirm(&self, prompt: &str) -> ConfirmOutcome {
        let (reply, answer) = oneshot::channel();
        let request = NotifierRequest::Confirm {
            prompt: prompt.to_string(),
            reply,
        };
        if self.tx.send(request).is_err() {
            return ConfirmOutcome::Cancel;
        }
        answer.await.unwrap_or(ConfirmOutcome::Cancel)
    }
}

/// Notifier that records notices and answers prompts from a script
///
/// With no scripted answer left, prompts are cancelled.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
    prompts: Mutex<Vec<String>>,
    answers: Mutex<VecDeque<ConfirmOutcome>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next prompt
    pub fn answer_next(&self, outcome: ConfirmOutcome) {
        self.answers.lock().unwrap().push_back(outcome);
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages(NoticeSeverity::Info)
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(NoticeSeverity::Error)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn messages(&self, severity: NoticeSeverity) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.severity == severity)
            .map(|n| n.message.clone())
            .collect()
    }

    fn push(&self, severity: NoticeSeverity, message: &str) {
        self.notices.lock().unwrap().push(Notice {
            severity,
            message: message.to_string(),
        });
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.push(NoticeSeverity::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(NoticeSeverity::Error, message);
    }

    async fn confirm(&self, prompt: &str) -> ConfirmOutcome {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ConfirmOutcome::Cancel)
    }
}

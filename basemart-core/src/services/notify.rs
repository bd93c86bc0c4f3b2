//! Non-blocking notices ("toasts") for the UI layer.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

const NOTICE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

/// Fan-out of notices. Publishing never blocks nor fails when nobody is
/// listening.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notice>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(NOTICE_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    pub fn notify(&self, level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) {
        let notice = Notice {
            level,
            title: title.into(),
            message: message.into(),
        };
        if self.sender.send(notice).is_err() {
            debug!("Notice dropped, no subscriber");
        }
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(NoticeLevel::Info, title, message);
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(NoticeLevel::Success, title, message);
    }

    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(NoticeLevel::Warning, title, message);
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(NoticeLevel::Error, title, message);
    }
}

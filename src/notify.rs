//! User-facing notifications. Components push notices through a shared
//! handle; whatever surface hosts the core (UI, CLI, tests) drains the
//! receiving end.

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// One transient, user-visible message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

/// Cloneable sending handle for notices.
#[derive(Debug, Clone)]
pub struct Notices {
    tx: mpsc::UnboundedSender<Notice>,
}

impl Notices {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn info(&self, title: impl Into<String>, body: impl Into<String>) {
        self.push(NoticeKind::Info, title.into(), body.into());
    }

    pub fn error(&self, title: impl Into<String>, body: impl Into<String>) {
        self.push(NoticeKind::Error, title.into(), body.into());
    }

    fn push(&self, kind: NoticeKind, title: String, body: String) {
        // A dropped receiver just means nobody is showing notices anymore.
        if self.tx.send(Notice { kind, title, body }).is_err() {
            tracing::debug!("notice dropped, receiver closed");
        }
    }
}

// User-facing notices (toasts).
//
// Failed actions are always surfaced through a NoticeSink; nothing is swallowed
// except draft discard failures, which never reach this module.

use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait NoticeSink: Send + Sync {
    fn push(&self, notice: Notice);
}

/// Collects notices for a view to render, and for tests to inspect.
#[derive(Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl NoticeSink for NoticeLog {
    fn push(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

/// Sink for headless use: notices become log lines.
pub struct TracingNotices;

impl NoticeSink for TracingNotices {
    fn push(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(message = %notice.message, "notice"),
            NoticeLevel::Warning => tracing::warn!(message = %notice.message, "notice"),
            NoticeLevel::Error => tracing::error!(message = %notice.message, "notice"),
        }
    }
}

#[cfg(test)]
mod notice_log_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_keep_notices_in_order_until_drained() {
        let log = NoticeLog::new();
        log.push(Notice::success("saved"));
        log.push(Notice::error("failed"));
        assert_eq!(log.snapshot().len(), 2);

        let drained = log.drain();
        assert_eq!(drained[0], Notice::success("saved"));
        assert_eq!(drained[1].level, NoticeLevel::Error);
        assert!(log.snapshot().is_empty());
    }
}

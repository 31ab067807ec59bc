use serde::Serialize;
use tokio::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Failure,
}

/// One user-facing result message
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            message: message.into(),
        }
    }
}

/// Holds the latest notice.
///
/// While a quote is pending the notice stays up; otherwise it disappears
/// `display` after it was posted.
#[derive(Debug)]
pub struct NoticeBoard {
    current: Option<(Notice, Instant)>,
    display: Duration,
}

impl NoticeBoard {
    pub fn new(display: Duration) -> Self {
        Self { current: None, display }
    }

    pub fn post(&mut self, notice: Notice) {
        self.current = Some((notice, Instant::now()));
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn visible(&self, has_pending: bool) -> Option<Notice> {
        let (notice, posted_at) = self.current.as_ref()?;
        if has_pending || posted_at.elapsed() < self.display {
            Some(notice.clone())
        } else {
            None
        }
    }
}

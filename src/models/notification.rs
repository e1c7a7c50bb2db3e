use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    ForcedPunchOut,
    PunchConfirmed,
    SyncSucceeded,
    SyncFailed,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ForcedPunchOut => "forced_punch_out",
            NotificationKind::PunchConfirmed => "punch_confirmed",
            NotificationKind::SyncSucceeded => "sync_succeeded",
            NotificationKind::SyncFailed => "sync_failed",
        }
    }
}

/// A user-visible, fire-and-forget message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.body)
    }
}

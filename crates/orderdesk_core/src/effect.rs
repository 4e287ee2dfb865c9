use crate::OutboundMessage;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Post a message to the host page.
    Post(OutboundMessage),
    /// Show a transient notification.
    Notify(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    pub duration_ms: u32,
}

impl Notice {
    pub fn new(text: impl Into<String>, kind: NoticeKind, duration_ms: u32) -> Self {
        Self {
            text: text.into(),
            kind,
            duration_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Ok,
    Info,
    Err,
}

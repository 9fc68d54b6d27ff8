use std::time::{Duration, Instant};

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub text: String,
    pub expires_at: Instant,
}

/// Transient user-facing messages. Each one is visible for a fixed duration
/// after it is posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notifications {
    ttl: Duration,
    items: Vec<Notification>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            items: Vec::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push_at(NoticeKind::Info, text.into(), Instant::now());
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push_at(NoticeKind::Success, text.into(), Instant::now());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push_at(NoticeKind::Error, text.into(), Instant::now());
    }

    pub fn push_at(&mut self, kind: NoticeKind, text: String, now: Instant) {
        self.prune(now);
        self.items.push(Notification {
            kind,
            text,
            expires_at: now + self.ttl,
        });
    }

    /// Notifications still visible at `now`, oldest first.
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(move |item| item.expires_at > now)
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|item| item.expires_at > now);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// One of the two notification destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Guest,
    Admin,
}

impl Channel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-side metadata attached to an outgoing email.
#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub name: &'static str,
    pub value: String,
}

/// Rendered subject/body pair for one channel, derived purely from a submission.
#[derive(Debug, Clone)]
pub struct NotificationPayload {
    pub subject: String,
    pub html: String,
    pub tags: Vec<Tag>,
}

/// Terminal outcome of one channel's delivery, after retries.
#[derive(Debug, Clone)]
pub enum DeliveryResult {
    Delivered { provider_id: String, attempts: u32 },
    Failed { error: String, attempts: u32 },
}

impl DeliveryResult {
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Delivered { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Delivered { provider_id: String },
    Failed { error: String },
}

/// Record of a single provider call, surfaced to the event sink only.
#[derive(Debug, Clone)]
pub struct DeliveryAttempt {
    pub channel: Channel,
    pub attempt: u32,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}

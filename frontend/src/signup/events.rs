use super::models::LedgerSnapshot;
use super::verification::Step;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

impl NotificationKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            NotificationKind::Info => "notification-info",
            NotificationKind::Success => "notification-success",
            NotificationKind::Error => "notification-error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: NotificationKind::Info }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: NotificationKind::Success }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: NotificationKind::Error }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterUpdate {
    pub registered_count: u64,
    pub remaining_slots: u64,
}

impl From<&LedgerSnapshot> for CounterUpdate {
    fn from(snapshot: &LedgerSnapshot) -> Self {
        Self {
            registered_count: snapshot.registered_count,
            remaining_slots: snapshot.remaining_slots,
        }
    }
}

/// What the page has to react to after a signup operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignupEvent {
    Notify(Notification),
    CountersChanged(CounterUpdate),
    StepChanged(Step),
}

//! Transient user notifications and the sink they are delivered to.

use std::sync::mpsc;

use crate::error::FetchError;

/// How long a host should keep a notification on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLength {
    Short,
    Long,
}

/// A short-lived, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    InProgress,
    Success,
    Error(String),
}

impl Notification {
    /// Build the error notification for a failed fetch.
    pub fn from_error(err: &FetchError) -> Self {
        match err {
            FetchError::Transport(e) => Notification::Error(format!("Error fetching data: {e}")),
            FetchError::MalformedResponse(msg) => {
                Notification::Error(format!("Error parsing data: {msg}"))
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notification::InProgress => "Fetching data...",
            Notification::Success => "Data fetched successfully!",
            Notification::Error(msg) => msg,
        }
    }

    pub fn length(&self) -> NotificationLength {
        match self {
            Notification::Error(_) => NotificationLength::Long,
            _ => NotificationLength::Short,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }
}

/// Receives notifications from the controller.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

impl<F> Notifier for F
where
    F: FnMut(Notification),
{
    fn notify(&mut self, notification: Notification) {
        self(notification)
    }
}

/// Forward over a channel. A hung-up receiver means the screen is gone, so
/// the notification is dropped.
impl Notifier for mpsc::Sender<Notification> {
    fn notify(&mut self, notification: Notification) {
        if self.send(notification).is_err() {
            tracing::debug!("notification receiver dropped");
        }
    }
}

//! Notification sync state.
//!
//! Read-state mutations are optimistic: the local mark is applied first and
//! is never rolled back if the confirming API call fails.  The unread count
//! is derived on every call, never cached.

use chrono::{DateTime, Utc};
use tracing::debug;

use inkstream_shared::{Notification, NotificationId, UserId};

/// The current user's notification list.
#[derive(Debug, Clone, Default)]
pub struct NotificationState {
    items: Vec<Notification>,
}

impl NotificationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with an authoritative payload.
    pub fn apply_list(&mut self, notifications: Vec<Notification>) {
        debug!(count = notifications.len(), "Applied notification list");
        self.items = notifications;
    }

    /// Mark one notification read for the given recipient.
    ///
    /// Monotone: an existing read timestamp is never overwritten.
    pub fn mark_read(&mut self, id: NotificationId, user: UserId, at: DateTime<Utc>) {
        let Some(notification) = self.items.iter_mut().find(|n| n.id == id) else {
            return;
        };
        for recipient in notification
            .recipients
            .iter_mut()
            .filter(|r| r.user_id == user)
        {
            if recipient.read_at.is_none() {
                recipient.read_at = Some(at);
            }
        }
    }

    /// Mark every notification read for the given recipient, all with the
    /// same timestamp.  Other recipients' read state is untouched.
    pub fn mark_all_read(&mut self, user: UserId, at: DateTime<Utc>) {
        for notification in &mut self.items {
            for recipient in notification
                .recipients
                .iter_mut()
                .filter(|r| r.user_id == user)
            {
                if recipient.read_at.is_none() {
                    recipient.read_at = Some(at);
                }
            }
        }
    }

    /// Remove a notification by id.  Idempotent.
    pub fn remove(&mut self, id: NotificationId) {
        self.items.retain(|n| n.id != id);
    }

    /// Derived unread count for the given recipient.
    pub fn unread_count(&self, user: UserId) -> usize {
        self.items.iter().filter(|n| n.is_unread_for(user)).count()
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    /// Drop everything (logout).
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

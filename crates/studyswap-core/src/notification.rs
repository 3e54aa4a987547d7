//! Notifications — the durable record of things a user should know.
//!
//! Created exactly once by the dispatcher; the only permitted mutation is
//! the unread → read flip. Deletion is reserved to the owning user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed vocabulary of notification kinds. Title/message templating lives
/// in the dispatcher, so new kinds never touch the match state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
  UserPromoted,
  MaterialApproved,
  MaterialRejected,
  MatchCompleted,
  MatchRequestReceived,
  System,
}

/// A persisted notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id:   Uuid,
  pub user_id:           Uuid,
  pub kind:              NotificationKind,
  pub title:             String,
  pub message:           String,
  /// Free-text pointer at whatever entity the notification is about
  /// (match id, material id, ...). Opaque to this crate.
  pub related_entity_id: String,
  pub read:              bool,
  pub created_at:        DateTime<Utc>,
}

impl Notification {
  /// Functional update — the only permitted mutation.
  pub fn mark_read(self) -> Self { Self { read: true, ..self } }
}

/// Input to [`crate::store::NotificationStore::save_notification`]. The
/// store assigns the id; notifications are born unread.
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub user_id:           Uuid,
  pub kind:              NotificationKind,
  pub title:             String,
  pub message:           String,
  pub related_entity_id: String,
  pub created_at:        DateTime<Utc>,
}

impl NewNotification {
  pub fn new(
    user_id: Uuid,
    kind: NotificationKind,
    title: impl Into<String>,
    message: impl Into<String>,
    related_entity_id: impl Into<String>,
  ) -> Self {
    Self {
      user_id,
      kind,
      title: title.into(),
      message: message.into(),
      related_entity_id: related_entity_id.into(),
      created_at: Utc::now(),
    }
  }

  /// Materialise the persisted form.
  pub fn into_notification(self, notification_id: Uuid) -> Notification {
    Notification {
      notification_id,
      user_id: self.user_id,
      kind: self.kind,
      title: self.title,
      message: self.message,
      related_entity_id: self.related_entity_id,
      read: false,
      created_at: self.created_at,
    }
  }
}

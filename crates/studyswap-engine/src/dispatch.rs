//! NotificationDispatcher — persist, then best-effort live + email push.
//!
//! The persisted record is the source of truth: the operation succeeds
//! once the store write lands, whatever happens to the live stream or the
//! mail collaborator afterwards. Title/message templating for each
//! notification kind lives here, outside the match state machine.

use std::{future::Future, sync::Arc};

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use studyswap_core::{
  Result,
  notification::{NewNotification, Notification, NotificationKind},
  store::{NotificationStore, UserStore},
};

use crate::fanout::NotificationFanout;

// ─── Mail boundary ───────────────────────────────────────────────────────────

/// Failure from the mail collaborator. Logged by the dispatcher, never
/// surfaced to callers.
#[derive(Debug, Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

/// The outbound-mail collaborator. Message formatting beyond a subject
/// line and plain-text body is the implementation's concern.
pub trait Mailer: Send + Sync + 'static {
  fn send<'a>(
    &'a self,
    to: &'a str,
    subject_line: &'a str,
    body: &'a str,
  ) -> impl Future<Output = Result<(), MailError>> + Send + 'a;
}

// ─── Dispatcher ──────────────────────────────────────────────────────────────

pub struct NotificationDispatcher<S, M> {
  store:  Arc<S>,
  fanout: Arc<NotificationFanout>,
  mailer: Arc<M>,
}

impl<S, M> NotificationDispatcher<S, M>
where
  S: NotificationStore + UserStore + 'static,
  M: Mailer,
{
  pub fn new(store: Arc<S>, fanout: Arc<NotificationFanout>, mailer: Arc<M>) -> Self {
    Self {
      store,
      fanout,
      mailer,
    }
  }

  /// Persist the notification, push it to the live fanout, and hand it to
  /// the mailer in the background. Only the persist step can fail.
  pub async fn dispatch(&self, input: NewNotification) -> Result<Notification> {
    let saved = self.store.save_notification(input).await?;
    info!(
      user_id = %saved.user_id,
      kind = ?saved.kind,
      title = %saved.title,
      "notification created"
    );

    self.fanout.emit(saved.user_id, saved.clone());
    self.send_email(saved.clone());

    Ok(saved)
  }

  /// Fire-and-forget email, spawned so a slow mail collaborator can never
  /// block the caller. Lookup and delivery failures are logged only.
  fn send_email(&self, notification: Notification) {
    let store = Arc::clone(&self.store);
    let mailer = Arc::clone(&self.mailer);
    tokio::spawn(async move {
      let user = match store.get_user(notification.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
          warn!(user_id = %notification.user_id, "email skipped, user not found");
          return;
        }
        Err(e) => {
          warn!(
            user_id = %notification.user_id,
            error = %e,
            "email skipped, user lookup failed"
          );
          return;
        }
      };

      if let Err(e) = mailer
        .send(&user.email, &notification.title, &notification.message)
        .await
      {
        warn!(
          user_id = %notification.user_id,
          error = %e,
          "email delivery failed, durable record stands"
        );
      }
    });
  }

  // ── Typed helpers ─────────────────────────────────────────────────────

  pub async fn notify_match_request_received(
    &self,
    user_id: Uuid,
    requester_nickname: &str,
    match_id: Uuid,
  ) -> Result<Notification> {
    self
      .dispatch(NewNotification::new(
        user_id,
        NotificationKind::MatchRequestReceived,
        "New match request",
        format!(
          "{requester_nickname} wants to exchange study materials with you."
        ),
        match_id.to_string(),
      ))
      .await
  }

  pub async fn notify_match_accepted(
    &self,
    user_id: Uuid,
    match_id: Uuid,
  ) -> Result<Notification> {
    self
      .dispatch(NewNotification::new(
        user_id,
        NotificationKind::System,
        "Match accepted",
        "Your match request was accepted. Complete the exchange once you \
         have traded materials.",
        match_id.to_string(),
      ))
      .await
  }

  pub async fn notify_match_rejected(
    &self,
    user_id: Uuid,
    match_id: Uuid,
  ) -> Result<Notification> {
    self
      .dispatch(NewNotification::new(
        user_id,
        NotificationKind::System,
        "Match declined",
        "Your match request was declined.",
        match_id.to_string(),
      ))
      .await
  }

  pub async fn notify_match_completed(
    &self,
    user_id: Uuid,
    partner_nickname: &str,
    match_id: Uuid,
  ) -> Result<Notification> {
    self
      .dispatch(NewNotification::new(
        user_id,
        NotificationKind::MatchCompleted,
        "Match completed",
        format!(
          "Your exchange with {partner_nickname} is complete. You can now \
           view their material."
        ),
        match_id.to_string(),
      ))
      .await
  }

  pub async fn notify_user_promoted(
    &self,
    user_id: Uuid,
  ) -> Result<Notification> {
    self
      .dispatch(NewNotification::new(
        user_id,
        NotificationKind::UserPromoted,
        "Account upgraded",
        "Congratulations! Your account has been upgraded.",
        user_id.to_string(),
      ))
      .await
  }

  pub async fn notify_material_approved(
    &self,
    user_id: Uuid,
    material_title: &str,
    material_id: Uuid,
  ) -> Result<Notification> {
    self
      .dispatch(NewNotification::new(
        user_id,
        NotificationKind::MaterialApproved,
        "Material approved",
        format!("Your upload '{material_title}' was approved."),
        material_id.to_string(),
      ))
      .await
  }

  pub async fn notify_material_rejected(
    &self,
    user_id: Uuid,
    material_title: &str,
    reason: &str,
    material_id: Uuid,
  ) -> Result<Notification> {
    self
      .dispatch(NewNotification::new(
        user_id,
        NotificationKind::MaterialRejected,
        "Material rejected",
        format!("Your upload '{material_title}' was rejected: {reason}"),
        material_id.to_string(),
      ))
      .await
  }
}

#[cfg(test)]
mod tests {
  use tokio_stream::StreamExt;

  use super::*;
  use studyswap_core::user::NewUser;
  use studyswap_store_memory::MemoryStore;

  struct NoopMailer;

  impl Mailer for NoopMailer {
    async fn send(
      &self,
      _to: &str,
      _subject_line: &str,
      _body: &str,
    ) -> Result<(), MailError> {
      Ok(())
    }
  }

  fn dispatcher(
    store: Arc<MemoryStore>,
    fanout: Arc<NotificationFanout>,
  ) -> NotificationDispatcher<MemoryStore, NoopMailer> {
    NotificationDispatcher::new(store, fanout, Arc::new(NoopMailer))
  }

  #[tokio::test]
  async fn dispatch_persists_and_emits() {
    let store = Arc::new(MemoryStore::new());
    let fanout = Arc::new(NotificationFanout::new());
    let d = dispatcher(Arc::clone(&store), Arc::clone(&fanout));

    let user = store
      .save_user(NewUser {
        email:    "user@example.com".into(),
        nickname: "user".into(),
      })
      .await
      .unwrap();
    let mut stream = fanout.subscribe(user.user_id);

    let saved = d
      .dispatch(NewNotification::new(
        user.user_id,
        NotificationKind::System,
        "hello",
        "body",
        "related",
      ))
      .await
      .unwrap();
    assert!(!saved.read);

    // Durable record plus live delivery.
    let stored = store
      .get_notification(saved.notification_id)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(stored.title, "hello");
    let live = stream.next().await.unwrap();
    assert_eq!(live.notification_id, saved.notification_id);
  }

  #[tokio::test]
  async fn typed_helpers_pick_their_kind() {
    let store = Arc::new(MemoryStore::new());
    let fanout = Arc::new(NotificationFanout::new());
    let d = dispatcher(Arc::clone(&store), fanout);

    let user = store
      .save_user(NewUser {
        email:    "user@example.com".into(),
        nickname: "user".into(),
      })
      .await
      .unwrap();
    let material_id = uuid::Uuid::new_v4();

    let n = d
      .notify_material_approved(user.user_id, "CS201 notes", material_id)
      .await
      .unwrap();
    assert_eq!(n.kind, NotificationKind::MaterialApproved);
    assert_eq!(n.related_entity_id, material_id.to_string());

    let n = d
      .notify_material_rejected(
        user.user_id,
        "CS201 notes",
        "duplicate upload",
        material_id,
      )
      .await
      .unwrap();
    assert_eq!(n.kind, NotificationKind::MaterialRejected);

    let n = d.notify_user_promoted(user.user_id).await.unwrap();
    assert_eq!(n.kind, NotificationKind::UserPromoted);

    assert_eq!(
      store.count_unread_notifications(user.user_id).await.unwrap(),
      3
    );
  }
}

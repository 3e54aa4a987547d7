//! NotificationFanout — per-user multicast of live notifications.
//!
//! One bounded broadcast channel per user, created lazily on first
//! subscription and shared by every concurrent connection for that user
//! (multi-device). The registry is process-local and is the only shared
//! mutable state in the engine; durable delivery is the dispatcher's
//! concern, so anything dropped here is still readable from the store.

use std::{
  pin::Pin,
  task::{Context, Poll},
};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio_stream::{
  Stream,
  wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};
use tracing::{debug, warn};
use uuid::Uuid;

use studyswap_core::notification::Notification;

/// Per-user buffer bound. Slow consumers lose the oldest items beyond
/// this; the producer never blocks.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

// ─── Registry ────────────────────────────────────────────────────────────────

/// The subscriber registry. Construct one per process and inject it
/// wherever emission or subscription is needed — tests get an isolated
/// instance the same way.
pub struct NotificationFanout {
  channels: DashMap<Uuid, broadcast::Sender<Notification>>,
  capacity: usize,
}

impl NotificationFanout {
  pub fn new() -> Self { Self::with_capacity(DEFAULT_CHANNEL_CAPACITY) }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      channels: DashMap::new(),
      capacity,
    }
  }

  /// Open a live stream for `user_id`, creating the shared channel lazily.
  /// Every concurrent stream for the same user receives every emission
  /// independently.
  pub fn subscribe(&self, user_id: Uuid) -> NotificationStream {
    let receiver = self
      .channels
      .entry(user_id)
      .or_insert_with(|| broadcast::channel(self.capacity).0)
      .subscribe();
    debug!(%user_id, "notification stream subscribed");
    NotificationStream {
      user_id,
      inner: BroadcastStream::new(receiver),
    }
  }

  /// Non-blocking publish to every live connection of `user_id`. An
  /// offline user (no channel) is a silent no-op; a channel nobody is
  /// reading anymore logs and drops — the durable record still stands.
  pub fn emit(&self, user_id: Uuid, notification: Notification) {
    let Some(sender) = self.channels.get(&user_id) else {
      debug!(%user_id, "no live stream, emit skipped");
      return;
    };
    match sender.send(notification) {
      Ok(receivers) => debug!(%user_id, receivers, "notification emitted"),
      Err(_) => {
        warn!(%user_id, "live emit failed, notification dropped from stream");
      }
    }
  }

  /// Close and remove the user's channel (logout). Every live stream for
  /// that user ends; a later [`Self::subscribe`] starts a fresh channel
  /// with no replay. Single-connection disconnects must NOT call this —
  /// other devices may still be attached.
  pub fn cleanup(&self, user_id: Uuid) {
    if self.channels.remove(&user_id).is_some() {
      debug!(%user_id, "notification channel cleaned up");
    }
  }

  pub fn is_connected(&self, user_id: Uuid) -> bool {
    self.channels.contains_key(&user_id)
  }

  pub fn connected_count(&self) -> usize { self.channels.len() }
}

impl Default for NotificationFanout {
  fn default() -> Self { Self::new() }
}

// ─── Stream ──────────────────────────────────────────────────────────────────

/// A live, per-connection notification sequence.
///
/// Dropping it cancels only this connection; the shared channel stays up
/// for other devices until an explicit [`NotificationFanout::cleanup`].
/// Lag (buffer overrun) is logged and skipped, never surfaced as an item.
pub struct NotificationStream {
  user_id: Uuid,
  inner:   BroadcastStream<Notification>,
}

impl NotificationStream {
  pub fn user_id(&self) -> Uuid { self.user_id }
}

impl Stream for NotificationStream {
  type Item = Notification;

  fn poll_next(
    self: Pin<&mut Self>,
    cx: &mut Context<'_>,
  ) -> Poll<Option<Self::Item>> {
    let this = self.get_mut();
    loop {
      match Pin::new(&mut this.inner).poll_next(cx) {
        Poll::Ready(Some(Ok(notification))) => {
          return Poll::Ready(Some(notification));
        }
        Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(missed)))) => {
          warn!(
            user_id = %this.user_id,
            missed,
            "subscriber lagged, oldest notifications dropped"
          );
        }
        Poll::Ready(None) => return Poll::Ready(None),
        Poll::Pending => return Poll::Pending,
      }
    }
  }
}

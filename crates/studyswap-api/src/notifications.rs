//! Handlers for `/notifications` endpoints, including the SSE stream.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/notifications` | `?unread=true` restricts to unread |
//! | `GET`    | `/notifications/unread-count` | `{"unread_count": n}` |
//! | `PUT`    | `/notifications/{id}/read` | Flip the read flag |
//! | `PUT`    | `/notifications/read-all` | `{"marked_read": n}` |
//! | `DELETE` | `/notifications/{id}` | Owner only |
//! | `GET`    | `/notifications/stream` | SSE: `notification` + `heartbeat` |
//! | `DELETE` | `/notifications/stream` | Logout cleanup, all devices |

use std::{convert::Infallible, time::Duration};

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{
    IntoResponse, Sse,
    sse::Event,
  },
};
use serde::Deserialize;
use serde_json::json;
use tokio::time::interval;
use tokio_stream::{Stream, StreamExt, wrappers::IntervalStream};
use tracing::warn;
use uuid::Uuid;

use studyswap_core::{
  Error as CoreError,
  notification::Notification,
  store::{ExchangeStore, NotificationStore},
};
use studyswap_engine::Mailer;

use crate::{AppState, error::ApiError, identity::Identity};

// ─── List / count ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// If `true`, return only unread notifications.
  #[serde(default)]
  pub unread: bool,
}

/// `GET /notifications[?unread=true]`
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Notification>>, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  let notifications = if params.unread {
    state.store.list_unread_notifications(user_id).await?
  } else {
    state.store.list_notifications(user_id).await?
  };
  Ok(Json(notifications))
}

/// `GET /notifications/unread-count`
pub async fn unread_count<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
) -> Result<impl IntoResponse, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  let count = state.store.count_unread_notifications(user_id).await?;
  Ok(Json(json!({ "unread_count": count })))
}

// ─── Read flags ───────────────────────────────────────────────────────────────

/// `PUT /notifications/{id}/read`
pub async fn mark_read<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
  Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  // Owner-gated like deletion: reading state is still the owner's.
  let existing = state
    .store
    .get_notification(notification_id)
    .await?
    .ok_or(CoreError::NotificationNotFound(notification_id))?;
  if existing.user_id != user_id {
    return Err(ApiError::Core(CoreError::Forbidden {
      user_id,
      action: "mark this notification read",
    }));
  }

  let updated = state
    .store
    .mark_notification_read(notification_id)
    .await?
    .ok_or(CoreError::NotificationNotFound(notification_id))?;
  Ok(Json(updated))
}

/// `PUT /notifications/read-all`
pub async fn mark_all_read<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
) -> Result<impl IntoResponse, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  let marked = state.store.mark_all_notifications_read(user_id).await?;
  Ok(Json(json!({ "marked_read": marked })))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /notifications/{id}` — only the owning user may delete.
pub async fn delete<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
  Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  let existing = state
    .store
    .get_notification(notification_id)
    .await?
    .ok_or(CoreError::NotificationNotFound(notification_id))?;
  if existing.user_id != user_id {
    return Err(ApiError::Core(CoreError::Forbidden {
      user_id,
      action: "delete this notification",
    }));
  }

  state.store.delete_notification(notification_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Live stream ──────────────────────────────────────────────────────────────

/// `GET /notifications/stream` — a per-connection SSE sequence.
///
/// Real notifications arrive as `notification` events with a JSON payload;
/// a `heartbeat` event with no payload is merged in on a fixed interval to
/// keep idle connections alive. Disconnecting ends only this connection.
pub async fn stream<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  let notifications =
    state.fanout.subscribe(user_id).filter_map(move |notification| {
      match Event::default().event("notification").json_data(&notification) {
        Ok(event) => Some(Ok::<_, Infallible>(event)),
        Err(e) => {
          warn!(%user_id, error = %e, "notification serialisation failed");
          None
        }
      }
    });

  let heartbeat = IntervalStream::new(interval(Duration::from_secs(
    state.config.heartbeat_secs,
  )))
  .map(|_| Ok(Event::default().event("heartbeat").comment("keep-alive")));

  Sse::new(notifications.merge(heartbeat))
}

/// `DELETE /notifications/stream` — logout cleanup. Closes the caller's
/// channel across every device; per-connection disconnects need no call.
pub async fn cleanup_stream<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
) -> StatusCode
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  state.fanout.cleanup(user_id);
  StatusCode::NO_CONTENT
}

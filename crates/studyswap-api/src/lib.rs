//! JSON + SSE API for StudySwap.
//!
//! Exposes an axum [`Router`] backed by any
//! [`studyswap_core::store::ExchangeStore`] and a
//! [`studyswap_engine::Mailer`]. Authentication, TLS, and transport
//! concerns are the caller's responsibility; handlers read the resolved
//! user id from the `x-user-id` header (see [`identity`]).

pub mod error;
pub mod identity;
pub mod matches;
pub mod notifications;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use serde::Deserialize;

use studyswap_core::store::ExchangeStore;
use studyswap_engine::{Mailer, MatchLifecycle, NotificationFanout};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with
/// `STUDYSWAP_`-prefixed environment overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  /// Seconds between SSE heartbeat events on idle streams.
  #[serde(default = "default_heartbeat_secs")]
  pub heartbeat_secs:      u64,
  /// Seconds between expiry-sweep runs.
  #[serde(default = "default_sweep_interval_secs")]
  pub sweep_interval_secs: u64,
  /// Per-user live-notification buffer bound.
  #[serde(default = "default_channel_capacity")]
  pub channel_capacity:    usize,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_heartbeat_secs() -> u64 { 30 }
fn default_sweep_interval_secs() -> u64 { 600 }
fn default_channel_capacity() -> usize { 64 }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                default_host(),
      port:                default_port(),
      heartbeat_secs:      default_heartbeat_secs(),
      sweep_interval_secs: default_sweep_interval_secs(),
      channel_capacity:    default_channel_capacity(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, M: Mailer> {
  pub store:     Arc<S>,
  pub fanout:    Arc<NotificationFanout>,
  pub lifecycle: Arc<MatchLifecycle<S, M>>,
  pub config:    Arc<ServerConfig>,
}

// Manual impl: `Arc` fields are clonable regardless of `S` and `M`.
impl<S, M: Mailer> Clone for AppState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      fanout:    Arc::clone(&self.fanout),
      lifecycle: Arc::clone(&self.lifecycle),
      config:    Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn router<S, M>(state: AppState<S, M>) -> Router<()>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  Router::new()
    // Matches
    .route("/matches", post(matches::request::<S, M>).get(matches::list::<S, M>))
    .route("/matches/active", get(matches::active::<S, M>))
    .route("/matches/received", get(matches::received::<S, M>))
    .route("/matches/sent", get(matches::sent::<S, M>))
    .route("/matches/candidates", get(matches::candidates::<S, M>))
    .route("/matches/{id}", get(matches::get_one::<S, M>))
    .route("/matches/{id}/accept", post(matches::accept::<S, M>))
    .route("/matches/{id}/reject", post(matches::reject::<S, M>))
    .route("/matches/{id}/complete", post(matches::complete::<S, M>))
    // Notifications
    .route("/notifications", get(notifications::list::<S, M>))
    .route(
      "/notifications/unread-count",
      get(notifications::unread_count::<S, M>),
    )
    .route(
      "/notifications/read-all",
      put(notifications::mark_all_read::<S, M>),
    )
    .route(
      "/notifications/stream",
      get(notifications::stream::<S, M>)
        .delete(notifications::cleanup_stream::<S, M>),
    )
    .route(
      "/notifications/{id}",
      delete(notifications::delete::<S, M>),
    )
    .route(
      "/notifications/{id}/read",
      put(notifications::mark_read::<S, M>),
    )
    .with_state(state)
}

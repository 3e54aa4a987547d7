//! Handlers for `/matches` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/matches` | Body: [`RequestMatchBody`]; returns 201 + match |
//! | `GET`  | `/matches` | Every match the caller takes part in |
//! | `GET`  | `/matches/active` | Live, unexpired matches only |
//! | `GET`  | `/matches/received` | Pending requests addressed to the caller |
//! | `GET`  | `/matches/sent` | Pending requests the caller sent |
//! | `GET`  | `/matches/candidates` | `?material_id` — possible partners |
//! | `GET`  | `/matches/{id}` | Participant-gated single match |
//! | `POST` | `/matches/{id}/accept` | Receiver only |
//! | `POST` | `/matches/{id}/reject` | Receiver only |
//! | `POST` | `/matches/{id}/complete` | Either participant |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use studyswap_core::{
  material::StudyMaterial, matching::Match, store::ExchangeStore,
};
use studyswap_engine::Mailer;

use crate::{AppState, error::ApiError, identity::Identity};

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /matches`.
#[derive(Debug, Deserialize)]
pub struct RequestMatchBody {
  /// The caller's own material offered in the exchange.
  pub requester_material_id: Uuid,
  /// The user being asked for their peer material.
  pub receiver_id:           Uuid,
}

/// `POST /matches` — returns 201 + the pending [`Match`].
pub async fn request<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
  Json(body): Json<RequestMatchBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  let m = state
    .lifecycle
    .request_match(user_id, body.requester_material_id, body.receiver_id)
    .await?;
  Ok((StatusCode::CREATED, Json(m)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /matches`
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
) -> Result<Json<Vec<Match>>, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  Ok(Json(state.lifecycle.matches_for(user_id).await?))
}

/// `GET /matches/active`
pub async fn active<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
) -> Result<Json<Vec<Match>>, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  Ok(Json(
    state.lifecycle.active_matches(user_id, Utc::now()).await?,
  ))
}

/// `GET /matches/received`
pub async fn received<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
) -> Result<Json<Vec<Match>>, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  Ok(Json(state.lifecycle.received_requests(user_id).await?))
}

/// `GET /matches/sent`
pub async fn sent<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
) -> Result<Json<Vec<Match>>, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  Ok(Json(state.lifecycle.sent_requests(user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CandidatesParams {
  /// The caller's material to find exchange partners for.
  pub material_id: Uuid,
}

/// `GET /matches/candidates?material_id=<id>`
pub async fn candidates<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
  Query(params): Query<CandidatesParams>,
) -> Result<Json<Vec<StudyMaterial>>, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  Ok(Json(
    state
      .lifecycle
      .find_candidates(user_id, params.material_id)
      .await?,
  ))
}

/// `GET /matches/{id}`
pub async fn get_one<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
  Path(match_id): Path<Uuid>,
) -> Result<Json<Match>, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  Ok(Json(state.lifecycle.get_match(match_id, user_id).await?))
}

// ─── Transitions ──────────────────────────────────────────────────────────────

/// `POST /matches/{id}/accept`
pub async fn accept<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
  Path(match_id): Path<Uuid>,
) -> Result<Json<Match>, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  Ok(Json(state.lifecycle.accept(match_id, user_id).await?))
}

/// `POST /matches/{id}/reject`
pub async fn reject<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
  Path(match_id): Path<Uuid>,
) -> Result<Json<Match>, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  Ok(Json(state.lifecycle.reject(match_id, user_id).await?))
}

/// `POST /matches/{id}/complete`
pub async fn complete<S, M>(
  State(state): State<AppState<S, M>>,
  Identity(user_id): Identity,
  Path(match_id): Path<Uuid>,
) -> Result<Json<Match>, ApiError>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  Ok(Json(state.lifecycle.complete(match_id, user_id).await?))
}

//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Domain errors from the engine keep their taxonomy all the way to the
//! client: not-found, permission, state-conflict, and bad-request families
//! each get their own status code with a JSON `{"error": ...}` body.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use studyswap_core::Error as CoreError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("authentication required")]
  Unauthorized,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Core(e) => match e {
        CoreError::MatchNotFound(_)
        | CoreError::NotificationNotFound(_)
        | CoreError::UserNotFound(_)
        | CoreError::MaterialNotFound(_) => StatusCode::NOT_FOUND,

        CoreError::Forbidden { .. }
        | CoreError::NotParticipant(_)
        | CoreError::NotOwner { .. } => StatusCode::FORBIDDEN,

        CoreError::InvalidTransition { .. } | CoreError::Expired(_) => {
          StatusCode::CONFLICT
        }

        CoreError::SelfMatch
        | CoreError::InsufficientTrust { .. }
        | CoreError::NoMatchingMaterial { .. }
        | CoreError::TrustScoreOutOfRange(_) => StatusCode::BAD_REQUEST,

        CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    };

    let message = match &self {
      // Never leak backend detail to clients.
      ApiError::Core(CoreError::Store(_)) => "internal error".to_owned(),
      other => other.to_string(),
    };

    (status, Json(json!({ "error": message }))).into_response()
  }
}

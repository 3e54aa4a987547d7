//! Resolved-identity extractor.
//!
//! Authentication happens upstream (OAuth gateway, reverse proxy, test
//! harness); by the time a request reaches these handlers the caller's
//! user id arrives resolved in the `x-user-id` header. Handlers never
//! trust ids from bodies or paths for authorisation.

use axum::{
  extract::FromRequestParts,
  http::{header::HeaderName, request::Parts},
};
use uuid::Uuid;

use crate::error::ApiError;

pub static USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for Identity {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let raw = parts
      .headers
      .get(&USER_ID_HEADER)
      .ok_or(ApiError::Unauthorized)?;
    let id = raw
      .to_str()
      .ok()
      .and_then(|s| Uuid::parse_str(s).ok())
      .ok_or_else(|| {
        ApiError::BadRequest("malformed x-user-id header".into())
      })?;
    Ok(Identity(id))
  }
}

//! TrustLedger — read-modify-write reputation updates.
//!
//! Participation is gated on the score being at or above the threshold.
//! Updates go through the user store one participant at a time; the caller
//! decides what a partial failure means (the lifecycle logs it and keeps
//! the completed match).

use std::sync::Arc;

use uuid::Uuid;

use studyswap_core::{Error, Result, store::UserStore, user::User};

pub struct TrustLedger<S> {
  users: Arc<S>,
}

impl<S: UserStore> TrustLedger<S> {
  pub fn new(users: Arc<S>) -> Self { Self { users } }

  pub async fn can_participate(&self, user_id: Uuid) -> Result<bool> {
    let user = self
      .users
      .get_user(user_id)
      .await?
      .ok_or(Error::UserNotFound(user_id))?;
    Ok(user.can_participate())
  }

  /// +1 (capped) for one side of a completed exchange.
  pub async fn record_completion(&self, user_id: Uuid) -> Result<User> {
    self.apply(user_id, User::with_completed_exchange).await
  }

  /// -1 (floored) on an explicit bad-match signal.
  pub async fn record_bad_match(&self, user_id: Uuid) -> Result<User> {
    self.apply(user_id, User::with_bad_exchange).await
  }

  async fn apply(
    &self,
    user_id: Uuid,
    f: impl FnOnce(User) -> User,
  ) -> Result<User> {
    let user = self
      .users
      .get_user(user_id)
      .await?
      .ok_or(Error::UserNotFound(user_id))?;
    self
      .users
      .update_user(f(user))
      .await?
      .ok_or(Error::UserNotFound(user_id))
  }
}

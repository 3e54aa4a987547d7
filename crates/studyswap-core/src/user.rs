//! User — the account envelope the exchange engine needs.
//!
//! OAuth identity, roles, and session state live outside this crate; the
//! engine only reads the trust score and the email address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::trust::TrustScore;

/// An immutable user snapshot. Trust-score changes produce a new value that
/// the store persists in place of the old row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:     Uuid,
  pub email:       String,
  pub nickname:    String,
  pub trust_score: TrustScore,
  pub created_at:  DateTime<Utc>,
}

impl User {
  pub fn can_participate(&self) -> bool {
    self.trust_score.is_above_threshold()
  }

  /// A copy with the score raised by one (capped).
  pub fn with_completed_exchange(self) -> Self {
    Self {
      trust_score: self.trust_score.increased(),
      ..self
    }
  }

  /// A copy with the score lowered by one (floored).
  pub fn with_bad_exchange(self) -> Self {
    Self {
      trust_score: self.trust_score.decreased(),
      ..self
    }
  }
}

/// Input to [`crate::store::UserStore::save_user`]. New users start at the
/// default (zero) trust score.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:    String,
  pub nickname: String,
}

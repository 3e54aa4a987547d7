//! Match — a bilateral proposal to exchange two study materials.
//!
//! A match is an immutable value. Every transition is a pure function
//! returning a new `Match`; the caller persists the result, replacing the
//! prior row by id. Terminal statuses permit no further transition, and
//! participant/material identities never change after creation.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// How long a request stays acceptable. Fixed at creation, never extended.
pub const EXPIRY_WINDOW_HOURS: i64 = 24;

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
  Pending,
  Accepted,
  Rejected,
  Completed,
  Expired,
}

impl MatchStatus {
  /// Still able to move — `Pending` or `Accepted`.
  pub fn is_live(self) -> bool {
    matches!(self, Self::Pending | Self::Accepted)
  }

  pub fn is_terminal(self) -> bool { !self.is_live() }
}

impl fmt::Display for MatchStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::Pending => "PENDING",
      Self::Accepted => "ACCEPTED",
      Self::Rejected => "REJECTED",
      Self::Completed => "COMPLETED",
      Self::Expired => "EXPIRED",
    };
    f.write_str(name)
  }
}

// ─── Match ───────────────────────────────────────────────────────────────────

/// A persisted match. Only `status` ever changes, and only through the
/// transition methods below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
  pub match_id:              Uuid,
  pub requester_id:          Uuid,
  pub receiver_id:           Uuid,
  pub requester_material_id: Uuid,
  pub receiver_material_id:  Uuid,
  pub status:                MatchStatus,
  pub created_at:            DateTime<Utc>,
  pub expired_at:            DateTime<Utc>,
}

impl Match {
  // ── Transitions ───────────────────────────────────────────────────────

  /// `Pending → Accepted`. The expiry gate lives in the lifecycle service,
  /// which persists the expiry before refusing a late accept.
  pub fn accept(self) -> Result<Self> {
    if self.status != MatchStatus::Pending {
      return Err(Error::InvalidTransition {
        status: self.status,
        action: "accept",
      });
    }
    Ok(Self {
      status: MatchStatus::Accepted,
      ..self
    })
  }

  /// `Pending → Rejected`. Permitted even past the expiry instant; only
  /// acceptance is expiry-gated.
  pub fn reject(self) -> Result<Self> {
    if self.status != MatchStatus::Pending {
      return Err(Error::InvalidTransition {
        status: self.status,
        action: "reject",
      });
    }
    Ok(Self {
      status: MatchStatus::Rejected,
      ..self
    })
  }

  /// `Accepted → Completed`.
  pub fn complete(self) -> Result<Self> {
    if self.status != MatchStatus::Accepted {
      return Err(Error::InvalidTransition {
        status: self.status,
        action: "complete",
      });
    }
    Ok(Self {
      status: MatchStatus::Completed,
      ..self
    })
  }

  /// Any live status → `Expired`.
  pub fn expire(self) -> Result<Self> {
    if self.status.is_terminal() {
      return Err(Error::InvalidTransition {
        status: self.status,
        action: "expire",
      });
    }
    Ok(Self {
      status: MatchStatus::Expired,
      ..self
    })
  }

  // ── Queries ───────────────────────────────────────────────────────────

  pub fn is_participant(&self, user_id: Uuid) -> bool {
    self.requester_id == user_id || self.receiver_id == user_id
  }

  pub fn is_requester(&self, user_id: Uuid) -> bool {
    self.requester_id == user_id
  }

  pub fn is_receiver(&self, user_id: Uuid) -> bool {
    self.receiver_id == user_id
  }

  /// The other participant's id.
  pub fn counterpart(&self, user_id: Uuid) -> Result<Uuid> {
    if self.requester_id == user_id {
      Ok(self.receiver_id)
    } else if self.receiver_id == user_id {
      Ok(self.requester_id)
    } else {
      Err(Error::NotParticipant(user_id))
    }
  }

  /// The material `user_id` brought into this match.
  pub fn material_of(&self, user_id: Uuid) -> Result<Uuid> {
    if self.requester_id == user_id {
      Ok(self.requester_material_id)
    } else if self.receiver_id == user_id {
      Ok(self.receiver_material_id)
    } else {
      Err(Error::NotParticipant(user_id))
    }
  }

  /// The material the other side brought — what `user_id` gains access to
  /// on completion.
  pub fn counterpart_material(&self, user_id: Uuid) -> Result<Uuid> {
    self.material_of(self.counterpart(user_id)?)
  }

  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    now > self.expired_at
  }

  /// Live status and still inside the expiry window.
  pub fn is_active(&self, now: DateTime<Utc>) -> bool {
    self.status.is_live() && !self.is_expired(now)
  }
}

// ─── NewMatch ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::MatchStore::save_match`]. The store assigns the
/// id; everything else — including both timestamps — is fixed here.
#[derive(Debug, Clone)]
pub struct NewMatch {
  pub requester_id:          Uuid,
  pub receiver_id:           Uuid,
  pub requester_material_id: Uuid,
  pub receiver_material_id:  Uuid,
  pub created_at:            DateTime<Utc>,
  pub expired_at:            DateTime<Utc>,
}

impl NewMatch {
  /// Build a new request anchored at `now`. The expiry window is part of
  /// the value: stores must persist it verbatim, never recompute it.
  pub fn new(
    requester_id: Uuid,
    requester_material_id: Uuid,
    receiver_id: Uuid,
    receiver_material_id: Uuid,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      requester_id,
      receiver_id,
      requester_material_id,
      receiver_material_id,
      created_at: now,
      expired_at: now + Duration::hours(EXPIRY_WINDOW_HOURS),
    }
  }

  /// Materialise the persisted form. New matches always start `Pending`.
  pub fn into_match(self, match_id: Uuid) -> Match {
    Match {
      match_id,
      requester_id: self.requester_id,
      receiver_id: self.receiver_id,
      requester_material_id: self.requester_material_id,
      receiver_material_id: self.receiver_material_id,
      status: MatchStatus::Pending,
      created_at: self.created_at,
      expired_at: self.expired_at,
    }
  }
}

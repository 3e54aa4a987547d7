//! MatchLifecycle — the owner of every match state transition.
//!
//! Transitions themselves are pure methods on [`Match`]; this service
//! wraps them with permission checks, the expiry gate, compare-and-swap
//! persistence, trust-score side effects, and counterpart notification.
//! Notification and trust failures after a persisted transition are
//! logged, never propagated: the stored match is the operation's outcome.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use studyswap_core::{
  Error, Result,
  material::StudyMaterial,
  matching::{Match, MatchStatus, NewMatch},
  store::{ExchangeStore, MatchStore, MaterialCatalog, UserStore},
};

use crate::{
  discovery::MatchDiscovery,
  dispatch::{Mailer, NotificationDispatcher},
  trust::TrustLedger,
};

pub struct MatchLifecycle<S, M> {
  store:      Arc<S>,
  discovery:  MatchDiscovery<S>,
  trust:      TrustLedger<S>,
  dispatcher: Arc<NotificationDispatcher<S, M>>,
}

impl<S, M> MatchLifecycle<S, M>
where
  S: ExchangeStore + 'static,
  M: Mailer,
{
  pub fn new(
    store: Arc<S>,
    dispatcher: Arc<NotificationDispatcher<S, M>>,
  ) -> Self {
    Self {
      discovery: MatchDiscovery::new(Arc::clone(&store)),
      trust: TrustLedger::new(Arc::clone(&store)),
      store,
      dispatcher,
    }
  }

  // ── Creation ──────────────────────────────────────────────────────────

  /// Open a `Pending` match from the requester's material to the
  /// receiver's peer material, resolved via discovery. Duplicate pending
  /// requests between the same pair are deliberately not rejected here.
  pub async fn request_match(
    &self,
    requester_id: Uuid,
    requester_material_id: Uuid,
    receiver_id: Uuid,
  ) -> Result<Match> {
    if requester_id == receiver_id {
      return Err(Error::SelfMatch);
    }

    let requester = self
      .store
      .get_user(requester_id)
      .await?
      .ok_or(Error::UserNotFound(requester_id))?;
    if !requester.can_participate() {
      return Err(Error::InsufficientTrust {
        score: requester.trust_score.value(),
      });
    }

    let material = self
      .store
      .get_material(requester_material_id)
      .await?
      .ok_or(Error::MaterialNotFound(requester_material_id))?;
    if !material.is_uploaded_by(requester_id) {
      return Err(Error::NotOwner {
        user_id:     requester_id,
        material_id: requester_material_id,
      });
    }

    let partner_material = self
      .discovery
      .find_partner_material(receiver_id, requester_material_id)
      .await?;

    let saved = self
      .store
      .save_match(NewMatch::new(
        requester_id,
        requester_material_id,
        receiver_id,
        partner_material.material_id,
        Utc::now(),
      ))
      .await?;
    info!(
      match_id = %saved.match_id,
      %requester_id,
      %receiver_id,
      "match requested"
    );

    if let Err(e) = self
      .dispatcher
      .notify_match_request_received(
        receiver_id,
        &requester.nickname,
        saved.match_id,
      )
      .await
    {
      warn!(
        match_id = %saved.match_id,
        error = %e,
        "match-request notification failed"
      );
    }

    Ok(saved)
  }

  // ── Transitions ───────────────────────────────────────────────────────

  /// Receiver-only. A `Pending` match past its window is transitioned to
  /// `Expired` and persisted before the caller gets [`Error::Expired`] —
  /// the refusal still updates the row to reflect reality.
  pub async fn accept(
    &self,
    match_id: Uuid,
    acting_user: Uuid,
  ) -> Result<Match> {
    let m = self.fetch(match_id).await?;
    if !m.is_receiver(acting_user) {
      return Err(Error::Forbidden {
        user_id: acting_user,
        action:  "accept",
      });
    }
    if m.status != MatchStatus::Pending {
      return Err(Error::InvalidTransition {
        status: m.status,
        action: "accept",
      });
    }

    if m.is_expired(Utc::now()) {
      let expired = m.expire()?;
      match self
        .store
        .update_match_where_status(MatchStatus::Pending, expired)
        .await?
      {
        Some(_) => info!(%match_id, "match expired on accept attempt"),
        None => warn!(%match_id, "concurrent transition while expiring"),
      }
      return Err(Error::Expired(match_id));
    }

    let stored = self
      .commit(MatchStatus::Pending, m.accept()?, "accept")
      .await?;
    info!(%match_id, receiver_id = %acting_user, "match accepted");

    if let Err(e) = self
      .dispatcher
      .notify_match_accepted(stored.requester_id, match_id)
      .await
    {
      warn!(%match_id, error = %e, "accept notification failed");
    }

    Ok(stored)
  }

  /// Receiver-only. No expiry gate: a late rejection still lands.
  pub async fn reject(
    &self,
    match_id: Uuid,
    acting_user: Uuid,
  ) -> Result<Match> {
    let m = self.fetch(match_id).await?;
    if !m.is_receiver(acting_user) {
      return Err(Error::Forbidden {
        user_id: acting_user,
        action:  "reject",
      });
    }

    let stored = self
      .commit(MatchStatus::Pending, m.reject()?, "reject")
      .await?;
    info!(%match_id, receiver_id = %acting_user, "match rejected");

    if let Err(e) = self
      .dispatcher
      .notify_match_rejected(stored.requester_id, match_id)
      .await
    {
      warn!(%match_id, error = %e, "reject notification failed");
    }

    Ok(stored)
  }

  /// Either participant. On success both trust scores are raised by one;
  /// each update is applied independently and a failure leaves the match
  /// `Completed` with the asymmetry logged.
  pub async fn complete(
    &self,
    match_id: Uuid,
    acting_user: Uuid,
  ) -> Result<Match> {
    let m = self.fetch(match_id).await?;
    if !m.is_participant(acting_user) {
      return Err(Error::Forbidden {
        user_id: acting_user,
        action:  "complete",
      });
    }
    let acting = self
      .store
      .get_user(acting_user)
      .await?
      .ok_or(Error::UserNotFound(acting_user))?;

    let stored = self
      .commit(MatchStatus::Accepted, m.complete()?, "complete")
      .await?;
    info!(%match_id, completed_by = %acting_user, "match completed");

    for user_id in [stored.requester_id, stored.receiver_id] {
      if let Err(e) = self.trust.record_completion(user_id).await {
        warn!(
          %match_id,
          %user_id,
          error = %e,
          "trust update failed after completion"
        );
      }
    }

    let counterpart = stored.counterpart(acting_user)?;
    if let Err(e) = self
      .dispatcher
      .notify_match_completed(counterpart, &acting.nickname, match_id)
      .await
    {
      warn!(%match_id, error = %e, "completion notification failed");
    }

    Ok(stored)
  }

  /// Force a live match to `Expired`, regardless of the window. Used by
  /// the sweep and by administrative tooling.
  pub async fn expire(&self, match_id: Uuid) -> Result<Match> {
    let m = self.fetch(match_id).await?;
    let previous = m.status;
    let stored = self.commit(previous, m.expire()?, "expire").await?;
    info!(%match_id, "match expired");
    Ok(stored)
  }

  /// Expire every live match whose window has passed. Returns how many
  /// rows transitioned; individual compare-and-swap losses are skipped,
  /// not errors.
  pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64> {
    let mut expired_count = 0u64;
    for m in self.store.list_expired_matches(now).await? {
      let previous = m.status;
      let Ok(expired) = m.expire() else { continue };
      if self
        .store
        .update_match_where_status(previous, expired)
        .await?
        .is_some()
      {
        expired_count += 1;
      }
    }
    if expired_count > 0 {
      info!(expired_count, "expired stale matches");
    }
    Ok(expired_count)
  }

  // ── Queries ───────────────────────────────────────────────────────────

  /// Participant-gated single-match fetch.
  pub async fn get_match(
    &self,
    match_id: Uuid,
    user_id: Uuid,
  ) -> Result<Match> {
    let m = self.fetch(match_id).await?;
    if !m.is_participant(user_id) {
      return Err(Error::NotParticipant(user_id));
    }
    Ok(m)
  }

  /// Every match the user takes part in, newest first.
  pub async fn matches_for(&self, user_id: Uuid) -> Result<Vec<Match>> {
    self.store.list_matches_for(user_id).await
  }

  /// Live, unexpired matches only.
  pub async fn active_matches(
    &self,
    user_id: Uuid,
    now: DateTime<Utc>,
  ) -> Result<Vec<Match>> {
    let matches = self.store.list_matches_for(user_id).await?;
    Ok(matches.into_iter().filter(|m| m.is_active(now)).collect())
  }

  /// Pending requests addressed to the user.
  pub async fn received_requests(&self, user_id: Uuid) -> Result<Vec<Match>> {
    let matches = self.store.list_matches_by_receiver(user_id).await?;
    Ok(
      matches
        .into_iter()
        .filter(|m| m.status == MatchStatus::Pending)
        .collect(),
    )
  }

  /// Pending requests the user sent.
  pub async fn sent_requests(&self, user_id: Uuid) -> Result<Vec<Match>> {
    let matches = self.store.list_matches_by_requester(user_id).await?;
    Ok(
      matches
        .into_iter()
        .filter(|m| m.status == MatchStatus::Pending)
        .collect(),
    )
  }

  /// Whether the user already completed an exchange involving the
  /// material — e.g. to grant viewing access.
  pub async fn has_completed_match(
    &self,
    user_id: Uuid,
    material_id: Uuid,
  ) -> Result<bool> {
    Ok(
      self
        .store
        .get_completed_match_for_material(user_id, material_id)
        .await?
        .is_some(),
    )
  }

  /// Candidate partner materials for a request, via discovery.
  pub async fn find_candidates(
    &self,
    user_id: Uuid,
    material_id: Uuid,
  ) -> Result<Vec<StudyMaterial>> {
    self.discovery.find_candidates(user_id, material_id).await
  }

  // ── Internals ─────────────────────────────────────────────────────────

  async fn fetch(&self, match_id: Uuid) -> Result<Match> {
    self
      .store
      .get_match(match_id)
      .await?
      .ok_or(Error::MatchNotFound(match_id))
  }

  /// Compare-and-swap commit. A lost race re-reads the row so the error
  /// names the status that won, not the stale one we computed from.
  async fn commit(
    &self,
    expected: MatchStatus,
    updated: Match,
    action: &'static str,
  ) -> Result<Match> {
    let match_id = updated.match_id;
    match self
      .store
      .update_match_where_status(expected, updated)
      .await?
    {
      Some(stored) => Ok(stored),
      None => {
        let status = self
          .store
          .get_match(match_id)
          .await?
          .map_or(expected, |current| current.status);
        Err(Error::InvalidTransition { status, action })
      }
    }
  }
}

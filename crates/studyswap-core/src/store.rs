//! Store boundary traits.
//!
//! The engine owns no schema. Implementations (`studyswap-store-memory`,
//! or a relational backend) persist the immutable domain values and assign
//! ids; higher layers depend on these abstractions only. A relational row
//! maps 1:1 onto each persisted type.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`). Backend
//! failures are wrapped as [`crate::Error::Store`].

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Result,
  material::{NewStudyMaterial, StudyMaterial},
  matching::{Match, MatchStatus, NewMatch},
  notification::{NewNotification, Notification},
  user::{NewUser, User},
};

// ─── Matches ─────────────────────────────────────────────────────────────────

pub trait MatchStore: Send + Sync {
  /// Persist a new match and return it with its store-assigned id.
  fn save_match(
    &self,
    input: NewMatch,
  ) -> impl Future<Output = Result<Match>> + Send + '_;

  fn get_match(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Match>>> + Send + '_;

  /// Matches the user started, newest first.
  fn list_matches_by_requester(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Match>>> + Send + '_;

  /// Matches addressed to the user, newest first.
  fn list_matches_by_receiver(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Match>>> + Send + '_;

  /// Matches the user participates in on either side, newest first.
  fn list_matches_for(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Match>>> + Send + '_;

  /// Matches whose expiry instant has passed and whose status is still
  /// live. Input to the periodic sweep.
  fn list_expired_matches(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Match>>> + Send + '_;

  /// Replace the stored row by id, but only while its status still equals
  /// `expected` — a single-row compare-and-swap. Returns `None` when the
  /// guard fails (a concurrent transition won) or the row is gone.
  ///
  /// Relational backends can express this as
  /// `UPDATE ... WHERE id = ? AND status = ?` and check the affected-row
  /// count.
  fn update_match_where_status(
    &self,
    expected: MatchStatus,
    updated: Match,
  ) -> impl Future<Output = Result<Option<Match>>> + Send + '_;

  /// A completed match in which `user_id` took part with `material_id` on
  /// either side, if any.
  fn get_completed_match_for_material(
    &self,
    user_id: Uuid,
    material_id: Uuid,
  ) -> impl Future<Output = Result<Option<Match>>> + Send + '_;
}

// ─── Notifications ───────────────────────────────────────────────────────────

pub trait NotificationStore: Send + Sync {
  /// Persist a new notification and return it with its store-assigned id.
  fn save_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification>> + Send + '_;

  fn get_notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Notification>>> + Send + '_;

  /// All of the user's notifications, newest first.
  fn list_notifications(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Notification>>> + Send + '_;

  fn list_unread_notifications(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Notification>>> + Send + '_;

  fn count_unread_notifications(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<u64>> + Send + '_;

  /// Flip the read flag. Returns the updated notification, `None` if the
  /// id is unknown.
  fn mark_notification_read(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Notification>>> + Send + '_;

  /// Mark every unread notification of the user read; returns how many
  /// flipped.
  fn mark_all_notifications_read(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<u64>> + Send + '_;

  /// Returns `false` if the notification did not exist.
  fn delete_notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool>> + Send + '_;
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub trait UserStore: Send + Sync {
  /// Persist a new user at the default trust score.
  fn save_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>>> + Send + '_;

  /// Replace the stored row by id. Returns `None` if the user vanished.
  fn update_user(
    &self,
    user: User,
  ) -> impl Future<Output = Result<Option<User>>> + Send + '_;
}

// ─── Materials ───────────────────────────────────────────────────────────────

/// Read side of the material catalog, plus `save_material` for seeding.
/// Upload and moderation workflows live with the owning service.
pub trait MaterialCatalog: Send + Sync {
  fn save_material(
    &self,
    input: NewStudyMaterial,
  ) -> impl Future<Output = Result<StudyMaterial>> + Send + '_;

  fn get_material(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<StudyMaterial>>> + Send + '_;

  /// Approved materials in the subject/exam-type peer group, newest first
  /// with id as tiebreak — deterministic for a fixed catalog snapshot.
  fn list_approved_materials<'a>(
    &'a self,
    subject: &'a str,
    exam_type: &'a str,
  ) -> impl Future<Output = Result<Vec<StudyMaterial>>> + Send + 'a;

  /// The subset of [`Self::list_approved_materials`] uploaded by
  /// `uploader_id`, same ordering.
  fn list_approved_materials_by<'a>(
    &'a self,
    uploader_id: Uuid,
    subject: &'a str,
    exam_type: &'a str,
  ) -> impl Future<Output = Result<Vec<StudyMaterial>>> + Send + 'a;
}

// ─── Umbrella ────────────────────────────────────────────────────────────────

/// Convenience bound for services that span several store concerns. Any
/// type implementing all four traits gets it for free.
pub trait ExchangeStore:
  MatchStore + NotificationStore + UserStore + MaterialCatalog
{
}

impl<S> ExchangeStore for S where
  S: MatchStore + NotificationStore + UserStore + MaterialCatalog
{
}

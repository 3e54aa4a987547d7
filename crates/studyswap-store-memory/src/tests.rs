//! Integration tests for `MemoryStore` against the store trait contracts.

use chrono::{Duration, Utc};
use uuid::Uuid;

use studyswap_core::{
  material::{ApprovalStatus, NewStudyMaterial},
  matching::{MatchStatus, NewMatch},
  notification::{NewNotification, NotificationKind},
  store::{MatchStore, MaterialCatalog, NotificationStore, UserStore},
  user::NewUser,
};

use crate::MemoryStore;

fn new_user(nickname: &str) -> NewUser {
  NewUser {
    email:    format!("{nickname}@example.com"),
    nickname: nickname.into(),
  }
}

fn approved_material(uploader_id: Uuid, subject: &str) -> NewStudyMaterial {
  NewStudyMaterial {
    uploader_id,
    title: format!("{subject} notes"),
    subject: subject.into(),
    exam_type: "MIDTERM".into(),
    status: ApprovalStatus::Approved,
  }
}

fn new_match(requester: Uuid, receiver: Uuid) -> NewMatch {
  NewMatch::new(requester, Uuid::new_v4(), receiver, Uuid::new_v4(), Utc::now())
}

fn notification(user_id: Uuid, title: &str) -> NewNotification {
  NewNotification::new(
    user_id,
    NotificationKind::System,
    title,
    "body",
    "related",
  )
}

// ─── Matches ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_match_assigns_id_and_starts_pending() {
  let store = MemoryStore::new();
  let saved = store
    .save_match(new_match(Uuid::new_v4(), Uuid::new_v4()))
    .await
    .unwrap();

  assert_eq!(saved.status, MatchStatus::Pending);
  let fetched = store.get_match(saved.match_id).await.unwrap().unwrap();
  assert_eq!(fetched.match_id, saved.match_id);
  assert_eq!(fetched.expired_at, fetched.created_at + Duration::hours(24));
}

#[tokio::test]
async fn get_match_missing_returns_none() {
  let store = MemoryStore::new();
  assert!(store.get_match(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_matches_by_side_and_participant() {
  let store = MemoryStore::new();
  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();
  let carol = Uuid::new_v4();

  store.save_match(new_match(alice, bob)).await.unwrap();
  store.save_match(new_match(bob, carol)).await.unwrap();

  assert_eq!(store.list_matches_by_requester(alice).await.unwrap().len(), 1);
  assert_eq!(store.list_matches_by_receiver(carol).await.unwrap().len(), 1);
  assert_eq!(store.list_matches_for(bob).await.unwrap().len(), 2);
  assert_eq!(store.list_matches_for(carol).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_where_status_is_a_compare_and_swap() {
  let store = MemoryStore::new();
  let saved = store
    .save_match(new_match(Uuid::new_v4(), Uuid::new_v4()))
    .await
    .unwrap();

  let accepted = saved.clone().accept().unwrap();
  let stored = store
    .update_match_where_status(MatchStatus::Pending, accepted)
    .await
    .unwrap();
  assert_eq!(stored.unwrap().status, MatchStatus::Accepted);

  // A second writer that still believes the match is pending loses, and
  // the accepted row stays.
  let match_id = saved.match_id;
  let rejected = saved.reject().unwrap();
  let lost = store
    .update_match_where_status(MatchStatus::Pending, rejected)
    .await
    .unwrap();
  assert!(lost.is_none());

  let current = store.get_match(match_id).await.unwrap().unwrap();
  assert_eq!(current.status, MatchStatus::Accepted);
}

#[tokio::test]
async fn list_expired_matches_only_returns_live_past_window() {
  let store = MemoryStore::new();
  let past = Utc::now() - Duration::hours(30);

  // Backdated pending match: expired 6 hours ago.
  let stale = store
    .save_match(NewMatch::new(
      Uuid::new_v4(),
      Uuid::new_v4(),
      Uuid::new_v4(),
      Uuid::new_v4(),
      past,
    ))
    .await
    .unwrap();

  // Fresh pending match: still inside its window.
  store
    .save_match(new_match(Uuid::new_v4(), Uuid::new_v4()))
    .await
    .unwrap();

  // Stale but already rejected: terminal, not sweepable.
  let rejected = store
    .save_match(NewMatch::new(
      Uuid::new_v4(),
      Uuid::new_v4(),
      Uuid::new_v4(),
      Uuid::new_v4(),
      past,
    ))
    .await
    .unwrap();
  store
    .update_match_where_status(
      MatchStatus::Pending,
      rejected.reject().unwrap(),
    )
    .await
    .unwrap();

  let expired = store.list_expired_matches(Utc::now()).await.unwrap();
  assert_eq!(expired.len(), 1);
  assert_eq!(expired[0].match_id, stale.match_id);
}

#[tokio::test]
async fn completed_match_lookup_by_user_and_material() {
  let store = MemoryStore::new();
  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();
  let input = new_match(alice, bob);
  let material = input.requester_material_id;

  let saved = store.save_match(input).await.unwrap();
  assert!(
    store
      .get_completed_match_for_material(alice, material)
      .await
      .unwrap()
      .is_none()
  );

  let completed = saved.accept().unwrap().complete().unwrap();
  store
    .update_match_where_status(MatchStatus::Accepted, completed)
    .await
    .unwrap();

  assert!(
    store
      .get_completed_match_for_material(alice, material)
      .await
      .unwrap()
      .is_some()
  );
  assert!(
    store
      .get_completed_match_for_material(bob, material)
      .await
      .unwrap()
      .is_some()
  );
  assert!(
    store
      .get_completed_match_for_material(Uuid::new_v4(), material)
      .await
      .unwrap()
      .is_none()
  );
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn notifications_unread_lifecycle() {
  let store = MemoryStore::new();
  let user = Uuid::new_v4();

  let first = store
    .save_notification(notification(user, "first"))
    .await
    .unwrap();
  store
    .save_notification(notification(user, "second"))
    .await
    .unwrap();
  store
    .save_notification(notification(Uuid::new_v4(), "other user"))
    .await
    .unwrap();

  assert_eq!(store.count_unread_notifications(user).await.unwrap(), 2);
  assert_eq!(store.list_notifications(user).await.unwrap().len(), 2);

  let read = store
    .mark_notification_read(first.notification_id)
    .await
    .unwrap()
    .unwrap();
  assert!(read.read);
  assert_eq!(store.count_unread_notifications(user).await.unwrap(), 1);
  assert_eq!(store.list_unread_notifications(user).await.unwrap().len(), 1);

  let flipped = store.mark_all_notifications_read(user).await.unwrap();
  assert_eq!(flipped, 1);
  assert_eq!(store.count_unread_notifications(user).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_notification_reports_existence() {
  let store = MemoryStore::new();
  let n = store
    .save_notification(notification(Uuid::new_v4(), "bye"))
    .await
    .unwrap();

  assert!(store.delete_notification(n.notification_id).await.unwrap());
  assert!(!store.delete_notification(n.notification_id).await.unwrap());
  assert!(
    store
      .get_notification(n.notification_id)
      .await
      .unwrap()
      .is_none()
  );
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_user_starts_at_default_trust() {
  let store = MemoryStore::new();
  let user = store.save_user(new_user("alice")).await.unwrap();
  assert_eq!(user.trust_score.value(), 0);

  let fetched = store.get_user(user.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.nickname, "alice");
}

#[tokio::test]
async fn update_user_replaces_row_or_reports_missing() {
  let store = MemoryStore::new();
  let user = store.save_user(new_user("bob")).await.unwrap();

  let raised = store
    .update_user(user.clone().with_completed_exchange())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(raised.trust_score.value(), 1);

  let mut ghost = user;
  ghost.user_id = Uuid::new_v4();
  assert!(store.update_user(ghost).await.unwrap().is_none());
}

// ─── Materials ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn approved_material_queries_filter_status_and_peer_group() {
  let store = MemoryStore::new();
  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();

  store
    .save_material(approved_material(alice, "CS201"))
    .await
    .unwrap();
  store
    .save_material(approved_material(bob, "CS201"))
    .await
    .unwrap();
  store
    .save_material(approved_material(bob, "MATH101"))
    .await
    .unwrap();

  let mut pending = approved_material(bob, "CS201");
  pending.status = ApprovalStatus::Pending;
  store.save_material(pending).await.unwrap();

  let group = store
    .list_approved_materials("CS201", "MIDTERM")
    .await
    .unwrap();
  assert_eq!(group.len(), 2);

  let bobs = store
    .list_approved_materials_by(bob, "CS201", "MIDTERM")
    .await
    .unwrap();
  assert_eq!(bobs.len(), 1);
  assert!(bobs[0].is_uploaded_by(bob));
}

#[tokio::test]
async fn material_listing_order_is_deterministic() {
  let store = MemoryStore::new();
  let uploader = Uuid::new_v4();
  for _ in 0..4 {
    store
      .save_material(approved_material(uploader, "CS201"))
      .await
      .unwrap();
  }

  let first = store
    .list_approved_materials("CS201", "MIDTERM")
    .await
    .unwrap();
  let second = store
    .list_approved_materials("CS201", "MIDTERM")
    .await
    .unwrap();
  let ids: Vec<Uuid> = first.iter().map(|m| m.material_id).collect();
  let ids_again: Vec<Uuid> = second.iter().map(|m| m.material_id).collect();
  assert_eq!(ids, ids_again);
}

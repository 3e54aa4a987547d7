//! [`MemoryStore`] — the in-memory implementation of the store traits.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use studyswap_core::{
  Result,
  material::{NewStudyMaterial, StudyMaterial},
  matching::{Match, MatchStatus, NewMatch},
  notification::{NewNotification, Notification},
  store::{MatchStore, MaterialCatalog, NotificationStore, UserStore},
  trust::TrustScore,
  user::{NewUser, User},
};

#[derive(Default)]
struct Tables {
  matches:       HashMap<Uuid, Match>,
  notifications: HashMap<Uuid, Notification>,
  users:         HashMap<Uuid, User>,
  materials:     HashMap<Uuid, StudyMaterial>,
}

/// All four store traits over shared in-process tables.
///
/// List methods sort newest-first with the id as tiebreak, so results are
/// deterministic for a fixed snapshot.
#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

fn newest_first<T>(
  rows: &mut Vec<T>,
  created_at: impl Fn(&T) -> DateTime<Utc>,
  id: impl Fn(&T) -> Uuid,
) {
  rows.sort_by(|a, b| {
    created_at(b)
      .cmp(&created_at(a))
      .then_with(|| id(a).cmp(&id(b)))
  });
}

// ─── MatchStore ──────────────────────────────────────────────────────────────

impl MatchStore for MemoryStore {
  async fn save_match(&self, input: NewMatch) -> Result<Match> {
    let m = input.into_match(Uuid::new_v4());
    let mut tables = self.tables.write().await;
    tables.matches.insert(m.match_id, m.clone());
    Ok(m)
  }

  async fn get_match(&self, id: Uuid) -> Result<Option<Match>> {
    Ok(self.tables.read().await.matches.get(&id).cloned())
  }

  async fn list_matches_by_requester(&self, user_id: Uuid) -> Result<Vec<Match>> {
    self.list_matches(|m| m.requester_id == user_id).await
  }

  async fn list_matches_by_receiver(&self, user_id: Uuid) -> Result<Vec<Match>> {
    self.list_matches(|m| m.receiver_id == user_id).await
  }

  async fn list_matches_for(&self, user_id: Uuid) -> Result<Vec<Match>> {
    self.list_matches(|m| m.is_participant(user_id)).await
  }

  async fn list_expired_matches(&self, now: DateTime<Utc>) -> Result<Vec<Match>> {
    self
      .list_matches(|m| m.status.is_live() && m.is_expired(now))
      .await
  }

  async fn update_match_where_status(
    &self,
    expected: MatchStatus,
    updated: Match,
  ) -> Result<Option<Match>> {
    let mut tables = self.tables.write().await;
    match tables.matches.get(&updated.match_id) {
      Some(current) if current.status == expected => {
        tables.matches.insert(updated.match_id, updated.clone());
        Ok(Some(updated))
      }
      _ => Ok(None),
    }
  }

  async fn get_completed_match_for_material(
    &self,
    user_id: Uuid,
    material_id: Uuid,
  ) -> Result<Option<Match>> {
    let tables = self.tables.read().await;
    Ok(
      tables
        .matches
        .values()
        .find(|m| {
          m.status == MatchStatus::Completed
            && m.is_participant(user_id)
            && (m.requester_material_id == material_id
              || m.receiver_material_id == material_id)
        })
        .cloned(),
    )
  }
}

impl MemoryStore {
  async fn list_matches(&self, keep: impl Fn(&Match) -> bool) -> Result<Vec<Match>> {
    let tables = self.tables.read().await;
    let mut rows: Vec<Match> =
      tables.matches.values().filter(|m| keep(m)).cloned().collect();
    newest_first(&mut rows, |m| m.created_at, |m| m.match_id);
    Ok(rows)
  }
}

// ─── NotificationStore ───────────────────────────────────────────────────────

impl NotificationStore for MemoryStore {
  async fn save_notification(
    &self,
    input: NewNotification,
  ) -> Result<Notification> {
    let n = input.into_notification(Uuid::new_v4());
    let mut tables = self.tables.write().await;
    tables.notifications.insert(n.notification_id, n.clone());
    Ok(n)
  }

  async fn get_notification(&self, id: Uuid) -> Result<Option<Notification>> {
    Ok(self.tables.read().await.notifications.get(&id).cloned())
  }

  async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
    self.list_notifications_where(|n| n.user_id == user_id).await
  }

  async fn list_unread_notifications(
    &self,
    user_id: Uuid,
  ) -> Result<Vec<Notification>> {
    self
      .list_notifications_where(|n| n.user_id == user_id && !n.read)
      .await
  }

  async fn count_unread_notifications(&self, user_id: Uuid) -> Result<u64> {
    let tables = self.tables.read().await;
    Ok(
      tables
        .notifications
        .values()
        .filter(|n| n.user_id == user_id && !n.read)
        .count() as u64,
    )
  }

  async fn mark_notification_read(
    &self,
    id: Uuid,
  ) -> Result<Option<Notification>> {
    let mut tables = self.tables.write().await;
    let Some(n) = tables.notifications.get(&id).cloned() else {
      return Ok(None);
    };
    let updated = n.mark_read();
    tables.notifications.insert(id, updated.clone());
    Ok(Some(updated))
  }

  async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64> {
    let mut tables = self.tables.write().await;
    let mut flipped = 0u64;
    for n in tables.notifications.values_mut() {
      if n.user_id == user_id && !n.read {
        *n = n.clone().mark_read();
        flipped += 1;
      }
    }
    Ok(flipped)
  }

  async fn delete_notification(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write().await;
    Ok(tables.notifications.remove(&id).is_some())
  }
}

impl MemoryStore {
  async fn list_notifications_where(
    &self,
    keep: impl Fn(&Notification) -> bool,
  ) -> Result<Vec<Notification>> {
    let tables = self.tables.read().await;
    let mut rows: Vec<Notification> = tables
      .notifications
      .values()
      .filter(|n| keep(n))
      .cloned()
      .collect();
    newest_first(&mut rows, |n| n.created_at, |n| n.notification_id);
    Ok(rows)
  }
}

// ─── UserStore ───────────────────────────────────────────────────────────────

impl UserStore for MemoryStore {
  async fn save_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:     Uuid::new_v4(),
      email:       input.email,
      nickname:    input.nickname,
      trust_score: TrustScore::default(),
      created_at:  Utc::now(),
    };
    let mut tables = self.tables.write().await;
    tables.users.insert(user.user_id, user.clone());
    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    Ok(self.tables.read().await.users.get(&id).cloned())
  }

  async fn update_user(&self, user: User) -> Result<Option<User>> {
    let mut tables = self.tables.write().await;
    if !tables.users.contains_key(&user.user_id) {
      return Ok(None);
    }
    tables.users.insert(user.user_id, user.clone());
    Ok(Some(user))
  }
}

// ─── MaterialCatalog ─────────────────────────────────────────────────────────

impl MaterialCatalog for MemoryStore {
  async fn save_material(
    &self,
    input: NewStudyMaterial,
  ) -> Result<StudyMaterial> {
    let material = StudyMaterial {
      material_id: Uuid::new_v4(),
      uploader_id: input.uploader_id,
      title:       input.title,
      subject:     input.subject,
      exam_type:   input.exam_type,
      status:      input.status,
      created_at:  Utc::now(),
    };
    let mut tables = self.tables.write().await;
    tables.materials.insert(material.material_id, material.clone());
    Ok(material)
  }

  async fn get_material(&self, id: Uuid) -> Result<Option<StudyMaterial>> {
    Ok(self.tables.read().await.materials.get(&id).cloned())
  }

  async fn list_approved_materials(
    &self,
    subject: &str,
    exam_type: &str,
  ) -> Result<Vec<StudyMaterial>> {
    self
      .list_materials(|m| {
        m.is_matchable() && m.subject == subject && m.exam_type == exam_type
      })
      .await
  }

  async fn list_approved_materials_by(
    &self,
    uploader_id: Uuid,
    subject: &str,
    exam_type: &str,
  ) -> Result<Vec<StudyMaterial>> {
    self
      .list_materials(|m| {
        m.is_matchable()
          && m.uploader_id == uploader_id
          && m.subject == subject
          && m.exam_type == exam_type
      })
      .await
  }
}

impl MemoryStore {
  async fn list_materials(
    &self,
    keep: impl Fn(&StudyMaterial) -> bool,
  ) -> Result<Vec<StudyMaterial>> {
    let tables = self.tables.read().await;
    let mut rows: Vec<StudyMaterial> = tables
      .materials
      .values()
      .filter(|m| keep(m))
      .cloned()
      .collect();
    newest_first(&mut rows, |m| m.created_at, |m| m.material_id);
    Ok(rows)
  }
}

//! Study materials — reduced to the attributes the matcher needs.
//!
//! Upload, file storage, and the admin review queue live outside this
//! crate. Discovery only reads ownership, the subject/exam-type peer group,
//! and the approval status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Moderation state. Only approved materials are matchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
  Pending,
  Approved,
  Rejected,
}

impl ApprovalStatus {
  pub fn is_matchable(self) -> bool { self == Self::Approved }
}

/// An uploaded study-material artifact.
///
/// Subject and exam type are free-text vocabularies (e.g. `"CS201"`,
/// `"MIDTERM"`); two materials are peers when both fields are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyMaterial {
  pub material_id: Uuid,
  pub uploader_id: Uuid,
  pub title:       String,
  pub subject:     String,
  pub exam_type:   String,
  pub status:      ApprovalStatus,
  pub created_at:  DateTime<Utc>,
}

impl StudyMaterial {
  pub fn is_uploaded_by(&self, user_id: Uuid) -> bool {
    self.uploader_id == user_id
  }

  pub fn is_matchable(&self) -> bool { self.status.is_matchable() }

  /// Whether `other` belongs to the same subject/exam-type peer group.
  pub fn is_peer_of(&self, other: &StudyMaterial) -> bool {
    self.subject == other.subject && self.exam_type == other.exam_type
  }
}

/// Input to [`crate::store::MaterialCatalog::save_material`].
#[derive(Debug, Clone)]
pub struct NewStudyMaterial {
  pub uploader_id: Uuid,
  pub title:       String,
  pub subject:     String,
  pub exam_type:   String,
  pub status:      ApprovalStatus,
}

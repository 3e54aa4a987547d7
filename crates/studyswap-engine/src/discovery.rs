//! MatchDiscovery — candidate lookup over the approved catalog.
//!
//! Discovery never writes: it resolves which of the partner's materials can
//! answer a request, and enumerates possible partners for a material. Peer
//! grouping is subject + exam-type equality over approved materials only.

use std::sync::Arc;

use uuid::Uuid;

use studyswap_core::{
  Error, Result, material::StudyMaterial, store::MaterialCatalog,
};

pub struct MatchDiscovery<S> {
  catalog: Arc<S>,
}

impl<S: MaterialCatalog> MatchDiscovery<S> {
  pub fn new(catalog: Arc<S>) -> Self { Self { catalog } }

  /// Resolve the partner's side of a proposed exchange: the approved
  /// material owned by `partner_id` in the same peer group as the
  /// requester's material. The catalog returns the group in deterministic
  /// order, so when the partner holds several peers the newest one wins.
  pub async fn find_partner_material(
    &self,
    partner_id: Uuid,
    requester_material_id: Uuid,
  ) -> Result<StudyMaterial> {
    let material = self
      .catalog
      .get_material(requester_material_id)
      .await?
      .ok_or(Error::MaterialNotFound(requester_material_id))?;

    self
      .catalog
      .list_approved_materials_by(
        partner_id,
        &material.subject,
        &material.exam_type,
      )
      .await?
      .into_iter()
      .next()
      .ok_or(Error::NoMatchingMaterial { partner_id })
  }

  /// Every approved material a request could be sent for: same peer group,
  /// excluding the requester's own uploads and the anchor material itself.
  pub async fn find_candidates(
    &self,
    requester_id: Uuid,
    requester_material_id: Uuid,
  ) -> Result<Vec<StudyMaterial>> {
    let material = self
      .catalog
      .get_material(requester_material_id)
      .await?
      .ok_or(Error::MaterialNotFound(requester_material_id))?;

    let peers = self
      .catalog
      .list_approved_materials(&material.subject, &material.exam_type)
      .await?;

    Ok(
      peers
        .into_iter()
        .filter(|peer| {
          !peer.is_uploaded_by(requester_id)
            && peer.material_id != requester_material_id
        })
        .collect(),
    )
  }
}

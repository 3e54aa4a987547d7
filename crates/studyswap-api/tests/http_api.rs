//! Integration tests for the HTTP surface against the in-memory store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use studyswap_api::{AppState, ServerConfig};
use studyswap_core::{
  material::{ApprovalStatus, NewStudyMaterial},
  store::{MaterialCatalog, UserStore},
  user::NewUser,
};
use studyswap_engine::{
  MailError, Mailer, MatchLifecycle, NotificationDispatcher,
  NotificationFanout,
};
use studyswap_store_memory::MemoryStore;

// ─── Harness ─────────────────────────────────────────────────────────────────

struct NoopMailer;

impl Mailer for NoopMailer {
  async fn send(
    &self,
    _to: &str,
    _subject_line: &str,
    _body: &str,
  ) -> Result<(), MailError> {
    Ok(())
  }
}

struct TestApp {
  store: Arc<MemoryStore>,
  app:   Router,
}

fn test_app() -> TestApp {
  let store = Arc::new(MemoryStore::new());
  let fanout = Arc::new(NotificationFanout::new());
  let dispatcher = Arc::new(NotificationDispatcher::new(
    Arc::clone(&store),
    Arc::clone(&fanout),
    Arc::new(NoopMailer),
  ));
  let lifecycle = Arc::new(MatchLifecycle::new(Arc::clone(&store), dispatcher));
  let state = AppState {
    store:     Arc::clone(&store),
    fanout,
    lifecycle,
    config:    Arc::new(ServerConfig::default()),
  };
  TestApp {
    store,
    app: studyswap_api::router(state),
  }
}

impl TestApp {
  async fn seed_pair(&self) -> (Uuid, Uuid, Uuid) {
    let requester = self
      .store
      .save_user(NewUser {
        email:    "requester@example.com".into(),
        nickname: "requester".into(),
      })
      .await
      .unwrap();
    let receiver = self
      .store
      .save_user(NewUser {
        email:    "receiver@example.com".into(),
        nickname: "receiver".into(),
      })
      .await
      .unwrap();
    let material = self
      .store
      .save_material(NewStudyMaterial {
        uploader_id: requester.user_id,
        title:       "CS201 notes".into(),
        subject:     "CS201".into(),
        exam_type:   "MIDTERM".into(),
        status:      ApprovalStatus::Approved,
      })
      .await
      .unwrap();
    self
      .store
      .save_material(NewStudyMaterial {
        uploader_id: receiver.user_id,
        title:       "CS201 past papers".into(),
        subject:     "CS201".into(),
        exam_type:   "MIDTERM".into(),
        status:      ApprovalStatus::Approved,
      })
      .await
      .unwrap();
    (requester.user_id, receiver.user_id, material.material_id)
  }

  async fn send(
    &self,
    method: &str,
    path: &str,
    user: Option<Uuid>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(user) = user {
      builder = builder.header("x-user-id", user.to_string());
    }
    let request = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    self.app.clone().oneshot(request).await.unwrap()
  }
}

async fn json_body(response: axum::response::Response) -> Value {
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .expect("failed to read response body");
  serde_json::from_slice(&bytes).expect("failed to parse JSON response")
}

// ─── Matches ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn match_flow_over_http() {
  let t = test_app();
  let (requester, receiver, material) = t.seed_pair().await;

  // Request.
  let response = t
    .send(
      "POST",
      "/matches",
      Some(requester),
      Some(json!({
        "requester_material_id": material,
        "receiver_id": receiver,
      })),
    )
    .await;
  assert_eq!(response.status(), StatusCode::CREATED);
  let created = json_body(response).await;
  assert_eq!(created["status"], "PENDING");
  let match_id = created["match_id"].as_str().unwrap().to_owned();

  // Accept by the receiver.
  let response = t
    .send(
      "POST",
      &format!("/matches/{match_id}/accept"),
      Some(receiver),
      None,
    )
    .await;
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(json_body(response).await["status"], "ACCEPTED");

  // Complete by the requester.
  let response = t
    .send(
      "POST",
      &format!("/matches/{match_id}/complete"),
      Some(requester),
      None,
    )
    .await;
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(json_body(response).await["status"], "COMPLETED");
}

#[tokio::test]
async fn accept_by_requester_maps_to_403() {
  let t = test_app();
  let (requester, receiver, material) = t.seed_pair().await;

  let response = t
    .send(
      "POST",
      "/matches",
      Some(requester),
      Some(json!({
        "requester_material_id": material,
        "receiver_id": receiver,
      })),
    )
    .await;
  let match_id = json_body(response).await["match_id"]
    .as_str()
    .unwrap()
    .to_owned();

  let response = t
    .send(
      "POST",
      &format!("/matches/{match_id}/accept"),
      Some(requester),
      None,
    )
    .await;
  assert_eq!(response.status(), StatusCode::FORBIDDEN);
  assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn self_match_maps_to_400_and_unknown_match_to_404() {
  let t = test_app();
  let (requester, _, material) = t.seed_pair().await;

  let response = t
    .send(
      "POST",
      "/matches",
      Some(requester),
      Some(json!({
        "requester_material_id": material,
        "receiver_id": requester,
      })),
    )
    .await;
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);

  let response = t
    .send(
      "POST",
      &format!("/matches/{}/accept", Uuid::new_v4()),
      Some(requester),
      None,
    )
    .await;
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn double_accept_maps_to_409() {
  let t = test_app();
  let (requester, receiver, material) = t.seed_pair().await;

  let response = t
    .send(
      "POST",
      "/matches",
      Some(requester),
      Some(json!({
        "requester_material_id": material,
        "receiver_id": receiver,
      })),
    )
    .await;
  let match_id = json_body(response).await["match_id"]
    .as_str()
    .unwrap()
    .to_owned();

  let path = format!("/matches/{match_id}/accept");
  let first = t.send("POST", &path, Some(receiver), None).await;
  assert_eq!(first.status(), StatusCode::OK);
  let second = t.send("POST", &path, Some(receiver), None).await;
  assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn missing_identity_header_is_401() {
  let t = test_app();
  let response = t.send("GET", "/matches", None, None).await;
  assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn candidates_lists_partner_materials() {
  let t = test_app();
  let (requester, _, material) = t.seed_pair().await;

  let response = t
    .send(
      "GET",
      &format!("/matches/candidates?material_id={material}"),
      Some(requester),
      None,
    )
    .await;
  assert_eq!(response.status(), StatusCode::OK);
  let candidates = json_body(response).await;
  assert_eq!(candidates.as_array().unwrap().len(), 1);
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn notification_read_flow_over_http() {
  let t = test_app();
  let (requester, receiver, material) = t.seed_pair().await;

  // A match request leaves the receiver one unread notification.
  t.send(
    "POST",
    "/matches",
    Some(requester),
    Some(json!({
      "requester_material_id": material,
      "receiver_id": receiver,
    })),
  )
  .await;

  let response = t
    .send("GET", "/notifications/unread-count", Some(receiver), None)
    .await;
  assert_eq!(json_body(response).await["unread_count"], 1);

  let response = t.send("GET", "/notifications", Some(receiver), None).await;
  let list = json_body(response).await;
  let id = list[0]["notification_id"].as_str().unwrap().to_owned();

  let response = t
    .send(
      "PUT",
      &format!("/notifications/{id}/read"),
      Some(receiver),
      None,
    )
    .await;
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(json_body(response).await["read"], true);

  let response = t
    .send(
      "GET",
      "/notifications?unread=true",
      Some(receiver),
      None,
    )
    .await;
  assert_eq!(json_body(response).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn deleting_anothers_notification_is_403() {
  let t = test_app();
  let (requester, receiver, material) = t.seed_pair().await;

  t.send(
    "POST",
    "/matches",
    Some(requester),
    Some(json!({
      "requester_material_id": material,
      "receiver_id": receiver,
    })),
  )
  .await;

  let response = t.send("GET", "/notifications", Some(receiver), None).await;
  let id = json_body(response).await[0]["notification_id"]
    .as_str()
    .unwrap()
    .to_owned();

  let response = t
    .send(
      "DELETE",
      &format!("/notifications/{id}"),
      Some(requester),
      None,
    )
    .await;
  assert_eq!(response.status(), StatusCode::FORBIDDEN);

  let response = t
    .send(
      "DELETE",
      &format!("/notifications/{id}"),
      Some(receiver),
      None,
    )
    .await;
  assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn stream_endpoint_speaks_sse_and_cleanup_returns_204() {
  let t = test_app();
  let (requester, _, _) = t.seed_pair().await;

  let response = t
    .send("GET", "/notifications/stream", Some(requester), None)
    .await;
  assert_eq!(response.status(), StatusCode::OK);
  let content_type = response
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
    .to_owned();
  assert!(content_type.starts_with("text/event-stream"));

  let response = t
    .send("DELETE", "/notifications/stream", Some(requester), None)
    .await;
  assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode},
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use cartshare::{
    auth::Role,
    db::entities::{list_member, shopping_list, user},
    domain::notification::{NotificationKind, NotificationStatus},
    routes::{API_PREFIX, router},
    test_helpers::{bearer, list_model, notification_model, test_state, user_model},
};

const SECRET: &[u8] = b"test-secret";

fn app(db: DatabaseConnection) -> Router {
    router(test_state(db, SECRET))
}

fn auth(user_id: &Uuid) -> String {
    bearer(SECRET, user_id, vec![Role::User])
}

fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

async fn json_response(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

fn post_json(path: &str, auth: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(api_path(path))
        .header("authorization", auth)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn share_to_unknown_email_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let alice = Uuid::new_v4();

    let (status, json) = json_response(
        app(db),
        post_json(
            &format!("/lists/{}/share", Uuid::new_v4()),
            &auth(&alice),
            json!({ "recipientEmail": "nobody@example.com" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Recipient user not found");
}

#[tokio::test]
async fn share_of_someone_elses_list_is_forbidden() {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let mallory = Uuid::new_v4();
    let list_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model(bob, "Bob", "bob@example.com")]])
        .append_query_results([[list_model(list_id, alice, "Groceries")]])
        .into_connection();

    let (status, json) = json_response(
        app(db),
        post_json(
            &format!("/lists/{list_id}/share"),
            &auth(&mallory),
            json!({ "recipientEmail": "bob@example.com" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Only the list owner can share this list");
}

#[tokio::test]
async fn accepting_an_accepted_share_conflicts() {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let list_id = Uuid::new_v4();
    let mut accepted = notification_model(bob, alice, NotificationKind::ListShared, Some(list_id));
    accepted.status = NotificationStatus::Accepted.as_str().to_string();
    accepted.pending_key = None;
    let notification_id = accepted.id;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[accepted]])
        .append_query_results([[list_model(list_id, alice, "Groceries")]])
        .into_connection();

    let (status, json) = json_response(
        app(db),
        post_json(
            "/lists/accept-shared",
            &auth(&bob),
            json!({ "notificationId": notification_id, "listId": list_id }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "This list has already been accepted");
}

#[tokio::test]
async fn only_the_recipient_can_reject() {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let pending = notification_model(bob, alice, NotificationKind::ListShared, Some(Uuid::new_v4()));
    let path = format!("/notifications/{}/reject", pending.id);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[pending]])
        .into_connection();

    let (status, _) = json_response(app(db), post_json(&path, &auth(&alice), json!({}))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn feed_survives_a_deleted_sender_and_list() {
    let bob = Uuid::new_v4();
    let stale = notification_model(
        bob,
        Uuid::new_v4(),
        NotificationKind::ListAccepted,
        Some(Uuid::new_v4()),
    );
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[stale]])
        .append_query_results([Vec::<user::Model>::new()])
        .append_query_results([Vec::<shopping_list::Model>::new()])
        .into_connection();

    let (status, json) = json_response(
        app(db),
        Request::builder()
            .uri(api_path("/notifications"))
            .header("authorization", auth(&bob))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let entry = &json["data"][0];
    assert!(entry["sender"].is_null());
    assert_eq!(entry["type"], "LIST_ACCEPTED");
    assert_eq!(entry["listDetails"]["title"], "Unnamed List");
    assert_eq!(entry["listDetails"]["items"], json!([]));
}

#[tokio::test]
async fn strangers_cannot_read_a_list() {
    let alice = Uuid::new_v4();
    let list_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[list_model(list_id, alice, "Groceries")]])
        .append_query_results([Vec::<list_member::Model>::new()])
        .into_connection();

    let (status, json) = json_response(
        app(db),
        Request::builder()
            .uri(api_path(&format!("/lists/{list_id}")))
            .header("authorization", auth(&Uuid::new_v4()))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Not authorized to view this list");
}

#[tokio::test]
async fn upload_rejects_non_images() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let body = concat!(
        "--XBOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"image\"; filename=\"doc.pdf\"\r\n",
        "Content-Type: application/pdf\r\n\r\n",
        "%PDF-1.4\r\n",
        "--XBOUNDARY--\r\n"
    );

    let (status, json) = json_response(
        app(db),
        Request::builder()
            .method("POST")
            .uri(api_path("/profile/upload-image"))
            .header("authorization", auth(&Uuid::new_v4()))
            .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        "Only image files are allowed (jpeg, jpg, png, gif)"
    );
}

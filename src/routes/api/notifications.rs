use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::entities::{notification, user},
    domain::notification::ListSnapshot,
    middleware::CurrentUser,
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        notification_service::NotificationView,
        sharing_service::{Dismissal, RejectOutcome},
    },
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct SenderResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub status: String,
    pub read: bool,
    pub recipient_id: Uuid,
    /// `null` once the sender's account is gone.
    pub sender: Option<SenderResponse>,
    pub related_list_id: Option<Uuid>,
    pub list_details: Option<ListSnapshot>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectResponse {
    pub notification_id: Uuid,
    pub sender_notification_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissResponse {
    pub notification_id: Uuid,
    /// `"rejected"` for a pending share, `"deleted"` otherwise.
    pub outcome: &'static str,
    pub sender_notification_id: Option<Uuid>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/{id}", delete(delete_notification))
        .route("/notifications/{id}/read", patch(mark_read))
        .route("/notifications/{id}/reject", post(reject_share))
        .with_state(state)
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Vec<NotificationResponse>> {
    let feed = ServiceContext::from_state(state.as_ref())
        .notification()
        .feed(&user.id)
        .await?;
    JsonApiResponse::ok(feed.into_iter().map(NotificationResponse::from).collect())
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<NotificationResponse> {
    let services = ServiceContext::from_state(state.as_ref());
    let notification = services.notification().mark_read(&user.id, &id).await?;
    let sender = services.user().find_by_id(&notification.sender_id).await?;
    JsonApiResponse::ok(NotificationResponse::from_parts(notification, sender))
}

async fn reject_share(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<RejectResponse> {
    let outcome = ServiceContext::from_state(state.as_ref())
        .sharing(state.config.sharing.strategy)
        .reject(&user.id, &id)
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, "Share rejected", outcome.into())
}

async fn delete_notification(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<DismissResponse> {
    let dismissal = ServiceContext::from_state(state.as_ref())
        .sharing(state.config.sharing.strategy)
        .dismiss(&user.id, &id)
        .await?;
    let response = match dismissal {
        Dismissal::Rejected(outcome) => DismissResponse {
            notification_id: id,
            outcome: "rejected",
            sender_notification_id: outcome.sender_notification_id,
        },
        Dismissal::Deleted => DismissResponse {
            notification_id: id,
            outcome: "deleted",
            sender_notification_id: None,
        },
    };
    JsonApiResponse::with_status(StatusCode::OK, "Notification deleted", response)
}

impl NotificationResponse {
    fn from_parts(model: notification::Model, sender: Option<user::Model>) -> Self {
        Self {
            id: model.id,
            kind: model.kind,
            message: model.message,
            status: model.status,
            read: model.read,
            recipient_id: model.recipient_id,
            sender: sender.map(SenderResponse::from),
            related_list_id: model.related_list_id,
            list_details: model.list_details,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<NotificationView> for NotificationResponse {
    fn from(view: NotificationView) -> Self {
        let mut response = Self::from_parts(view.notification, view.sender);
        response.list_details = Some(view.list_details);
        response
    }
}

impl From<user::Model> for SenderResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

impl From<RejectOutcome> for RejectResponse {
    fn from(outcome: RejectOutcome) -> Self {
        Self {
            notification_id: outcome.notification_id,
            sender_notification_id: outcome.sender_notification_id,
        }
    }
}

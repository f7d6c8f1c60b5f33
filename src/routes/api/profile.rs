use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    routing::{delete, get, post},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::Role,
    db::entities::user,
    error::AppError,
    middleware::CurrentUser,
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, account_service::AccountDeletion, user_service::ProfileUpdate},
    state::AppState,
};

const IMAGE_FIELD: &str = "image";
// multipart framing on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub avatar: Option<String>,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDeletionResponse {
    pub lists_deleted: usize,
    pub shares_archived: u64,
    pub memberships_removed: u64,
    pub notifications_deleted: u64,
}

pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.uploads.max_bytes() + MULTIPART_OVERHEAD;
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route(
            "/profile/upload-image",
            post(upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/users/delete-account", delete(delete_account))
        .with_state(state)
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<UserResponse> {
    let profile = ServiceContext::from_state(state.as_ref())
        .user()
        .profile(&user.id)
        .await?;
    JsonApiResponse::ok(profile.into())
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(body): Json<UpdateProfileRequest>,
) -> ApiResult<UserResponse> {
    let update = ProfileUpdate {
        name: body.name,
        email: body.email,
        password: body.password,
    };
    let profile = ServiceContext::from_state(state.as_ref())
        .user()
        .update_profile(&user.id, update)
        .await?;
    JsonApiResponse::ok(profile.into())
}

async fn upload_image(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<UserResponse> {
    let too_large = || {
        AppError::bad_request(format!(
            "File too large. Maximum size is {}MB",
            state.uploads.max_bytes() / (1024 * 1024)
        ))
    };
    let read_error = |err: MultipartError| {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            too_large()
        } else {
            AppError::bad_request(format!("Invalid upload: {}", err.body_text()))
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(read_error)?;

        let avatar = state
            .uploads
            .save(file_name.as_deref(), content_type.as_deref(), &bytes)
            .await?;
        let profile = ServiceContext::from_state(state.as_ref())
            .user()
            .set_avatar(&user.id, &avatar)
            .await?;
        info!(user_id = %user.id, avatar = %avatar, "avatar updated");
        return JsonApiResponse::ok(profile.into());
    }

    Err(AppError::bad_request("No file uploaded"))
}

async fn delete_account(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<AccountDeletionResponse> {
    let deletion = ServiceContext::from_state(state.as_ref())
        .account()
        .delete_account(&user.id)
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, "account deleted", deletion.into())
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            is_admin: model.role == Role::Admin.as_str(),
            name: model.name,
            email: model.email,
            avatar: model.avatar,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
        }
    }
}

impl From<AccountDeletion> for AccountDeletionResponse {
    fn from(deletion: AccountDeletion) -> Self {
        Self {
            lists_deleted: deletion.lists_deleted,
            shares_archived: deletion.shares_archived,
            memberships_removed: deletion.memberships_removed,
            notifications_deleted: deletion.notifications_deleted,
        }
    }
}

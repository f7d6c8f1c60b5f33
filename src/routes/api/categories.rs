use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AdminRole,
    db::entities::category,
    domain::category::CategoryDraft,
    error::AppError,
    middleware::{AuthRoleGuard, CurrentUser},
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, category_service::CategoryService},
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub color: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .with_state(state)
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> ApiResult<Vec<CategoryResponse>> {
    let categories = category_service(state.as_ref()).list().await?;
    JsonApiResponse::ok(categories.into_iter().map(CategoryResponse::from).collect())
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Json(body): Json<CategoryRequest>,
) -> ApiResult<CategoryResponse> {
    let draft = body.into_draft()?;
    let created = category_service(state.as_ref()).create(draft).await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "created", created.into())
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Path(id): Path<Uuid>,
    Json(body): Json<CategoryRequest>,
) -> ApiResult<CategoryResponse> {
    let draft = body.into_draft()?;
    let updated = category_service(state.as_ref()).update(&id, draft).await?;
    JsonApiResponse::ok(updated.into())
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    category_service(state.as_ref()).delete(&id).await?;
    JsonApiResponse::with_status(StatusCode::OK, "deleted", serde_json::Value::Null)
}

impl CategoryRequest {
    fn into_draft(self) -> Result<CategoryDraft, AppError> {
        CategoryDraft::new(
            &self.name,
            self.description.as_deref(),
            self.color.as_deref(),
        )
    }
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            color: model.color,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn category_service(state: &AppState) -> CategoryService {
    ServiceContext::from_state(state).category()
}

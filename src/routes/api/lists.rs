use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{
        dao::list_dao::ListChanges,
        entities::{list_item, shopping_list},
    },
    domain::{
        category::CategoryDetails,
        list::{ItemDraft, ItemPatch, Progress},
    },
    error::AppError,
    middleware::CurrentUser,
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        list_service::{ListDetail, ListService, ListSummary, NewList},
        sharing_service::{AcceptOutcome, ShareOutcome},
    },
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemRequest {
    pub name: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub category_details: Option<CategoryDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateListRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub items: Vec<ItemRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateListRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub category_details: Option<CategoryDetails>,
    pub checked: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoveItemsRequest {
    pub item_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShareRequest {
    pub recipient_email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptSharedRequest {
    pub notification_id: Uuid,
    pub list_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub owner_id: Uuid,
    pub is_completed: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: Uuid,
    pub list_id: Uuid,
    pub name: String,
    pub quantity: String,
    pub unit: Option<String>,
    pub category: String,
    pub category_details: CategoryDetails,
    pub checked: bool,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub position: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDetailResponse {
    #[serde(flatten)]
    pub list: ListResponse,
    pub items: Vec<ItemResponse>,
    pub shared_with: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummaryResponse {
    #[serde(flatten)]
    pub list: ListResponse,
    pub items: Vec<ItemResponse>,
    pub progress: Progress,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedResponse {
    pub removed: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub notification_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptResponse {
    pub new_list_id: Option<Uuid>,
    pub notification_id: Uuid,
    pub sender_notification_id: Option<Uuid>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/lists", post(create_list).get(list_lists))
        .route("/lists/accept-shared", post(accept_shared))
        .route(
            "/lists/{list_id}",
            get(get_list).put(update_list).delete(delete_list),
        )
        .route("/lists/{list_id}/share", post(share_list))
        .route(
            "/lists/{list_id}/items",
            get(list_items).post(add_item).delete(remove_items),
        )
        .route(
            "/lists/{list_id}/items/{item_id}",
            patch(update_item).delete(delete_item),
        )
        .route("/lists/{list_id}/items/{item_id}/toggle", patch(toggle_item))
        .with_state(state)
}

async fn create_list(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(body): Json<CreateListRequest>,
) -> ApiResult<ListDetailResponse> {
    let items = body
        .items
        .into_iter()
        .map(ItemRequest::into_draft)
        .collect::<Result<Vec<_>, _>>()?;
    let new = NewList {
        title: body.title,
        description: body.description,
        category: body.category,
        items,
    };
    let detail = list_service(state.as_ref()).create_list(&user.id, new).await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "created", detail.into())
}

async fn list_lists(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<ListSummaryResponse>> {
    let summaries = list_service(state.as_ref())
        .list_lists(&user.id, query.limit)
        .await?;
    JsonApiResponse::ok(summaries.into_iter().map(ListSummaryResponse::from).collect())
}

async fn get_list(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(list_id): Path<Uuid>,
) -> ApiResult<ListDetailResponse> {
    let detail = list_service(state.as_ref()).get_list(&user.id, &list_id).await?;
    JsonApiResponse::ok(detail.into())
}

async fn update_list(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(list_id): Path<Uuid>,
    Json(body): Json<UpdateListRequest>,
) -> ApiResult<ListResponse> {
    let changes = ListChanges {
        title: body.title,
        description: body.description,
        category: body.category,
    };
    let list = list_service(state.as_ref())
        .update_list(&user.id, &list_id, changes)
        .await?;
    JsonApiResponse::ok(list.into())
}

async fn delete_list(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(list_id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    list_service(state.as_ref())
        .delete_list(&user.id, &list_id)
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, "deleted", serde_json::Value::Null)
}

async fn list_items(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(list_id): Path<Uuid>,
) -> ApiResult<Vec<ItemResponse>> {
    let items = list_service(state.as_ref()).items(&user.id, &list_id).await?;
    JsonApiResponse::ok(items.into_iter().map(ItemResponse::from).collect())
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(list_id): Path<Uuid>,
    Json(body): Json<ItemRequest>,
) -> ApiResult<ItemResponse> {
    let draft = body.into_draft()?;
    let item = list_service(state.as_ref())
        .add_item(&user.id, &list_id, draft)
        .await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "created", item.into())
}

async fn remove_items(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(list_id): Path<Uuid>,
    Json(body): Json<RemoveItemsRequest>,
) -> ApiResult<RemovedResponse> {
    if body.item_ids.is_empty() {
        return Err(AppError::bad_request("itemIds must not be empty"));
    }
    let removed = list_service(state.as_ref())
        .remove_items(&user.id, &list_id, body.item_ids)
        .await?;
    JsonApiResponse::ok(RemovedResponse { removed })
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((list_id, item_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateItemRequest>,
) -> ApiResult<ItemResponse> {
    let patch = ItemPatch {
        name: body.name,
        quantity: body.quantity,
        unit: body.unit,
        category: body.category,
        category_details: body.category_details,
        checked: body.checked,
    };
    if patch.is_empty() {
        return Err(AppError::bad_request("No fields to update"));
    }
    let item = list_service(state.as_ref())
        .update_item(&user.id, &list_id, &item_id, patch)
        .await?;
    JsonApiResponse::ok(item.into())
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((list_id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<serde_json::Value> {
    list_service(state.as_ref())
        .delete_item(&user.id, &list_id, &item_id)
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, "deleted", serde_json::Value::Null)
}

async fn toggle_item(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((list_id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<ItemResponse> {
    let item = list_service(state.as_ref())
        .toggle_item(&user.id, &list_id, &item_id)
        .await?;
    JsonApiResponse::ok(item.into())
}

async fn share_list(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(list_id): Path<Uuid>,
    Json(body): Json<ShareRequest>,
) -> ApiResult<ShareResponse> {
    let outcome = ServiceContext::from_state(state.as_ref())
        .sharing(state.config.sharing.strategy)
        .share(&user.id, &list_id, &body.recipient_email)
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, outcome.message.clone(), outcome.into())
}

async fn accept_shared(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(body): Json<AcceptSharedRequest>,
) -> ApiResult<AcceptResponse> {
    let outcome = ServiceContext::from_state(state.as_ref())
        .sharing(state.config.sharing.strategy)
        .accept(&user.id, &body.notification_id, &body.list_id)
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, "List accepted", outcome.into())
}

impl ItemRequest {
    fn into_draft(self) -> Result<ItemDraft, AppError> {
        ItemDraft::new(
            &self.name,
            self.quantity,
            self.unit,
            self.category.as_deref(),
            self.category_details,
        )
    }
}

impl From<shopping_list::Model> for ListResponse {
    fn from(model: shopping_list::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            category: model.category,
            owner_id: model.owner_id,
            is_completed: model.is_completed,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<list_item::Model> for ItemResponse {
    fn from(model: list_item::Model) -> Self {
        Self {
            id: model.id,
            list_id: model.list_id,
            name: model.name,
            quantity: model.quantity,
            unit: model.unit,
            category: model.category,
            category_details: model.category_details,
            checked: model.checked,
            completed_at: model.completed_at,
            position: model.position,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<ListDetail> for ListDetailResponse {
    fn from(detail: ListDetail) -> Self {
        Self {
            list: detail.list.into(),
            items: detail.items.into_iter().map(ItemResponse::from).collect(),
            shared_with: detail.members,
        }
    }
}

impl From<ListSummary> for ListSummaryResponse {
    fn from(summary: ListSummary) -> Self {
        Self {
            list: summary.list.into(),
            items: summary.items.into_iter().map(ItemResponse::from).collect(),
            progress: summary.progress,
        }
    }
}

impl From<ShareOutcome> for ShareResponse {
    fn from(outcome: ShareOutcome) -> Self {
        Self {
            notification_id: outcome.notification_id,
            message: outcome.message,
        }
    }
}

impl From<AcceptOutcome> for AcceptResponse {
    fn from(outcome: AcceptOutcome) -> Self {
        Self {
            new_list_id: outcome.new_list_id,
            notification_id: outcome.notification_id,
            sender_notification_id: outcome.sender_notification_id,
        }
    }
}

fn list_service(state: &AppState) -> ListService {
    ServiceContext::from_state(state).list()
}

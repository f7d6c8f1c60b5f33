use std::sync::Arc;

use axum::{Router, extract::State, routing::get};
use serde::Serialize;

use crate::{
    auth::AdminRole,
    middleware::AuthRoleGuard,
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    state::AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub users: u64,
    pub lists: u64,
    pub notifications: u64,
    pub sharing_strategy: &'static str,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/admin/stats", get(admin_stats))
        .with_state(state)
}

async fn admin_stats(
    State(state): State<Arc<AppState>>,
    _admin: AuthRoleGuard<AdminRole>,
) -> ApiResult<StatsResponse> {
    let services = ServiceContext::from_state(state.as_ref());
    JsonApiResponse::ok(StatsResponse {
        users: services.user().count_users().await?,
        lists: services.list().count_lists().await?,
        notifications: services.notification().count_notifications().await?,
        sharing_strategy: state.config.sharing.strategy.as_str(),
    })
}

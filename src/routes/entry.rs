use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;

use crate::{state::AppState, uploads::PUBLIC_PREFIX};

use super::api;

pub const API_PREFIX: &str = "/api";

pub fn router(state: Arc<AppState>) -> Router {
    let uploads = ServeDir::new(state.uploads.dir());
    Router::new()
        .nest(API_PREFIX, api::router(state))
        .nest_service(PUBLIC_PREFIX, uploads)
}

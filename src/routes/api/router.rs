use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{admin, auth, categories, lists, notifications, profile, public};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public::router())
        .merge(auth::router(state.clone()))
        .merge(profile::router(state.clone()))
        .merge(categories::router(state.clone()))
        .merge(lists::router(state.clone()))
        .merge(notifications::router(state.clone()))
        .merge(admin::router(state))
}

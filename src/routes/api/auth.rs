use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};

use crate::{
    auth::TokenBundle,
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    state::AppState,
};

// Fields default to empty so a missing one gets the service's 400 message.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckEmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: usize,
}

#[derive(Debug, Serialize)]
pub struct CheckEmailResponse {
    pub exists: bool,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
        .route("/auth/check-email", post(check_email))
        .with_state(state)
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<TokenResponse> {
    let services = ServiceContext::from_state(state.as_ref());
    let service = services.auth(&state.auth);
    let tokens = service
        .register(&body.name, &body.email, &body.password)
        .await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "registered", tokens.into())
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let services = ServiceContext::from_state(state.as_ref());
    let service = services.auth(&state.auth);
    let tokens = service.login(&body.email, &body.password).await?;
    JsonApiResponse::ok(tokens.into())
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<TokenResponse> {
    let services = ServiceContext::from_state(state.as_ref());
    let service = services.auth(&state.auth);
    let tokens = service.refresh(&body.refresh_token).await?;
    JsonApiResponse::ok(tokens.into())
}

async fn check_email(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CheckEmailRequest>,
) -> ApiResult<CheckEmailResponse> {
    let exists = ServiceContext::from_state(state.as_ref())
        .user()
        .email_exists(&body.email)
        .await?;
    JsonApiResponse::ok(CheckEmailResponse { exists })
}

impl From<TokenBundle> for TokenResponse {
    fn from(bundle: TokenBundle) -> Self {
        Self {
            access_token: bundle.access_token,
            refresh_token: bundle.refresh_token,
            token_type: bundle.token_type,
            expires_in: bundle.expires_in,
        }
    }
}

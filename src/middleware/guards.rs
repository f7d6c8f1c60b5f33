use std::{marker::PhantomData, sync::Arc};

use axum::{extract::FromRequestParts, http::header};
use uuid::Uuid;

use crate::{
    auth::{Claims, RequiredRole},
    error::AppError,
    state::AppState,
};

// Bearer token → verified claims, cached in request extensions.
impl FromRequestParts<Arc<AppState>> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(claims);
        }

        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let claims = state.auth.verify_header(authorization).await?;
        parts.extensions.insert(claims.clone());
        Ok(claims)
    }
}

pub struct AuthRoleGuard<R: RequiredRole> {
    pub claims: Claims,
    _marker: PhantomData<R>,
}

impl<R> FromRequestParts<Arc<AppState>> for AuthRoleGuard<R>
where
    R: RequiredRole,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = Claims::from_request_parts(parts, state).await?;

        if !claims.roles.iter().any(|role| role == &R::required()) {
            return Err(AppError::forbidden("Missing required role"));
        }

        Ok(Self {
            claims,
            _marker: PhantomData,
        })
    }
}

/// The authenticated caller, identified by the user id carried in `sub`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub claims: Claims,
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = Claims::from_request_parts(parts, state).await?;
        let id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AppError::unauthorized("Token subject is not a user id"))?;
        Ok(Self { id, claims })
    }
}

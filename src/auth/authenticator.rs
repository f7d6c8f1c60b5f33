use std::sync::Arc;

use tracing::info;

use crate::{config::AuthConfig, error::AppError, services::ServiceContext};

use super::{
    Claims,
    jwt::JwtKeys,
    providers::{AuthProvider, AuthProviderId, LocalAuthProvider},
};

const BEARER: &str = "bearer";

/// The credential backend selected by `auth.provider`, shared by the route
/// guards and the `/auth` endpoints.
#[derive(Clone)]
pub struct Authenticator {
    provider: Arc<dyn AuthProvider>,
}

impl Authenticator {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(cfg: &AuthConfig, services: &ServiceContext) -> Self {
        let provider: Arc<dyn AuthProvider> = match cfg.provider {
            AuthProviderId::Local => Arc::new(LocalAuthProvider::new(
                services.user(),
                services.refresh_token_dao(),
                JwtKeys::from_secret(cfg.jwt_secret.as_bytes()),
            )),
        };
        Self::new(provider)
    }

    /// [`Self::from_config`] plus the admin seed; run once at startup.
    pub async fn bootstrap(cfg: &AuthConfig, services: &ServiceContext) -> anyhow::Result<Self> {
        let auth = Self::from_config(cfg, services);
        auth.provider.seed_admin(cfg).await?;
        info!(provider = auth.id().as_str(), "auth provider ready");
        Ok(auth)
    }

    pub fn id(&self) -> AuthProviderId {
        self.provider.id()
    }

    pub fn provider(&self) -> &dyn AuthProvider {
        self.provider.as_ref()
    }

    /// Verifies an `Authorization` header value of the form `Bearer <jwt>`.
    /// The scheme is matched case-insensitively.
    pub async fn verify_header(&self, header: Option<&str>) -> Result<Claims, AppError> {
        let token = header
            .and_then(|value| value.trim().split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case(BEARER))
            .map(|(_, token)| token.trim())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::unauthorized("Missing/invalid Authorization header"))?;
        self.provider.verify(token).await
    }
}

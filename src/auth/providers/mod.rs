//! Credential backends. Only email/password accounts exist today; the trait
//! is the seam for adding another backend behind `auth.provider`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{Claims, TokenBundle},
    config::AuthConfig,
    error::AppError,
};

pub mod local;

pub use local::LocalAuthProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProviderId {
    Local,
}

impl AuthProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthProviderId::Local => "local",
        }
    }
}

impl std::str::FromStr for AuthProviderId {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(AuthProviderId::Local),
            other => Err(format!("unsupported auth provider: {other}")),
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn id(&self) -> AuthProviderId;

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<TokenBundle, AppError>;
    async fn login(&self, email: &str, password: &str) -> Result<TokenBundle, AppError>;
    /// Exchanges a refresh token for a new pair; the old one is spent.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, AppError>;
    async fn verify(&self, access_token: &str) -> Result<Claims, AppError>;

    /// Creates the configured admin account when missing.
    async fn seed_admin(&self, _cfg: &AuthConfig) -> anyhow::Result<()> {
        Ok(())
    }
}

use crate::{
    auth::{Authenticator, TokenBundle},
    error::AppError,
};

/// Account endpoints routed to whichever provider is configured.
#[derive(Clone, Copy)]
pub struct AuthService<'a> {
    auth: &'a Authenticator,
}

impl<'a> AuthService<'a> {
    pub fn new(auth: &'a Authenticator) -> Self {
        Self { auth }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<TokenBundle, AppError> {
        self.auth.provider().register(name, email, password).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenBundle, AppError> {
        self.auth.provider().login(email, password).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, AppError> {
        let refresh_token = refresh_token.trim();
        if refresh_token.is_empty() {
            return Err(AppError::bad_request("Refresh token is required"));
        }
        self.auth.provider().refresh(refresh_token).await
    }
}

use async_trait::async_trait;
use tracing::info;

use crate::{
    auth::{
        Claims, Role, TokenBundle,
        jwt::{JwtKeys, decode_token, encode_token, make_access_claims},
        password::{hash_password, verify_password},
    },
    config::AuthConfig,
    db::{dao::RefreshTokenDao, entities::user},
    domain::account::{MISSING_FIELDS, normalize_email, normalize_name},
    error::AppError,
    services::user_service::UserService,
};

use super::{AuthProvider, AuthProviderId};

const ACCESS_TTL_SECS: usize = 15 * 60;
const REFRESH_TTL_DAYS: i64 = 30;
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Email/password accounts stored in the `users` table.
#[derive(Clone)]
pub struct LocalAuthProvider {
    user_service: UserService,
    refresh_token_dao: RefreshTokenDao,
    jwt: JwtKeys,
}

impl LocalAuthProvider {
    pub fn new(
        user_service: UserService,
        refresh_token_dao: RefreshTokenDao,
        jwt: JwtKeys,
    ) -> Self {
        Self {
            user_service,
            refresh_token_dao,
            jwt,
        }
    }

    async fn issue_tokens(&self, user: &user::Model) -> Result<TokenBundle, AppError> {
        let claims = make_access_claims(&user.id, Role::claims_for(&user.role), ACCESS_TTL_SECS);
        let access_token = encode_token(&self.jwt, &claims)?;

        let refresh = self
            .refresh_token_dao
            .create_refresh_token(&user.id, Some(REFRESH_TTL_DAYS))
            .await?;

        Ok(TokenBundle {
            access_token,
            refresh_token: refresh.token,
            token_type: "Bearer",
            expires_in: ACCESS_TTL_SECS,
        })
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    fn id(&self) -> AuthProviderId {
        AuthProviderId::Local
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<TokenBundle, AppError> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AppError::bad_request(MISSING_FIELDS));
        }
        let name = normalize_name(name)?;
        let email = normalize_email(email)?;

        if self.user_service.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User already exists"));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .user_service
            .create_user(&name, &email, &password_hash, Role::User.as_str())
            .await?;
        info!(user_id = %user.id, "registered user");

        self.issue_tokens(&user).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<TokenBundle, AppError> {
        let user = self
            .user_service
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let now = chrono::Utc::now().fixed_offset();
        self.user_service.set_last_login(&user.id, &now).await?;

        self.issue_tokens(&user).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, AppError> {
        let token = self
            .refresh_token_dao
            .find_active_by_token(refresh_token)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        if token.revoked || token.expires_at < chrono::Utc::now().fixed_offset() {
            return Err(AppError::unauthorized("Refresh token expired"));
        }

        let user = self
            .user_service
            .find_by_id(&token.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        // single use: a replayed token loses the race here
        if !self.refresh_token_dao.consume(refresh_token).await? {
            return Err(AppError::unauthorized("Refresh token expired"));
        }

        self.issue_tokens(&user).await
    }

    async fn verify(&self, access_token: &str) -> Result<Claims, AppError> {
        decode_token(&self.jwt, access_token)
    }

    async fn seed_admin(&self, cfg: &AuthConfig) -> anyhow::Result<()> {
        if let Some(existing) = self.user_service.find_by_email(&cfg.admin_email).await? {
            info!(email = %existing.email, "admin user already present");
            return Ok(());
        }

        let hash = hash_password(&cfg.admin_password)
            .map_err(|err| anyhow::anyhow!("admin seed hash error: {err}"))?;
        let user = self
            .user_service
            .create_user(
                &cfg.admin_name,
                &cfg.admin_email,
                &hash,
                Role::Admin.as_str(),
            )
            .await?;
        info!(email = %user.email, "seeded admin user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, DbErr, IntoMockRow, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::{
        auth::{
            Role,
            jwt::{JwtKeys, encode_token, make_access_claims},
            password::hash_password,
            providers::AuthProvider,
        },
        config::AuthConfig,
        db::entities::{refresh_token, user},
        error::AppError,
        services::ServiceContext,
        test_helpers::{account_model, refresh_token_model},
    };

    use super::{ACCESS_TTL_SECS, AuthProviderId, LocalAuthProvider};

    struct ProviderFixtureBuilder {
        mock: MockDatabase,
        secret: Vec<u8>,
    }

    impl ProviderFixtureBuilder {
        fn new() -> Self {
            Self {
                mock: MockDatabase::new(DatabaseBackend::Postgres),
                secret: b"test-secret".to_vec(),
            }
        }

        fn with_secret(mut self, secret: &[u8]) -> Self {
            self.secret = secret.to_vec();
            self
        }

        fn with_rows<T, I>(mut self, rows: I) -> Self
        where
            T: IntoMockRow,
            I: IntoIterator<Item = T>,
        {
            self.mock = self.mock.append_query_results([rows]);
            self
        }

        fn with_query_error(mut self, error: DbErr) -> Self {
            self.mock = self.mock.append_query_errors([error]);
            self
        }

        fn with_exec_result(mut self, rows_affected: u64) -> Self {
            self.mock = self.mock.append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected,
            }]);
            self
        }

        /// find_by_email, then the find + update pair behind `set_last_login`.
        fn with_login_lookups(self, account: user::Model) -> Self {
            self.with_rows([account.clone()])
                .with_rows([account.clone()])
                .with_rows([account])
        }

        fn build(self) -> LocalAuthProvider {
            let db = self.mock.into_connection();
            let services = ServiceContext::new(&db);
            LocalAuthProvider::new(
                services.user(),
                services.refresh_token_dao(),
                JwtKeys::from_secret(&self.secret),
            )
        }
    }

    fn admin_config(admin_password: &str) -> AuthConfig {
        AuthConfig {
            provider: AuthProviderId::Local,
            jwt_secret: "unit-test-secret".to_string(),
            admin_email: "admin@example.com".to_string(),
            admin_password: admin_password.to_string(),
            admin_name: "Administrator".to_string(),
        }
    }

    #[tokio::test]
    async fn verify_accepts_token_from_same_secret_only() {
        let provider = ProviderFixtureBuilder::new()
            .with_secret(b"secret-a")
            .build();
        let claims = make_access_claims(&Uuid::new_v4(), vec![Role::User], 300);

        let good = encode_token(&JwtKeys::from_secret(b"secret-a"), &claims).expect("encode");
        let verified = provider.verify(&good).await.expect("same secret verifies");
        assert_eq!(verified.sub, claims.sub);

        let forged = encode_token(&JwtKeys::from_secret(b"secret-b"), &claims).expect("encode");
        let err = provider.verify(&forged).await.expect_err("other secret");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn register_requires_every_field() {
        let provider = ProviderFixtureBuilder::new().build();

        for (name, email, password) in [
            ("", "bob@example.com", "password123"),
            ("Bob", "   ", "password123"),
            ("Bob", "bob@example.com", ""),
        ] {
            let err = provider
                .register(name, email, password)
                .await
                .expect_err("missing field");
            assert_eq!(err.message(), "Please provide all required fields");
        }
    }

    #[tokio::test]
    async fn register_rejects_malformed_email_without_querying() {
        let provider = ProviderFixtureBuilder::new().build();

        let err = provider
            .register("Bob", "bob-at-example", "password123")
            .await
            .expect_err("bad email");
        assert_eq!(err.message(), "Please enter a valid email");
    }

    #[tokio::test]
    async fn register_conflicts_on_existing_email() {
        let provider = ProviderFixtureBuilder::new()
            .with_rows([account_model(Uuid::new_v4(), "bob@example.com", "hash", "user")])
            .build();

        let err = provider
            .register("Bob", "Bob@Example.com", "password123")
            .await
            .expect_err("duplicate email");
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.message(), "User already exists");
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let provider = ProviderFixtureBuilder::new()
            .with_rows(Vec::<user::Model>::new())
            .build();

        let err = provider
            .register("Bob", "bob@example.com", "short")
            .await
            .expect_err("short password");
        assert_eq!(err.message(), "Password must be at least 8 characters");
    }

    #[tokio::test]
    async fn register_issues_user_tokens() {
        let user_id = Uuid::new_v4();
        let provider = ProviderFixtureBuilder::new()
            .with_rows(Vec::<user::Model>::new())
            .with_rows([account_model(user_id, "bob@example.com", "hash", "user")])
            .with_rows([refresh_token_model("refresh-1", user_id, 30, false)])
            .build();

        let bundle = provider
            .register("Bob", "bob@example.com", "password123")
            .await
            .expect("register should succeed");
        assert_eq!(bundle.refresh_token, "refresh-1");
        assert_eq!(bundle.token_type, "Bearer");
        assert_eq!(bundle.expires_in, ACCESS_TTL_SECS);

        let claims = provider.verify(&bundle.access_token).await.expect("verify");
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.roles, vec![Role::User]);
    }

    #[tokio::test]
    async fn login_hides_whether_the_email_exists() {
        let hash = hash_password("password123").expect("hash");
        let missing = ProviderFixtureBuilder::new()
            .with_rows(Vec::<user::Model>::new())
            .build();
        let wrong_password = ProviderFixtureBuilder::new()
            .with_rows([account_model(Uuid::new_v4(), "bob@example.com", &hash, "user")])
            .build();

        let missing_err = missing
            .login("nobody@example.com", "password123")
            .await
            .expect_err("unknown email");
        let wrong_err = wrong_password
            .login("bob@example.com", "password124")
            .await
            .expect_err("wrong password");

        assert_eq!(missing_err.message(), "Invalid email or password");
        assert_eq!(wrong_err.message(), missing_err.message());
    }

    #[tokio::test]
    async fn admin_login_carries_both_roles() {
        let user_id = Uuid::new_v4();
        let hash = hash_password("password123").expect("hash");
        let provider = ProviderFixtureBuilder::new()
            .with_login_lookups(account_model(user_id, "admin@example.com", &hash, "admin"))
            .with_rows([refresh_token_model("refresh-admin", user_id, 30, false)])
            .build();

        let bundle = provider
            .login("admin@example.com", "password123")
            .await
            .expect("login should succeed");
        let claims = provider.verify(&bundle.access_token).await.expect("verify");

        assert_eq!(bundle.refresh_token, "refresh-admin");
        assert_eq!(claims.roles, vec![Role::Admin, Role::User]);
    }

    #[tokio::test]
    async fn refresh_rejects_unknown_and_expired_tokens() {
        let unknown = ProviderFixtureBuilder::new()
            .with_rows(Vec::<refresh_token::Model>::new())
            .build();
        let err = unknown.refresh("missing").await.expect_err("unknown token");
        assert_eq!(err.message(), "Invalid refresh token");

        let expired = ProviderFixtureBuilder::new()
            .with_rows([refresh_token_model("old", Uuid::new_v4(), -1, false)])
            .build();
        let err = expired.refresh("old").await.expect_err("expired token");
        assert_eq!(err.message(), "Refresh token expired");
    }

    #[tokio::test]
    async fn refresh_rotates_the_token() {
        let user_id = Uuid::new_v4();
        let provider = ProviderFixtureBuilder::new()
            .with_rows([refresh_token_model("old-token", user_id, 1, false)])
            .with_rows([account_model(user_id, "bob@example.com", "hash", "user")])
            .with_exec_result(1)
            .with_rows([refresh_token_model("new-token", user_id, 30, false)])
            .build();

        let bundle = provider
            .refresh("old-token")
            .await
            .expect("refresh should succeed");
        assert_eq!(bundle.refresh_token, "new-token");
    }

    #[tokio::test]
    async fn refresh_token_replay_is_rejected() {
        let user_id = Uuid::new_v4();
        let provider = ProviderFixtureBuilder::new()
            .with_rows([refresh_token_model("spent", user_id, 1, false)])
            .with_rows([account_model(user_id, "bob@example.com", "hash", "user")])
            .with_exec_result(0)
            .build();

        let err = provider.refresh("spent").await.expect_err("already used");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn seed_admin_skips_existing_account() {
        let provider = ProviderFixtureBuilder::new()
            .with_rows([account_model(Uuid::new_v4(), "admin@example.com", "hash", "admin")])
            .build();

        provider
            .seed_admin(&admin_config("admin-password"))
            .await
            .expect("existing admin is fine");
    }

    #[tokio::test]
    async fn seed_admin_creates_missing_account() {
        let provider = ProviderFixtureBuilder::new()
            .with_rows(Vec::<user::Model>::new())
            .with_rows([account_model(Uuid::new_v4(), "admin@example.com", "hash", "admin")])
            .build();

        provider
            .seed_admin(&admin_config("admin-password"))
            .await
            .expect("admin should be created");
    }

    #[tokio::test]
    async fn seed_admin_reports_hash_and_insert_failures() {
        let short = ProviderFixtureBuilder::new()
            .with_rows(Vec::<user::Model>::new())
            .build();
        let err = short
            .seed_admin(&admin_config("short"))
            .await
            .expect_err("short admin password");
        assert!(err.to_string().starts_with("admin seed hash error:"));

        let failing = ProviderFixtureBuilder::new()
            .with_rows(Vec::<user::Model>::new())
            .with_query_error(DbErr::Custom("insert failed".to_string()))
            .build();
        let err = failing
            .seed_admin(&admin_config("admin-password"))
            .await
            .expect_err("insert fails");
        assert!(err.to_string().contains("insert failed"));
    }
}

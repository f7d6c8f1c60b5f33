use uuid::Uuid;

use super::not_found_as;
use crate::{
    auth::password::hash_password,
    db::{
        dao::{DaoBase, DaoLayerError, UserDao, user_dao::ProfileChanges},
        entities::user,
    },
    domain::account::{normalize_email, normalize_name},
    error::AppError,
};

const USER_NOT_FOUND: &str = "User not found";

/// Profile fields a user may change about themselves.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    user_dao: UserDao,
}

impl UserService {
    pub fn new(user_dao: UserDao) -> Self {
        Self { user_dao }
    }

    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<user::Model>, AppError> {
        match self.user_dao.find_by_id(*id).await {
            Ok(model) => Ok(Some(model)),
            Err(DaoLayerError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_by_email(email).await?)
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<user::Model, AppError> {
        self.user_dao
            .create_user(name, email, password_hash, role)
            .await
            .map_err(|err| match err {
                DaoLayerError::UniqueViolation(_) => AppError::conflict("User already exists"),
                other => other.into(),
            })
    }

    pub async fn set_last_login(
        &self,
        user_id: &Uuid,
        last_login: &chrono::DateTime<chrono::FixedOffset>,
    ) -> Result<(), AppError> {
        Ok(self.user_dao.set_last_login(user_id, last_login).await?)
    }

    pub async fn profile(&self, user_id: &Uuid) -> Result<user::Model, AppError> {
        self.user_dao
            .find_by_id(*user_id)
            .await
            .map_err(not_found_as(USER_NOT_FOUND))
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::bad_request("Email is required"));
        }
        Ok(self.find_by_email(email).await?.is_some())
    }

    /// Validates and applies a profile update. A new email must not belong
    /// to another account.
    pub async fn update_profile(
        &self,
        user_id: &Uuid,
        update: ProfileUpdate,
    ) -> Result<user::Model, AppError> {
        let mut changes = ProfileChanges::default();
        if let Some(name) = update.name.as_deref() {
            changes.name = Some(normalize_name(name)?);
        }
        if let Some(email) = update.email.as_deref() {
            let email = normalize_email(email)?;
            if let Some(owner) = self.find_by_email(&email).await? {
                if owner.id != *user_id {
                    return Err(AppError::conflict("Email is already in use"));
                }
            }
            changes.email = Some(email);
        }
        if let Some(password) = update.password.as_deref() {
            changes.password_hash = Some(hash_password(password)?);
        }

        self.user_dao
            .update_profile(user_id, changes)
            .await
            .map_err(|err| match err {
                DaoLayerError::UniqueViolation(_) => AppError::conflict("Email is already in use"),
                other => not_found_as(USER_NOT_FOUND)(other),
            })
    }

    pub async fn set_avatar(&self, user_id: &Uuid, path: &str) -> Result<user::Model, AppError> {
        self.user_dao
            .set_avatar(user_id, path)
            .await
            .map_err(not_found_as(USER_NOT_FOUND))
    }

    pub async fn count_users(&self) -> Result<u64, AppError> {
        Ok(self.user_dao.count_users().await?)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::ProfileUpdate;
    use crate::{
        db::entities::user, error::AppError, services::ServiceContext, test_helpers::user_model,
    };

    #[tokio::test]
    async fn profile_of_missing_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let err = ServiceContext::new(&db)
            .user()
            .profile(&Uuid::new_v4())
            .await
            .expect_err("no such user");
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.message(), "User not found");
    }

    #[tokio::test]
    async fn email_taken_by_someone_else_conflicts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(Uuid::new_v4(), "Carol", "carol@example.com")]])
            .into_connection();

        let err = ServiceContext::new(&db)
            .user()
            .update_profile(
                &Uuid::new_v4(),
                ProfileUpdate {
                    email: Some("Carol@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect_err("email belongs to carol");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_any_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = ServiceContext::new(&db)
            .user()
            .update_profile(
                &Uuid::new_v4(),
                ProfileUpdate {
                    name: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect_err("blank name");
        assert_eq!(err.message(), "Name is required");
    }

    #[tokio::test]
    async fn renaming_keeps_own_email() {
        let id = Uuid::new_v4();
        let renamed = user_model(id, "Robert", "bob@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(id, "Bob", "bob@example.com")]])
            .append_query_results([[user_model(id, "Bob", "bob@example.com")]])
            .append_query_results([[renamed]])
            .into_connection();

        let updated = ServiceContext::new(&db)
            .user()
            .update_profile(
                &id,
                ProfileUpdate {
                    name: Some("Robert".to_string()),
                    email: Some("bob@example.com".to_string()),
                    password: None,
                },
            )
            .await
            .expect("own email is fine");
        assert_eq!(updated.name, "Robert");
    }
}

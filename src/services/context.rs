use sea_orm::DatabaseConnection;

use crate::{
    auth::Authenticator,
    db::dao::{DaoContext, RefreshTokenDao},
    domain::sharing::SharingStrategy,
    services::{
        account_service::AccountService, auth_service::AuthService,
        category_service::CategoryService, list_service::ListService,
        notification_service::NotificationService, sharing_service::SharingService,
        user_service::UserService,
    },
    state::AppState,
};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db)
    }

    pub fn user(&self) -> UserService {
        UserService::new(self.daos.user())
    }

    pub fn category(&self) -> CategoryService {
        CategoryService::new(self.daos.category())
    }

    pub fn list(&self) -> ListService {
        ListService::new(self.daos.list(), self.daos.notification())
    }

    pub fn notification(&self) -> NotificationService {
        NotificationService::new(
            self.daos.notification(),
            self.daos.user(),
            self.daos.list(),
        )
    }

    pub fn sharing(&self, strategy: SharingStrategy) -> SharingService {
        SharingService::new(
            self.daos.list(),
            self.daos.user(),
            self.daos.notification(),
            strategy,
        )
    }

    pub fn account(&self) -> AccountService {
        AccountService::new(
            self.daos.user(),
            self.daos.list(),
            self.daos.notification(),
            self.daos.refresh_token(),
        )
    }

    pub fn auth<'a>(&self, auth: &'a Authenticator) -> AuthService<'a> {
        AuthService::new(auth)
    }

    pub fn refresh_token_dao(&self) -> RefreshTokenDao {
        self.daos.refresh_token()
    }
}

use tracing::info;
use uuid::Uuid;

use super::not_found_as;
use crate::{
    db::dao::{DaoBase, ListDao, NotificationDao, RefreshTokenDao, UserDao},
    error::AppError,
};

/// What an account deletion removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountDeletion {
    pub lists_deleted: usize,
    pub shares_archived: u64,
    pub memberships_removed: u64,
    pub notifications_deleted: u64,
}

#[derive(Clone)]
pub struct AccountService {
    user_dao: UserDao,
    list_dao: ListDao,
    notification_dao: NotificationDao,
    refresh_token_dao: RefreshTokenDao,
}

impl AccountService {
    pub fn new(
        user_dao: UserDao,
        list_dao: ListDao,
        notification_dao: NotificationDao,
        refresh_token_dao: RefreshTokenDao,
    ) -> Self {
        Self {
            user_dao,
            list_dao,
            notification_dao,
            refresh_token_dao,
        }
    }

    /// Removes the user and everything hanging off them. Shares the user sent
    /// that are still PENDING are archived rather than deleted, so the
    /// recipients keep a readable (sender-less) entry.
    pub async fn delete_account(&self, user_id: &Uuid) -> Result<AccountDeletion, AppError> {
        self.user_dao
            .find_by_id(*user_id)
            .await
            .map_err(not_found_as("User not found"))?;

        // only owners share, so this covers every owned list
        let shares_archived = self
            .notification_dao
            .archive_pending_from_sender(user_id)
            .await?;
        let lists_deleted = self.list_dao.delete_lists_owned_by(user_id).await?.len();
        let memberships_removed = self.list_dao.remove_memberships_of(user_id).await?;
        let notifications_deleted = self.notification_dao.delete_for_recipient(user_id).await?;
        self.refresh_token_dao.delete_for_user(user_id).await?;
        self.user_dao
            .delete_user(user_id)
            .await
            .map_err(not_found_as("User not found"))?;

        info!(
            user_id = %user_id,
            lists_deleted,
            shares_archived,
            memberships_removed,
            notifications_deleted,
            "account deleted"
        );
        Ok(AccountDeletion {
            lists_deleted,
            shares_archived,
            memberships_removed,
            notifications_deleted,
        })
    }
}

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::not_found_as;
use crate::{
    db::{
        dao::{ListDao, NotificationDao, UserDao},
        entities::{notification, user},
    },
    domain::notification::ListSnapshot,
    error::AppError,
};

pub(crate) const NOTIFICATION_NOT_FOUND: &str = "Notification not found";

/// A notification as shown in the recipient's feed.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub notification: notification::Model,
    /// `None` once the sender deleted their account.
    pub sender: Option<user::Model>,
    pub list_details: ListSnapshot,
}

#[derive(Clone)]
pub struct NotificationService {
    notification_dao: NotificationDao,
    user_dao: UserDao,
    list_dao: ListDao,
}

impl NotificationService {
    pub fn new(notification_dao: NotificationDao, user_dao: UserDao, list_dao: ListDao) -> Self {
        Self {
            notification_dao,
            user_dao,
            list_dao,
        }
    }

    /// Loads a notification addressed to `user_id`; anyone else gets 403.
    pub async fn find_for_recipient(
        &self,
        user_id: &Uuid,
        notification_id: &Uuid,
    ) -> Result<notification::Model, AppError> {
        let notification = self
            .notification_dao
            .find_notification(notification_id)
            .await
            .map_err(not_found_as(NOTIFICATION_NOT_FOUND))?;
        if notification.recipient_id != *user_id {
            return Err(AppError::forbidden(
                "Not authorized to access this notification",
            ));
        }
        Ok(notification)
    }

    /// The recipient's notifications, newest first. Entries stored without a
    /// snapshot get one built from the related list's current title.
    pub async fn feed(&self, user_id: &Uuid) -> Result<Vec<NotificationView>, AppError> {
        let notifications = self.notification_dao.for_recipient(user_id).await?;

        let sender_ids: HashSet<Uuid> = notifications.iter().map(|n| n.sender_id).collect();
        let senders: HashMap<Uuid, user::Model> = self
            .user_dao
            .find_by_ids(sender_ids.into_iter().collect())
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let unsnapshotted: HashSet<Uuid> = notifications
            .iter()
            .filter(|n| n.list_details.is_none())
            .filter_map(|n| n.related_list_id)
            .collect();
        let titles: HashMap<Uuid, String> = self
            .list_dao
            .find_lists_by_ids(unsnapshotted.into_iter().collect())
            .await?
            .into_iter()
            .map(|list| (list.id, list.title))
            .collect();

        Ok(notifications
            .into_iter()
            .map(|notification| {
                let list_details = notification.list_details.clone().unwrap_or_else(|| {
                    let title = notification
                        .related_list_id
                        .and_then(|id| titles.get(&id))
                        .map(String::as_str);
                    ListSnapshot::placeholder(title)
                });
                NotificationView {
                    sender: senders.get(&notification.sender_id).cloned(),
                    list_details,
                    notification,
                }
            })
            .collect())
    }

    /// Idempotent.
    pub async fn mark_read(
        &self,
        user_id: &Uuid,
        notification_id: &Uuid,
    ) -> Result<notification::Model, AppError> {
        let notification = self.find_for_recipient(user_id, notification_id).await?;
        if notification.read {
            return Ok(notification);
        }
        self.notification_dao
            .mark_read(notification_id)
            .await
            .map_err(not_found_as(NOTIFICATION_NOT_FOUND))
    }

    pub async fn count_notifications(&self) -> Result<u64, AppError> {
        Ok(self.notification_dao.count_notifications().await?)
    }
}

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use super::not_found_as;
use crate::{
    db::{
        dao::{ListDao, NotificationDao, list_dao::ListChanges},
        entities::{list_item, shopping_list},
    },
    domain::list::{
        ItemDraft, ItemPatch, Progress, ensure_owner, ensure_visible, item_position,
        next_position, normalize_title,
    },
    error::AppError,
};

pub(crate) const LIST_NOT_FOUND: &str = "List not found";
const ITEM_NOT_FOUND: &str = "Item not found";

/// Input for `create_list`; `items` are appended in order.
#[derive(Debug, Default, Clone)]
pub struct NewList {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub items: Vec<ItemDraft>,
}

/// A list with its items (by position) and the users it is shared with.
#[derive(Debug, Clone)]
pub struct ListDetail {
    pub list: shopping_list::Model,
    pub items: Vec<list_item::Model>,
    pub members: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct ListSummary {
    pub list: shopping_list::Model,
    pub items: Vec<list_item::Model>,
    pub progress: Progress,
}

#[derive(Clone)]
pub struct ListService {
    list_dao: ListDao,
    notification_dao: NotificationDao,
}

impl ListService {
    pub fn new(list_dao: ListDao, notification_dao: NotificationDao) -> Self {
        Self {
            list_dao,
            notification_dao,
        }
    }

    async fn find_list(&self, list_id: &Uuid) -> Result<shopping_list::Model, AppError> {
        self.list_dao
            .find_list(list_id)
            .await
            .map_err(not_found_as(LIST_NOT_FOUND))
    }

    /// Loads the list and fails with 403 unless `user_id` owns it.
    async fn owned_list(
        &self,
        user_id: &Uuid,
        list_id: &Uuid,
    ) -> Result<shopping_list::Model, AppError> {
        let list = self.find_list(list_id).await?;
        ensure_owner(list.owner_id, *user_id)?;
        Ok(list)
    }

    async fn refresh_completion(&self, list_id: &Uuid) -> Result<(), AppError> {
        let list = self.find_list(list_id).await?;
        self.list_dao.refresh_completion(&list).await?;
        Ok(())
    }

    pub async fn create_list(&self, owner_id: &Uuid, new: NewList) -> Result<ListDetail, AppError> {
        let title = normalize_title(&new.title)?;
        let list = self
            .list_dao
            .create_list(owner_id, title, new.description, new.category)
            .await?;

        let mut items = Vec::with_capacity(new.items.len());
        for (position, draft) in new.items.into_iter().enumerate() {
            items.push(
                self.list_dao
                    .add_item(&list.id, item_position(position)?, draft)
                    .await?,
            );
        }

        info!(list_id = %list.id, owner_id = %owner_id, items = items.len(), "list created");
        Ok(ListDetail {
            list,
            items,
            members: Vec::new(),
        })
    }

    /// Lists owned by or shared with `user_id`, newest first.
    pub async fn list_lists(
        &self,
        user_id: &Uuid,
        limit: Option<u64>,
    ) -> Result<Vec<ListSummary>, AppError> {
        let lists = self.list_dao.lists_for_user(user_id, limit).await?;
        let ids = lists.iter().map(|list| list.id).collect();
        let mut items_by_list: HashMap<Uuid, Vec<list_item::Model>> = HashMap::new();
        for item in self.list_dao.items_for_lists(ids).await? {
            items_by_list.entry(item.list_id).or_default().push(item);
        }

        Ok(lists
            .into_iter()
            .map(|list| {
                let items = items_by_list.remove(&list.id).unwrap_or_default();
                let progress = Progress::from_checked(items.iter().map(|item| item.checked));
                ListSummary {
                    list,
                    items,
                    progress,
                }
            })
            .collect())
    }

    pub async fn get_list(&self, user_id: &Uuid, list_id: &Uuid) -> Result<ListDetail, AppError> {
        let list = self.find_list(list_id).await?;
        let members = self.list_dao.members(&list.id).await?;
        ensure_visible(list.owner_id, &members, *user_id)?;
        let items = self.list_dao.items(&list.id).await?;
        Ok(ListDetail {
            list,
            items,
            members,
        })
    }

    pub async fn items(
        &self,
        user_id: &Uuid,
        list_id: &Uuid,
    ) -> Result<Vec<list_item::Model>, AppError> {
        Ok(self.get_list(user_id, list_id).await?.items)
    }

    pub async fn update_list(
        &self,
        user_id: &Uuid,
        list_id: &Uuid,
        mut changes: ListChanges,
    ) -> Result<shopping_list::Model, AppError> {
        if let Some(title) = changes.title.as_deref() {
            changes.title = Some(normalize_title(title)?.to_string());
        }
        self.owned_list(user_id, list_id).await?;
        self.list_dao
            .update_list(list_id, changes)
            .await
            .map_err(not_found_as(LIST_NOT_FOUND))
    }

    /// Deletes the list, its items and memberships. Shares still waiting for
    /// an answer are archived first.
    pub async fn delete_list(&self, user_id: &Uuid, list_id: &Uuid) -> Result<(), AppError> {
        self.owned_list(user_id, list_id).await?;
        let archived = self
            .notification_dao
            .archive_pending_for_list(list_id)
            .await?;
        self.list_dao
            .delete_list(list_id)
            .await
            .map_err(not_found_as(LIST_NOT_FOUND))?;
        info!(list_id = %list_id, archived_shares = archived, "list deleted");
        Ok(())
    }

    pub async fn add_item(
        &self,
        user_id: &Uuid,
        list_id: &Uuid,
        draft: ItemDraft,
    ) -> Result<list_item::Model, AppError> {
        let list = self.owned_list(user_id, list_id).await?;
        let items = self.list_dao.items(list_id).await?;
        let position = next_position(items.iter().map(|item| item.position))?;

        let item = self.list_dao.add_item(list_id, position, draft).await?;
        // A fresh unchecked item always reopens the list.
        if list.is_completed {
            self.list_dao.set_completed(list_id, false).await?;
        }
        Ok(item)
    }

    pub async fn update_item(
        &self,
        user_id: &Uuid,
        list_id: &Uuid,
        item_id: &Uuid,
        patch: ItemPatch,
    ) -> Result<list_item::Model, AppError> {
        let patch = patch.normalized()?;
        self.owned_list(user_id, list_id).await?;
        let item = self
            .list_dao
            .update_item(list_id, item_id, patch)
            .await
            .map_err(not_found_as(ITEM_NOT_FOUND))?;
        self.refresh_completion(list_id).await?;
        Ok(item)
    }

    pub async fn toggle_item(
        &self,
        user_id: &Uuid,
        list_id: &Uuid,
        item_id: &Uuid,
    ) -> Result<list_item::Model, AppError> {
        self.owned_list(user_id, list_id).await?;
        let item = self
            .list_dao
            .toggle_item(list_id, item_id)
            .await
            .map_err(not_found_as(ITEM_NOT_FOUND))?;
        self.refresh_completion(list_id).await?;
        Ok(item)
    }

    pub async fn delete_item(
        &self,
        user_id: &Uuid,
        list_id: &Uuid,
        item_id: &Uuid,
    ) -> Result<(), AppError> {
        self.owned_list(user_id, list_id).await?;
        self.list_dao
            .delete_item(list_id, item_id)
            .await
            .map_err(not_found_as(ITEM_NOT_FOUND))?;
        self.refresh_completion(list_id).await
    }

    /// Removes the given items; ids not on the list are skipped. Returns how
    /// many were removed.
    pub async fn remove_items(
        &self,
        user_id: &Uuid,
        list_id: &Uuid,
        item_ids: Vec<Uuid>,
    ) -> Result<u64, AppError> {
        self.owned_list(user_id, list_id).await?;
        let removed = self.list_dao.delete_items(list_id, item_ids).await?;
        if removed > 0 {
            self.refresh_completion(list_id).await?;
        }
        Ok(removed)
    }

    pub async fn count_lists(&self) -> Result<u64, AppError> {
        Ok(self.list_dao.count_lists().await?)
    }
}

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    Order, QueryFilter, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, ExprTrait},
};
use uuid::Uuid;

use super::{
    DaoBase, DaoLayerError, DaoResult,
    base_traits::{HasIdActiveModel, TimestampedActiveModel},
};
use crate::{
    db::entities::{
        list_item, list_member,
        prelude::{ListItem, ListMember, ShoppingList},
        shopping_list,
    },
    domain::list::{ItemDraft, ItemPatch, is_completed},
};

#[derive(Clone)]
pub struct ListDao {
    db: DatabaseConnection,
}

impl DaoBase for ListDao {
    type Entity = ShoppingList;
    const ENTITY_NAME: &'static str = "shopping_list";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[derive(Clone)]
struct ListItemDao {
    db: DatabaseConnection,
}

impl DaoBase for ListItemDao {
    type Entity = ListItem;
    const ENTITY_NAME: &'static str = "list_item";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[derive(Clone)]
struct ListMemberDao {
    db: DatabaseConnection,
}

impl DaoBase for ListMemberDao {
    type Entity = ListMember;
    const ENTITY_NAME: &'static str = "list_member";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// List header fields to overwrite. An empty description or category clears
/// the stored value.
#[derive(Debug, Default, Clone)]
pub struct ListChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

fn item_active_model(list_id: Uuid, position: i32, draft: ItemDraft) -> list_item::ActiveModel {
    list_item::ActiveModel {
        list_id: Set(list_id),
        position: Set(position),
        name: Set(draft.name),
        quantity: Set(draft.quantity),
        unit: Set(draft.unit),
        category: Set(draft.category),
        category_details: Set(draft.category_details),
        checked: Set(false),
        completed_at: Set(None),
        ..Default::default()
    }
}

fn stamp_new<A>(active: &mut A, now: DateTimeWithTimeZone)
where
    A: HasIdActiveModel + TimestampedActiveModel,
{
    active.set_id(Uuid::new_v4());
    active.set_created_at(now);
    active.set_updated_at(now);
}

impl ListDao {
    fn item_dao(&self) -> ListItemDao {
        ListItemDao::new(&self.db)
    }

    fn member_dao(&self) -> ListMemberDao {
        ListMemberDao::new(&self.db)
    }

    pub async fn create_list(
        &self,
        owner_id: &Uuid,
        title: &str,
        description: Option<String>,
        category: Option<String>,
    ) -> DaoResult<shopping_list::Model> {
        let model = shopping_list::ActiveModel {
            owner_id: Set(*owner_id),
            title: Set(title.to_string()),
            description: Set(description.and_then(non_empty)),
            category: Set(category.and_then(non_empty)),
            is_completed: Set(false),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn find_list(&self, id: &Uuid) -> DaoResult<shopping_list::Model> {
        self.find_by_id(*id).await
    }

    pub async fn find_lists_by_ids(&self, ids: Vec<Uuid>) -> DaoResult<Vec<shopping_list::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_iter(None, None, move |query| {
            query.filter(shopping_list::Column::Id.is_in(ids.clone()))
        })
        .collect_all()
        .await
    }

    /// Lists the user owns or was granted, newest first.
    pub async fn lists_for_user(
        &self,
        user_id: &Uuid,
        limit: Option<u64>,
    ) -> DaoResult<Vec<shopping_list::Model>> {
        let shared = self.member_list_ids(user_id).await?;
        let visible = Condition::any()
            .add(shopping_list::Column::OwnerId.eq(*user_id))
            .add(shopping_list::Column::Id.is_in(shared));

        match limit {
            Some(limit) => {
                let limit = limit.clamp(1, Self::MAX_PAGE_SIZE);
                self.find(1, limit, None, move |query| query.filter(visible))
                    .await
                    .map(|response| response.data)
            }
            None => {
                self.find_iter(None, None, move |query| query.filter(visible.clone()))
                    .collect_all()
                    .await
            }
        }
    }

    pub async fn lists_owned_by(&self, owner_id: &Uuid) -> DaoResult<Vec<shopping_list::Model>> {
        let owner_id = *owner_id;
        self.find_iter(None, None, move |query| {
            query.filter(shopping_list::Column::OwnerId.eq(owner_id))
        })
        .collect_all()
        .await
    }

    pub async fn update_list(
        &self,
        id: &Uuid,
        changes: ListChanges,
    ) -> DaoResult<shopping_list::Model> {
        self.update(*id, move |active| {
            if let Some(title) = changes.title {
                active.title = Set(title);
            }
            if let Some(description) = changes.description {
                active.description = Set(non_empty(description));
            }
            if let Some(category) = changes.category {
                active.category = Set(non_empty(category));
            }
        })
        .await
    }

    /// Removes the list with its items and members.
    pub async fn delete_list(&self, id: &Uuid) -> DaoResult<()> {
        self.delete_children(vec![*id]).await?;
        self.delete(*id).await.map(|_| ())
    }

    /// Removes every list the user owns and returns their ids.
    pub async fn delete_lists_owned_by(&self, owner_id: &Uuid) -> DaoResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = self
            .lists_owned_by(owner_id)
            .await?
            .into_iter()
            .map(|list| list.id)
            .collect();
        if ids.is_empty() {
            return Ok(ids);
        }

        self.delete_children(ids.clone()).await?;
        ShoppingList::delete_many()
            .filter(shopping_list::Column::Id.is_in(ids.clone()))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(ids)
    }

    async fn delete_children(&self, list_ids: Vec<Uuid>) -> DaoResult<()> {
        ListItem::delete_many()
            .filter(list_item::Column::ListId.is_in(list_ids.clone()))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        ListMember::delete_many()
            .filter(list_member::Column::ListId.is_in(list_ids))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(())
    }

    pub async fn set_completed(&self, id: &Uuid, completed: bool) -> DaoResult<()> {
        ShoppingList::update_many()
            .col_expr(shopping_list::Column::IsCompleted, Expr::value(completed))
            .col_expr(
                shopping_list::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(shopping_list::Column::Id.eq(*id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(())
    }

    /// Re-derives `is_completed` from the stored items and writes it back
    /// when it changed.
    pub async fn refresh_completion(&self, list: &shopping_list::Model) -> DaoResult<bool> {
        let items = self.items(&list.id).await?;
        let completed = is_completed(items.iter().map(|item| item.checked));
        if completed != list.is_completed {
            self.set_completed(&list.id, completed).await?;
        }
        Ok(completed)
    }

    pub async fn count_lists(&self) -> DaoResult<u64> {
        self.count(|query| query).await
    }

    pub async fn items(&self, list_id: &Uuid) -> DaoResult<Vec<list_item::Model>> {
        let list_id = *list_id;
        self.item_dao()
            .find_iter(None, Some((list_item::Column::Position, Order::Asc)), move |query| {
                query.filter(list_item::Column::ListId.eq(list_id))
            })
            .collect_all()
            .await
    }

    pub async fn items_for_lists(&self, list_ids: Vec<Uuid>) -> DaoResult<Vec<list_item::Model>> {
        if list_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.item_dao()
            .find_iter(None, Some((list_item::Column::Position, Order::Asc)), move |query| {
                query.filter(list_item::Column::ListId.is_in(list_ids.clone()))
            })
            .collect_all()
            .await
    }

    pub async fn find_item(
        &self,
        list_id: &Uuid,
        item_id: &Uuid,
    ) -> DaoResult<Option<list_item::Model>> {
        let (list_id, item_id) = (*list_id, *item_id);
        self.item_dao()
            .find_one(move |query| {
                query
                    .filter(list_item::Column::Id.eq(item_id))
                    .filter(list_item::Column::ListId.eq(list_id))
            })
            .await
    }

    pub async fn add_item(
        &self,
        list_id: &Uuid,
        position: i32,
        draft: ItemDraft,
    ) -> DaoResult<list_item::Model> {
        self.item_dao()
            .create(item_active_model(*list_id, position, draft))
            .await
    }

    /// Applies `patch` to one item. Checking an item stamps `completed_at`;
    /// unchecking clears it.
    pub async fn update_item(
        &self,
        list_id: &Uuid,
        item_id: &Uuid,
        patch: ItemPatch,
    ) -> DaoResult<list_item::Model> {
        let item = self
            .find_item(list_id, item_id)
            .await?
            .ok_or_else(|| ListItemDao::not_found(*item_id))?;

        let now = Utc::now().fixed_offset();
        let was_checked = item.checked;
        let mut active = item.into_active_model();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(quantity) = patch.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(unit) = patch.unit {
            active.unit = Set(non_empty(unit));
        }
        if let Some(category) = patch.category {
            active.category = Set(category);
        }
        if let Some(details) = patch.category_details {
            active.category_details = Set(details);
        }
        if let Some(checked) = patch.checked {
            if checked != was_checked {
                active.completed_at = Set(checked.then_some(now));
            }
            active.checked = Set(checked);
        }
        active.set_updated_at(now);

        active.update(&self.db).await.map_err(DaoLayerError::from_db)
    }

    /// Flips `checked` in a single statement so concurrent toggles never
    /// lose an update. Siblings are untouched.
    pub async fn toggle_item(
        &self,
        list_id: &Uuid,
        item_id: &Uuid,
    ) -> DaoResult<list_item::Model> {
        let now = Utc::now().fixed_offset();
        let completed_at = Expr::case(
            Expr::col(list_item::Column::Checked).eq(false),
            Expr::value(now),
        )
        .finally(Expr::value(Option::<DateTimeWithTimeZone>::None));

        let result = ListItem::update_many()
            .col_expr(
                list_item::Column::Checked,
                Expr::col(list_item::Column::Checked).not(),
            )
            .col_expr(list_item::Column::CompletedAt, completed_at.into())
            .col_expr(list_item::Column::UpdatedAt, Expr::value(now))
            .filter(list_item::Column::Id.eq(*item_id))
            .filter(list_item::Column::ListId.eq(*list_id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;

        if result.rows_affected == 0 {
            return Err(ListItemDao::not_found(*item_id));
        }

        self.item_dao().find_by_id(*item_id).await
    }

    pub async fn delete_item(&self, list_id: &Uuid, item_id: &Uuid) -> DaoResult<()> {
        let removed = self.delete_items(list_id, vec![*item_id]).await?;
        if removed == 0 {
            return Err(ListItemDao::not_found(*item_id));
        }
        Ok(())
    }

    /// Removes the listed items; ids that are not on the list are ignored.
    pub async fn delete_items(&self, list_id: &Uuid, item_ids: Vec<Uuid>) -> DaoResult<u64> {
        if item_ids.is_empty() {
            return Ok(0);
        }
        let result = ListItem::delete_many()
            .filter(list_item::Column::ListId.eq(*list_id))
            .filter(list_item::Column::Id.is_in(item_ids))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }

    /// Creates a list owned by `owner_id` with the given header and items,
    /// all unchecked, in one transaction.
    pub async fn copy_list(
        &self,
        source: &shopping_list::Model,
        items: &[list_item::Model],
        owner_id: &Uuid,
    ) -> DaoResult<shopping_list::Model> {
        let now = Utc::now().fixed_offset();
        let txn = self.db.begin().await.map_err(DaoLayerError::Db)?;

        let mut list = shopping_list::ActiveModel {
            owner_id: Set(*owner_id),
            title: Set(source.title.clone()),
            description: Set(source.description.clone()),
            category: Set(source.category.clone()),
            is_completed: Set(false),
            ..Default::default()
        };
        stamp_new(&mut list, now);
        let list = list.insert(&txn).await.map_err(DaoLayerError::from_db)?;

        for item in items {
            let draft = ItemDraft {
                name: item.name.clone(),
                quantity: item.quantity.clone(),
                unit: item.unit.clone(),
                category: item.category.clone(),
                category_details: item.category_details.clone(),
            };
            let mut active = item_active_model(list.id, item.position, draft);
            stamp_new(&mut active, now);
            active.insert(&txn).await.map_err(DaoLayerError::from_db)?;
        }

        txn.commit().await.map_err(DaoLayerError::Db)?;
        Ok(list)
    }

    pub async fn members(&self, list_id: &Uuid) -> DaoResult<Vec<Uuid>> {
        let list_id = *list_id;
        let rows = self
            .member_dao()
            .find_iter(None, None, move |query| {
                query.filter(list_member::Column::ListId.eq(list_id))
            })
            .collect_all()
            .await?;
        Ok(rows.into_iter().map(|row| row.user_id).collect())
    }

    pub async fn is_member(&self, list_id: &Uuid, user_id: &Uuid) -> DaoResult<bool> {
        let (list_id, user_id) = (*list_id, *user_id);
        self.member_dao()
            .find_one(move |query| {
                query
                    .filter(list_member::Column::ListId.eq(list_id))
                    .filter(list_member::Column::UserId.eq(user_id))
            })
            .await
            .map(|row| row.is_some())
    }

    pub async fn add_member(&self, list_id: &Uuid, user_id: &Uuid) -> DaoResult<list_member::Model> {
        let model = list_member::ActiveModel {
            list_id: Set(*list_id),
            user_id: Set(*user_id),
            ..Default::default()
        };
        self.member_dao().create(model).await
    }

    async fn member_list_ids(&self, user_id: &Uuid) -> DaoResult<Vec<Uuid>> {
        let user_id = *user_id;
        let rows = self
            .member_dao()
            .find_iter(None, None, move |query| {
                query.filter(list_member::Column::UserId.eq(user_id))
            })
            .collect_all()
            .await?;
        Ok(rows.into_iter().map(|row| row.list_id).collect())
    }

    pub async fn remove_memberships_of(&self, user_id: &Uuid) -> DaoResult<u64> {
        let result = ListMember::delete_many()
            .filter(list_member::Column::UserId.eq(*user_id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }
}

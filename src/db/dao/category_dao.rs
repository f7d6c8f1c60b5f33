use sea_orm::{ColumnTrait, DatabaseConnection, Order, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::{
    db::entities::{category, prelude::Category},
    domain::category::CategoryDraft,
};

#[derive(Clone)]
pub struct CategoryDao {
    db: DatabaseConnection,
}

impl DaoBase for CategoryDao {
    type Entity = Category;
    const ENTITY_NAME: &'static str = "category";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl CategoryDao {
    pub async fn list_by_name(&self) -> DaoResult<Vec<category::Model>> {
        self.find_iter(None, Some((category::Column::Name, Order::Asc)), |query| query)
            .collect_all()
            .await
    }

    pub async fn find_by_name(&self, name: &str) -> DaoResult<Option<category::Model>> {
        let name = name.to_string();
        self.find_one(move |query| query.filter(category::Column::Name.eq(name)))
            .await
    }

    pub async fn create_category(&self, draft: CategoryDraft) -> DaoResult<category::Model> {
        let model = category::ActiveModel {
            name: Set(draft.name),
            description: Set(draft.description),
            color: Set(draft.color),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn update_category(
        &self,
        id: &Uuid,
        draft: CategoryDraft,
    ) -> DaoResult<category::Model> {
        self.update(*id, move |active| {
            active.name = Set(draft.name);
            active.description = Set(draft.description);
            active.color = Set(draft.color);
        })
        .await
    }

    pub async fn delete_category(&self, id: &Uuid) -> DaoResult<()> {
        self.delete(*id).await.map(|_| ())
    }
}

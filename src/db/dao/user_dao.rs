use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::{prelude::User, user};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;
    const ENTITY_NAME: &'static str = "user";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Profile fields to overwrite; `None` keeps the stored value.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserDao {
    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        let email = email.trim().to_lowercase();
        self.find_one(move |query| query.filter(user::Column::Email.eq(email)))
            .await
    }

    pub async fn find_by_ids(&self, ids: Vec<Uuid>) -> DaoResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_iter(None, None, move |query| {
            query.filter(user::Column::Id.is_in(ids.clone()))
        })
        .collect_all()
        .await
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.trim().to_lowercase()),
            password_hash: Set(password_hash.to_string()),
            role: Set(role.to_string()),
            avatar: Set(None),
            last_login_at: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn set_last_login(
        &self,
        id: &Uuid,
        at: &chrono::DateTime<chrono::FixedOffset>,
    ) -> DaoResult<()> {
        let at = *at;
        self.update(*id, move |active| {
            active.last_login_at = Set(Some(at));
        })
        .await
        .map(|_| ())
    }

    pub async fn update_profile(&self, id: &Uuid, changes: ProfileChanges) -> DaoResult<user::Model> {
        self.update(*id, move |active| {
            if let Some(name) = changes.name {
                active.name = Set(name);
            }
            if let Some(email) = changes.email {
                active.email = Set(email.trim().to_lowercase());
            }
            if let Some(password_hash) = changes.password_hash {
                active.password_hash = Set(password_hash);
            }
        })
        .await
    }

    pub async fn set_avatar(&self, id: &Uuid, path: &str) -> DaoResult<user::Model> {
        let path = path.to_string();
        self.update(*id, move |active| {
            active.avatar = Set(Some(path));
        })
        .await
    }

    pub async fn delete_user(&self, id: &Uuid) -> DaoResult<()> {
        self.delete(*id).await.map(|_| ())
    }

    pub async fn count_users(&self) -> DaoResult<u64> {
        self.count(|query| query).await
    }
}

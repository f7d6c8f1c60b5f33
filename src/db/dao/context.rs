use sea_orm::DatabaseConnection;

use super::{CategoryDao, DaoBase, ListDao, NotificationDao, RefreshTokenDao, UserDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn refresh_token(&self) -> RefreshTokenDao {
        DaoBase::new(&self.db)
    }

    pub fn category(&self) -> CategoryDao {
        DaoBase::new(&self.db)
    }

    pub fn list(&self) -> ListDao {
        DaoBase::new(&self.db)
    }

    pub fn notification(&self) -> NotificationDao {
        DaoBase::new(&self.db)
    }
}

use uuid::Uuid;

use super::not_found_as;
use crate::{
    db::{
        dao::{CategoryDao, DaoLayerError},
        entities::category,
    },
    domain::category::CategoryDraft,
    error::AppError,
};

const CATEGORY_NOT_FOUND: &str = "Category not found";
const CATEGORY_EXISTS: &str = "Category already exists";

fn duplicate_as_conflict(err: DaoLayerError) -> AppError {
    match err {
        DaoLayerError::UniqueViolation(_) => AppError::conflict(CATEGORY_EXISTS),
        other => not_found_as(CATEGORY_NOT_FOUND)(other),
    }
}

#[derive(Clone)]
pub struct CategoryService {
    category_dao: CategoryDao,
}

impl CategoryService {
    pub fn new(category_dao: CategoryDao) -> Self {
        Self { category_dao }
    }

    pub async fn list(&self) -> Result<Vec<category::Model>, AppError> {
        Ok(self.category_dao.list_by_name().await?)
    }

    pub async fn create(&self, draft: CategoryDraft) -> Result<category::Model, AppError> {
        if self.category_dao.find_by_name(&draft.name).await?.is_some() {
            return Err(AppError::conflict(CATEGORY_EXISTS));
        }
        self.category_dao
            .create_category(draft)
            .await
            .map_err(duplicate_as_conflict)
    }

    pub async fn update(&self, id: &Uuid, draft: CategoryDraft) -> Result<category::Model, AppError> {
        if let Some(existing) = self.category_dao.find_by_name(&draft.name).await? {
            if existing.id != *id {
                return Err(AppError::conflict(CATEGORY_EXISTS));
            }
        }
        self.category_dao
            .update_category(id, draft)
            .await
            .map_err(duplicate_as_conflict)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        self.category_dao
            .delete_category(id)
            .await
            .map_err(not_found_as(CATEGORY_NOT_FOUND))
    }
}

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DaoLayerError {
    #[error("Database error: {0}")]
    Db(DbErr),
    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Invalid pagination: page={page} page_size={page_size}")]
    InvalidPagination { page: u64, page_size: u64 },
    #[error("Duplicate value: {0}")]
    UniqueViolation(String),
}

pub type DaoResult<T> = Result<T, DaoLayerError>;

impl DaoLayerError {
    /// Wraps a driver error, singling out unique-constraint violations.
    pub fn from_db(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => DaoLayerError::UniqueViolation(detail),
            _ => DaoLayerError::Db(err),
        }
    }
}

impl From<DbErr> for DaoLayerError {
    fn from(err: DbErr) -> Self {
        DaoLayerError::from_db(err)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;
    use uuid::Uuid;

    use super::DaoLayerError;

    #[test]
    fn plain_db_errors_stay_db_errors() {
        let err = DaoLayerError::from(DbErr::Custom("connection reset".to_string()));
        assert!(matches!(err, DaoLayerError::Db(_)));
    }

    #[test]
    fn not_found_names_entity_and_id() {
        let id = Uuid::nil();
        let err = DaoLayerError::NotFound {
            entity: "shopping_list",
            id,
        };
        assert_eq!(
            err.to_string(),
            format!("shopping_list not found (id={id})")
        );
    }
}

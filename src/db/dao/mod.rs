pub mod base;
pub mod base_traits;
pub mod category_dao;
mod context;
pub mod error;
pub mod list_dao;
pub mod notification_dao;
pub mod refresh_token_dao;
pub mod user_dao;

pub use base::{DaoBase, DaoPager, PaginatedResponse};
pub use base_traits::{
    HasCreatedAtColumn, HasIdActiveModel, HasIdColumn, TimestampedActiveModel,
};
pub use category_dao::CategoryDao;
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use list_dao::ListDao;
pub use notification_dao::NotificationDao;
pub use refresh_token_dao::RefreshTokenDao;
pub use user_dao::UserDao;

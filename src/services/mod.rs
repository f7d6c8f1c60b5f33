pub mod account_service;
pub mod auth_service;
pub mod category_service;
pub mod context;
pub mod list_service;
pub mod notification_service;
pub mod sharing_service;
pub mod user_service;

pub use context::ServiceContext;

use crate::{db::dao::DaoLayerError, error::AppError};

/// Replaces the DAO's "<entity> not found (id=..)" text with a client-facing
/// message; other errors convert as usual.
pub(crate) fn not_found_as(message: &'static str) -> impl FnOnce(DaoLayerError) -> AppError {
    move |err| match err {
        DaoLayerError::NotFound { .. } => AppError::not_found(message),
        other => other.into(),
    }
}

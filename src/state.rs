use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{auth::Authenticator, config::AppConfig, uploads::UploadStore};

/// Everything a handler can reach. Services are built per request from `db`.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub auth: Authenticator,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection, auth: Authenticator) -> Arc<Self> {
        let uploads = UploadStore::new(&config.uploads);
        Arc::new(Self {
            config,
            db,
            auth,
            uploads,
        })
    }
}

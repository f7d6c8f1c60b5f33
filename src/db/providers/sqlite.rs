use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use super::{DbProvider, DbProviderId, connect_options};
use crate::config::DatabaseConfig;

const BUSY_TIMEOUT_MS: u64 = 5_000;

/// Local runs and the database-backed tests.
pub struct SqliteDbProvider;

#[async_trait]
impl DbProvider for SqliteDbProvider {
    fn id(&self) -> DbProviderId {
        DbProviderId::Sqlite
    }

    async fn connect(&self, cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut options = connect_options(cfg);
        // one writer at a time; extra pooled connections only wait on the lock
        if cfg.url.contains(":memory:") {
            options.max_connections(1).min_connections(1);
        }
        Ok(Database::connect(options).await?)
    }

    // list items, members and refresh tokens are removed through ON DELETE CASCADE
    async fn post_connect(&self, db: &DatabaseConnection, _cfg: &DatabaseConfig) -> Result<()> {
        db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
        db.execute_unprepared(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"))
            .await?;
        Ok(())
    }
}

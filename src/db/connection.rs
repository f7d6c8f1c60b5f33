use sea_orm::DatabaseConnection;
use tracing::info;

use super::providers::provider_for_url;
use crate::config::DatabaseConfig;

/// Opens the pool through the provider matching the URL scheme, then creates
/// or alters tables to match the entity definitions.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let provider = provider_for_url(&cfg.url)?;
    let db = provider.connect(cfg).await?;
    provider.post_connect(&db, cfg).await?;

    info!(provider = provider.id().as_str(), "syncing database schema from entities");
    db.get_schema_registry("cartshare::db::entities::*")
        .sync(&db)
        .await?;
    Ok(db)
}

//! Connection setup per database engine, chosen from the URL scheme.

mod postgres;
mod sqlite;

use std::{sync::Arc, time::Duration};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use sea_orm::{ConnectOptions, DatabaseConnection};

use crate::config::DatabaseConfig;

use self::{postgres::PostgresDbProvider, sqlite::SqliteDbProvider};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbProviderId {
    Postgres,
    Sqlite,
}

impl DbProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            DbProviderId::Postgres => "postgres",
            DbProviderId::Sqlite => "sqlite",
        }
    }

    /// `postgres://`, `postgresql://` or `sqlite:` (any case).
    pub fn from_url(url: &str) -> Option<Self> {
        let (scheme, _) = url.trim().split_once(':')?;
        match scheme.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" if url.trim()[scheme.len()..].starts_with("://") => {
                Some(DbProviderId::Postgres)
            }
            "sqlite" => Some(DbProviderId::Sqlite),
            _ => None,
        }
    }
}

#[async_trait]
pub trait DbProvider: Send + Sync {
    fn id(&self) -> DbProviderId;
    async fn connect(&self, cfg: &DatabaseConfig) -> Result<DatabaseConnection>;
    /// Runs once per pool, before the schema sync.
    async fn post_connect(&self, _db: &DatabaseConnection, _cfg: &DatabaseConfig) -> Result<()> {
        Ok(())
    }
}

pub fn provider_for_url(url: &str) -> Result<Arc<dyn DbProvider>> {
    match DbProviderId::from_url(url) {
        Some(DbProviderId::Postgres) => Ok(Arc::new(PostgresDbProvider)),
        Some(DbProviderId::Sqlite) => Ok(Arc::new(SqliteDbProvider)),
        None => Err(anyhow!(
            "unsupported database url '{}'; expected postgres://, postgresql:// or sqlite:",
            redact_url(url)
        )),
    }
}

fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_idle)
        .connect_timeout(CONNECT_TIMEOUT)
        .sqlx_logging(false);
    options
}

/// Keeps credentials out of startup errors.
fn redact_url(url: &str) -> String {
    let trimmed = url.trim();
    match trimmed.split_once("://") {
        Some((scheme, _)) => format!("{scheme}://<redacted>"),
        None => match trimmed.split_once(':') {
            Some((scheme, _)) => format!("{scheme}:<redacted>"),
            None => "<invalid-url>".to_string(),
        },
    }
}

use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::Expr};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::refresh_token::{self, Entity as RefreshToken};

const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;

#[derive(Clone)]
pub struct RefreshTokenDao {
    db: DatabaseConnection,
}

impl DaoBase for RefreshTokenDao {
    type Entity = RefreshToken;
    const ENTITY_NAME: &'static str = "refresh_token";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RefreshTokenDao {
    pub async fn create_refresh_token(
        &self,
        user_id: &Uuid,
        ttl_days: Option<i64>,
    ) -> DaoResult<refresh_token::Model> {
        let expires_at = Utc::now().fixed_offset()
            + Duration::days(ttl_days.unwrap_or(DEFAULT_REFRESH_TTL_DAYS));
        let model = refresh_token::ActiveModel {
            token: Set(Uuid::new_v4().to_string()),
            user_id: Set(*user_id),
            expires_at: Set(expires_at),
            revoked: Set(false),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn find_active_by_token(
        &self,
        token: &str,
    ) -> DaoResult<Option<refresh_token::Model>> {
        let token = token.to_string();
        self.find_one(move |query| {
            query
                .filter(refresh_token::Column::Token.eq(token))
                .filter(refresh_token::Column::Revoked.eq(false))
        })
        .await
    }

    /// Revokes `token` if it is still live. `false` means another request
    /// already spent it.
    pub async fn consume(&self, token: &str) -> DaoResult<bool> {
        let result = RefreshToken::update_many()
            .col_expr(refresh_token::Column::Revoked, Expr::value(true))
            .col_expr(
                refresh_token::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(refresh_token::Column::Token.eq(token))
            .filter(refresh_token::Column::Revoked.eq(false))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected == 1)
    }

    pub async fn delete_for_user(&self, user_id: &Uuid) -> DaoResult<u64> {
        let result = RefreshToken::delete_many()
            .filter(refresh_token::Column::UserId.eq(*user_id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }
}

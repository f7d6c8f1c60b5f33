use sea_orm::entity::prelude::*;

use crate::domain::notification::ListSnapshot;

/// Sender, recipient and related list are plain ids: a notification outlives
/// the records it mentions.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(indexed)]
    pub recipient_id: Uuid,
    #[sea_orm(indexed)]
    pub sender_id: Uuid,
    pub kind: String,
    pub message: String,
    #[sea_orm(indexed)]
    pub related_list_id: Option<Uuid>,
    pub list_details: Option<ListSnapshot>,
    pub status: String,
    #[sea_orm(default_value = false)]
    pub read: bool,
    #[sea_orm(unique)]
    pub pending_key: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}

crate::db::dao::base_traits::impl_base_entity!();

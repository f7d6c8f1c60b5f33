use sea_orm::entity::prelude::*;

use crate::domain::category::CategoryDetails;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "list_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(indexed)]
    pub list_id: Uuid,
    pub position: i32,
    pub name: String,
    pub quantity: String,
    pub unit: Option<String>,
    pub category: String,
    pub category_details: CategoryDetails,
    #[sea_orm(default_value = false)]
    pub checked: bool,
    pub completed_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(belongs_to, from = "list_id", to = "id", on_delete = "Cascade")]
    pub list: HasOne<super::shopping_list::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

crate::db::dao::base_traits::impl_base_entity!();

#[allow(unused_imports)]
pub mod prelude {
    pub use super::category::Entity as Category;
    pub use super::list_item::Entity as ListItem;
    pub use super::list_member::Entity as ListMember;
    pub use super::notification::Entity as Notification;
    pub use super::refresh_token::Entity as RefreshToken;
    pub use super::shopping_list::Entity as ShoppingList;
    pub use super::user::Entity as User;
}

pub mod category;
pub mod list_item;
pub mod list_member;
pub mod notification;
pub mod refresh_token;
pub mod shopping_list;
pub mod user;

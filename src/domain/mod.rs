pub mod account;
pub mod category;
pub mod list;
pub mod notification;
pub mod sharing;

pub mod admin;
pub mod auth;
pub mod categories;
pub mod lists;
pub mod notifications;
pub mod profile;
pub mod public;
mod router;

pub use router::router;

mod authenticator;
pub mod jwt;
pub mod password;
pub mod providers;
mod types;

pub use authenticator::Authenticator;
pub use types::{AdminRole, Claims, RequiredRole, Role, TokenBundle};

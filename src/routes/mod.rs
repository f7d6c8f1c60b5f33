pub mod api;
mod entry;

pub use entry::{API_PREFIX, router};
pub use crate::middleware::{
    AuthRoleGuard, CurrentUser, catch_panic_layer, json_error_middleware,
};
pub use crate::response::{ApiResult, JsonApiResponse};

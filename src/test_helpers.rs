//! Fixtures shared by unit tests and the `tests/` router tests.

use std::sync::Arc;

use axum::Router;
use chrono::{Duration, Utc};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, prelude::DateTimeWithTimeZone};
use uuid::Uuid;

use crate::{
    auth::{
        Authenticator, Role,
        jwt::{JwtKeys, encode_token, make_access_claims},
        providers::AuthProviderId,
    },
    config::{AppConfig, AuthConfig},
    db::entities::{category, list_item, list_member, notification, refresh_token, shopping_list, user},
    domain::{
        category::{CategoryDetails, DEFAULT_COLOR, UNCATEGORIZED},
        notification::{NotificationKind, NotificationStatus, pending_key},
    },
    routes::router,
    services::ServiceContext,
    state::AppState,
};

pub fn ts() -> DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

pub fn test_auth_config(secret: &[u8]) -> AuthConfig {
    AuthConfig {
        provider: AuthProviderId::Local,
        jwt_secret: String::from_utf8_lossy(secret).into_owned(),
        admin_email: "admin@example.com".to_string(),
        admin_password: "adminpassword".to_string(),
        admin_name: "Administrator".to_string(),
    }
}

/// App state over `db` with a local auth provider signing with `secret`.
pub fn test_state(db: DatabaseConnection, secret: &[u8]) -> Arc<AppState> {
    let auth_cfg = test_auth_config(secret);
    let auth = Authenticator::from_config(&auth_cfg, &ServiceContext::new(&db));
    let cfg = AppConfig {
        auth: Some(auth_cfg),
        ..AppConfig::default()
    };
    AppState::new(cfg, db, auth)
}

/// Router over an empty mock database.
pub fn test_router(secret: &[u8]) -> Router {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    router(test_state(db, secret))
}

pub fn bearer(secret: &[u8], user_id: &Uuid, roles: Vec<Role>) -> String {
    let claims = make_access_claims(user_id, roles, 3600);
    let token = encode_token(&JwtKeys::from_secret(secret), &claims).expect("encode token");
    format!("Bearer {token}")
}

pub fn user_model(id: Uuid, name: &str, email: &str) -> user::Model {
    user::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        role: Role::User.as_str().to_string(),
        avatar: None,
        last_login_at: None,
    }
}

pub fn account_model(id: Uuid, email: &str, password_hash: &str, role: &str) -> user::Model {
    user::Model {
        password_hash: password_hash.to_string(),
        role: role.to_string(),
        ..user_model(id, "Test User", email)
    }
}

pub fn refresh_token_model(
    token: &str,
    user_id: Uuid,
    days_from_now: i64,
    revoked: bool,
) -> refresh_token::Model {
    refresh_token::Model {
        id: Uuid::new_v4(),
        created_at: ts(),
        updated_at: ts(),
        token: token.to_string(),
        user_id,
        expires_at: ts() + Duration::days(days_from_now),
        revoked,
    }
}

pub fn category_model(id: Uuid, name: &str) -> category::Model {
    category::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        name: name.to_string(),
        description: String::new(),
        color: DEFAULT_COLOR.to_string(),
    }
}

pub fn list_model(id: Uuid, owner_id: Uuid, title: &str) -> shopping_list::Model {
    shopping_list::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        owner_id,
        title: title.to_string(),
        description: None,
        category: None,
        is_completed: false,
    }
}

pub fn item_model(list_id: Uuid, position: i32, name: &str) -> list_item::Model {
    list_item::Model {
        id: Uuid::new_v4(),
        created_at: ts(),
        updated_at: ts(),
        list_id,
        position,
        name: name.to_string(),
        quantity: String::new(),
        unit: None,
        category: UNCATEGORIZED.to_string(),
        category_details: CategoryDetails::default(),
        checked: false,
        completed_at: None,
    }
}

pub fn member_model(list_id: Uuid, user_id: Uuid) -> list_member::Model {
    list_member::Model {
        id: Uuid::new_v4(),
        created_at: ts(),
        updated_at: ts(),
        list_id,
        user_id,
    }
}

/// A PENDING notification; shares of a list carry their `pending_key`.
pub fn notification_model(
    recipient_id: Uuid,
    sender_id: Uuid,
    kind: NotificationKind,
    related_list_id: Option<Uuid>,
) -> notification::Model {
    let pending = match (kind, related_list_id) {
        (NotificationKind::ListShared, Some(list_id)) => Some(pending_key(list_id, recipient_id)),
        _ => None,
    };
    notification::Model {
        id: Uuid::new_v4(),
        created_at: ts(),
        updated_at: ts(),
        recipient_id,
        sender_id,
        kind: kind.as_str().to_string(),
        message: format!("{} notification", kind.as_str()),
        related_list_id,
        list_details: None,
        status: NotificationStatus::Pending.as_str().to_string(),
        read: false,
        pending_key: pending,
    }
}

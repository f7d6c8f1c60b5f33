use sea_orm::{FromJsonQueryResult, prelude::DateTimeWithTimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    ListShared,
    ListAccepted,
    ListRejected,
    FriendRequest,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ListShared => "LIST_SHARED",
            NotificationKind::ListAccepted => "LIST_ACCEPTED",
            NotificationKind::ListRejected => "LIST_REJECTED",
            NotificationKind::FriendRequest => "FRIEND_REQUEST",
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "LIST_SHARED" => Ok(NotificationKind::ListShared),
            "LIST_ACCEPTED" => Ok(NotificationKind::ListAccepted),
            "LIST_REJECTED" => Ok(NotificationKind::ListRejected),
            "FRIEND_REQUEST" => Ok(NotificationKind::FriendRequest),
            other => Err(AppError::internal(format!("unknown notification kind: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    Pending,
    Accepted,
    Rejected,
    Archived,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "PENDING",
            NotificationStatus::Accepted => "ACCEPTED",
            NotificationStatus::Rejected => "REJECTED",
            NotificationStatus::Archived => "ARCHIVED",
        }
    }

    /// PENDING is the only state with outgoing edges.
    pub fn can_transition_to(self, next: NotificationStatus) -> bool {
        self == NotificationStatus::Pending && next != NotificationStatus::Pending
    }
}

impl TryFrom<&str> for NotificationStatus {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PENDING" => Ok(NotificationStatus::Pending),
            "ACCEPTED" => Ok(NotificationStatus::Accepted),
            "REJECTED" => Ok(NotificationStatus::Rejected),
            "ARCHIVED" => Ok(NotificationStatus::Archived),
            other => Err(AppError::internal(format!(
                "unknown notification status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotItem {
    pub name: String,
    pub quantity: String,
    pub unit: Option<String>,
    pub checked: bool,
}

/// The list as the recipient saw it when it was shared. Stored by value and
/// never refreshed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct ListSnapshot {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub items: Vec<SnapshotItem>,
    pub created_at: Option<DateTimeWithTimeZone>,
    pub item_count: u32,
}

impl ListSnapshot {
    pub const UNNAMED: &'static str = "Unnamed List";

    /// Stand-in for notifications stored without a snapshot.
    pub fn placeholder(title: Option<&str>) -> Self {
        Self {
            title: title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or(Self::UNNAMED)
                .to_string(),
            description: None,
            category: None,
            owner_name: None,
            owner_email: None,
            items: Vec::new(),
            created_at: None,
            item_count: 0,
        }
    }
}

/// Key held by a PENDING share; unique per (list, recipient).
pub fn pending_key(list_id: Uuid, recipient_id: Uuid) -> String {
    format!("{list_id}:{recipient_id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: Uuid,
    pub sender_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub related_list_id: Option<Uuid>,
    pub list_details: Option<ListSnapshot>,
}

impl NewNotification {
    pub fn validate(mut self) -> Result<Self, AppError> {
        if self.recipient_id == self.sender_id {
            return Err(AppError::bad_request(
                "Notification recipient and sender must differ",
            ));
        }
        self.message = self.message.trim().to_string();
        if self.message.is_empty() {
            return Err(AppError::bad_request("Notification message is required"));
        }
        Ok(self)
    }

    /// PENDING shares carry a pending key; everything else leaves it NULL.
    pub fn pending_key(&self) -> Option<String> {
        match (self.kind, self.related_list_id) {
            (NotificationKind::ListShared, Some(list_id)) => {
                Some(pending_key(list_id, self.recipient_id))
            }
            _ => None,
        }
    }
}

//! Decision rules for Share, Accept and Reject. Persistence lives in
//! `services::sharing_service`; everything here is pure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::notification::{NotificationKind, NotificationStatus};
use crate::{db::entities::notification, error::AppError};

/// How an accepted share is materialized for the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharingStrategy {
    /// The recipient gets an independent copy owned by them.
    #[default]
    Copy,
    /// The recipient joins the original list's members.
    Grant,
}

pub const ALREADY_SHARED: &str = "List is already shared with this user";

impl SharingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SharingStrategy::Copy => "copy",
            SharingStrategy::Grant => "grant",
        }
    }
}

/// The fields of a stored notification that the workflow decides on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareInvite {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Uuid,
    pub kind: NotificationKind,
    pub status: NotificationStatus,
    pub related_list_id: Option<Uuid>,
}

impl TryFrom<&notification::Model> for ShareInvite {
    type Error = AppError;

    fn try_from(model: &notification::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            recipient_id: model.recipient_id,
            sender_id: model.sender_id,
            kind: NotificationKind::try_from(model.kind.as_str())?,
            status: NotificationStatus::try_from(model.status.as_str())?,
            related_list_id: model.related_list_id,
        })
    }
}

// Share checks are split so callers can stop before the next lookup.

pub fn ensure_distinct(sender_id: Uuid, recipient_id: Uuid) -> Result<(), AppError> {
    if recipient_id == sender_id {
        return Err(AppError::bad_request("You cannot share a list with yourself"));
    }
    Ok(())
}

pub fn ensure_can_share(owner_id: Uuid, sender_id: Uuid) -> Result<(), AppError> {
    if owner_id != sender_id {
        return Err(AppError::forbidden("Only the list owner can share this list"));
    }
    Ok(())
}

pub fn ensure_not_shared(already_member: bool, pending_exists: bool) -> Result<(), AppError> {
    if already_member || pending_exists {
        return Err(AppError::conflict(ALREADY_SHARED));
    }
    Ok(())
}

/// Callers who are not the recipient learn nothing else about the share.
pub fn check_accept(invite: &ShareInvite, caller_id: Uuid, list_id: Uuid) -> Result<(), AppError> {
    if invite.recipient_id != caller_id {
        return Err(AppError::forbidden("Not authorized to accept this share"));
    }
    if invite.related_list_id != Some(list_id) {
        return Err(AppError::bad_request(
            "Notification does not refer to this list",
        ));
    }
    ensure_pending_share(invite)
}

pub fn check_reject(invite: &ShareInvite, caller_id: Uuid) -> Result<(), AppError> {
    if invite.recipient_id != caller_id {
        return Err(AppError::forbidden("Not authorized to reject this share"));
    }
    ensure_pending_share(invite)
}

fn ensure_pending_share(invite: &ShareInvite) -> Result<(), AppError> {
    if invite.kind != NotificationKind::ListShared {
        return Err(AppError::bad_request("Notification is not a list share"));
    }
    match invite.status {
        NotificationStatus::Pending => Ok(()),
        NotificationStatus::Accepted => {
            Err(AppError::conflict("This list has already been accepted"))
        }
        NotificationStatus::Rejected | NotificationStatus::Archived => {
            Err(AppError::conflict("This share is no longer pending"))
        }
    }
}

pub fn share_message(sender_name: &str, title: &str) -> String {
    format!("{sender_name} shared a list with you: {title}")
}

pub fn accepted_message(recipient_name: &str, title: &str) -> String {
    format!("{recipient_name} accepted your shared list: {title}")
}

pub fn rejected_message(recipient_name: &str, title: &str) -> String {
    format!("{recipient_name} declined your shared list: {title}")
}

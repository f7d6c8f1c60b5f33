//! Share → Accept / Reject. The PENDING notification is the only state the
//! workflow keeps; `pending_key` and the conditional claim make each step
//! happen at most once per (list, recipient).

use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    list_service::LIST_NOT_FOUND, not_found_as,
    notification_service::NOTIFICATION_NOT_FOUND,
};
use crate::{
    db::{
        dao::{DaoBase, DaoLayerError, ListDao, NotificationDao, UserDao},
        entities::{list_item, notification, shopping_list, user},
    },
    domain::{
        notification::{
            ListSnapshot, NewNotification, NotificationKind, NotificationStatus, SnapshotItem,
        },
        sharing::{
            ALREADY_SHARED, ShareInvite, SharingStrategy, accepted_message, check_accept,
            check_reject, ensure_can_share, ensure_distinct, ensure_not_shared, rejected_message,
            share_message,
        },
    },
    error::AppError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareOutcome {
    pub notification_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptOutcome {
    /// Set under the copy strategy.
    pub new_list_id: Option<Uuid>,
    pub notification_id: Uuid,
    /// `None` when the reply to the sender could not be stored.
    pub sender_notification_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectOutcome {
    pub notification_id: Uuid,
    pub sender_notification_id: Option<Uuid>,
}

/// What deleting a notification from the feed did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dismissal {
    /// A pending share was declined and kept as history.
    Rejected(RejectOutcome),
    Deleted,
}

fn snapshot(
    list: &shopping_list::Model,
    owner: &user::Model,
    items: &[list_item::Model],
) -> ListSnapshot {
    ListSnapshot {
        title: list.title.clone(),
        description: list.description.clone(),
        category: list.category.clone(),
        owner_name: Some(owner.name.clone()),
        owner_email: Some(owner.email.clone()),
        items: items
            .iter()
            .map(|item| SnapshotItem {
                name: item.name.clone(),
                quantity: item.quantity.clone(),
                unit: item.unit.clone(),
                checked: item.checked,
            })
            .collect(),
        created_at: Some(list.created_at),
        item_count: u32::try_from(items.len()).unwrap_or(u32::MAX),
    }
}

#[derive(Clone)]
pub struct SharingService {
    list_dao: ListDao,
    user_dao: UserDao,
    notification_dao: NotificationDao,
    strategy: SharingStrategy,
}

impl SharingService {
    pub fn new(
        list_dao: ListDao,
        user_dao: UserDao,
        notification_dao: NotificationDao,
        strategy: SharingStrategy,
    ) -> Self {
        Self {
            list_dao,
            user_dao,
            notification_dao,
            strategy,
        }
    }

    async fn user(&self, user_id: &Uuid) -> Result<user::Model, AppError> {
        self.user_dao
            .find_by_id(*user_id)
            .await
            .map_err(not_found_as("User not found"))
    }

    async fn list(&self, list_id: &Uuid) -> Result<shopping_list::Model, AppError> {
        self.list_dao
            .find_list(list_id)
            .await
            .map_err(not_found_as(LIST_NOT_FOUND))
    }

    async fn notification(&self, id: &Uuid) -> Result<notification::Model, AppError> {
        self.notification_dao
            .find_notification(id)
            .await
            .map_err(not_found_as(NOTIFICATION_NOT_FOUND))
    }

    /// Offers `list_id` to the user registered under `recipient_email`. The
    /// list itself is untouched until the recipient accepts.
    pub async fn share(
        &self,
        sender_id: &Uuid,
        list_id: &Uuid,
        recipient_email: &str,
    ) -> Result<ShareOutcome, AppError> {
        let recipient_email = recipient_email.trim();
        if recipient_email.is_empty() {
            return Err(AppError::bad_request("Recipient email is required"));
        }
        let recipient = self
            .user_dao
            .find_by_email(recipient_email)
            .await?
            .ok_or_else(|| AppError::not_found("Recipient user not found"))?;
        ensure_distinct(*sender_id, recipient.id)?;

        let list = self.list(list_id).await?;
        ensure_can_share(list.owner_id, *sender_id)?;
        let already_member = self.list_dao.is_member(list_id, &recipient.id).await?;
        let pending = self
            .notification_dao
            .find_pending_share(list_id, &recipient.id)
            .await?
            .is_some();
        ensure_not_shared(already_member, pending)?;

        let owner = self.user(sender_id).await?;
        let items = self.list_dao.items(list_id).await?;
        let message = share_message(&owner.name, &list.title);
        let new = NewNotification {
            recipient_id: recipient.id,
            sender_id: *sender_id,
            kind: NotificationKind::ListShared,
            message: message.clone(),
            related_list_id: Some(list.id),
            list_details: Some(snapshot(&list, &owner, &items)),
        }
        .validate()?;

        let created = self
            .notification_dao
            .create_notification(new)
            .await
            .map_err(|err| match err {
                DaoLayerError::UniqueViolation(_) => AppError::conflict(ALREADY_SHARED),
                other => other.into(),
            })?;

        info!(
            list_id = %list.id,
            sender_id = %sender_id,
            recipient_id = %recipient.id,
            notification_id = %created.id,
            "list shared"
        );
        Ok(ShareOutcome {
            notification_id: created.id,
            message,
        })
    }

    /// Accepts a pending share for `list_id` on behalf of `caller_id`.
    pub async fn accept(
        &self,
        caller_id: &Uuid,
        notification_id: &Uuid,
        list_id: &Uuid,
    ) -> Result<AcceptOutcome, AppError> {
        let stored = self.notification(notification_id).await?;
        let list = self.list(list_id).await?;
        let invite = ShareInvite::try_from(&stored)?;
        check_accept(&invite, *caller_id, *list_id)?;
        let recipient = self.user(caller_id).await?;

        if !self
            .notification_dao
            .claim(notification_id, NotificationStatus::Accepted)
            .await?
        {
            warn!(notification_id = %notification_id, "accept lost the claim race");
            return Err(AppError::conflict("This list has already been accepted"));
        }

        let new_list_id = match self.materialize(&list, caller_id).await {
            Ok(new_list_id) => new_list_id,
            Err(err) => {
                if let Err(release_err) = self
                    .notification_dao
                    .release(notification_id, NotificationStatus::Accepted, list_id, caller_id)
                    .await
                {
                    error!(
                        notification_id = %notification_id,
                        error = %release_err,
                        "failed to release share claim"
                    );
                }
                return Err(err);
            }
        };

        let reply = self
            .reply(NewNotification {
                recipient_id: invite.sender_id,
                sender_id: *caller_id,
                kind: NotificationKind::ListAccepted,
                message: accepted_message(&recipient.name, &list.title),
                related_list_id: Some(list.id),
                list_details: None,
            })
            .await;

        info!(
            list_id = %list.id,
            recipient_id = %caller_id,
            notification_id = %notification_id,
            strategy = self.strategy.as_str(),
            new_list_id = ?new_list_id,
            "share accepted"
        );
        Ok(AcceptOutcome {
            new_list_id,
            notification_id: *notification_id,
            sender_notification_id: reply,
        })
    }

    /// Stores the answer for the original sender. The share is already
    /// settled when this runs, so a failure is logged instead of returned.
    async fn reply(&self, new: NewNotification) -> Option<Uuid> {
        let kind = new.kind;
        let recipient_id = new.recipient_id;
        let stored = match new.validate() {
            Ok(valid) => self
                .notification_dao
                .create_notification(valid)
                .await
                .map_err(AppError::from),
            Err(err) => Err(err),
        };
        match stored {
            Ok(reply) => Some(reply.id),
            Err(err) => {
                error!(
                    kind = kind.as_str(),
                    recipient_id = %recipient_id,
                    error = %err,
                    "failed to notify sender"
                );
                None
            }
        }
    }

    async fn materialize(
        &self,
        list: &shopping_list::Model,
        recipient_id: &Uuid,
    ) -> Result<Option<Uuid>, AppError> {
        match self.strategy {
            SharingStrategy::Copy => {
                let items = self.list_dao.items(&list.id).await?;
                let copy = self.list_dao.copy_list(list, &items, recipient_id).await?;
                Ok(Some(copy.id))
            }
            SharingStrategy::Grant => {
                if !self.list_dao.is_member(&list.id, recipient_id).await? {
                    match self.list_dao.add_member(&list.id, recipient_id).await {
                        Ok(_) | Err(DaoLayerError::UniqueViolation(_)) => {}
                        Err(err) => return Err(err.into()),
                    }
                }
                Ok(None)
            }
        }
    }

    pub async fn reject(
        &self,
        caller_id: &Uuid,
        notification_id: &Uuid,
    ) -> Result<RejectOutcome, AppError> {
        let stored = self.notification(notification_id).await?;
        self.reject_loaded(caller_id, &stored).await
    }

    async fn reject_loaded(
        &self,
        caller_id: &Uuid,
        stored: &notification::Model,
    ) -> Result<RejectOutcome, AppError> {
        let invite = ShareInvite::try_from(stored)?;
        check_reject(&invite, *caller_id)?;

        let title = match (&stored.list_details, stored.related_list_id) {
            (Some(details), _) => details.title.clone(),
            (None, Some(list_id)) => self
                .list_dao
                .find_list(&list_id)
                .await
                .map(|list| list.title)
                .unwrap_or_else(|_| ListSnapshot::UNNAMED.to_string()),
            (None, None) => ListSnapshot::UNNAMED.to_string(),
        };
        let recipient = self.user(caller_id).await?;

        if !self
            .notification_dao
            .claim(&stored.id, NotificationStatus::Rejected)
            .await?
        {
            return Err(AppError::conflict("This share is no longer pending"));
        }

        let reply = self
            .reply(NewNotification {
                recipient_id: invite.sender_id,
                sender_id: *caller_id,
                kind: NotificationKind::ListRejected,
                message: rejected_message(&recipient.name, &title),
                related_list_id: stored.related_list_id,
                list_details: None,
            })
            .await;

        info!(
            notification_id = %stored.id,
            recipient_id = %caller_id,
            sender_id = %invite.sender_id,
            "share rejected"
        );
        Ok(RejectOutcome {
            notification_id: stored.id,
            sender_notification_id: reply,
        })
    }

    /// Deleting a pending share from the feed declines it; anything else is
    /// removed outright.
    pub async fn dismiss(
        &self,
        caller_id: &Uuid,
        notification_id: &Uuid,
    ) -> Result<Dismissal, AppError> {
        let stored = self.notification(notification_id).await?;
        if stored.recipient_id != *caller_id {
            return Err(AppError::forbidden(
                "Not authorized to delete this notification",
            ));
        }

        let pending_share = stored.kind == NotificationKind::ListShared.as_str()
            && stored.status == NotificationStatus::Pending.as_str();
        if pending_share {
            return self
                .reject_loaded(caller_id, &stored)
                .await
                .map(Dismissal::Rejected);
        }

        self.notification_dao
            .delete_notification(notification_id)
            .await
            .map_err(not_found_as(NOTIFICATION_NOT_FOUND))?;
        Ok(Dismissal::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{
        DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult, RuntimeErr,
    };
    use uuid::Uuid;

    use super::{Dismissal, SharingService};
    use crate::{
        db::entities::{list_member, notification, user},
        domain::{
            notification::{NotificationKind, NotificationStatus},
            sharing::SharingStrategy,
        },
        error::AppError,
        services::ServiceContext,
        test_helpers::{item_model, list_model, member_model, notification_model, user_model},
    };

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(db: &DatabaseConnection, strategy: SharingStrategy) -> SharingService {
        ServiceContext::new(db).sharing(strategy)
    }

    struct Scenario {
        alice: Uuid,
        bob: Uuid,
        list_id: Uuid,
    }

    impl Scenario {
        fn new() -> Self {
            Self {
                alice: Uuid::new_v4(),
                bob: Uuid::new_v4(),
                list_id: Uuid::new_v4(),
            }
        }

        fn alice_model(&self) -> user::Model {
            user_model(self.alice, "Alice", "alice@example.com")
        }

        fn bob_model(&self) -> user::Model {
            user_model(self.bob, "Bob", "bob@example.com")
        }

        fn invite(&self, status: NotificationStatus) -> notification::Model {
            let mut stored = notification_model(
                self.bob,
                self.alice,
                NotificationKind::ListShared,
                Some(self.list_id),
            );
            stored.status = status.as_str().to_string();
            if status != NotificationStatus::Pending {
                stored.pending_key = None;
            }
            stored
        }

        fn reply(&self, kind: NotificationKind) -> notification::Model {
            notification_model(self.alice, self.bob, kind, Some(self.list_id))
        }
    }

    #[tokio::test]
    async fn share_to_unknown_email_stops_after_one_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let err = service(&db, SharingStrategy::Copy)
            .share(&Uuid::new_v4(), &Uuid::new_v4(), "nobody@example.com")
            .await
            .expect_err("unknown recipient");

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.message(), "Recipient user not found");
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn share_requires_recipient_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = service(&db, SharingStrategy::Copy)
            .share(&Uuid::new_v4(), &Uuid::new_v4(), "  ")
            .await
            .expect_err("blank email");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn sharing_with_yourself_is_rejected() {
        let s = Scenario::new();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.alice_model()]])
            .into_connection();

        let err = service(&db, SharingStrategy::Copy)
            .share(&s.alice, &s.list_id, "alice@example.com")
            .await
            .expect_err("self share");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn non_owner_cannot_share_and_nothing_is_written() {
        let s = Scenario::new();
        let mallory = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.bob_model()]])
            .append_query_results([[list_model(s.list_id, s.alice, "Groceries")]])
            .into_connection();

        let err = service(&db, SharingStrategy::Copy)
            .share(&mallory, &s.list_id, "bob@example.com")
            .await
            .expect_err("not the owner");

        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(db.into_transaction_log().len(), 2);
    }

    #[tokio::test]
    async fn second_share_while_pending_conflicts() {
        let s = Scenario::new();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.bob_model()]])
            .append_query_results([[list_model(s.list_id, s.alice, "Groceries")]])
            .append_query_results([Vec::<list_member::Model>::new()])
            .append_query_results([[s.invite(NotificationStatus::Pending)]])
            .into_connection();

        let err = service(&db, SharingStrategy::Copy)
            .share(&s.alice, &s.list_id, "bob@example.com")
            .await
            .expect_err("already pending");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn share_to_existing_member_conflicts() {
        let s = Scenario::new();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.bob_model()]])
            .append_query_results([[list_model(s.list_id, s.alice, "Groceries")]])
            .append_query_results([[member_model(s.list_id, s.bob)]])
            .append_query_results([Vec::<notification::Model>::new()])
            .into_connection();

        let err = service(&db, SharingStrategy::Grant)
            .share(&s.alice, &s.list_id, "bob@example.com")
            .await
            .expect_err("already a member");
        assert_eq!(err.message(), "List is already shared with this user");
    }

    #[tokio::test]
    async fn share_creates_a_pending_notification() {
        let s = Scenario::new();
        let stored = s.invite(NotificationStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.bob_model()]])
            .append_query_results([[list_model(s.list_id, s.alice, "Groceries")]])
            .append_query_results([Vec::<list_member::Model>::new()])
            .append_query_results([Vec::<notification::Model>::new()])
            .append_query_results([[s.alice_model()]])
            .append_query_results([[item_model(s.list_id, 0, "Milk 1L")]])
            .append_query_results([[stored.clone()]])
            .into_connection();

        let outcome = service(&db, SharingStrategy::Copy)
            .share(&s.alice, &s.list_id, "Bob@Example.com")
            .await
            .expect("share should succeed");

        assert_eq!(outcome.notification_id, stored.id);
        assert_eq!(outcome.message, "Alice shared a list with you: Groceries");
    }

    #[tokio::test]
    async fn accept_with_copy_creates_a_list_and_notifies_sender() {
        let s = Scenario::new();
        let copy_id = Uuid::new_v4();
        let reply = s.reply(NotificationKind::ListAccepted);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.invite(NotificationStatus::Pending)]])
            .append_query_results([[list_model(s.list_id, s.alice, "Groceries")]])
            .append_query_results([[s.bob_model()]])
            .append_exec_results([exec(1)])
            .append_query_results([[item_model(s.list_id, 0, "Milk 1L")]])
            .append_query_results([[list_model(copy_id, s.bob, "Groceries")]])
            .append_query_results([[item_model(copy_id, 0, "Milk 1L")]])
            .append_query_results([[reply.clone()]])
            .into_connection();
        let notification_id = s.invite(NotificationStatus::Pending).id;

        let outcome = service(&db, SharingStrategy::Copy)
            .accept(&s.bob, &notification_id, &s.list_id)
            .await
            .expect("accept should succeed");

        assert_eq!(outcome.new_list_id, Some(copy_id));
        assert_eq!(outcome.sender_notification_id, Some(reply.id));
    }

    #[tokio::test]
    async fn accept_with_grant_adds_membership_only() {
        let s = Scenario::new();
        let reply = s.reply(NotificationKind::ListAccepted);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.invite(NotificationStatus::Pending)]])
            .append_query_results([[list_model(s.list_id, s.alice, "Groceries")]])
            .append_query_results([[s.bob_model()]])
            .append_exec_results([exec(1)])
            .append_query_results([Vec::<list_member::Model>::new()])
            .append_query_results([[member_model(s.list_id, s.bob)]])
            .append_query_results([[reply]])
            .into_connection();

        let outcome = service(&db, SharingStrategy::Grant)
            .accept(&s.bob, &Uuid::new_v4(), &s.list_id)
            .await
            .expect("accept should succeed");
        assert_eq!(outcome.new_list_id, None);
    }

    #[tokio::test]
    async fn accepting_twice_conflicts() {
        let s = Scenario::new();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.invite(NotificationStatus::Accepted)]])
            .append_query_results([[list_model(s.list_id, s.alice, "Groceries")]])
            .into_connection();

        let err = service(&db, SharingStrategy::Copy)
            .accept(&s.bob, &Uuid::new_v4(), &s.list_id)
            .await
            .expect_err("already accepted");
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.message(), "This list has already been accepted");
    }

    #[tokio::test]
    async fn losing_the_claim_race_conflicts_without_copying() {
        let s = Scenario::new();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.invite(NotificationStatus::Pending)]])
            .append_query_results([[list_model(s.list_id, s.alice, "Groceries")]])
            .append_query_results([[s.bob_model()]])
            .append_exec_results([exec(0)])
            .into_connection();

        let err = service(&db, SharingStrategy::Copy)
            .accept(&s.bob, &Uuid::new_v4(), &s.list_id)
            .await
            .expect_err("someone else accepted");
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(db.into_transaction_log().len(), 4);
    }

    #[tokio::test]
    async fn accept_by_a_deleted_user_leaves_the_share_pending() {
        let s = Scenario::new();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.invite(NotificationStatus::Pending)]])
            .append_query_results([[list_model(s.list_id, s.alice, "Groceries")]])
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let err = service(&db, SharingStrategy::Copy)
            .accept(&s.bob, &Uuid::new_v4(), &s.list_id)
            .await
            .expect_err("recipient is gone");
        assert!(matches!(err, AppError::NotFound(_)));
        // no claim was attempted
        assert_eq!(db.into_transaction_log().len(), 3);
    }

    #[tokio::test]
    async fn accept_survives_a_failed_reply_to_the_sender() {
        let s = Scenario::new();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.invite(NotificationStatus::Pending)]])
            .append_query_results([[list_model(s.list_id, s.alice, "Groceries")]])
            .append_query_results([[s.bob_model()]])
            .append_exec_results([exec(1)])
            .append_query_results([Vec::<list_member::Model>::new()])
            .append_query_results([[member_model(s.list_id, s.bob)]])
            .append_query_errors([DbErr::Query(RuntimeErr::Internal("disk full".to_string()))])
            .into_connection();

        let outcome = service(&db, SharingStrategy::Grant)
            .accept(&s.bob, &Uuid::new_v4(), &s.list_id)
            .await
            .expect("membership is already granted");

        assert_eq!(outcome.sender_notification_id, None);
        let log = db.into_transaction_log();
        // the claim is kept: nothing runs after the failed reply
        assert_eq!(log.len(), 7);
        assert!(
            log[6].statements()[0]
                .sql
                .starts_with(r#"INSERT INTO "notifications""#)
        );
    }

    #[tokio::test]
    async fn failed_grant_releases_the_claim() {
        let s = Scenario::new();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.invite(NotificationStatus::Pending)]])
            .append_query_results([[list_model(s.list_id, s.alice, "Groceries")]])
            .append_query_results([[s.bob_model()]])
            .append_exec_results([exec(1)])
            .append_query_results([Vec::<list_member::Model>::new()])
            .append_query_errors([DbErr::Query(RuntimeErr::Internal("disk full".to_string()))])
            .append_exec_results([exec(1)])
            .into_connection();

        let err = service(&db, SharingStrategy::Grant)
            .accept(&s.bob, &Uuid::new_v4(), &s.list_id)
            .await
            .expect_err("membership insert fails");
        assert!(matches!(err, AppError::Internal(_)));
        // lookups, claim, membership check, failed insert and release
        assert_eq!(db.into_transaction_log().len(), 7);
    }

    #[tokio::test]
    async fn accept_for_another_list_is_a_bad_request() {
        let s = Scenario::new();
        let other_list = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.invite(NotificationStatus::Pending)]])
            .append_query_results([[list_model(other_list, s.alice, "Hardware")]])
            .into_connection();

        let err = service(&db, SharingStrategy::Copy)
            .accept(&s.bob, &Uuid::new_v4(), &other_list)
            .await
            .expect_err("list mismatch");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn stranger_accepting_for_another_list_is_forbidden() {
        let s = Scenario::new();
        let other_list = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.invite(NotificationStatus::Pending)]])
            .append_query_results([[list_model(other_list, s.alice, "Hardware")]])
            .into_connection();

        let err = service(&db, SharingStrategy::Copy)
            .accept(&Uuid::new_v4(), &Uuid::new_v4(), &other_list)
            .await
            .expect_err("not the recipient");
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn only_recipient_may_reject() {
        let s = Scenario::new();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.invite(NotificationStatus::Pending)]])
            .into_connection();

        let err = service(&db, SharingStrategy::Copy)
            .reject(&Uuid::new_v4(), &Uuid::new_v4())
            .await
            .expect_err("not the recipient");
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn reject_keeps_history_and_notifies_sender() {
        let s = Scenario::new();
        let reply = s.reply(NotificationKind::ListRejected);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[s.invite(NotificationStatus::Pending)]])
            .append_exec_results([exec(1)])
            .append_query_results([[list_model(s.list_id, s.alice, "Groceries")]])
            .append_query_results([[s.bob_model()]])
            .append_query_results([[reply.clone()]])
            .into_connection();

        let outcome = service(&db, SharingStrategy::Copy)
            .reject(&s.bob, &Uuid::new_v4())
            .await
            .expect("reject should succeed");
        assert_eq!(outcome.sender_notification_id, Some(reply.id));
    }

    #[tokio::test]
    async fn dismissing_a_pending_share_rejects_it() {
        let s = Scenario::new();
        let mut pending = s.invite(NotificationStatus::Pending);
        pending.list_details = Some(crate::domain::notification::ListSnapshot::placeholder(
            Some("Groceries"),
        ));
        let reply = s.reply(NotificationKind::ListRejected);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[pending.clone()]])
            .append_exec_results([exec(1)])
            .append_query_results([[s.bob_model()]])
            .append_query_results([[reply]])
            .into_connection();

        let dismissal = service(&db, SharingStrategy::Copy)
            .dismiss(&s.bob, &pending.id)
            .await
            .expect("dismiss should succeed");
        assert!(matches!(dismissal, Dismissal::Rejected(_)));
    }

    #[tokio::test]
    async fn dismissing_an_answered_share_deletes_it() {
        let s = Scenario::new();
        let accepted = s.invite(NotificationStatus::Accepted);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[accepted.clone()]])
            .append_exec_results([exec(1)])
            .into_connection();

        let dismissal = service(&db, SharingStrategy::Copy)
            .dismiss(&s.bob, &accepted.id)
            .await
            .expect("dismiss should succeed");
        assert_eq!(dismissal, Dismissal::Deleted);
    }

    #[tokio::test]
    async fn dismiss_is_recipient_only() {
        let s = Scenario::new();
        let stored = s.reply(NotificationKind::ListAccepted);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored.clone()]])
            .into_connection();

        let err = service(&db, SharingStrategy::Copy)
            .dismiss(&s.bob, &stored.id)
            .await
            .expect_err("alice's notification");
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}

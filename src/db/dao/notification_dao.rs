use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, UpdateMany,
    sea_query::Expr,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::{
    db::entities::{notification, prelude::Notification},
    domain::notification::{NewNotification, NotificationKind, NotificationStatus, pending_key},
};

#[derive(Clone)]
pub struct NotificationDao {
    db: DatabaseConnection,
}

impl DaoBase for NotificationDao {
    type Entity = Notification;
    const ENTITY_NAME: &'static str = "notification";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// `status = to`, `pending_key = NULL`, `read = true`; callers add the guard.
fn close_pending(to: NotificationStatus) -> UpdateMany<Notification> {
    Notification::update_many()
        .col_expr(notification::Column::Status, Expr::value(to.as_str()))
        .col_expr(
            notification::Column::PendingKey,
            Expr::value(Option::<String>::None),
        )
        .col_expr(notification::Column::Read, Expr::value(true))
        .col_expr(
            notification::Column::UpdatedAt,
            Expr::value(Utc::now().fixed_offset()),
        )
        .filter(notification::Column::Status.eq(NotificationStatus::Pending.as_str()))
}

impl NotificationDao {
    /// Persists a validated notification. A second PENDING share for the same
    /// list and recipient fails with `UniqueViolation`.
    pub async fn create_notification(
        &self,
        new: NewNotification,
    ) -> DaoResult<notification::Model> {
        let pending_key = new.pending_key();
        let model = notification::ActiveModel {
            recipient_id: Set(new.recipient_id),
            sender_id: Set(new.sender_id),
            kind: Set(new.kind.as_str().to_string()),
            message: Set(new.message),
            related_list_id: Set(new.related_list_id),
            list_details: Set(new.list_details),
            status: Set(NotificationStatus::Pending.as_str().to_string()),
            read: Set(false),
            pending_key: Set(pending_key),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn find_notification(&self, id: &Uuid) -> DaoResult<notification::Model> {
        self.find_by_id(*id).await
    }

    pub async fn find_pending_share(
        &self,
        list_id: &Uuid,
        recipient_id: &Uuid,
    ) -> DaoResult<Option<notification::Model>> {
        let key = pending_key(*list_id, *recipient_id);
        self.find_one(move |query| query.filter(notification::Column::PendingKey.eq(key)))
            .await
    }

    /// Newest first.
    pub async fn for_recipient(&self, recipient_id: &Uuid) -> DaoResult<Vec<notification::Model>> {
        let recipient_id = *recipient_id;
        self.find_iter(None, None, move |query| {
            query.filter(notification::Column::RecipientId.eq(recipient_id))
        })
        .collect_all()
        .await
    }

    /// Moves one PENDING notification to `to`. Returns `false` when it was no
    /// longer PENDING, i.e. someone else got there first.
    pub async fn claim(&self, id: &Uuid, to: NotificationStatus) -> DaoResult<bool> {
        if !NotificationStatus::Pending.can_transition_to(to) {
            return Ok(false);
        }
        let result = close_pending(to)
            .filter(notification::Column::Id.eq(*id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected > 0)
    }

    /// Undoes a claim after the accept side effects failed.
    pub async fn release(
        &self,
        id: &Uuid,
        from: NotificationStatus,
        list_id: &Uuid,
        recipient_id: &Uuid,
    ) -> DaoResult<()> {
        Notification::update_many()
            .col_expr(
                notification::Column::Status,
                Expr::value(NotificationStatus::Pending.as_str()),
            )
            .col_expr(
                notification::Column::PendingKey,
                Expr::value(pending_key(*list_id, *recipient_id)),
            )
            .col_expr(notification::Column::Read, Expr::value(false))
            .filter(notification::Column::Id.eq(*id))
            .filter(notification::Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::from_db)?;
        Ok(())
    }

    pub async fn mark_read(&self, id: &Uuid) -> DaoResult<notification::Model> {
        self.update(*id, |active| {
            active.read = Set(true);
        })
        .await
    }

    pub async fn delete_notification(&self, id: &Uuid) -> DaoResult<()> {
        self.delete(*id).await.map(|_| ())
    }

    /// Archives the outstanding shares of a list that is going away.
    pub async fn archive_pending_for_list(&self, list_id: &Uuid) -> DaoResult<u64> {
        let result = close_pending(NotificationStatus::Archived)
            .filter(notification::Column::RelatedListId.eq(*list_id))
            .filter(notification::Column::Kind.eq(NotificationKind::ListShared.as_str()))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }

    pub async fn archive_pending_from_sender(&self, sender_id: &Uuid) -> DaoResult<u64> {
        let result = close_pending(NotificationStatus::Archived)
            .filter(notification::Column::SenderId.eq(*sender_id))
            .filter(notification::Column::Kind.eq(NotificationKind::ListShared.as_str()))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }

    pub async fn delete_for_recipient(&self, recipient_id: &Uuid) -> DaoResult<u64> {
        let result = Notification::delete_many()
            .filter(notification::Column::RecipientId.eq(*recipient_id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }

    pub async fn count_notifications(&self) -> DaoResult<u64> {
        self.count(|query| query).await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use super::NotificationDao;
    use crate::{
        db::{
            dao::{DaoBase, DaoLayerError},
            entities::notification,
        },
        domain::notification::{NewNotification, NotificationKind, NotificationStatus},
        test_helpers::notification_model,
    };

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn claim_reports_whether_the_row_was_still_pending() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(0)])
            .into_connection();
        let dao = NotificationDao::new(&db);
        let id = Uuid::new_v4();

        assert!(
            dao.claim(&id, NotificationStatus::Accepted)
                .await
                .expect("first claim")
        );
        assert!(
            !dao.claim(&id, NotificationStatus::Accepted)
                .await
                .expect("second claim")
        );
    }

    #[tokio::test]
    async fn create_stores_share_as_pending() {
        let recipient = Uuid::new_v4();
        let sender = Uuid::new_v4();
        let list = Uuid::new_v4();
        let stored = notification_model(recipient, sender, NotificationKind::ListShared, Some(list));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored.clone()]])
            .into_connection();
        let dao = NotificationDao::new(&db);

        let created = dao
            .create_notification(NewNotification {
                recipient_id: recipient,
                sender_id: sender,
                kind: NotificationKind::ListShared,
                message: "Alice shared a list with you: Groceries".to_string(),
                related_list_id: Some(list),
                list_details: None,
            })
            .await
            .expect("insert should succeed");
        assert_eq!(created.status, "PENDING");
        assert_eq!(created.pending_key, stored.pending_key);
    }

    #[tokio::test]
    async fn find_pending_share_returns_none_without_match() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<notification::Model>::new()])
            .into_connection();
        let dao = NotificationDao::new(&db);

        let found = dao
            .find_pending_share(&Uuid::new_v4(), &Uuid::new_v4())
            .await
            .expect("query should succeed");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn mark_read_on_missing_notification_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<notification::Model>::new()])
            .into_connection();
        let dao = NotificationDao::new(&db);

        let err = dao
            .mark_read(&Uuid::new_v4())
            .await
            .expect_err("missing notification");
        assert!(matches!(
            err,
            DaoLayerError::NotFound {
                entity: "notification",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn archive_counts_affected_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(2)])
            .into_connection();
        let dao = NotificationDao::new(&db);

        let archived = dao
            .archive_pending_for_list(&Uuid::new_v4())
            .await
            .expect("update should succeed");
        assert_eq!(archived, 2);
    }
}

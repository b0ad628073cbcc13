/// Durable notification storage
///
/// Every read and write is scoped to the owning user: asking for another
/// user's notification behaves exactly like asking for a missing one.
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::{
    ListQuery, NewNotification, NotificationKind, NotificationRecord, NotificationUpdate, UserId,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a new, unread notification and return it with its id
    async fn insert(&self, new: NewNotification) -> Result<NotificationRecord, StoreError>;

    /// History page, newest first
    async fn list(
        &self,
        user_id: UserId,
        query: &ListQuery,
    ) -> Result<Vec<NotificationRecord>, StoreError>;

    async fn unread_count(&self, user_id: UserId) -> Result<i64, StoreError>;

    async fn get(&self, user_id: UserId, id: i64) -> Result<Option<NotificationRecord>, StoreError>;

    async fn update(
        &self,
        user_id: UserId,
        id: i64,
        update: &NotificationUpdate,
    ) -> Result<Option<NotificationRecord>, StoreError>;

    /// Mark everything read and return the full history, newest first
    async fn mark_all_read(&self, user_id: UserId) -> Result<Vec<NotificationRecord>, StoreError>;

    async fn delete(&self, user_id: UserId, id: i64) -> Result<bool, StoreError>;

    async fn delete_all(&self, user_id: UserId) -> Result<u64, StoreError>;
}

const COLUMNS: &str =
    "id, user_id, title, message, notification_type, related_id, is_read, created_at";

fn record_from_row(row: &PgRow) -> NotificationRecord {
    NotificationRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        message: row.get("message"),
        notification_type: NotificationKind::from(row.get::<String, _>("notification_type")),
        related_id: row.get("related_id"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    }
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgNotificationStore {
    db: PgPool,
}

impl PgNotificationStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        info!(max_connections, "connected to notification database");
        Ok(Self::new(db))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn insert(&self, new: NewNotification) -> Result<NotificationRecord, StoreError> {
        let query = format!(
            r#"
            INSERT INTO notifications (user_id, title, message, notification_type, related_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(new.user_id)
            .bind(&new.title)
            .bind(&new.message)
            .bind(new.notification_type.as_str())
            .bind(new.related_id)
            .fetch_one(&self.db)
            .await?;

        Ok(record_from_row(&row))
    }

    async fn list(
        &self,
        user_id: UserId,
        query: &ListQuery,
    ) -> Result<Vec<NotificationRecord>, StoreError> {
        let (offset, limit) = query.window();
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM notifications
            WHERE user_id = $1 AND ($2 = FALSE OR is_read = FALSE)
            ORDER BY created_at DESC, id DESC
            OFFSET $3 LIMIT $4
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(query.unread_only)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn unread_count(&self, user_id: UserId) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }

    async fn get(&self, user_id: UserId, id: i64) -> Result<Option<NotificationRecord>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM notifications WHERE id = $1 AND user_id = $2");
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.as_ref().map(record_from_row))
    }

    async fn update(
        &self,
        user_id: UserId,
        id: i64,
        update: &NotificationUpdate,
    ) -> Result<Option<NotificationRecord>, StoreError> {
        let sql = format!(
            r#"
            UPDATE notifications
            SET is_read = COALESCE($3, is_read)
            WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(user_id)
            .bind(update.is_read)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.as_ref().map(record_from_row))
    }

    async fn mark_all_read(&self, user_id: UserId) -> Result<Vec<NotificationRecord>, StoreError> {
        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "SELECT {COLUMNS} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&mut *tx).await?;

        tx.commit().await?;
        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn delete(&self, user_id: UserId, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self, user_id: UserId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    records: Vec<NotificationRecord>,
}

impl MemoryState {
    fn history(&self, user_id: UserId) -> Vec<NotificationRecord> {
        let mut records: Vec<NotificationRecord> = self
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records
    }
}

/// Process-local store for tests and database-less development
#[derive(Default)]
pub struct InMemoryNotificationStore {
    state: Mutex<MemoryState>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, new: NewNotification) -> Result<NotificationRecord, StoreError> {
        let mut state = self.state.lock().await;
        state.next_id += 1;

        let record = NotificationRecord {
            id: state.next_id,
            user_id: new.user_id,
            title: new.title,
            message: new.message,
            notification_type: new.notification_type,
            related_id: new.related_id,
            is_read: false,
            created_at: Utc::now(),
        };
        state.records.push(record.clone());
        Ok(record)
    }

    async fn list(
        &self,
        user_id: UserId,
        query: &ListQuery,
    ) -> Result<Vec<NotificationRecord>, StoreError> {
        let (offset, limit) = query.window();
        let state = self.state.lock().await;

        Ok(state
            .history(user_id)
            .into_iter()
            .filter(|r| !query.unread_only || !r.is_read)
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn unread_count(&self, user_id: UserId) -> Result<i64, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .iter()
            .filter(|r| r.user_id == user_id && !r.is_read)
            .count() as i64)
    }

    async fn get(&self, user_id: UserId, id: i64) -> Result<Option<NotificationRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn update(
        &self,
        user_id: UserId,
        id: i64,
        update: &NotificationUpdate,
    ) -> Result<Option<NotificationRecord>, StoreError> {
        let mut state = self.state.lock().await;
        let Some(record) = state
            .records
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
        else {
            return Ok(None);
        };

        if let Some(is_read) = update.is_read {
            record.is_read = is_read;
        }
        Ok(Some(record.clone()))
    }

    async fn mark_all_read(&self, user_id: UserId) -> Result<Vec<NotificationRecord>, StoreError> {
        let mut state = self.state.lock().await;
        for record in state.records.iter_mut().filter(|r| r.user_id == user_id) {
            record.is_read = true;
        }
        Ok(state.history(user_id))
    }

    async fn delete(&self, user_id: UserId, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let before = state.records.len();
        state.records.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(state.records.len() != before)
    }

    async fn delete_all(&self, user_id: UserId) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let before = state.records.len();
        state.records.retain(|r| r.user_id != user_id);
        Ok((before - state.records.len()) as u64)
    }
}

//! Task store adapter.
//!
//! The router never talks to sqlx directly; it goes through [`TaskStore`] so
//! tests can substitute fakes and so persistence failures surface as a single
//! [`StoreError`].

use async_trait::async_trait;
use db::models::task::{CreateTask, Task};
use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("store error: {0}")]
pub struct StoreError(#[from] pub sqlx::Error);

/// Fields for a task about to be inserted.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub notes: String,
    pub pomodoros: i64,
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks, pending first, then by id ascending.
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;

    async fn insert_task(&self, fields: NewTask) -> Result<Task, StoreError>;

    /// Returns the updated task, or `None` when the id does not exist.
    async fn update_task_status(
        &self,
        id: i64,
        completed: bool,
    ) -> Result<Option<Task>, StoreError>;

    /// Returns `false` when the id does not exist.
    async fn delete_task(&self, id: i64) -> Result<bool, StoreError>;
}

/// SQLite-backed store over the shared connection pool.
#[derive(Clone)]
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(Task::list(&self.pool).await?)
    }

    async fn insert_task(&self, fields: NewTask) -> Result<Task, StoreError> {
        let data = CreateTask {
            title: fields.title,
            notes: Some(fields.notes),
            pomodoros: Some(fields.pomodoros),
        };
        Ok(Task::create(&self.pool, &data).await?)
    }

    async fn update_task_status(
        &self,
        id: i64,
        completed: bool,
    ) -> Result<Option<Task>, StoreError> {
        Ok(Task::set_completed(&self.pool, id, completed).await?)
    }

    async fn delete_task(&self, id: i64) -> Result<bool, StoreError> {
        Ok(Task::delete(&self.pool, id).await? > 0)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A unit of work tracked by the assistant.
///
/// `pomodoros` is the estimated effort in pomodoro units and is kept `>= 1`
/// by the schema; callers clamp user input before inserting.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub notes: String,
    pub pomodoros: i64,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub pomodoros: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub pomodoros: Option<i64>,
    pub completed: Option<bool>,
}

impl Task {
    /// All tasks, pending first, then by id ascending.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT id, title, notes, pomodoros, completed, created_at
             FROM tasks
             ORDER BY completed ASC, id ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT id, title, notes, pomodoros, completed, created_at
             FROM tasks
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateTask) -> Result<Self, sqlx::Error> {
        let notes = data.notes.clone().unwrap_or_default();
        let pomodoros = data.pomodoros.unwrap_or(1).max(1);
        sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (title, notes, pomodoros, completed)
             VALUES (?, ?, ?, 0)
             RETURNING id, title, notes, pomodoros, completed, created_at",
        )
        .bind(&data.title)
        .bind(notes)
        .bind(pomodoros)
        .fetch_one(pool)
        .await
    }

    /// Flip the completion flag. Returns the updated row, or `None` when the
    /// id does not exist.
    pub async fn set_completed(
        pool: &SqlitePool,
        id: i64,
        completed: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET completed = ?
             WHERE id = ?
             RETURNING id, title, notes, pomodoros, completed, created_at",
        )
        .bind(completed)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let existing = match Self::find_by_id(pool, id).await? {
            Some(task) => task,
            None => return Ok(None),
        };

        let title = data.title.clone().unwrap_or(existing.title);
        let notes = data.notes.clone().unwrap_or(existing.notes);
        let pomodoros = data.pomodoros.unwrap_or(existing.pomodoros).max(1);
        let completed = data.completed.unwrap_or(existing.completed);

        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET title = ?, notes = ?, pomodoros = ?, completed = ?
             WHERE id = ?
             RETURNING id, title, notes, pomodoros, completed, created_at",
        )
        .bind(title)
        .bind(notes)
        .bind(pomodoros)
        .bind(completed)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Returns the number of rows removed (0 when the id does not exist).
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn new_task(title: &str) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            notes: None,
            pomodoros: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_and_list_ordering() {
        let db = DBService::new_in_memory().await.unwrap();

        let a = Task::create(&db.pool, &new_task("primera")).await.unwrap();
        let b = Task::create(&db.pool, &new_task("segunda")).await.unwrap();
        assert_eq!(a.pomodoros, 1);
        assert!(!a.completed);
        assert_eq!(a.notes, "");

        Task::set_completed(&db.pool, a.id, true).await.unwrap();

        // Pending tasks come first, ties broken by id.
        let tasks = Task::list(&db.pool).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, b.id);
        assert_eq!(tasks[1].id, a.id);
        assert!(tasks[1].completed);
    }

    #[tokio::test]
    async fn pomodoros_are_clamped_to_one() {
        let db = DBService::new_in_memory().await.unwrap();
        let task = Task::create(
            &db.pool,
            &CreateTask {
                title: "leer".to_string(),
                notes: Some("cap. 3".to_string()),
                pomodoros: Some(0),
            },
        )
        .await
        .unwrap();
        assert_eq!(task.pomodoros, 1);

        let updated = Task::update(
            &db.pool,
            task.id,
            &UpdateTask {
                title: None,
                notes: None,
                pomodoros: Some(-5),
                completed: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.pomodoros, 1);
        assert_eq!(updated.notes, "cap. 3");
    }

    #[tokio::test]
    async fn set_completed_missing_id_returns_none() {
        let db = DBService::new_in_memory().await.unwrap();
        let result = Task::set_completed(&db.pool, 999, true).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_reports_rows_affected() {
        let db = DBService::new_in_memory().await.unwrap();
        let task = Task::create(&db.pool, &new_task("borrar")).await.unwrap();
        assert_eq!(Task::delete(&db.pool, task.id).await.unwrap(), 1);
        assert_eq!(Task::delete(&db.pool, task.id).await.unwrap(), 0);
    }
}

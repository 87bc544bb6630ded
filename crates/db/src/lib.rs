use std::str::FromStr;

use sqlx::{
    Error, Pool, Sqlite, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub mod models;

#[derive(Clone)]
pub struct DBService {
    pub pool: Pool<Sqlite>,
}

impl DBService {
    /// Open (or create) the database at the given path and apply migrations.
    pub async fn new(database_path: &str) -> Result<DBService, Error> {
        let database_url = format!("sqlite://{database_path}");
        let options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(DBService { pool })
    }

    /// Resolve the database path from `DATABASE_PATH`, defaulting to a local file.
    pub async fn from_env() -> Result<DBService, Error> {
        let path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "tareas.sqlite".to_string());
        tracing::info!("Opening task database at {}", path);
        Self::new(&path).await
    }

    /// In-memory database, used by tests. The pool is capped at a single
    /// connection; every `:memory:` connection is otherwise its own database.
    pub async fn new_in_memory() -> Result<DBService, Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(DBService { pool })
    }
}

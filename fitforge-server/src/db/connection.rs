use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use uuid::Uuid;

use super::schema::{DEMO_EXERCISES, SCHEMA};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy();
        let is_memory = path_str.trim().eq_ignore_ascii_case(MEMORY_DB_PATH);

        let manager = if is_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path)
        }
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

        // Every in-memory connection is its own database, so the pool must hold exactly one.
        let max_size = if is_memory { 1 } else { 8 };
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .context("Failed to create database connection pool")?;
        Ok(Self { pool })
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Initialize the database schema
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Seed the exercise catalog with the demo entries, skipping names already present
    pub fn seed_exercises(&self) -> Result<usize> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        for (name, muscle_group, difficulty, equipment, video_url) in DEMO_EXERCISES {
            inserted += tx
                .execute(
                    "INSERT OR IGNORE INTO exercises (id, name, muscle_group, difficulty, equipment, video_url)
                     VALUES (?, ?, ?, ?, ?, ?)",
                    (
                        Uuid::new_v4().to_string(),
                        name,
                        muscle_group,
                        difficulty,
                        equipment,
                        video_url,
                    ),
                )
                .context("Failed to seed exercise")?;
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}

// Table bootstrap, run once at startup. Safe to re-run against an existing database.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

pub const CREATE_ALBUMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS albums (
    id SERIAL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description VARCHAR(255) NOT NULL,
    thumbnail VARCHAR(255) NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

// album_id is ON DELETE SET NULL, but album deletion removes the songs first.
pub const CREATE_SONGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS songs (
    id SERIAL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description VARCHAR(255) NOT NULL,
    thumbnail VARCHAR(255),
    audio VARCHAR(255) NOT NULL,
    album_id INTEGER REFERENCES albums(id) ON DELETE SET NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(CREATE_ALBUMS_TABLE)
        .execute(pool)
        .await
        .context("Failed to create albums table")?;

    sqlx::query(CREATE_SONGS_TABLE)
        .execute(pool)
        .await
        .context("Failed to create songs table")?;

    info!("Database initialized successfully");
    Ok(())
}

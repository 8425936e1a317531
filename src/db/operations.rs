use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use crate::catalog::CatalogStore;
use crate::models::{Album, Song};

/// PostgreSQL-backed catalog store.
// Queries use the runtime API (`query_as` + `FromRow`) so the crate builds
// without DATABASE_URL at compile time.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_album(&self, id: i32) -> Result<Option<Album>> {
        let album = sqlx::query_as::<_, Album>("SELECT * FROM albums WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up album")?;

        Ok(album)
    }

    async fn insert_album(&self, title: &str, description: &str, thumbnail: &str) -> Result<Album> {
        let album = sqlx::query_as::<_, Album>(
            r#"
            INSERT INTO albums (title, description, thumbnail)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(thumbnail)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert album")?;

        Ok(album)
    }

    async fn find_song(&self, id: i32) -> Result<Option<Song>> {
        let song = sqlx::query_as::<_, Song>("SELECT * FROM songs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up song")?;

        Ok(song)
    }

    async fn insert_song(
        &self,
        title: &str,
        description: &str,
        audio: &str,
        album_id: i32,
    ) -> Result<Song> {
        let song = sqlx::query_as::<_, Song>(
            r#"
            INSERT INTO songs (title, description, audio, album_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(audio)
        .bind(album_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert song")?;

        Ok(song)
    }

    async fn set_song_thumbnail(&self, id: i32, thumbnail: &str) -> Result<Option<Song>> {
        let song = sqlx::query_as::<_, Song>(
            "UPDATE songs SET thumbnail = $1 WHERE id = $2 RETURNING *",
        )
        .bind(thumbnail)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update song thumbnail")?;

        Ok(song)
    }

    async fn delete_songs_by_album(&self, album_id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM songs WHERE album_id = $1")
            .bind(album_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete album songs")?;

        Ok(result.rows_affected())
    }

    async fn delete_album(&self, id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM albums WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete album")?;

        Ok(result.rows_affected())
    }

    async fn delete_song(&self, id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM songs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete song")?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        super::health_check(&self.pool).await
    }
}

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Album, Song};

/// Relational persistence for albums and songs. Each method is a single
/// statement; callers sequence them.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_album(&self, id: i32) -> Result<Option<Album>>;

    async fn insert_album(&self, title: &str, description: &str, thumbnail: &str) -> Result<Album>;

    async fn find_song(&self, id: i32) -> Result<Option<Song>>;

    async fn insert_song(
        &self,
        title: &str,
        description: &str,
        audio: &str,
        album_id: i32,
    ) -> Result<Song>;

    /// Returns `None` when the song no longer exists.
    async fn set_song_thumbnail(&self, id: i32, thumbnail: &str) -> Result<Option<Song>>;

    /// Returns the number of songs removed.
    async fn delete_songs_by_album(&self, album_id: i32) -> Result<u64>;

    async fn delete_album(&self, id: i32) -> Result<u64>;

    async fn delete_song(&self, id: i32) -> Result<u64>;

    async fn ping(&self) -> Result<()>;
}

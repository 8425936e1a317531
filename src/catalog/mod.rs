//! Catalog write path
//!
//! Every admin operation runs the same fixed sequence:
//!
//! ```text
//! role check -> existence check -> field/file validation
//!            -> data URI -> object store upload -> SQL write
//!            -> cache invalidation -> response
//! ```
//!
//! Nothing here runs concurrently within one request and nothing is retried.
//! The SQL write and the cache invalidation are independent: invalidation is
//! best-effort and a failure is logged without failing the request, since
//! the row is already committed by then.

pub mod store;

use std::sync::Arc;

use tracing::{debug, info, warn};
use validator::Validate;

use crate::cache::{CacheKey, CatalogCache};
use crate::models::{Album, Identity, NewAlbum, NewSong, Song};
use crate::storage::{ObjectStore, UploadOptions};
use crate::types::{AppError, AppResult};
use crate::utils::datauri::{DataUri, UploadedFile};

pub use store::CatalogStore;

pub const DEFAULT_ADMIN_ROLE: &str = "admin";

/// Health of the service's collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthReport {
    pub database: bool,
    pub cache: bool,
}

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    objects: Arc<dyn ObjectStore>,
    cache: Arc<dyn CatalogCache>,
    admin_role: String,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        objects: Arc<dyn ObjectStore>,
        cache: Arc<dyn CatalogCache>,
    ) -> Self {
        Self {
            store,
            objects,
            cache,
            admin_role: DEFAULT_ADMIN_ROLE.to_string(),
        }
    }

    pub fn with_admin_role(mut self, role: impl Into<String>) -> Self {
        self.admin_role = role.into();
        self
    }

    // =========================================================================
    // Albums
    // =========================================================================

    pub async fn create_album(
        &self,
        identity: &Identity,
        album: NewAlbum,
        file: Option<UploadedFile>,
    ) -> AppResult<Album> {
        self.ensure_admin(identity)?;
        album.validate()?;
        let file = require_file(file)?;

        let thumbnail = self.upload(&file, &UploadOptions::album_artwork()).await?;

        let created = self
            .store
            .insert_album(&album.title, &album.description, &thumbnail)
            .await?;
        info!(album_id = created.id, user = %identity.user_id, "Album created");

        self.invalidate(CacheKey::Albums).await;
        Ok(created)
    }

    /// Removes the album's songs first, then the album. The two deletes are
    /// separate statements; if the second fails the songs stay deleted.
    pub async fn delete_album(&self, identity: &Identity, album_id: i32) -> AppResult<()> {
        self.ensure_admin(identity)?;
        self.require_album(album_id).await?;

        let removed_songs = self.store.delete_songs_by_album(album_id).await?;
        self.store.delete_album(album_id).await?;
        info!(album_id, removed_songs, user = %identity.user_id, "Album deleted");

        self.invalidate(CacheKey::Albums).await;
        self.invalidate(CacheKey::Songs).await;
        Ok(())
    }

    // =========================================================================
    // Songs
    // =========================================================================

    pub async fn add_song(
        &self,
        identity: &Identity,
        song: NewSong,
        file: Option<UploadedFile>,
    ) -> AppResult<Song> {
        self.ensure_admin(identity)?;
        let album_id = song
            .album_id
            .ok_or_else(|| AppError::BadRequest("A valid album id is required".to_string()))?;
        self.require_album(album_id).await?;
        song.validate()?;
        let file = require_file(file)?;

        let audio = self.upload(&file, &UploadOptions::song_audio()).await?;

        let created = self
            .store
            .insert_song(&song.title, &song.description, &audio, album_id)
            .await?;
        info!(song_id = created.id, album_id, user = %identity.user_id, "Song added");

        self.invalidate(CacheKey::Songs).await;
        Ok(created)
    }

    pub async fn set_song_thumbnail(
        &self,
        identity: &Identity,
        song_id: i32,
        file: Option<UploadedFile>,
    ) -> AppResult<Song> {
        self.ensure_admin(identity)?;
        self.require_song(song_id).await?;
        let file = require_file(file)?;

        let thumbnail = self.upload(&file, &UploadOptions::song_thumbnail()).await?;

        let updated = self
            .store
            .set_song_thumbnail(song_id, &thumbnail)
            .await?
            .ok_or_else(song_not_found)?;
        info!(song_id, user = %identity.user_id, "Song thumbnail set");

        self.invalidate(CacheKey::Songs).await;
        Ok(updated)
    }

    pub async fn delete_song(&self, identity: &Identity, song_id: i32) -> AppResult<()> {
        self.ensure_admin(identity)?;
        self.require_song(song_id).await?;

        self.store.delete_song(song_id).await?;
        info!(song_id, user = %identity.user_id, "Song deleted");

        self.invalidate(CacheKey::Songs).await;
        Ok(())
    }

    // =========================================================================
    // Health
    // =========================================================================

    pub async fn health(&self) -> HealthReport {
        let database = match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Database health check failed: {:#}", e);
                false
            }
        };

        HealthReport {
            database,
            cache: self.cache.is_available(),
        }
    }

    // =========================================================================
    // Steps
    // =========================================================================

    fn ensure_admin(&self, identity: &Identity) -> AppResult<()> {
        if identity.has_role(&self.admin_role) {
            Ok(())
        } else {
            debug!(user = %identity.user_id, role = %identity.role, "Rejected non-admin caller");
            Err(AppError::Forbidden)
        }
    }

    async fn require_album(&self, album_id: i32) -> AppResult<Album> {
        self.store
            .find_album(album_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No album with this id".to_string()))
    }

    async fn require_song(&self, song_id: i32) -> AppResult<Song> {
        self.store
            .find_song(song_id)
            .await?
            .ok_or_else(song_not_found)
    }

    async fn upload(&self, file: &UploadedFile, options: &UploadOptions) -> AppResult<String> {
        let payload = DataUri::from_file(file)?;
        let asset = self.objects.upload(&payload, options).await?;
        debug!(
            provider = self.objects.provider(),
            size = file.len(),
            url = %asset.secure_url,
            "File uploaded"
        );
        Ok(asset.secure_url)
    }

    async fn invalidate(&self, key: CacheKey) {
        if !self.cache.is_available() {
            debug!("Cache unavailable, skipping invalidation for {}", key);
            return;
        }

        match self.cache.invalidate(key).await {
            Ok(()) => info!("Cache invalidated for {}", key),
            Err(e) => warn!("Cache invalidation failed for {}: {:#}", key, e),
        }
    }
}

fn require_file(file: Option<UploadedFile>) -> AppResult<UploadedFile> {
    file.ok_or_else(|| AppError::BadRequest("No file to upload".to_string()))
}

fn song_not_found() -> AppError {
    AppError::NotFound("No song with this id".to_string())
}

//! Shared test fixtures: in-memory collaborators that record every call.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use catalog_admin::cache::{CacheKey, CatalogCache};
use catalog_admin::catalog::CatalogStore;
use catalog_admin::models::{Album, Identity, Song};
use catalog_admin::storage::{ObjectStore, StorageError, UploadOptions, UploadedAsset};
use catalog_admin::utils::datauri::{DataUri, UploadedFile};
use catalog_admin::CatalogService;

// =============================================================================
// Relational store
// =============================================================================

#[derive(Default)]
pub struct InMemoryStore {
    albums: Mutex<Vec<Album>>,
    songs: Mutex<Vec<Song>>,
    next_id: AtomicUsize,
    writes: AtomicUsize,
    fail_album_delete: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn next_id(&self) -> i32 {
        (self.next_id.fetch_add(1, Ordering::SeqCst) + 1) as i32
    }

    pub fn seed_album(&self, title: &str) -> Album {
        let album = Album {
            id: self.next_id(),
            title: title.to_string(),
            description: format!("{} description", title),
            thumbnail: format!("https://cdn.test/albums/{}.png", title),
            created_at: None,
        };
        self.albums.lock().unwrap().push(album.clone());
        album
    }

    pub fn seed_song(&self, title: &str, album_id: Option<i32>) -> Song {
        let song = Song {
            id: self.next_id(),
            title: title.to_string(),
            description: format!("{} description", title),
            thumbnail: None,
            audio: format!("https://cdn.test/songs/{}.mp3", title),
            album_id,
            created_at: None,
        };
        self.songs.lock().unwrap().push(song.clone());
        song
    }

    pub fn albums(&self) -> Vec<Album> {
        self.albums.lock().unwrap().clone()
    }

    pub fn songs(&self) -> Vec<Song> {
        self.songs.lock().unwrap().clone()
    }

    /// Number of mutating statements executed.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_album_delete(&self) {
        self.fail_album_delete.store(true, Ordering::SeqCst);
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn find_album(&self, id: i32) -> Result<Option<Album>> {
        Ok(self.albums.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn insert_album(&self, title: &str, description: &str, thumbnail: &str) -> Result<Album> {
        self.record_write();
        let album = Album {
            id: self.next_id(),
            title: title.to_string(),
            description: description.to_string(),
            thumbnail: thumbnail.to_string(),
            created_at: Some(chrono::Utc::now().naive_utc()),
        };
        self.albums.lock().unwrap().push(album.clone());
        Ok(album)
    }

    async fn find_song(&self, id: i32) -> Result<Option<Song>> {
        Ok(self.songs.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn insert_song(
        &self,
        title: &str,
        description: &str,
        audio: &str,
        album_id: i32,
    ) -> Result<Song> {
        self.record_write();
        let song = Song {
            id: self.next_id(),
            title: title.to_string(),
            description: description.to_string(),
            thumbnail: None,
            audio: audio.to_string(),
            album_id: Some(album_id),
            created_at: Some(chrono::Utc::now().naive_utc()),
        };
        self.songs.lock().unwrap().push(song.clone());
        Ok(song)
    }

    async fn set_song_thumbnail(&self, id: i32, thumbnail: &str) -> Result<Option<Song>> {
        self.record_write();
        let mut songs = self.songs.lock().unwrap();
        Ok(songs.iter_mut().find(|s| s.id == id).map(|song| {
            song.thumbnail = Some(thumbnail.to_string());
            song.clone()
        }))
    }

    async fn delete_songs_by_album(&self, album_id: i32) -> Result<u64> {
        self.record_write();
        let mut songs = self.songs.lock().unwrap();
        let before = songs.len();
        songs.retain(|s| s.album_id != Some(album_id));
        Ok((before - songs.len()) as u64)
    }

    async fn delete_album(&self, id: i32) -> Result<u64> {
        self.record_write();
        if self.fail_album_delete.load(Ordering::SeqCst) {
            return Err(anyhow!("connection reset while deleting album"));
        }
        let mut albums = self.albums.lock().unwrap();
        let before = albums.len();
        albums.retain(|a| a.id != id);
        // Mirrors ON DELETE SET NULL for any song left behind.
        self.songs
            .lock()
            .unwrap()
            .iter_mut()
            .filter(|s| s.album_id == Some(id))
            .for_each(|s| s.album_id = None);
        Ok((before - albums.len()) as u64)
    }

    async fn delete_song(&self, id: i32) -> Result<u64> {
        self.record_write();
        let mut songs = self.songs.lock().unwrap();
        let before = songs.len();
        songs.retain(|s| s.id != id);
        Ok((before - songs.len()) as u64)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Object store
// =============================================================================

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub mime: String,
    pub options: UploadOptions,
}

#[derive(Default)]
pub struct FakeObjectStore {
    uploads: Mutex<Vec<RecordedUpload>>,
    fail: AtomicBool,
}

impl FakeObjectStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let store = Self::default();
        store.fail.store(true, Ordering::SeqCst);
        Arc::new(store)
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn upload(
        &self,
        payload: &DataUri,
        options: &UploadOptions,
    ) -> std::result::Result<UploadedAsset, StorageError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(RecordedUpload {
            mime: payload.mime().to_string(),
            options: options.clone(),
        });

        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected {
                status: 500,
                message: "object store unavailable".to_string(),
            });
        }

        let folder = options.folder.clone().unwrap_or_else(|| "root".to_string());
        let public_id = format!("{}/asset-{}", folder, uploads.len());
        Ok(UploadedAsset {
            secure_url: format!("https://cdn.test/{}", public_id),
            public_id,
        })
    }

    fn provider(&self) -> &'static str {
        "fake"
    }
}

// =============================================================================
// Cache
// =============================================================================

pub struct FakeCache {
    available: AtomicBool,
    fail: AtomicBool,
    drop_on_failure: AtomicBool,
    invalidated: Mutex<Vec<CacheKey>>,
}

impl FakeCache {
    pub fn available() -> Arc<Self> {
        Arc::new(Self {
            available: AtomicBool::new(true),
            fail: AtomicBool::new(false),
            drop_on_failure: AtomicBool::new(false),
            invalidated: Mutex::new(Vec::new()),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        let cache = Self::available();
        cache.available.store(false, Ordering::SeqCst);
        cache
    }

    pub fn failing() -> Arc<Self> {
        let cache = Self::available();
        cache.fail.store(true, Ordering::SeqCst);
        cache
    }

    /// Fails every command and reports unavailable after the first failure,
    /// the way a connection that dropped mid-session does.
    pub fn dropping() -> Arc<Self> {
        let cache = Self::failing();
        cache.drop_on_failure.store(true, Ordering::SeqCst);
        cache
    }

    pub fn invalidated(&self) -> Vec<CacheKey> {
        self.invalidated.lock().unwrap().clone()
    }

    pub fn count(&self, key: CacheKey) -> usize {
        self.invalidated().iter().filter(|k| **k == key).count()
    }
}

#[async_trait]
impl CatalogCache for FakeCache {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn invalidate(&self, key: CacheKey) -> Result<()> {
        self.invalidated.lock().unwrap().push(key);
        if self.fail.load(Ordering::SeqCst) {
            if self.drop_on_failure.load(Ordering::SeqCst) {
                self.available.store(false, Ordering::SeqCst);
            }
            return Err(anyhow!("READONLY You can't write against a read only replica."));
        }
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub objects: Arc<FakeObjectStore>,
    pub cache: Arc<FakeCache>,
    pub service: Arc<CatalogService>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(InMemoryStore::new(), FakeObjectStore::new(), FakeCache::available())
    }

    pub fn with(
        store: Arc<InMemoryStore>,
        objects: Arc<FakeObjectStore>,
        cache: Arc<FakeCache>,
    ) -> Self {
        let service = CatalogService::new(store.clone(), objects.clone(), cache.clone());
        Self {
            store,
            objects,
            cache,
            service: Arc::new(service),
        }
    }
}

pub fn admin() -> Identity {
    Identity::new("admin-1", "admin")
}

pub fn listener() -> Identity {
    Identity::new("user-1", "user")
}

pub fn cover_art() -> UploadedFile {
    UploadedFile::new("cover.png", Some("image/png".to_string()), vec![0x89u8, b'P', b'N', b'G'])
        .unwrap()
}

pub fn audio_file() -> UploadedFile {
    UploadedFile::new("track.mp3", Some("audio/mpeg".to_string()), b"ID3\x03\x00".to_vec()).unwrap()
}

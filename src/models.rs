use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::catalog::CatalogService;
use crate::config::AuthConfig;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(catalog: Arc<CatalogService>, auth: AuthConfig) -> Self {
        Self { catalog, auth }
    }
}

/// Caller identity, resolved from the bearer token by the HTTP layer and
/// handed to every catalog operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

// Rows

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Album {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Song {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub audio: String,
    pub album_id: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
}

// Write inputs

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewAlbum {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewSong {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    /// `None` when the form field is missing or not an integer.
    pub album_id: Option<i32>,
}

// API responses

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AlbumResponse {
    pub message: String,
    pub album: Album,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SongResponse {
    pub message: String,
    pub song: Song,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub database: String,
    pub cache: String,
}

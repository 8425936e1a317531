use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        Path, State,
    },
    routing::post,
    Json, Router,
};
use tracing::info;

use super::form::{parse_id, UploadForm};
use crate::models::{AppState, Identity, MessageResponse, NewSong, SongResponse};
use crate::types::AppResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/song/new", post(add_song))
        .route("/song/{id}", post(set_song_thumbnail).delete(delete_song))
}

/// POST /song/new - multipart `title`, `description`, `album`, `file`
async fn add_song(
    State(state): State<AppState>,
    identity: Identity,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<SongResponse>> {
    info!(user = %identity.user_id, "Add song request received");

    let mut form = UploadForm::read(multipart).await;
    let song = NewSong {
        title: form.text("title"),
        description: form.text("description"),
        album_id: form.integer("album"),
    };

    let song = state
        .catalog
        .add_song(&identity, song, form.take_file())
        .await?;

    Ok(Json(SongResponse {
        message: "Song Added".to_string(),
        song,
    }))
}

/// POST /song/{id} - multipart `file`, sets the song thumbnail
async fn set_song_thumbnail(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<SongResponse>> {
    let song_id = parse_id(&id)?;
    let mut form = UploadForm::read(multipart).await;

    let song = state
        .catalog
        .set_song_thumbnail(&identity, song_id, form.take_file())
        .await?;

    Ok(Json(SongResponse {
        message: "Thumbnail added".to_string(),
        song,
    }))
}

/// DELETE /song/{id}
async fn delete_song(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let song_id = parse_id(&id)?;
    state.catalog.delete_song(&identity, song_id).await?;

    Ok(Json(MessageResponse::new("Song deleted successfully")))
}

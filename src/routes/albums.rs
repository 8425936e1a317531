use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        Path, State,
    },
    routing::{delete, post},
    Json, Router,
};
use tracing::info;

use super::form::{parse_id, UploadForm};
use crate::models::{AlbumResponse, AppState, Identity, MessageResponse, NewAlbum};
use crate::types::AppResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/album/new", post(create_album))
        .route("/album/{id}", delete(delete_album))
}

/// POST /album/new - multipart `title`, `description`, `file`
async fn create_album(
    State(state): State<AppState>,
    identity: Identity,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<AlbumResponse>> {
    info!(user = %identity.user_id, "Create album request received");

    let mut form = UploadForm::read(multipart).await;
    let album = NewAlbum {
        title: form.text("title"),
        description: form.text("description"),
    };

    let album = state
        .catalog
        .create_album(&identity, album, form.take_file())
        .await?;

    Ok(Json(AlbumResponse {
        message: "Album Created".to_string(),
        album,
    }))
}

/// DELETE /album/{id}
async fn delete_album(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let album_id = parse_id(&id)?;
    state.catalog.delete_album(&identity, album_id).await?;

    Ok(Json(MessageResponse::new("Album deleted successfully")))
}

use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db::{content, models::{Album, AlbumView, Photo, Profile}, profiles},
    policy::{self, Action, Resource},
    principal::Principal,
    required, AppError, AppResult, AppState, Payload,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/View/{id}", get(view))
        .route("/Create", post(create))
        .route("/Delete", post(delete))
        .route("/AddPhoto", post(add_photo))
        .route("/DeletePhoto", post(delete_photo))
}

async fn profile(db_pool: &SqlitePool, profile_id: Uuid) -> AppResult<Profile> {
    profiles::find_by_id(db_pool, profile_id)
        .await?
        .ok_or_else(|| AppError::not_found("profile"))
}

async fn album_and_owner(db_pool: &SqlitePool, album_id: Uuid) -> AppResult<(Album, Profile)> {
    let album = content::find_album(db_pool, album_id)
        .await?
        .ok_or_else(|| AppError::not_found("album"))?;
    let owner = profile(db_pool, album.profile_id).await?;
    Ok((album, owner))
}

#[debug_handler(state = AppState)]
pub(crate) async fn view(
    State(db_pool): State<SqlitePool>,
    principal: Option<Principal>,
    Path(album_id): Path<Uuid>,
) -> AppResult<Json<AlbumView>> {
    let (album, owner) = album_and_owner(&db_pool, album_id).await?;
    let resource = crate::profiles::as_resource(&db_pool, principal.as_ref(), &owner).await?;
    policy::evaluate(principal.as_ref(), resource, Action::View).require()?;

    let mut aggregate = profiles::load_aggregate(&db_pool, owner.id)
        .await?
        .ok_or_else(|| AppError::not_found("profile"))?;
    if principal.as_ref().is_none_or(|p| p.user_id != owner.user_id) {
        aggregate.hide_unapproved_comments();
    }

    aggregate
        .albums
        .into_iter()
        .find(|view| view.album.id == album.id)
        .map(Json)
        .ok_or_else(|| AppError::not_found("album"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbum {
    /// Defaults to the caller's own profile.
    pub profile_id: Option<Uuid>,
    pub title: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(form): Payload<CreateAlbum>,
) -> AppResult<Json<Album>> {
    let owner = match form.profile_id {
        Some(profile_id) => profile(&db_pool, profile_id).await?,
        None => crate::profiles::own_profile(&db_pool, &principal).await?,
    };
    policy::evaluate(Some(&principal), Resource::Content { owner: owner.user_id }, Action::Create).require()?;

    let title = required(&form.title, "title")?;
    Ok(Json(content::insert_album(&db_pool, owner.id, title).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRef {
    pub album_id: Uuid,
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(AlbumRef { album_id }): Payload<AlbumRef>,
) -> AppResult<StatusCode> {
    let (album, owner) = album_and_owner(&db_pool, album_id).await?;
    policy::evaluate(Some(&principal), Resource::Content { owner: owner.user_id }, Action::Delete).require()?;

    content::delete_album(&db_pool, album.id).await?;
    tracing::info!(%album_id, by = %principal.user_id, "album deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPhoto {
    pub album_id: Uuid,
    pub url: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn add_photo(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(form): Payload<AddPhoto>,
) -> AppResult<Json<Photo>> {
    let (album, owner) = album_and_owner(&db_pool, form.album_id).await?;
    policy::evaluate(Some(&principal), Resource::Content { owner: owner.user_id }, Action::Create).require()?;

    let url = required(&form.url, "url")?;
    Ok(Json(content::insert_photo(&db_pool, album.id, url).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRef {
    pub photo_id: Uuid,
}

/// Removes a photo; shared with the moderation screen.
pub(crate) async fn remove_photo(db_pool: &SqlitePool, principal: &Principal, photo_id: Uuid) -> AppResult<()> {
    let profile_id = content::photo_profile_id(db_pool, photo_id)
        .await?
        .ok_or_else(|| AppError::not_found("photo"))?;
    let owner = profile(db_pool, profile_id).await?;
    policy::evaluate(Some(principal), Resource::Content { owner: owner.user_id }, Action::Delete).require()?;

    content::delete_photo(db_pool, photo_id).await?;
    tracing::info!(%photo_id, by = %principal.user_id, "photo deleted");
    Ok(())
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_photo(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(PhotoRef { photo_id }): Payload<PhotoRef>,
) -> AppResult<StatusCode> {
    remove_photo(&db_pool, &principal, photo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

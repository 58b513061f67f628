//! Posts, albums and photos.

use chrono::Utc;
use sqlx::SqliteExecutor;
use uuid::Uuid;

use super::models::{Album, Photo, Post};

pub async fn insert_post(db: impl SqliteExecutor<'_>, profile_id: Uuid, title: &str, content: &str) -> sqlx::Result<Post> {
    let post = Post {
        id: Uuid::now_v7(),
        profile_id,
        title: title.to_owned(),
        content: content.to_owned(),
        created_at: Utc::now(),
    };
    sqlx::query("INSERT INTO posts (id,profile_id,title,content,created_at) VALUES (?,?,?,?,?)")
        .bind(post.id)
        .bind(post.profile_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.created_at)
        .execute(db)
        .await?;
    Ok(post)
}

pub async fn find_post(db: impl SqliteExecutor<'_>, post_id: Uuid) -> sqlx::Result<Option<Post>> {
    sqlx::query_as("SELECT id,profile_id,title,content,created_at FROM posts WHERE id=?")
        .bind(post_id)
        .fetch_optional(db)
        .await
}

pub async fn recent_posts(db: impl SqliteExecutor<'_>, limit: i64) -> sqlx::Result<Vec<Post>> {
    sqlx::query_as("SELECT id,profile_id,title,content,created_at FROM posts ORDER BY created_at DESC, id DESC LIMIT ?")
        .bind(limit)
        .fetch_all(db)
        .await
}

pub async fn delete_post(db: impl SqliteExecutor<'_>, post_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id=?")
        .bind(post_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn insert_album(db: impl SqliteExecutor<'_>, profile_id: Uuid, title: &str) -> sqlx::Result<Album> {
    let album = Album {
        id: Uuid::now_v7(),
        profile_id,
        title: title.to_owned(),
    };
    sqlx::query("INSERT INTO albums (id,profile_id,title) VALUES (?,?,?)")
        .bind(album.id)
        .bind(album.profile_id)
        .bind(&album.title)
        .execute(db)
        .await?;
    Ok(album)
}

pub async fn find_album(db: impl SqliteExecutor<'_>, album_id: Uuid) -> sqlx::Result<Option<Album>> {
    sqlx::query_as("SELECT id,profile_id,title FROM albums WHERE id=?")
        .bind(album_id)
        .fetch_optional(db)
        .await
}

pub async fn delete_album(db: impl SqliteExecutor<'_>, album_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM albums WHERE id=?")
        .bind(album_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn insert_photo(db: impl SqliteExecutor<'_>, album_id: Uuid, url: &str) -> sqlx::Result<Photo> {
    let photo = Photo {
        id: Uuid::now_v7(),
        album_id,
        url: url.to_owned(),
    };
    sqlx::query("INSERT INTO photos (id,album_id,url) VALUES (?,?,?)")
        .bind(photo.id)
        .bind(photo.album_id)
        .bind(&photo.url)
        .execute(db)
        .await?;
    Ok(photo)
}

/// The profile a photo ultimately belongs to.
pub async fn photo_profile_id(db: impl SqliteExecutor<'_>, photo_id: Uuid) -> sqlx::Result<Option<Uuid>> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "SELECT a.profile_id FROM photos ph JOIN albums a ON a.id = ph.album_id WHERE ph.id=?",
    )
    .bind(photo_id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(|(profile_id,)| profile_id))
}

pub async fn delete_photo(db: impl SqliteExecutor<'_>, photo_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM photos WHERE id=?")
        .bind(photo_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

use std::collections::HashMap;

use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use super::models::{Album, AlbumView, Comment, Photo, PhotoView, Post, PostView, Profile, ProfileAggregate, Visibility};

pub async fn find_by_id(db: impl SqliteExecutor<'_>, profile_id: Uuid) -> sqlx::Result<Option<Profile>> {
    sqlx::query_as("SELECT id,user_id,name,visibility FROM profiles WHERE id=?")
        .bind(profile_id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_user(db: impl SqliteExecutor<'_>, user_id: Uuid) -> sqlx::Result<Option<Profile>> {
    sqlx::query_as("SELECT id,user_id,name,visibility FROM profiles WHERE user_id=?")
        .bind(user_id)
        .fetch_optional(db)
        .await
}

pub async fn insert(db: impl SqliteExecutor<'_>, user_id: Uuid, name: &str, visibility: Visibility) -> sqlx::Result<Profile> {
    let profile = Profile {
        id: Uuid::now_v7(),
        user_id,
        name: name.to_owned(),
        visibility,
    };
    sqlx::query("INSERT INTO profiles (id,user_id,name,visibility) VALUES (?,?,?,?)")
        .bind(profile.id)
        .bind(profile.user_id)
        .bind(&profile.name)
        .bind(profile.visibility)
        .execute(db)
        .await?;
    Ok(profile)
}

pub async fn update(db: impl SqliteExecutor<'_>, profile_id: Uuid, name: &str, visibility: Visibility) -> sqlx::Result<()> {
    sqlx::query("UPDATE profiles SET name=?, visibility=? WHERE id=?")
        .bind(name)
        .bind(visibility)
        .bind(profile_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Public profiles whose name contains `query`.
pub async fn search_public(db: impl SqliteExecutor<'_>, query: &str) -> sqlx::Result<Vec<Profile>> {
    sqlx::query_as(
        "SELECT id,user_id,name,visibility FROM profiles
         WHERE visibility='Public' AND instr(lower(name), lower(?)) > 0
         ORDER BY name",
    )
    .bind(query)
    .fetch_all(db)
    .await
}

/// Profile plus posts, albums, photos and every comment on them.
pub async fn load_aggregate(db_pool: &SqlitePool, profile_id: Uuid) -> sqlx::Result<Option<ProfileAggregate>> {
    let Some(profile) = find_by_id(db_pool, profile_id).await? else {
        return Ok(None);
    };

    let posts: Vec<Post> = sqlx::query_as(
        "SELECT id,profile_id,title,content,created_at FROM posts WHERE profile_id=? ORDER BY created_at DESC, id DESC",
    )
    .bind(profile_id)
    .fetch_all(db_pool)
    .await?;

    let albums: Vec<Album> = sqlx::query_as("SELECT id,profile_id,title FROM albums WHERE profile_id=? ORDER BY id")
        .bind(profile_id)
        .fetch_all(db_pool)
        .await?;

    let photos: Vec<Photo> = sqlx::query_as(
        "SELECT ph.id,ph.album_id,ph.url FROM photos ph
         JOIN albums a ON a.id = ph.album_id
         WHERE a.profile_id=? ORDER BY ph.id",
    )
    .bind(profile_id)
    .fetch_all(db_pool)
    .await?;

    let comments: Vec<Comment> = sqlx::query_as(
        "SELECT c.id,c.user_id,c.post_id,c.photo_id,c.content,c.approval_status,c.created_at FROM comments c
         LEFT JOIN posts p ON p.id = c.post_id
         LEFT JOIN photos ph ON ph.id = c.photo_id
         LEFT JOIN albums a ON a.id = ph.album_id
         WHERE p.profile_id=? OR a.profile_id=?
         ORDER BY c.created_at, c.id",
    )
    .bind(profile_id)
    .bind(profile_id)
    .fetch_all(db_pool)
    .await?;

    let mut post_comments: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    let mut photo_comments: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for comment in comments {
        match (comment.post_id, comment.photo_id) {
            (Some(post_id), _) => post_comments.entry(post_id).or_default().push(comment),
            (None, Some(photo_id)) => photo_comments.entry(photo_id).or_default().push(comment),
            (None, None) => {}
        }
    }

    let mut album_photos: HashMap<Uuid, Vec<PhotoView>> = HashMap::new();
    for photo in photos {
        let comments = photo_comments.remove(&photo.id).unwrap_or_default();
        album_photos.entry(photo.album_id).or_default().push(PhotoView { photo, comments });
    }

    Ok(Some(ProfileAggregate {
        profile,
        posts: posts
            .into_iter()
            .map(|post| {
                let comments = post_comments.remove(&post.id).unwrap_or_default();
                PostView { post, comments }
            })
            .collect(),
        albums: albums
            .into_iter()
            .map(|album| {
                let photos = album_photos.remove(&album.id).unwrap_or_default();
                AlbumView { album, photos }
            })
            .collect(),
    }))
}

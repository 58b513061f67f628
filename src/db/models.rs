use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Role {
    Visitor,
    User,
    Moderator,
    Blocked,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum ApprovalStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Answer to a pending friend request or a pending comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

impl From<Verdict> for FriendshipStatus {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accept => FriendshipStatus::Accepted,
            Verdict::Reject => FriendshipStatus::Rejected,
        }
    }
}

impl From<Verdict> for ApprovalStatus {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accept => ApprovalStatus::Accepted,
            Verdict::Reject => ApprovalStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    pub album_id: Uuid,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Option<Uuid>,
    pub photo_id: Option<Uuid>,
    pub content: String,
    pub approval_status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

/// What a comment hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentTarget {
    Post(Uuid),
    Photo(Uuid),
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    pub fn other_party(&self, user_id: Uuid) -> Uuid {
        if self.sender_id == user_id { self.receiver_id } else { self.sender_id }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Where a message goes: one user or one group, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    User(Uuid),
    Group(Uuid),
}

impl Destination {
    pub(crate) fn columns(self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            Destination::User(id) => (Some(id), None),
            Destination::Group(id) => (None, Some(id)),
        }
    }
}

impl Message {
    pub fn destination(&self) -> Option<Destination> {
        match (self.receiver_id, self.group_id) {
            (Some(user), None) => Some(Destination::User(user)),
            (None, Some(group)) => Some(Destination::Group(group)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoView {
    #[serde(flatten)]
    pub photo: Photo,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumView {
    #[serde(flatten)]
    pub album: Album,
    pub photos: Vec<PhotoView>,
}

/// A profile with everything hanging off it, loaded in one go.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAggregate {
    #[serde(flatten)]
    pub profile: Profile,
    pub posts: Vec<PostView>,
    pub albums: Vec<AlbumView>,
}

impl ProfileAggregate {
    /// Drops every comment that is not `Accepted`.
    pub fn hide_unapproved_comments(&mut self) {
        let keep = |c: &Comment| c.approval_status == ApprovalStatus::Accepted;
        for post in &mut self.posts {
            post.comments.retain(keep);
        }
        for album in &mut self.albums {
            for photo in &mut album.photos {
                photo.comments.retain(keep);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(receiver_id: Option<Uuid>, group_id: Option<Uuid>) -> Message {
        Message {
            id: Uuid::now_v7(),
            sender_id: Uuid::now_v7(),
            receiver_id,
            group_id,
            content: "hi".to_owned(),
            is_read: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn destination_is_exactly_one_of_receiver_or_group() {
        let user = Uuid::now_v7();
        let group = Uuid::now_v7();
        assert_eq!(message(Some(user), None).destination(), Some(Destination::User(user)));
        assert_eq!(message(None, Some(group)).destination(), Some(Destination::Group(group)));
        assert_eq!(message(Some(user), Some(group)).destination(), None);
        assert_eq!(message(None, None).destination(), None);
        assert_eq!(Destination::Group(group).columns(), (None, Some(group)));
    }

    #[test]
    fn other_party_is_symmetric() {
        let friendship = Friendship {
            id: Uuid::now_v7(),
            sender_id: Uuid::now_v7(),
            receiver_id: Uuid::now_v7(),
            status: FriendshipStatus::Pending,
            created_at: Utc::now(),
        };
        assert_eq!(friendship.other_party(friendship.sender_id), friendship.receiver_id);
        assert_eq!(friendship.other_party(friendship.receiver_id), friendship.sender_id);
    }

    #[test]
    fn hiding_comments_keeps_only_accepted() {
        let profile_id = Uuid::now_v7();
        let comment = |status| Comment {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            post_id: None,
            photo_id: None,
            content: "c".to_owned(),
            approval_status: status,
            created_at: Utc::now(),
        };
        let mut aggregate = ProfileAggregate {
            profile: Profile { id: profile_id, user_id: Uuid::now_v7(), name: "a".into(), visibility: Visibility::Public },
            posts: vec![PostView {
                post: Post {
                    id: Uuid::now_v7(),
                    profile_id,
                    title: String::new(),
                    content: "p".into(),
                    created_at: Utc::now(),
                },
                comments: vec![
                    comment(ApprovalStatus::Pending),
                    comment(ApprovalStatus::Accepted),
                    comment(ApprovalStatus::Rejected),
                ],
            }],
            albums: vec![],
        };
        aggregate.hide_unapproved_comments();
        assert_eq!(aggregate.posts[0].comments.len(), 1);
        assert_eq!(aggregate.posts[0].comments[0].approval_status, ApprovalStatus::Accepted);
    }
}

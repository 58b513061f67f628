//! Every allow/deny rule of the service lives here.
//!
//! Handlers gather the facts a rule needs (who owns what, whether two users
//! are friends, group membership), describe them as a [`Resource`], and ask
//! [`evaluate`] whether the acting [`Principal`] may perform an [`Action`].
//! The request-level Visitor gate goes through [`admit`].

use uuid::Uuid;

use crate::{
    db::models::{Role, Visibility},
    principal::Principal,
    AppError, AppResult,
};

/// (controller, actions) pairs a Visitor may reach. Everything else
/// redirects to the access-denied page.
pub const VISITOR_ALLOWED: &[(&str, &[&str])] = &[
    ("Home", &["Index", "Privacy", "AccessDenied"]),
    ("Profile", &["Index", "View"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// A profile, and through it its posts, albums and photos.
    Profile { owner: Uuid, visibility: Visibility, friends: bool },
    /// A post, album or photo owned by the user `owner`.
    Content { owner: Uuid },
    Comment { author: Uuid, parent_owner: Uuid },
    Friendship { sender: Uuid, receiver: Uuid },
    Message { sender: Uuid },
    /// The direct line between the principal and another user.
    DirectLine { friends: bool },
    Group { member: bool },
    /// Moderation and administration screens.
    Site,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    /// Accept or reject a friend request.
    Respond,
    /// Accept or reject a comment.
    Moderate,
    /// Read messages.
    Read,
    /// Send messages.
    Send,
    Administer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No principal where one is needed.
    Unauthenticated,
    /// The principal may not see the resource.
    Hidden,
    Forbidden(&'static str),
    /// Visitor outside the allow-list.
    Redirect,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }

    pub fn require(self) -> AppResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(Denial::Unauthenticated) => Err(AppError::Unauthorized("authentication required".to_owned())),
            Decision::Deny(Denial::Hidden) => Err(AppError::Unauthorized("this profile is private".to_owned())),
            Decision::Deny(Denial::Forbidden(reason)) => Err(AppError::Forbidden(reason.to_owned())),
            Decision::Deny(Denial::Redirect) => Err(AppError::AccessDenied),
        }
    }
}

fn allow_if(condition: bool, reason: &'static str) -> Decision {
    if condition { Decision::Allow } else { Decision::Deny(Denial::Forbidden(reason)) }
}

pub fn evaluate(principal: Option<&Principal>, resource: Resource, action: Action) -> Decision {
    use Action::*;
    use Resource::*;

    // group listings are public
    if let (Group { .. }, View) = (resource, action) {
        return Decision::Allow;
    }

    let Some(principal) = principal else {
        return Decision::Deny(Denial::Unauthenticated);
    };
    let me = principal.user_id;
    let moderator = principal.is_in_role(Role::Moderator);

    match (resource, action) {
        (Profile { owner, visibility, friends }, View) => {
            if owner == me || visibility == Visibility::Public || friends {
                Decision::Allow
            } else {
                Decision::Deny(Denial::Hidden)
            }
        }
        (Profile { owner, .. }, Create | Edit) => allow_if(owner == me, "only the owner can change this profile"),

        // no moderator bypass on create
        (Content { owner }, Create | Edit) => allow_if(owner == me, "only the owner can add to this profile"),
        (Content { owner }, Delete) => allow_if(owner == me || moderator, "only the owner or a moderator can delete this"),

        (Comment { parent_owner, .. }, Moderate) => {
            allow_if(parent_owner == me, "only the owner of the post or photo can moderate its comments")
        }
        (Comment { author, .. }, Delete) => {
            allow_if(author == me || moderator, "only the author or a moderator can delete this comment")
        }

        (Friendship { sender, .. }, Respond) if sender == me => {
            Decision::Deny(Denial::Forbidden("you cannot answer your own friend request"))
        }
        (Friendship { receiver, .. }, Respond) => allow_if(receiver == me, "this friend request is not addressed to you"),
        (Friendship { sender, receiver }, View) => allow_if(sender == me || receiver == me, "not your friend request"),

        (Message { sender }, Delete) => allow_if(sender == me || moderator, "only the sender or a moderator can delete this message"),

        (DirectLine { friends }, Read | Send) => allow_if(friends, "you can only message accepted friends"),

        (Group { member }, Read | Send) => allow_if(member, "only group members can use the group chat"),
        (Group { .. }, Create | Edit) => Decision::Allow,

        (Site, View | Administer | Delete | Edit) => allow_if(moderator, "moderators only"),

        _ => Decision::Deny(Denial::Forbidden("operation not permitted")),
    }
}

/// Request-level gate: blocked principals are refused outright and Visitors
/// are confined to [`VISITOR_ALLOWED`]. Anonymous callers pass; the handlers
/// decide whether they need a principal.
pub fn admit(principal: Option<&Principal>, controller: &str, action: &str) -> Decision {
    let Some(principal) = principal else {
        return Decision::Allow;
    };
    if principal.is_in_role(Role::Blocked) {
        return Decision::Deny(Denial::Forbidden("this account is blocked"));
    }
    if principal.is_in_role(Role::Visitor) && !visitor_may(controller, action) {
        return Decision::Deny(Denial::Redirect);
    }
    Decision::Allow
}

pub fn visitor_may(controller: &str, action: &str) -> bool {
    VISITOR_ALLOWED
        .iter()
        .any(|(c, actions)| c.eq_ignore_ascii_case(controller) && actions.iter().any(|a| a.eq_ignore_ascii_case(action)))
}

//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Forum.
//! Rows are keyed by the store's auto-assigned integer id; a freshly
//! constructed entity carries [`UNSAVED_ID`] until it is persisted.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Primary key type shared by every table.
pub type Id = i64;

/// Sentinel id of an entity that has not been saved yet. Never matches a row.
pub const UNSAVED_ID: Id = -1;

/// A top-level category (e.g. "General", "Off-Topic").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forum {
    pub id: Id,
    pub title: String,
    pub description: String,
    /// Derived at read time, never persisted.
    pub topic_count: i64,
    /// Derived at read time, never persisted.
    pub post_count: i64,
}

/// A discussion thread inside a forum, as written: `Topic::new` → validate → save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub forum_id: Id,
    /// Always `-1`; the real count only exists on [`TopicSummary`].
    pub post_count: i64,
}

impl Topic {
    pub fn new() -> Self {
        Self {
            id: UNSAVED_ID,
            title: String::new(),
            description: String::new(),
            forum_id: UNSAVED_ID,
            post_count: -1,
        }
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self::new()
    }
}

/// A topic as read back from the store, with its post count. Listing
/// pages get these without the owning forum resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub forum_id: Id,
    /// Derived at read time, never persisted.
    pub post_count: i64,
}

/// Detail-page view of a topic with its owning forum resolved, so the page
/// can render forum breadcrumbs without a second lookup in the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicDetail {
    pub topic: TopicSummary,
    pub forum: Forum,
}

/// The part of a user a post listing needs: who wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub id: Id,
    pub username: String,
}

/// A single message within a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Id,
    pub text: String,
    /// Assigned when the post is constructed, not when it is saved.
    pub published: DateTime<Utc>,
    pub topic_id: Id,
    pub user_id: Id,
    /// Populated by every store fetch; `None` only on an unsaved post.
    pub author: Option<PostAuthor>,
}

impl Post {
    pub fn new() -> Self {
        Self {
            id: UNSAVED_ID,
            text: String::new(),
            published: Utc::now(),
            topic_id: UNSAVED_ID,
            user_id: UNSAVED_ID,
            author: None,
        }
    }

    /// True when the resolved author is `user_id`.
    pub fn is_authored_by(&self, user_id: Id) -> bool {
        self.author.as_ref().is_some_and(|a| a.id == user_id)
    }
}

impl Default for Post {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered account.
///
/// `password` holds the plaintext only between form parsing and hashing;
/// it is zeroed by [`User::hash_password`](crate::credentials) and is never
/// read back from storage.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password: Vec<u8>,
    #[serde(skip)]
    pub password_hash: Option<String>,
}

impl User {
    pub fn new() -> Self {
        Self {
            id: UNSAVED_ID,
            username: String::new(),
            email: String::new(),
            password: Vec::new(),
            password_hash: None,
        }
    }

    pub fn has_password_hash(&self) -> bool {
        self.password_hash.as_deref().is_some_and(|h| !h.is_empty())
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("password_hash", &self.password_hash.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.
//! Stores never log or render; they hand back `Result` values for the caller
//! to interpret.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Forum, Id, Post, Topic, TopicDetail, TopicSummary, User};

/// Read access to forums. Counts are always computed fresh.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ForumRepo: Send + Sync {
    /// Every forum in id order, with topic and post counts.
    async fn find_all(&self) -> Result<Vec<Forum>>;
    async fn find_one(&self, id: Id) -> Result<Forum>;
}

/// Persistence contract for topics.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TopicRepo: Send + Sync {
    /// Inserts the topic and returns the assigned id.
    async fn save(&self, topic: &Topic) -> Result<Id>;
    /// Topic with its forum resolved. Fails if the owning forum is gone.
    async fn find_one(&self, id: Id) -> Result<TopicDetail>;
    /// Topics of a forum in id order, without the forum relation.
    async fn find_page(&self, forum_id: Id, limit: i64, offset: i64) -> Result<Vec<TopicSummary>>;
}

/// Persistence contract for posts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    /// Inserts the post with the timestamp it was constructed with.
    async fn save(&self, post: &Post) -> Result<Id>;
    /// Post with its author resolved.
    async fn find_one(&self, id: Id) -> Result<Post>;
    /// Posts of a topic, oldest first, each with its author resolved.
    async fn find_page(&self, topic_id: Id, limit: i64, offset: i64) -> Result<Vec<Post>>;
    /// Hard delete. Returns `false` when no row had that id.
    async fn delete(&self, id: Id) -> Result<bool>;
}

/// Credential storage.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Inserts the user. Refuses users without a password hash.
    async fn save(&self, user: &User) -> Result<Id>;
    async fn find_one_by_username(&self, username: &str) -> Result<User>;
    async fn find_one_by_id(&self, id: Id) -> Result<User>;
}

/// Slow, salted password hashing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Derives a self-describing hash string (algorithm, cost, salt, digest).
    fn hash(&self, plaintext: &[u8]) -> Result<String>;

    /// Constant-time check of `plaintext` against `hash`.
    /// `Ok(false)` means a clean mismatch.
    fn verify(&self, plaintext: &[u8], hash: &str) -> Result<bool>;
}

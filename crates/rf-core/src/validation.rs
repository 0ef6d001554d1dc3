//! # Validation
//!
//! Business rules checked before anything is saved. Every rule is checked on
//! its own, so a caller gets the full list of problems in one pass. Foreign
//! keys are checked with a point lookup through the repository ports; a
//! `NotFound` there is a rule violation, any other error is propagated.

use crate::error::{AppError, Result};
use crate::models::{Id, Post, Topic, User, UNSAVED_ID};
use crate::traits::{ForumRepo, TopicRepo, UserRepo};

/// Longest accepted topic title or description, in characters.
pub const MAX_TOPIC_FIELD_LEN: usize = 255;

/// Ordered list of violated rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    errors: Vec<String>,
}

impl Validation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` unless `ok` holds.
    pub fn check(&mut self, ok: bool, message: &str) {
        if !ok {
            self.errors.push(message.to_string());
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// `Ok(())` when valid, otherwise `ValidationFailed` with every message.
    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationFailed(self.errors))
        }
    }
}

/// Turns a point lookup into "does the row exist".
fn exists<T>(lookup: Result<T>) -> Result<bool> {
    match lookup {
        Ok(_) => Ok(true),
        Err(AppError::NotFound(..)) => Ok(false),
        Err(e) => Err(e),
    }
}

fn is_saved(id: Id) -> bool {
    id != UNSAVED_ID
}

pub async fn validate_topic(forums: &dyn ForumRepo, topic: &Topic) -> Result<Validation> {
    let mut v = Validation::new();
    let title = topic.title.trim();
    let description = topic.description.trim();

    v.check(!title.is_empty(), "Title must not be empty.");
    v.check(
        title.chars().count() <= MAX_TOPIC_FIELD_LEN,
        "Title must be at most 255 characters.",
    );
    v.check(
        description.chars().count() <= MAX_TOPIC_FIELD_LEN,
        "Description must be at most 255 characters.",
    );

    let forum_exists =
        is_saved(topic.forum_id) && exists(forums.find_one(topic.forum_id).await)?;
    v.check(forum_exists, "Forum does not exist.");

    Ok(v)
}

pub async fn validate_post(
    topics: &dyn TopicRepo,
    users: &dyn UserRepo,
    post: &Post,
) -> Result<Validation> {
    let mut v = Validation::new();

    v.check(!post.text.trim().is_empty(), "Text must not be empty.");

    let topic_exists = is_saved(post.topic_id) && exists(topics.find_one(post.topic_id).await)?;
    v.check(topic_exists, "Topic does not exist.");

    let user_exists = is_saved(post.user_id) && exists(users.find_one_by_id(post.user_id).await)?;
    v.check(user_exists, "User does not exist.");

    Ok(v)
}

pub async fn validate_user(users: &dyn UserRepo, user: &User) -> Result<Validation> {
    let mut v = Validation::new();

    v.check(!user.username.is_empty(), "Username must not be empty.");

    if !user.username.is_empty() {
        let taken = exists(users.find_one_by_username(&user.username).await)?;
        v.check(!taken, "Username is already taken.");
    }

    v.check(!user.password.is_empty(), "Password must not be empty.");

    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Forum, TopicDetail, TopicSummary};
    use crate::traits::{MockForumRepo, MockTopicRepo, MockUserRepo};
    use mockall::predicate::*;
    use tokio_test::block_on;

    fn forum(id: Id) -> Forum {
        Forum {
            id,
            title: "test".into(),
            description: "tester forum".into(),
            topic_count: 0,
            post_count: 0,
        }
    }

    /// Forum 1 exists, everything else does not.
    fn forums() -> MockForumRepo {
        let mut repo = MockForumRepo::new();
        repo.expect_find_one().returning(|id| {
            if id == 1 {
                Ok(forum(1))
            } else {
                Err(AppError::not_found("forum", format!("id {id}")))
            }
        });
        repo
    }

    /// Topic 2 and user 1 exist.
    fn topics() -> MockTopicRepo {
        let mut repo = MockTopicRepo::new();
        repo.expect_find_one().returning(|id| {
            if id == 2 {
                Ok(TopicDetail {
                    topic: TopicSummary {
                        id: 2,
                        title: "test topic".into(),
                        description: String::new(),
                        forum_id: 1,
                        post_count: 0,
                    },
                    forum: forum(1),
                })
            } else {
                Err(AppError::not_found("topic", format!("id {id}")))
            }
        });
        repo
    }

    fn users() -> MockUserRepo {
        let mut repo = MockUserRepo::new();
        repo.expect_find_one_by_id().returning(|id| {
            if id == 1 {
                Ok(User { id: 1, username: "test".into(), ..User::new() })
            } else {
                Err(AppError::not_found("user", format!("id {id}")))
            }
        });
        repo.expect_find_one_by_username().returning(|name| {
            if name == "test" {
                Ok(User { id: 1, username: "test".into(), ..User::new() })
            } else {
                Err(AppError::not_found("user", format!("username {name}")))
            }
        });
        repo
    }

    #[test]
    fn blank_topic_reports_title_and_forum() {
        let v = block_on(validate_topic(&forums(), &Topic::new())).unwrap();
        assert!(!v.is_valid());
        assert_eq!(v.errors(), ["Title must not be empty.", "Forum does not exist."]);
    }

    #[test]
    fn sentinel_forum_id_never_hits_the_store() {
        let mut repo = MockForumRepo::new();
        repo.expect_find_one().never();

        let topic = Topic { title: "Test".into(), ..Topic::new() };
        let v = block_on(validate_topic(&repo, &topic)).unwrap();
        assert_eq!(v.errors(), ["Forum does not exist."]);
    }

    #[test]
    fn topic_rules_walkthrough() {
        let repo = forums();
        let mut topic = Topic::new();

        topic.title = "Test".into();
        topic.forum_id = 255;
        let v = block_on(validate_topic(&repo, &topic)).unwrap();
        assert_eq!(v.errors(), ["Forum does not exist."]);

        topic.forum_id = 1;
        assert!(block_on(validate_topic(&repo, &topic)).unwrap().is_valid());

        topic.title = "a".repeat(256);
        let v = block_on(validate_topic(&repo, &topic)).unwrap();
        assert_eq!(v.errors(), ["Title must be at most 255 characters."]);

        topic.title = "Test".into();
        topic.description = "a".repeat(256);
        let v = block_on(validate_topic(&repo, &topic)).unwrap();
        assert_eq!(v.errors(), ["Description must be at most 255 characters."]);

        topic.title = "a".repeat(255);
        topic.description = "a".repeat(255);
        assert!(block_on(validate_topic(&repo, &topic)).unwrap().is_valid());
    }

    #[test]
    fn topic_lengths_are_measured_after_trimming_in_characters() {
        let topic = Topic {
            title: format!("  {}  ", "ü".repeat(255)),
            description: format!("\t{}\n", "é".repeat(255)),
            forum_id: 1,
            ..Topic::new()
        };
        assert!(block_on(validate_topic(&forums(), &topic)).unwrap().is_valid());
    }

    #[test]
    fn forum_lookup_storage_error_is_propagated() {
        let mut repo = MockForumRepo::new();
        repo.expect_find_one()
            .with(eq(1))
            .returning(|_| Err(AppError::Storage("database is locked".into())));

        let topic = Topic { title: "Test".into(), forum_id: 1, ..Topic::new() };
        let err = block_on(validate_topic(&repo, &topic)).unwrap_err();
        assert_eq!(err, AppError::Storage("database is locked".into()));
    }

    #[test]
    fn fresh_post_reports_exactly_three_errors() {
        let v = block_on(validate_post(&topics(), &users(), &Post::new())).unwrap();
        assert_eq!(
            v.errors(),
            ["Text must not be empty.", "Topic does not exist.", "User does not exist."]
        );
    }

    #[test]
    fn post_rules_walkthrough() {
        let (t, u) = (topics(), users());
        let mut post = Post::new();

        post.user_id = i64::MAX;
        assert_eq!(block_on(validate_post(&t, &u, &post)).unwrap().errors().len(), 3);

        post.user_id = 1;
        assert_eq!(block_on(validate_post(&t, &u, &post)).unwrap().errors().len(), 2);

        post.text = "Hello!".into();
        assert_eq!(
            block_on(validate_post(&t, &u, &post)).unwrap().errors(),
            ["Topic does not exist."]
        );

        post.topic_id = i64::MAX;
        assert_eq!(block_on(validate_post(&t, &u, &post)).unwrap().errors().len(), 1);

        post.topic_id = 2;
        assert!(block_on(validate_post(&t, &u, &post)).unwrap().is_valid());
    }

    #[test]
    fn whitespace_only_post_text_counts_as_empty() {
        let post = Post {
            id: 1,
            text: "\t\n\t\n\t\n    \t\n\t\n\t\n".into(),
            topic_id: 2,
            user_id: 1,
            ..Post::new()
        };
        let v = block_on(validate_post(&topics(), &users(), &post)).unwrap();
        assert_eq!(v.errors(), ["Text must not be empty."]);
    }

    #[test]
    fn blank_user_reports_username_and_password() {
        let mut repo = MockUserRepo::new();
        repo.expect_find_one_by_username().never();

        let v = block_on(validate_user(&repo, &User::new())).unwrap();
        assert_eq!(v.errors(), ["Username must not be empty.", "Password must not be empty."]);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let user = User {
            username: "test".into(),
            password: b"pw".to_vec(),
            ..User::new()
        };
        let v = block_on(validate_user(&users(), &user)).unwrap();
        assert_eq!(v.errors(), ["Username is already taken."]);

        let fresh = User { username: "newcomer".into(), ..user };
        assert!(block_on(validate_user(&users(), &fresh)).unwrap().is_valid());
    }

    #[test]
    fn into_result_carries_every_message() {
        let mut v = Validation::new();
        v.check(false, "one");
        v.check(true, "skipped");
        v.check(false, "two");
        assert_eq!(
            v.into_result(),
            Err(AppError::ValidationFailed(vec!["one".into(), "two".into()]))
        );
        assert_eq!(Validation::new().into_result(), Ok(()));
    }
}

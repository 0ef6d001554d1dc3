//! Explicit form decoding.
//!
//! Each entity has its own parse function that reads the named fields it
//! needs and nothing else. Parsing only checks shape; business rules are
//! left to `rf_core::validation`.

use std::collections::HashMap;

use rf_core::models::{Id, Post, Topic, User};

/// Raw `application/x-www-form-urlencoded` fields.
pub type FormFields = HashMap<String, String>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("missing form field `{0}`")]
    Missing(&'static str),
    #[error("form field `{field}` is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },
}

fn required(fields: &mut FormFields, name: &'static str) -> Result<String, FormError> {
    fields.remove(name).ok_or(FormError::Missing(name))
}

fn optional(fields: &mut FormFields, name: &str) -> String {
    fields.remove(name).unwrap_or_default()
}

fn number(fields: &mut FormFields, name: &'static str) -> Result<Id, FormError> {
    let raw = required(fields, name)?;
    raw.trim()
        .parse()
        .map_err(|_| FormError::NotANumber { field: name, value: raw })
}

/// New topic in the forum named by the URL.
pub fn parse_topic(forum_id: Id, mut fields: FormFields) -> Result<Topic, FormError> {
    Ok(Topic {
        title: required(&mut fields, "title")?,
        description: optional(&mut fields, "description"),
        forum_id,
        ..Topic::new()
    })
}

/// New post in the topic named by the URL. The author comes from the session.
pub fn parse_post(topic_id: Id, mut fields: FormFields) -> Result<Post, FormError> {
    Ok(Post {
        text: required(&mut fields, "text")?,
        topic_id,
        ..Post::new()
    })
}

/// The password string is moved into the user's byte buffer without a copy.
pub fn parse_registration(mut fields: FormFields) -> Result<User, FormError> {
    Ok(User {
        username: required(&mut fields, "username")?,
        email: optional(&mut fields, "email"),
        password: required(&mut fields, "password")?.into_bytes(),
        ..User::new()
    })
}

pub struct LoginForm {
    pub username: String,
    pub password: Vec<u8>,
    /// Page the login was started from; may be empty.
    pub referer: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("referer", &self.referer)
            .finish()
    }
}

pub fn parse_login(mut fields: FormFields) -> Result<LoginForm, FormError> {
    Ok(LoginForm {
        username: required(&mut fields, "username")?,
        password: required(&mut fields, "password")?.into_bytes(),
        referer: optional(&mut fields, "referer"),
    })
}

/// Id of the post to delete.
pub fn parse_delete(mut fields: FormFields) -> Result<Id, FormError> {
    number(&mut fields, "post_id")
}
